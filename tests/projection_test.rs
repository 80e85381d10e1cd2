use geo_network_editor::editor::{OverlayConfig, OverlayGeoreferencer, Shape};
use geo_network_editor::geodesy::{GaussKruger, LngLat, PlanePoint, rotate};
use pretty_assertions::assert_eq;

const ZONE_IX: LngLat = LngLat::new(139.0 + 50.0 / 60.0, 36.0);

fn overlay(center: LngLat, width: f64, height: f64, rotation_deg: f64) -> OverlayConfig {
	OverlayConfig {
		pixel_shape: Shape::new(width, height),
		physical_shape_meters: Shape::new(width, height),
		rotation_deg,
		center,
		opacity: 1.0,
	}
}

// =============================================================================
// Projection
// =============================================================================

#[test]
fn inverse_undoes_forward_near_origin() {
	let gk = GaussKruger::new(ZONE_IX);
	for i in -10..=10 {
		for j in -10..=10 {
			let p = LngLat::new(ZONE_IX.lng + i as f64 * 0.25, ZONE_IX.lat + j as f64 * 0.25);
			let back = gk.inverse(gk.forward(p));
			assert!((back.lng - p.lng).abs() < 1e-9, "lng drift at {p:?}: {back:?}");
			assert!((back.lat - p.lat).abs() < 1e-9, "lat drift at {p:?}: {back:?}");
		}
	}
}

#[test]
fn one_degree_north_is_about_111_km() {
	let gk = GaussKruger::new(ZONE_IX);
	let p = gk.forward(LngLat::new(ZONE_IX.lng, ZONE_IX.lat + 1.0));
	assert!(p.y.abs() < 1e-6, "on the central meridian: {p:?}");
	assert!((p.x - 111_000.0).abs() < 1_000.0, "x = {}", p.x);
}

#[test]
fn rotate_quarter_turn() {
	assert_eq!(rotate(0.0, PlanePoint::new(3.0, -4.0)), PlanePoint::new(3.0, -4.0));

	let r = rotate(90.0, PlanePoint::new(1.0, 0.0));
	assert!(r.x.abs() < 1e-12);
	assert!((r.y - 1.0).abs() < 1e-12);
}

// =============================================================================
// Overlay quadrilateral
// =============================================================================

#[test]
fn overlay_example_bounds() {
	let center = LngLat::new(139.74515, 35.71968);
	let georef = OverlayGeoreferencer::new(ZONE_IX);
	let quad = georef.quad(&overlay(center, 800.0, 350.0, 0.0));
	let (sw, ne) = quad.fit_bounds();

	assert!(sw.lng < center.lng && center.lng < ne.lng);
	assert!(sw.lat < center.lat && center.lat < ne.lat);

	let gk = georef.projection();
	assert_eq!(gk.origin(), ZONE_IX);
	let west = gk.forward(LngLat::new(sw.lng, center.lat));
	let east = gk.forward(LngLat::new(ne.lng, center.lat));
	let extent = east.y - west.y;
	assert!((extent - 800.0).abs() < 1.0, "east-west extent {extent} m");
}

#[test]
fn overlay_corners_wind_nw_ne_se_sw() {
	let center = LngLat::new(139.74515, 35.71968);
	let quad = OverlayGeoreferencer::new(ZONE_IX).quad(&overlay(center, 800.0, 350.0, 0.0));

	assert!(quad.nw.lat > quad.sw.lat && quad.ne.lat > quad.se.lat);
	assert!(quad.ne.lng > quad.nw.lng && quad.se.lng > quad.sw.lng);
}

#[test]
fn overlay_sides_keep_their_length_under_rotation() {
	let center = LngLat::new(139.74515, 35.71968);
	let georef = OverlayGeoreferencer::new(ZONE_IX);
	let gk = georef.projection();
	for rotation in [0.0, 30.0, 90.0, 217.5] {
		let quad = georef.quad(&overlay(center, 800.0, 350.0, rotation));
		let [nw, ne, se, _] = quad.corners().map(|c| gk.forward(c));
		let top = (ne.x - nw.x).hypot(ne.y - nw.y);
		let right = (se.x - ne.x).hypot(se.y - ne.y);
		assert!((top - 800.0).abs() < 1e-6, "top {top} at {rotation} deg");
		assert!((right - 350.0).abs() < 1e-6, "right {right} at {rotation} deg");
	}
}
