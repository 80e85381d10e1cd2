//! Georeferencing of the raster overlay: from a centre, a size in meters and
//! a rotation to four geographic corners.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

use super::state::OverlayConfig;
use crate::geodesy::{GaussKruger, LngLat, PlanePoint, rotate};

/// Geographic corners of the overlay. Raster consumers expect exactly this
/// winding: north-west, north-east, south-east, south-west.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
	/// Top-left corner of the image.
	pub nw: LngLat,
	/// Top-right corner of the image.
	pub ne: LngLat,
	/// Bottom-right corner of the image.
	pub se: LngLat,
	/// Bottom-left corner of the image.
	pub sw: LngLat,
}

impl Quad {
	/// Corners in winding order.
	pub fn corners(&self) -> [LngLat; 4] {
		[self.nw, self.ne, self.se, self.sw]
	}

	/// Axis-aligned bounding box as `(south-west, north-east)`.
	pub fn fit_bounds(&self) -> (LngLat, LngLat) {
		let corners = self.corners();
		let (mut min, mut max) = (corners[0], corners[0]);
		for c in &corners[1..] {
			min.lng = min.lng.min(c.lng);
			min.lat = min.lat.min(c.lat);
			max.lng = max.lng.max(c.lng);
			max.lat = max.lat.max(c.lat);
		}
		(min, max)
	}
}

/// Projects overlay placements through a projection anchored at a fixed
/// reference origin.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayGeoreferencer {
	projection: GaussKruger,
}

impl OverlayGeoreferencer {
	/// Georeferencer with its projection anchored at `origin`.
	pub fn new(origin: LngLat) -> Self {
		Self {
			projection: GaussKruger::new(origin),
		}
	}

	/// The projection in use.
	pub fn projection(&self) -> &GaussKruger {
		&self.projection
	}

	/// Corners of the rotated rectangle described by `config`.
	///
	/// Plane `x` is north, so the rectangle's height runs along `x` and its
	/// width along `y`.
	pub fn quad(&self, config: &OverlayConfig) -> Quad {
		let center = self.projection.forward(config.center);
		let half_w = config.physical_shape_meters.width / 2.0;
		let half_h = config.physical_shape_meters.height / 2.0;
		let corner = |north: f64, east: f64| {
			let offset = rotate(-config.rotation_deg, PlanePoint::new(north, east));
			self.projection.inverse(center + offset)
		};

		Quad {
			nw: corner(half_h, -half_w),
			ne: corner(half_h, half_w),
			se: corner(-half_h, half_w),
			sw: corner(-half_h, -half_w),
		}
	}
}

/// Render layer for the overlay: one closed polygon `nw, ne, se, sw, nw`
/// carrying `opacity`, or nothing when no image is loaded.
pub fn overlay_collection(placement: Option<(Quad, f64)>) -> FeatureCollection {
	let features = placement
		.map(|(quad, opacity)| {
			let mut ring: Vec<Vec<f64>> = quad.corners().iter().map(|c| c.to_position()).collect();
			ring.push(quad.nw.to_position());
			let mut props = JsonObject::new();
			props.insert("opacity".into(), json!(opacity));
			Feature {
				bbox: None,
				geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
				id: None,
				properties: Some(props),
				foreign_members: None,
			}
		})
		.into_iter()
		.collect();
	FeatureCollection {
		bbox: None,
		features,
		foreign_members: None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::editor::state::Shape;

	fn config(width: f64, height: f64, rotation_deg: f64) -> OverlayConfig {
		OverlayConfig {
			pixel_shape: Shape::new(width, height),
			physical_shape_meters: Shape::new(width, height),
			rotation_deg,
			center: LngLat::new(139.74515, 35.71968),
			opacity: 1.0,
		}
	}

	fn georeferencer() -> OverlayGeoreferencer {
		OverlayGeoreferencer::new(LngLat::new(139.0 + 50.0 / 60.0, 36.0))
	}

	#[test]
	fn unrotated_quad_is_axis_aligned() {
		let quad = georeferencer().quad(&config(800.0, 350.0, 0.0));
		assert!(quad.nw.lat > quad.sw.lat);
		assert!(quad.ne.lng > quad.nw.lng);
		assert!((quad.nw.lat - quad.ne.lat).abs() < 1e-5);
		assert!((quad.sw.lng - quad.nw.lng).abs() < 1e-5);
	}

	#[test]
	fn quarter_turn_swaps_extents() {
		let g = georeferencer();
		let flat = g.quad(&config(800.0, 350.0, 0.0)).fit_bounds();
		let turned = g.quad(&config(800.0, 350.0, 90.0)).fit_bounds();
		let flat_span = flat.1.lng - flat.0.lng;
		let turned_span = turned.1.lat - turned.0.lat;
		// 800 m east-west becomes 800 m north-south.
		let lat_per_lng = flat_span / turned_span;
		assert!(lat_per_lng > 1.1 && lat_per_lng < 1.3, "{lat_per_lng}");
	}

	#[test]
	fn fit_bounds_covers_every_corner() {
		let quad = georeferencer().quad(&config(500.0, 300.0, 33.0));
		let (sw, ne) = quad.fit_bounds();
		for c in quad.corners() {
			assert!(c.lng >= sw.lng && c.lng <= ne.lng);
			assert!(c.lat >= sw.lat && c.lat <= ne.lat);
		}
	}

	#[test]
	fn overlay_layer_is_a_closed_ring() {
		let quad = georeferencer().quad(&config(10.0, 10.0, 0.0));
		let fc = overlay_collection(Some((quad, 0.5)));
		let Some(Value::Polygon(rings)) = fc.features[0].geometry.as_ref().map(|g| g.value.clone())
		else {
			panic!("expected polygon");
		};
		assert_eq!(rings[0].len(), 5);
		assert_eq!(rings[0][0], rings[0][4]);
		assert!(overlay_collection(None).features.is_empty());
	}
}
