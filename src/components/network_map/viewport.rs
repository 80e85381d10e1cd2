use std::f64::consts::PI;

use crate::geodesy::LngLat;

const TILE_SIZE: f64 = 256.0;
const MAX_LAT: f64 = 85.051_128_78;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 22.0;

/// Web-Mercator view: which position sits at the canvas centre, at which
/// zoom, on a canvas of which size.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	pub center: LngLat,
	pub zoom: f64,
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub fn new(center: LngLat, zoom: f64, width: f64, height: f64) -> Self {
		Self {
			center,
			zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
			width,
			height,
		}
	}

	fn world_size(&self) -> f64 {
		TILE_SIZE * self.zoom.exp2()
	}

	fn to_world(&self, p: LngLat) -> (f64, f64) {
		let size = self.world_size();
		let lat = p.lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
		let x = (p.lng + 180.0) / 360.0 * size;
		let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
		(x, y)
	}

	fn from_world(&self, x: f64, y: f64) -> LngLat {
		let size = self.world_size();
		let lng = x / size * 360.0 - 180.0;
		let lat = (PI * (1.0 - 2.0 * y / size)).sinh().atan().to_degrees();
		LngLat::new(lng, lat)
	}

	/// Geographic → canvas pixels.
	pub fn project(&self, p: LngLat) -> (f64, f64) {
		let (cx, cy) = self.to_world(self.center);
		let (x, y) = self.to_world(p);
		(x - cx + self.width / 2.0, y - cy + self.height / 2.0)
	}

	/// Canvas pixels → geographic.
	pub fn unproject(&self, sx: f64, sy: f64) -> LngLat {
		let (cx, cy) = self.to_world(self.center);
		self.from_world(cx + sx - self.width / 2.0, cy + sy - self.height / 2.0)
	}

	/// Move the view so the content follows a drag of `(dx, dy)` pixels.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.center = self.unproject(self.width / 2.0 - dx, self.height / 2.0 - dy);
	}

	/// Zoom by `delta` levels keeping the position under `(sx, sy)` fixed.
	pub fn zoom_around(&mut self, sx: f64, sy: f64, delta: f64) {
		let anchor = self.unproject(sx, sy);
		self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
		let (ax, ay) = self.project(anchor);
		self.pan_by(sx - ax, sy - ay);
	}

	/// Centre on a bounding box and pick the largest zoom that shows it with
	/// `padding` pixels to spare on each side.
	pub fn fit_bounds(&mut self, sw: LngLat, ne: LngLat, padding: f64) {
		self.center = LngLat::new((sw.lng + ne.lng) / 2.0, (sw.lat + ne.lat) / 2.0);
		let (x0, y0) = self.to_world(sw);
		let (x1, y1) = self.to_world(ne);
		let (span_x, span_y) = ((x1 - x0).abs().max(1e-9), (y1 - y0).abs().max(1e-9));
		let avail_x = (self.width - 2.0 * padding).max(1.0);
		let avail_y = (self.height - 2.0 * padding).max(1.0);
		let scale = (avail_x / span_x).min(avail_y / span_y);
		self.zoom = (self.zoom + scale.log2()).clamp(MIN_ZOOM, MAX_ZOOM);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Degrees between graticule lines that keeps them roughly 100 px apart.
	pub fn graticule_step(&self) -> f64 {
		let degrees_per_px = 360.0 / self.world_size();
		let target = degrees_per_px * 100.0;
		let mut step = 1e-5;
		while step < target {
			step *= 10.0;
		}
		step
	}
}
