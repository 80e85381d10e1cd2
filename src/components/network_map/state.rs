use std::collections::HashSet;

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Value};
use web_sys::HtmlImageElement;

use super::viewport::Viewport;
use crate::config::BaseMapStyle;
use crate::editor::{LayerKind, RenderSurface};
use crate::geodesy::LngLat;

pub const NODE_RADIUS: f64 = 6.0;
/// Pointer travel below which a press-release counts as a click.
pub const CLICK_SLOP: f64 = 3.0;

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub last_x: f64,
	pub last_y: f64,
}

#[derive(Clone, Debug)]
pub struct OverlayPlacement {
	/// `nw, ne, se, sw`.
	pub corners: [LngLat; 4],
	pub opacity: f64,
}

/// Canvas-backed render surface: the last geometry pushed for every layer,
/// the highlighted features, and the view onto them.
pub struct MapSurface {
	pub viewport: Viewport,
	pub pan: PanState,
	pub basemap: BaseMapStyle,
	pub hit_radius: f64,
	pub overlay_image: Option<HtmlImageElement>,
	pub nodes: Vec<(i64, LngLat)>,
	pub edges: Vec<(i64, Vec<LngLat>)>,
	pub preview: Option<(LngLat, LngLat)>,
	pub overlay: Option<OverlayPlacement>,
	highlighted: HashSet<(LayerKind, i64)>,
}

fn feature_id(feature: &Feature) -> Option<i64> {
	match feature.id.as_ref()? {
		Id::Number(n) => n.as_i64(),
		Id::String(s) => s.parse().ok(),
	}
}

fn positions(line: &[Vec<f64>]) -> Vec<LngLat> {
	line.iter()
		.filter(|p| p.len() >= 2)
		.map(|p| LngLat::new(p[0], p[1]))
		.collect()
}

fn geometry(feature: &Feature) -> Option<&Value> {
	feature.geometry.as_ref().map(|g| &g.value)
}

impl MapSurface {
	pub fn new(viewport: Viewport, basemap: BaseMapStyle, hit_radius: f64) -> Self {
		Self {
			viewport,
			pan: PanState::default(),
			basemap,
			hit_radius,
			overlay_image: None,
			nodes: Vec::new(),
			edges: Vec::new(),
			preview: None,
			overlay: None,
			highlighted: HashSet::new(),
		}
	}

	pub fn is_highlighted(&self, layer: LayerKind, id: i64) -> bool {
		self.highlighted.contains(&(layer, id))
	}

	/// Topmost node within the hit radius of canvas point `(sx, sy)`.
	pub fn node_at(&self, sx: f64, sy: f64) -> Option<i64> {
		let r = self.hit_radius.max(NODE_RADIUS);
		self.nodes
			.iter()
			.rev()
			.find(|(_, p)| {
				let (x, y) = self.viewport.project(*p);
				(x - sx).hypot(y - sy) <= r
			})
			.map(|(id, _)| *id)
	}

	/// Topmost edge passing within the hit radius of `(sx, sy)`.
	pub fn edge_at(&self, sx: f64, sy: f64) -> Option<i64> {
		self.edges
			.iter()
			.rev()
			.find(|(_, line)| {
				line.windows(2).any(|w| {
					let a = self.viewport.project(w[0]);
					let b = self.viewport.project(w[1]);
					distance_to_segment((sx, sy), a, b) <= self.hit_radius / 2.0
				})
			})
			.map(|(id, _)| *id)
	}
}

fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 < 1e-12 {
		0.0
	} else {
		(((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
	};
	(p.0 - (a.0 + t * dx)).hypot(p.1 - (a.1 + t * dy))
}

impl RenderSurface for MapSurface {
	fn set_features(&mut self, layer: LayerKind, features: FeatureCollection) {
		let features = features.features;
		match layer {
			LayerKind::Nodes => {
				self.nodes = features
					.iter()
					.filter_map(|f| match geometry(f) {
						Some(Value::Point(p)) if p.len() >= 2 => {
							Some((feature_id(f)?, LngLat::new(p[0], p[1])))
						}
						_ => None,
					})
					.collect();
			}
			LayerKind::Edges => {
				self.edges = features
					.iter()
					.filter_map(|f| match geometry(f) {
						Some(Value::LineString(line)) => Some((feature_id(f)?, positions(line))),
						_ => None,
					})
					.collect();
			}
			LayerKind::Preview => {
				self.preview = features.iter().find_map(|f| match geometry(f) {
					Some(Value::LineString(line)) => match positions(line).as_slice() {
						[a, b, ..] => Some((*a, *b)),
						_ => None,
					},
					_ => None,
				});
			}
			LayerKind::Overlay => {
				self.overlay = features.iter().find_map(|f| {
					let Some(Value::Polygon(rings)) = geometry(f) else {
						return None;
					};
					let ring = positions(rings.first()?);
					let corners: [LngLat; 4] = ring.get(..4)?.try_into().ok()?;
					let opacity = f
						.properties
						.as_ref()
						.and_then(|p| p.get("opacity"))
						.and_then(|v| v.as_f64())
						.unwrap_or(1.0);
					Some(OverlayPlacement { corners, opacity })
				});
			}
		}
	}

	fn set_highlight(&mut self, layer: LayerKind, feature_id: i64, on: bool) {
		if on {
			self.highlighted.insert((layer, feature_id));
		} else {
			self.highlighted.remove(&(layer, feature_id));
		}
	}
}
