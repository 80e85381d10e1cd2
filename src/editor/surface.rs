//! Boundary between the pure editor and whatever draws the map.
//!
//! The editor never touches a render surface during a transition. After each
//! transition the host hands the new state and the emitted highlights to a
//! [`SurfaceAdapter`], which pushes only the layers whose derived geometry
//! changed.

use geojson::FeatureCollection;
use log::debug;

use super::overlay::{OverlayGeoreferencer, overlay_collection};
use super::state::EditorState;
use crate::graph::features::{edges_collection, nodes_collection, preview_collection};

/// Layers the editor produces geometry for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
	/// Node points.
	Nodes,
	/// Edge lines.
	Edges,
	/// The dashed in-progress edge.
	Preview,
	/// The raster overlay footprint.
	Overlay,
}

impl LayerKind {
	/// Every layer, bottom to top.
	pub const ALL: [LayerKind; 4] = [
		LayerKind::Overlay,
		LayerKind::Edges,
		LayerKind::Preview,
		LayerKind::Nodes,
	];
}

/// Request to switch a feature's highlight on or off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Highlight {
	/// Layer holding the feature.
	pub layer: LayerKind,
	/// Feature id within the layer.
	pub feature_id: i64,
	/// Highlighted or not.
	pub on: bool,
}

impl Highlight {
	/// Switch on.
	pub fn on(layer: LayerKind, feature_id: i64) -> Self {
		Self {
			layer,
			feature_id,
			on: true,
		}
	}

	/// Switch off.
	pub fn off(layer: LayerKind, feature_id: i64) -> Self {
		Self {
			layer,
			feature_id,
			on: false,
		}
	}
}

/// What the editor needs from a map renderer.
pub trait RenderSurface {
	/// Replace all features of `layer`.
	fn set_features(&mut self, layer: LayerKind, features: FeatureCollection);
	/// Toggle the highlight of one feature.
	fn set_highlight(&mut self, layer: LayerKind, feature_id: i64, on: bool);
}

/// Derived geometry of every layer for one state.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedLayers {
	/// Nodes layer.
	pub nodes: FeatureCollection,
	/// Edges layer.
	pub edges: FeatureCollection,
	/// Preview layer.
	pub preview: FeatureCollection,
	/// Overlay layer.
	pub overlay: FeatureCollection,
}

impl DerivedLayers {
	/// Derive all layers from `state`.
	pub fn derive(state: &EditorState, georeferencer: &OverlayGeoreferencer) -> Self {
		let graph = state.graph();
		Self {
			nodes: nodes_collection(graph),
			edges: edges_collection(graph),
			preview: preview_collection(state.preview_segment()),
			overlay: overlay_collection(
				state
					.overlay()
					.map(|o| (georeferencer.quad(o), o.opacity)),
			),
		}
	}

	/// Collection for `layer`.
	pub fn layer(&self, layer: LayerKind) -> &FeatureCollection {
		match layer {
			LayerKind::Nodes => &self.nodes,
			LayerKind::Edges => &self.edges,
			LayerKind::Preview => &self.preview,
			LayerKind::Overlay => &self.overlay,
		}
	}
}

/// Keeps a render surface in step with editor states.
#[derive(Clone, Debug)]
pub struct SurfaceAdapter {
	georeferencer: OverlayGeoreferencer,
	last: Option<DerivedLayers>,
}

impl SurfaceAdapter {
	/// Adapter projecting the overlay with `georeferencer`.
	pub fn new(georeferencer: OverlayGeoreferencer) -> Self {
		Self {
			georeferencer,
			last: None,
		}
	}

	/// The georeferencer used for the overlay layer.
	pub fn georeferencer(&self) -> &OverlayGeoreferencer {
		&self.georeferencer
	}

	/// Push changed layers, then apply `highlights`. The first call pushes
	/// every layer.
	pub fn sync(
		&mut self,
		state: &EditorState,
		highlights: &[Highlight],
		surface: &mut impl RenderSurface,
	) {
		let derived = DerivedLayers::derive(state, &self.georeferencer);
		for layer in LayerKind::ALL {
			let changed = self
				.last
				.as_ref()
				.is_none_or(|last| last.layer(layer) != derived.layer(layer));
			if changed {
				debug!("layer {layer:?} updated");
				surface.set_features(layer, derived.layer(layer).clone());
			}
		}
		for h in highlights {
			surface.set_highlight(h.layer, h.feature_id, h.on);
		}
		self.last = Some(derived);
	}

	/// Forget what was pushed, so the next sync pushes every layer again.
	pub fn invalidate(&mut self) {
		self.last = None;
	}
}
