use crate::geodesy::LngLat;
use crate::graph::{EdgeId, Graph, NodeId};

/// Whether an edge is pending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawMode {
	/// No pending edge.
	#[default]
	Idle,
	/// An edge is pending from `anchor`; the next click completes or extends
	/// the path.
	DrawingEdge {
		/// Node the pending edge starts from.
		anchor: NodeId,
	},
}

/// Width and height pair.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Shape {
	/// Horizontal extent.
	pub width: f64,
	/// Vertical extent.
	pub height: f64,
}

impl Shape {
	/// Build a shape.
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}
}

/// Placement of the raster overlay. Exists only once an image was loaded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayConfig {
	/// Decoded image size in pixels.
	pub pixel_shape: Shape,
	/// Size on the ground in meters.
	pub physical_shape_meters: Shape,
	/// Clockwise-on-screen rotation, degrees.
	pub rotation_deg: f64,
	/// Geographic centre of the image.
	pub center: LngLat,
	/// 0 is transparent, 1 is opaque.
	pub opacity: f64,
}

impl OverlayConfig {
	/// Fresh placement: one meter per pixel, unrotated, opaque.
	pub fn new(pixel_width: u32, pixel_height: u32, center: LngLat) -> Self {
		let pixels = Shape::new(f64::from(pixel_width), f64::from(pixel_height));
		Self {
			pixel_shape: pixels,
			physical_shape_meters: pixels,
			rotation_deg: 0.0,
			center,
			opacity: 1.0,
		}
	}
}

/// Everything the editor knows about a session.
///
/// Values of this type are never mutated after a transition hands them out;
/// each event yields a new state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorState {
	pub(crate) graph: Graph,
	pub(crate) mode: DrawMode,
	pub(crate) hover_node: Option<NodeId>,
	pub(crate) hover_edge: Option<EdgeId>,
	pub(crate) preview: Option<(LngLat, LngLat)>,
	pub(crate) overlay: Option<OverlayConfig>,
}

impl EditorState {
	/// Empty session.
	pub fn new() -> Self {
		Self::default()
	}

	/// Nodes and edges.
	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	/// Drawing mode.
	pub fn mode(&self) -> DrawMode {
		self.mode
	}

	/// Anchor of the pending edge, if any.
	pub fn pending_edge_from(&self) -> Option<NodeId> {
		match self.mode {
			DrawMode::Idle => None,
			DrawMode::DrawingEdge { anchor } => Some(anchor),
		}
	}

	/// Hovered node.
	pub fn hover_node(&self) -> Option<NodeId> {
		self.hover_node
	}

	/// Hovered edge.
	pub fn hover_edge(&self) -> Option<EdgeId> {
		self.hover_edge
	}

	/// Anchor position to cursor position, while drawing.
	pub fn preview_segment(&self) -> Option<(LngLat, LngLat)> {
		self.preview
	}

	/// Overlay placement, if an image was loaded.
	pub fn overlay(&self) -> Option<&OverlayConfig> {
		self.overlay.as_ref()
	}
}
