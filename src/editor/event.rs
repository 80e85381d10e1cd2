use crate::geodesy::LngLat;
use crate::graph::interchange::NodeLinkDocument;
use crate::graph::{EdgeId, ImportedLink, Node, NodeId};

/// Input to the state machine. The host translates pointer, keyboard and file
/// callbacks into these, already parsed.
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
	/// Click on the map where no feature is under the pointer.
	ClickOnEmptyMap(LngLat),
	/// Click on a node feature.
	ClickOnNode(NodeId),
	/// Pointer moved over the map.
	PointerMove(LngLat),
	/// Abort the pending edge (Escape).
	Cancel,
	/// Pointer entered a node feature or its table row.
	HoverNode(NodeId),
	/// Pointer left the hovered node.
	UnhoverNode,
	/// Pointer entered an edge feature or its table row.
	HoverEdge(EdgeId),
	/// Pointer left the hovered edge.
	UnhoverEdge,
	/// Remove a node and its incident edges.
	DeleteNode(NodeId),
	/// Remove one edge.
	DeleteEdge(EdgeId),
	/// Back to an empty session.
	ResetAll,
	/// Reset, then replace the graph with imported collections.
	ImportGraph {
		/// Imported nodes.
		nodes: Vec<Node>,
		/// Imported links.
		links: Vec<ImportedLink>,
	},
	/// An image finished decoding; place it at the current map centre.
	LoadOverlayImage {
		/// Decoded width in pixels.
		pixel_width: u32,
		/// Decoded height in pixels.
		pixel_height: u32,
		/// Map centre at the time of loading.
		map_center: LngLat,
	},
	/// Physical overlay width, meters.
	SetOverlayWidthMeters(f64),
	/// Physical overlay height, meters.
	SetOverlayHeightMeters(f64),
	/// Overlay rotation, degrees.
	SetOverlayRotationDeg(f64),
	/// Move the overlay centre; a missing component keeps its value.
	SetOverlayCenter {
		/// New longitude.
		lng: Option<f64>,
		/// New latitude.
		lat: Option<f64>,
	},
	/// Overlay opacity, clamped to `0..=1`.
	SetOverlayOpacity(f64),
}

impl EditorEvent {
	/// Import event for a validated node-link document.
	pub fn import(document: NodeLinkDocument) -> Self {
		let (nodes, links) = document.into_parts();
		Self::ImportGraph { nodes, links }
	}
}
