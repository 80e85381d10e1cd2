//! Node-link JSON, the NetworkX-style `{ nodes, links }` document.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::{EdgeId, Graph, ImportedLink, MAX_ID, Node, NodeId};
use crate::error::{EditorError, Result};
use crate::geodesy::LngLat;

/// One entry of `nodes`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
	/// Node id.
	pub id: NodeId,
	/// Longitude, degrees.
	pub lng: f64,
	/// Latitude, degrees.
	pub lat: f64,
}

/// One entry of `links`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
	/// Edge id; optional on import.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<EdgeId>,
	/// Source node id.
	pub source: NodeId,
	/// Target node id.
	pub target: NodeId,
}

/// A validated node-link document. Unknown top-level keys (`directed`,
/// `multigraph`, `graph`, ...) are ignored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkDocument {
	/// Node entries.
	pub nodes: Vec<NodeRecord>,
	/// Link entries.
	pub links: Vec<LinkRecord>,
}

impl NodeLinkDocument {
	/// Parse and validate JSON text. Either the whole document is accepted or
	/// an error is returned; there is no partial result.
	pub fn from_json_str(text: &str) -> Result<Self> {
		let value: Value = serde_json::from_str(text)?;
		Self::from_value(value)
	}

	/// Validate an already-decoded JSON value.
	pub fn from_value(value: Value) -> Result<Self> {
		let Some(object) = value.as_object() else {
			return Err(EditorError::InvalidShape("top level is not an object".into()));
		};
		for key in ["nodes", "links"] {
			if !object.get(key).is_some_and(Value::is_array) {
				warn!("node-link import rejected: `{key}` missing or not an array");
				return Err(EditorError::InvalidShape(format!("`{key}` must be an array")));
			}
		}
		let document: Self = serde_json::from_value(value).map_err(|err| {
			warn!("node-link import rejected: {err}");
			EditorError::from(err)
		})?;
		document.check_ids()?;
		Ok(document)
	}

	/// Node and link ids above [`MAX_ID`] would leave the id counters no room
	/// to grow, so the whole document is refused.
	fn check_ids(&self) -> Result<()> {
		let node_ids = self.nodes.iter().map(|n| ("node", n.id));
		let link_ids = self.links.iter().filter_map(|l| l.id.map(|id| ("link", id)));
		match node_ids.chain(link_ids).find(|(_, id)| *id > MAX_ID) {
			Some((kind, id)) => {
				warn!("node-link import rejected: {kind} id {id} is too large");
				Err(EditorError::InvalidShape(format!(
					"{kind} id {id} exceeds the largest supported id {MAX_ID}"
				)))
			}
			None => Ok(()),
		}
	}

	/// Snapshot of a graph. Link ids are always written so that a re-import
	/// keeps them.
	pub fn from_graph(graph: &Graph) -> Self {
		Self {
			nodes: graph
				.nodes()
				.iter()
				.map(|n| NodeRecord {
					id: n.id,
					lng: n.position.lng,
					lat: n.position.lat,
				})
				.collect(),
			links: graph
				.edges()
				.iter()
				.map(|e| LinkRecord {
					id: Some(e.id),
					source: e.source,
					target: e.target,
				})
				.collect(),
		}
	}

	/// Encode as compact JSON text.
	pub fn to_json_string(&self) -> Result<String> {
		serde_json::to_string(self).map_err(|err| EditorError::Export(err.to_string()))
	}

	/// Split into the collections [`Graph::import`] consumes.
	pub fn into_parts(self) -> (Vec<Node>, Vec<ImportedLink>) {
		let nodes = self
			.nodes
			.into_iter()
			.map(|r| Node {
				id: r.id,
				position: LngLat::new(r.lng, r.lat),
			})
			.collect();
		let links = self
			.links
			.into_iter()
			.map(|r| ImportedLink {
				id: r.id,
				source: r.source,
				target: r.target,
			})
			.collect();
		(nodes, links)
	}
}
