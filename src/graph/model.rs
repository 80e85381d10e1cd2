use log::debug;
use serde::{Deserialize, Serialize};

use crate::geodesy::LngLat;

/// Node identifier. Allocated from a counter that only grows.
pub type NodeId = i64;
/// Edge identifier. Allocated from a counter that only grows.
pub type EdgeId = i64;

/// Largest id an import may carry. Browser JSON readers hold integers exactly
/// only up to 2^53 - 1, and the counters need room above the largest id.
pub const MAX_ID: i64 = (1 << 53) - 1;

/// A graph vertex at a geographic position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	/// Stable id.
	pub id: NodeId,
	/// Where the node sits on the map.
	pub position: LngLat,
}

/// A directed connector between two nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
	/// Stable id.
	pub id: EdgeId,
	/// Node the edge starts from.
	pub source: NodeId,
	/// Node the edge ends at.
	pub target: NodeId,
}

impl Edge {
	/// Whether `node` is one of the endpoints.
	pub fn touches(&self, node: NodeId) -> bool {
		self.source == node || self.target == node
	}
}

/// Link as it arrives from an import. `id` may be missing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedLink {
	/// Explicit id, if the payload carried one.
	pub id: Option<EdgeId>,
	/// Source node id.
	pub source: NodeId,
	/// Target node id.
	pub target: NodeId,
}

/// Node and edge collections plus the two id counters.
///
/// Counters are never rewound by removal, so ids are not reused within a
/// session. Only [`Graph::default`] and [`Graph::import`] reset them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	next_node_id: NodeId,
	next_edge_id: EdgeId,
}

impl Graph {
	/// Nodes in insertion order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Edges in insertion order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Id the next added node will receive.
	pub fn next_node_id(&self) -> NodeId {
		self.next_node_id
	}

	/// Id the next added edge will receive.
	pub fn next_edge_id(&self) -> EdgeId {
		self.next_edge_id
	}

	/// Look up a node by id.
	pub fn node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Look up an edge by id.
	pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
		self.edges.iter().find(|e| e.id == id)
	}

	/// Position of the node with `id`, if it exists.
	pub fn position_of(&self, id: NodeId) -> Option<LngLat> {
		self.node(id).map(|n| n.position)
	}

	/// Append a node at `position` and return it.
	pub fn add_node(&mut self, position: LngLat) -> Node {
		let node = Node {
			id: self.next_node_id,
			position,
		};
		self.next_node_id += 1;
		self.nodes.push(node.clone());
		node
	}

	/// Append an edge. Returns `None` for a self-loop, leaving the graph and
	/// the edge counter untouched.
	pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Option<Edge> {
		if source == target {
			debug!("rejected self-edge on node {source}");
			return None;
		}
		let edge = Edge {
			id: self.next_edge_id,
			source,
			target,
		};
		self.next_edge_id += 1;
		self.edges.push(edge.clone());
		Some(edge)
	}

	/// Remove a node and every edge incident to it. Returns the ids of the
	/// removed edges; unknown ids remove nothing.
	pub fn remove_node(&mut self, id: NodeId) -> Vec<EdgeId> {
		let before = self.nodes.len();
		self.nodes.retain(|n| n.id != id);
		if self.nodes.len() == before {
			debug!("remove_node: no node {id}");
		}

		let mut dropped = Vec::new();
		self.edges.retain(|e| {
			let keep = !e.touches(id);
			if !keep {
				dropped.push(e.id);
			}
			keep
		});
		dropped
	}

	/// Remove a single edge. Returns whether anything was removed.
	pub fn remove_edge(&mut self, id: EdgeId) -> bool {
		let before = self.edges.len();
		self.edges.retain(|e| e.id != id);
		let removed = self.edges.len() != before;
		if !removed {
			debug!("remove_edge: no edge {id}");
		}
		removed
	}

	/// Replace the whole graph with imported collections.
	///
	/// A link without an id takes its position in `links` as id, so a payload
	/// that mixes identified and unidentified links can produce duplicates.
	/// Endpoints are not checked against the node list.
	pub fn import(nodes: Vec<Node>, links: Vec<ImportedLink>) -> Self {
		let edges: Vec<Edge> = links
			.into_iter()
			.enumerate()
			.map(|(index, link)| Edge {
				id: link.id.unwrap_or(index as EdgeId),
				source: link.source,
				target: link.target,
			})
			.collect();

		let next_node_id = nodes.iter().map(|n| n.id).max().map_or(0, |max| max.saturating_add(1));
		let next_edge_id = edges.iter().map(|e| e.id).max().map_or(0, |max| max.saturating_add(1));

		Self {
			nodes,
			edges,
			next_node_id,
			next_edge_id,
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn pos(i: i64) -> LngLat {
		LngLat::new(139.7 + i as f64 * 0.001, 35.7)
	}

	#[test]
	fn ids_are_never_reused_after_removal() {
		let mut g = Graph::default();
		let a = g.add_node(pos(0));
		let b = g.add_node(pos(1));
		g.remove_node(b.id);
		let c = g.add_node(pos(2));
		assert_eq!((a.id, b.id, c.id), (0, 1, 2));
		assert_eq!(g.next_node_id(), 3);
	}

	#[test]
	fn self_edge_is_rejected_without_consuming_an_id() {
		let mut g = Graph::default();
		let a = g.add_node(pos(0));
		assert!(g.add_edge(a.id, a.id).is_none());
		assert_eq!(g.next_edge_id(), 0);
		assert!(g.edges().is_empty());
	}

	#[test]
	fn remove_node_cascades_to_incident_edges_only() {
		let mut g = Graph::default();
		let ids: Vec<_> = (0..4).map(|i| g.add_node(pos(i)).id).collect();
		g.add_edge(ids[0], ids[1]);
		g.add_edge(ids[1], ids[2]);
		g.add_edge(ids[2], ids[3]);
		g.add_edge(ids[3], ids[0]);

		let dropped = g.remove_node(ids[1]);
		assert_eq!(dropped, vec![0, 1]);
		let left: Vec<_> = g.edges().iter().map(|e| (e.source, e.target)).collect();
		assert_eq!(left, vec![(2, 3), (3, 0)]);
	}

	#[test]
	fn remove_unknown_ids_is_a_no_op() {
		let mut g = Graph::default();
		g.add_node(pos(0));
		let before = g.clone();
		assert!(g.remove_node(42).is_empty());
		assert!(!g.remove_edge(42));
		assert_eq!(g, before);
	}

	#[test]
	fn import_recomputes_counters() {
		let nodes = vec![
			Node { id: 4, position: pos(0) },
			Node { id: 9, position: pos(1) },
		];
		let links = vec![ImportedLink { id: Some(7), source: 4, target: 9 }];
		let g = Graph::import(nodes, links);
		assert_eq!(g.next_node_id(), 10);
		assert_eq!(g.next_edge_id(), 8);
	}

	#[test]
	fn import_defaults_missing_link_ids_to_position() {
		let links = vec![
			ImportedLink { id: None, source: 0, target: 1 },
			ImportedLink { id: None, source: 1, target: 2 },
		];
		let g = Graph::import(Vec::new(), links);
		let ids: Vec<_> = g.edges().iter().map(|e| e.id).collect();
		assert_eq!(ids, vec![0, 1]);
		assert_eq!(g.next_node_id(), 0);
		assert_eq!(g.next_edge_id(), 2);
	}

	#[test]
	fn import_of_the_largest_id_does_not_overflow() {
		let g = Graph::import(vec![Node { id: i64::MAX, position: pos(0) }], Vec::new());
		assert_eq!(g.next_node_id(), i64::MAX);
	}

	#[test]
	fn import_keeps_self_loops_and_dangling_links() {
		let links = vec![
			ImportedLink { id: Some(0), source: 3, target: 3 },
			ImportedLink { id: Some(1), source: 3, target: 99 },
		];
		let g = Graph::import(vec![Node { id: 3, position: pos(0) }], links);
		assert_eq!(g.edges().len(), 2);
	}
}
