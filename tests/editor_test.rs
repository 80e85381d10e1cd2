use std::collections::HashSet;

use geo_network_editor::config::ClickMode;
use geo_network_editor::editor::{DrawMode, EditorEvent, EditorState, EditorStateMachine};
use geo_network_editor::geodesy::LngLat;
use geo_network_editor::graph::NodeId;
use geo_network_editor::graph::interchange::NodeLinkDocument;
use pretty_assertions::assert_eq;

fn at(i: i64) -> LngLat {
	LngLat::new(139.70 + i as f64 * 0.001, 35.70 + i as f64 * 0.001)
}

fn machine() -> EditorStateMachine {
	EditorStateMachine::new(ClickMode::Chain)
}

fn pairs(m: &EditorStateMachine) -> Vec<(NodeId, NodeId)> {
	m.state()
		.graph()
		.edges()
		.iter()
		.map(|e| (e.source, e.target))
		.collect()
}

/// Deterministic pseudo-random sequence in `0.0..1.0`.
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

fn arbitrary_event(seed: usize) -> EditorEvent {
	let pick = |k: usize, n: i64| (rand_simple(seed * 7 + k) * n as f64) as i64;
	match pick(0, 10) {
		0..=2 => EditorEvent::ClickOnEmptyMap(at(pick(1, 50))),
		3 => EditorEvent::ClickOnNode(pick(1, 20)),
		4 => EditorEvent::PointerMove(at(pick(1, 50))),
		5 => EditorEvent::Cancel,
		6 => EditorEvent::DeleteNode(pick(1, 20)),
		7 => EditorEvent::DeleteEdge(pick(1, 20)),
		8 => EditorEvent::HoverNode(pick(1, 20)),
		_ => EditorEvent::HoverEdge(pick(1, 20)),
	}
}

// =============================================================================
// Id space
// =============================================================================

#[test]
fn ids_stay_unique_and_below_counters() {
	for click_mode in [ClickMode::Chain, ClickMode::PlaceOnly] {
		let mut m = EditorStateMachine::new(click_mode);
		let (mut max_node, mut max_edge) = (-1, -1);
		for seed in 0..2_000 {
			m.dispatch(arbitrary_event(seed));
			let graph = m.state().graph();

			let node_ids: HashSet<_> = graph.nodes().iter().map(|n| n.id).collect();
			let edge_ids: HashSet<_> = graph.edges().iter().map(|e| e.id).collect();
			assert_eq!(node_ids.len(), graph.nodes().len(), "node ids are distinct");
			assert_eq!(edge_ids.len(), graph.edges().len(), "edge ids are distinct");

			max_node = node_ids.iter().copied().fold(max_node, i64::max);
			max_edge = edge_ids.iter().copied().fold(max_edge, i64::max);
			assert!(graph.next_node_id() > max_node);
			assert!(graph.next_edge_id() > max_edge);

			assert!(
				graph.edges().iter().all(|e| e.source != e.target),
				"no self-loops"
			);
		}
	}
}

#[test]
fn ids_are_not_reused_after_delete() {
	let mut m = machine();
	m.dispatch(EditorEvent::ClickOnEmptyMap(at(0)));
	m.dispatch(EditorEvent::ClickOnEmptyMap(at(1)));
	m.dispatch(EditorEvent::Cancel);
	m.dispatch(EditorEvent::DeleteNode(1));
	m.dispatch(EditorEvent::ClickOnEmptyMap(at(2)));

	let ids: Vec<_> = m.state().graph().nodes().iter().map(|n| n.id).collect();
	assert_eq!(ids, vec![0, 2]);
	assert_eq!(m.state().graph().next_edge_id(), 1);
}

// =============================================================================
// Drawing
// =============================================================================

#[test]
fn chained_drawing() {
	let mut m = machine();
	for i in 1..=3 {
		m.dispatch(EditorEvent::ClickOnEmptyMap(at(i)));
	}
	assert_eq!(m.state().graph().nodes().len(), 3);
	assert_eq!(pairs(&m), vec![(0, 1), (1, 2)]);
	assert_eq!(m.state().mode(), DrawMode::DrawingEdge { anchor: 2 });
}

#[test]
fn click_on_node_closes_path() {
	let mut m = machine();
	m.dispatch(EditorEvent::ClickOnEmptyMap(at(0)));
	m.dispatch(EditorEvent::ClickOnEmptyMap(at(1)));
	m.dispatch(EditorEvent::ClickOnNode(0));

	assert_eq!(pairs(&m), vec![(0, 1), (1, 0)]);
	assert_eq!(m.state().mode(), DrawMode::Idle);
	assert_eq!(m.state().preview_segment(), None);
}

#[test]
fn cancel_drops_the_pending_edge() {
	let mut m = machine();
	m.dispatch(EditorEvent::ClickOnEmptyMap(at(0)));
	m.dispatch(EditorEvent::PointerMove(at(5)));
	m.dispatch(EditorEvent::Cancel);

	assert_eq!(m.state().mode(), DrawMode::Idle);
	assert_eq!(m.state().preview_segment(), None);
	assert!(m.state().graph().edges().is_empty());

	m.dispatch(EditorEvent::ClickOnEmptyMap(at(1)));
	assert_eq!(m.state().graph().nodes().len(), 2);
	assert!(m.state().graph().edges().is_empty(), "no edge from the old anchor");
}

#[test]
fn cancel_while_idle_is_a_no_op() {
	let mut m = machine();
	let before = m.state().clone();
	assert!(m.dispatch(EditorEvent::Cancel).is_empty());
	assert_eq!(*m.state(), before);
}

// =============================================================================
// Deletion
// =============================================================================

#[test]
fn delete_node_removes_exactly_incident_edges() {
	let mut m = machine();
	// 0 -> 1 -> 2 -> 3, then 3 -> 1
	for i in 0..4 {
		m.dispatch(EditorEvent::ClickOnEmptyMap(at(i)));
	}
	m.dispatch(EditorEvent::ClickOnNode(1));
	let before = m.state().graph().edges().to_vec();

	m.dispatch(EditorEvent::DeleteNode(2));

	let expected: Vec<_> = before.into_iter().filter(|e| !e.touches(2)).collect();
	assert_eq!(m.state().graph().edges(), expected.as_slice());
	assert_eq!(pairs(&m), vec![(0, 1), (3, 1)]);
}

// =============================================================================
// Reset and import
// =============================================================================

#[test]
fn import_then_reset_is_a_fresh_session() {
	let doc = NodeLinkDocument::from_json_str(
		r#"{"directed": false, "nodes": [{"id": 4, "lng": 139.7, "lat": 35.7}, {"id": 9, "lng": 139.8, "lat": 35.8}],
		    "links": [{"id": 2, "source": 4, "target": 9}]}"#,
	)
	.unwrap();

	let mut m = machine();
	m.dispatch(EditorEvent::ClickOnEmptyMap(at(0)));
	m.dispatch(EditorEvent::import(doc));
	assert_eq!(m.state().graph().next_node_id(), 10);
	assert_eq!(m.state().graph().next_edge_id(), 3);
	assert_eq!(m.state().mode(), DrawMode::Idle);

	m.dispatch(EditorEvent::ResetAll);
	assert_eq!(*m.state(), EditorState::default());
}

#[test]
fn import_continues_numbering() {
	let doc = NodeLinkDocument::from_json_str(
		r#"{"nodes": [{"id": 0, "lng": 139.7, "lat": 35.7}, {"id": 1, "lng": 139.8, "lat": 35.8}],
		    "links": [{"source": 0, "target": 1}]}"#,
	)
	.unwrap();

	let mut m = machine();
	m.dispatch(EditorEvent::import(doc));
	m.dispatch(EditorEvent::ClickOnNode(1));
	m.dispatch(EditorEvent::ClickOnEmptyMap(at(3)));

	assert_eq!(pairs(&m), vec![(0, 1), (1, 2)]);
	let edge_ids: Vec<_> = m.state().graph().edges().iter().map(|e| e.id).collect();
	assert_eq!(edge_ids, vec![0, 1]);
}

#[test]
fn malformed_import_is_rejected() {
	assert!(NodeLinkDocument::from_json_str(r#"{"nodes": []}"#).is_err());
	assert!(NodeLinkDocument::from_json_str(r#"{"nodes": [{"id": 0, "lng": 1.0}], "links": []}"#).is_err());
	assert!(NodeLinkDocument::from_json_str(r#"{"nodes": [], "links": [{"source": 0}]}"#).is_err());
	assert!(NodeLinkDocument::from_json_str("not json").is_err());
}

#[test]
fn oversized_ids_fail_the_import_as_a_whole() {
	let mut m = machine();
	m.dispatch(EditorEvent::ClickOnEmptyMap(at(0)));
	let before = m.state().clone();

	let text = r#"{"nodes": [{"id": 1, "lng": 139.7, "lat": 35.7}, {"id": 9223372036854775807, "lng": 139.8, "lat": 35.8}],
		"links": []}"#;
	if let Ok(doc) = NodeLinkDocument::from_json_str(text) {
		m.dispatch(EditorEvent::import(doc));
	}
	assert_eq!(*m.state(), before);

	m.dispatch(EditorEvent::ClickOnEmptyMap(at(1)));
	assert_eq!(m.state().graph().next_node_id(), 2);
}

#[test]
fn export_round_trips_through_import() {
	let mut m = machine();
	for i in 0..3 {
		m.dispatch(EditorEvent::ClickOnEmptyMap(at(i)));
	}
	let text = NodeLinkDocument::from_graph(m.state().graph())
		.to_json_string()
		.unwrap();

	let mut other = machine();
	other.dispatch(EditorEvent::import(NodeLinkDocument::from_json_str(&text).unwrap()));
	assert_eq!(other.state().graph().nodes(), m.state().graph().nodes());
	assert_eq!(other.state().graph().edges(), m.state().graph().edges());
}
