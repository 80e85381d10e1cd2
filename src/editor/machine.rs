use log::{debug, info};

use super::event::EditorEvent;
use super::state::{DrawMode, EditorState, OverlayConfig};
use super::surface::{Highlight, LayerKind};
use crate::config::ClickMode;
use crate::geodesy::LngLat;
use crate::graph::{Graph, NodeId};

/// Result of applying one event: the next state plus the highlight changes
/// the render surface should apply.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
	/// State after the event.
	pub state: EditorState,
	/// Highlight on/off requests, in the order they should be applied.
	pub highlights: Vec<Highlight>,
}

/// Apply `event` to `state`. Total: every event yields a state, and events
/// that reference unknown ids leave it unchanged.
pub fn transition(state: &EditorState, event: EditorEvent, click_mode: ClickMode) -> Transition {
	let mut next = state.clone();
	let mut highlights = Vec::new();

	match event {
		EditorEvent::ClickOnEmptyMap(pos) => click_empty_map(&mut next, pos, click_mode),
		EditorEvent::ClickOnNode(id) => click_node(&mut next, id),
		EditorEvent::PointerMove(pos) => {
			if let Some(anchor) = next.pending_edge_from() {
				next.preview = next.graph.position_of(anchor).map(|from| (from, pos));
			}
		}
		EditorEvent::Cancel => {
			if next.mode != DrawMode::Idle {
				debug!("pending edge cancelled");
				end_drawing(&mut next);
			}
		}
		EditorEvent::HoverNode(id) => {
			if next.graph.node(id).is_some() {
				set_hover(&mut next.hover_node, LayerKind::Nodes, Some(id), &mut highlights);
			}
		}
		EditorEvent::UnhoverNode => {
			set_hover(&mut next.hover_node, LayerKind::Nodes, None, &mut highlights)
		}
		EditorEvent::HoverEdge(id) => {
			if next.graph.edge(id).is_some() {
				set_hover(&mut next.hover_edge, LayerKind::Edges, Some(id), &mut highlights);
			}
		}
		EditorEvent::UnhoverEdge => {
			set_hover(&mut next.hover_edge, LayerKind::Edges, None, &mut highlights)
		}
		EditorEvent::DeleteNode(id) => {
			let dropped = next.graph.remove_node(id);
			if next.hover_node == Some(id) {
				set_hover(&mut next.hover_node, LayerKind::Nodes, None, &mut highlights);
			}
			if next.hover_edge.is_some_and(|e| dropped.contains(&e)) {
				set_hover(&mut next.hover_edge, LayerKind::Edges, None, &mut highlights);
			}
		}
		EditorEvent::DeleteEdge(id) => {
			if next.graph.remove_edge(id) && next.hover_edge == Some(id) {
				set_hover(&mut next.hover_edge, LayerKind::Edges, None, &mut highlights);
			}
		}
		EditorEvent::ResetAll => {
			reset(&mut next, &mut highlights);
			info!("session reset");
		}
		EditorEvent::ImportGraph { nodes, links } => {
			reset(&mut next, &mut highlights);
			next.graph = Graph::import(nodes, links);
			info!(
				"imported {} nodes and {} edges",
				next.graph.nodes().len(),
				next.graph.edges().len()
			);
		}
		EditorEvent::LoadOverlayImage {
			pixel_width,
			pixel_height,
			map_center,
		} => {
			next.overlay = Some(OverlayConfig::new(pixel_width, pixel_height, map_center));
			info!("overlay image {pixel_width}x{pixel_height} placed at {map_center:?}");
		}
		EditorEvent::SetOverlayWidthMeters(w) => {
			update_extent(&mut next, w, |o, w| o.physical_shape_meters.width = w)
		}
		EditorEvent::SetOverlayHeightMeters(h) => {
			update_extent(&mut next, h, |o, h| o.physical_shape_meters.height = h)
		}
		EditorEvent::SetOverlayRotationDeg(deg) => {
			update_overlay(&mut next, deg, |o, deg| o.rotation_deg = deg)
		}
		EditorEvent::SetOverlayOpacity(opacity) => {
			update_overlay(&mut next, opacity, |o, v| o.opacity = v.clamp(0.0, 1.0))
		}
		EditorEvent::SetOverlayCenter { lng, lat } => {
			if let Some(lng) = lng {
				update_overlay(&mut next, lng, |o, v| o.center.lng = v);
			}
			if let Some(lat) = lat {
				update_overlay(&mut next, lat, |o, v| o.center.lat = v);
			}
		}
	}

	Transition {
		state: next,
		highlights,
	}
}

fn click_empty_map(state: &mut EditorState, pos: LngLat, click_mode: ClickMode) {
	let node = state.graph.add_node(pos);
	match state.mode {
		DrawMode::DrawingEdge { anchor } => {
			// The anchor may have been deleted while drawing; the path then
			// restarts from the new node without a dangling edge.
			if state.graph.node(anchor).is_some() {
				state.graph.add_edge(anchor, node.id);
			} else {
				debug!("anchor {anchor} is gone; restarting path at {}", node.id);
			}
			start_drawing(state, node.id, pos);
		}
		DrawMode::Idle => match click_mode {
			ClickMode::Chain => start_drawing(state, node.id, pos),
			ClickMode::PlaceOnly => {}
		},
	}
}

fn click_node(state: &mut EditorState, id: NodeId) {
	let Some(pos) = state.graph.position_of(id) else {
		debug!("click on unknown node {id} ignored");
		return;
	};
	match state.mode {
		DrawMode::DrawingEdge { anchor } => {
			if state.graph.node(anchor).is_some() {
				state.graph.add_edge(anchor, id);
			} else {
				debug!("anchor {anchor} is gone; path closed without an edge");
			}
			end_drawing(state);
		}
		DrawMode::Idle => start_drawing(state, id, pos),
	}
}

fn start_drawing(state: &mut EditorState, anchor: NodeId, pos: LngLat) {
	state.mode = DrawMode::DrawingEdge { anchor };
	state.preview = Some((pos, pos));
}

fn end_drawing(state: &mut EditorState) {
	state.mode = DrawMode::Idle;
	state.preview = None;
}

fn set_hover(
	slot: &mut Option<i64>,
	layer: LayerKind,
	new: Option<i64>,
	highlights: &mut Vec<Highlight>,
) {
	if *slot == new {
		return;
	}
	if let Some(prev) = slot.take() {
		highlights.push(Highlight::off(layer, prev));
	}
	if let Some(id) = new {
		highlights.push(Highlight::on(layer, id));
	}
	*slot = new;
}

/// Drop everything but keep the surface consistent: hovered features are
/// unhighlighted first because ids restart from zero afterwards.
fn reset(state: &mut EditorState, highlights: &mut Vec<Highlight>) {
	set_hover(&mut state.hover_node, LayerKind::Nodes, None, highlights);
	set_hover(&mut state.hover_edge, LayerKind::Edges, None, highlights);
	*state = EditorState::default();
}

/// Width and height must stay positive; a negative extent would mirror the
/// quad and flip its winding.
fn update_extent(state: &mut EditorState, meters: f64, apply: impl FnOnce(&mut OverlayConfig, f64)) {
	if meters > 0.0 {
		update_overlay(state, meters, apply);
	} else {
		debug!("ignored non-positive overlay extent {meters}");
	}
}

fn update_overlay(state: &mut EditorState, value: f64, apply: impl FnOnce(&mut OverlayConfig, f64)) {
	if !value.is_finite() {
		debug!("ignored non-finite overlay value {value}");
		return;
	}
	match state.overlay.as_mut() {
		Some(overlay) => apply(overlay, value),
		None => debug!("overlay update ignored: no image loaded"),
	}
}

/// Owns the session state and feeds events through [`transition`] one at a
/// time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorStateMachine {
	click_mode: ClickMode,
	state: EditorState,
}

impl EditorStateMachine {
	/// Empty session using `click_mode` for idle clicks.
	pub fn new(click_mode: ClickMode) -> Self {
		Self {
			click_mode,
			state: EditorState::default(),
		}
	}

	/// Current state.
	pub fn state(&self) -> &EditorState {
		&self.state
	}

	/// Idle-click behavior.
	pub fn click_mode(&self) -> ClickMode {
		self.click_mode
	}

	/// Apply one event and return the highlight requests it produced.
	pub fn dispatch(&mut self, event: EditorEvent) -> Vec<Highlight> {
		let Transition { state, highlights } = transition(&self.state, event, self.click_mode);
		self.state = state;
		highlights
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::editor::Shape;

	fn p(i: i64) -> LngLat {
		LngLat::new(139.70 + i as f64 * 0.001, 35.70)
	}

	fn run(events: impl IntoIterator<Item = EditorEvent>) -> EditorStateMachine {
		let mut machine = EditorStateMachine::default();
		for event in events {
			machine.dispatch(event);
		}
		machine
	}

	fn pairs(machine: &EditorStateMachine) -> Vec<(NodeId, NodeId)> {
		machine
			.state()
			.graph()
			.edges()
			.iter()
			.map(|e| (e.source, e.target))
			.collect()
	}

	#[test]
	fn first_click_opens_a_pending_edge() {
		let m = run([EditorEvent::ClickOnEmptyMap(p(0))]);
		assert_eq!(m.state().mode(), DrawMode::DrawingEdge { anchor: 0 });
		assert_eq!(m.state().preview_segment(), Some((p(0), p(0))));
	}

	#[test]
	fn place_only_mode_stays_idle() {
		let mut m = EditorStateMachine::new(ClickMode::PlaceOnly);
		m.dispatch(EditorEvent::ClickOnEmptyMap(p(0)));
		m.dispatch(EditorEvent::ClickOnEmptyMap(p(1)));
		assert_eq!(m.state().mode(), DrawMode::Idle);
		assert_eq!(m.state().graph().nodes().len(), 2);
		assert!(m.state().graph().edges().is_empty());
	}

	#[test]
	fn clicking_a_node_closes_the_path() {
		let m = run([
			EditorEvent::ClickOnEmptyMap(p(0)),
			EditorEvent::ClickOnEmptyMap(p(1)),
			EditorEvent::ClickOnNode(0),
		]);
		assert_eq!(pairs(&m), vec![(0, 1), (1, 0)]);
		assert_eq!(m.state().mode(), DrawMode::Idle);
		assert_eq!(m.state().preview_segment(), None);
	}

	#[test]
	fn self_edge_is_absorbed_and_exits_drawing() {
		let m = run([
			EditorEvent::ClickOnEmptyMap(p(0)),
			EditorEvent::ClickOnNode(0),
		]);
		assert!(m.state().graph().edges().is_empty());
		assert_eq!(m.state().mode(), DrawMode::Idle);
	}

	#[test]
	fn clicking_a_node_while_idle_selects_it_as_anchor() {
		let mut m = EditorStateMachine::new(ClickMode::PlaceOnly);
		m.dispatch(EditorEvent::ClickOnEmptyMap(p(0)));
		m.dispatch(EditorEvent::ClickOnNode(0));
		assert_eq!(m.state().mode(), DrawMode::DrawingEdge { anchor: 0 });
		assert_eq!(m.state().graph().nodes().len(), 1);
	}

	#[test]
	fn pointer_move_tracks_the_cursor_only_while_drawing() {
		let m = run([EditorEvent::PointerMove(p(5))]);
		assert_eq!(m.state().preview_segment(), None);

		let m = run([
			EditorEvent::ClickOnEmptyMap(p(0)),
			EditorEvent::PointerMove(p(5)),
		]);
		assert_eq!(m.state().preview_segment(), Some((p(0), p(5))));
	}

	#[test]
	fn unknown_ids_are_no_ops() {
		let base = run([EditorEvent::ClickOnEmptyMap(p(0)), EditorEvent::Cancel]);
		for event in [
			EditorEvent::ClickOnNode(9),
			EditorEvent::HoverNode(9),
			EditorEvent::HoverEdge(9),
			EditorEvent::DeleteNode(9),
			EditorEvent::DeleteEdge(9),
		] {
			let t = transition(base.state(), event.clone(), ClickMode::Chain);
			assert_eq!(&t.state, base.state(), "{event:?}");
			assert!(t.highlights.is_empty(), "{event:?}");
		}
	}

	#[test]
	fn hover_switches_highlight_between_nodes() {
		let mut m = run([
			EditorEvent::ClickOnEmptyMap(p(0)),
			EditorEvent::ClickOnEmptyMap(p(1)),
		]);
		assert_eq!(
			m.dispatch(EditorEvent::HoverNode(0)),
			vec![Highlight::on(LayerKind::Nodes, 0)]
		);
		assert!(m.dispatch(EditorEvent::HoverNode(0)).is_empty());
		assert_eq!(
			m.dispatch(EditorEvent::HoverNode(1)),
			vec![
				Highlight::off(LayerKind::Nodes, 0),
				Highlight::on(LayerKind::Nodes, 1)
			]
		);
		assert_eq!(
			m.dispatch(EditorEvent::UnhoverNode),
			vec![Highlight::off(LayerKind::Nodes, 1)]
		);
		assert_eq!(m.state().hover_node(), None);
	}

	#[test]
	fn deleting_the_hovered_edge_unhighlights_it() {
		let mut m = run([
			EditorEvent::ClickOnEmptyMap(p(0)),
			EditorEvent::ClickOnEmptyMap(p(1)),
			EditorEvent::HoverEdge(0),
		]);
		assert_eq!(
			m.dispatch(EditorEvent::DeleteNode(1)),
			vec![Highlight::off(LayerKind::Edges, 0)]
		);
		assert_eq!(m.state().hover_edge(), None);
	}

	#[test]
	fn deleting_the_anchor_keeps_drawing_mode() {
		let mut m = run([
			EditorEvent::ClickOnEmptyMap(p(0)),
			EditorEvent::ClickOnEmptyMap(p(1)),
			EditorEvent::DeleteNode(1),
		]);
		assert_eq!(m.state().mode(), DrawMode::DrawingEdge { anchor: 1 });

		m.dispatch(EditorEvent::PointerMove(p(3)));
		assert_eq!(m.state().preview_segment(), None);

		m.dispatch(EditorEvent::ClickOnEmptyMap(p(2)));
		assert!(m.state().graph().edges().is_empty());
		assert_eq!(m.state().mode(), DrawMode::DrawingEdge { anchor: 2 });
	}

	#[test]
	fn clicking_a_node_after_losing_the_anchor_adds_no_edge() {
		let mut m = run([
			EditorEvent::ClickOnEmptyMap(p(0)),
			EditorEvent::Cancel,
			EditorEvent::ClickOnEmptyMap(p(1)),
			EditorEvent::DeleteNode(1),
			EditorEvent::ClickOnNode(0),
		]);
		assert!(m.state().graph().edges().is_empty());
		assert_eq!(m.state().mode(), DrawMode::Idle);

		m.dispatch(EditorEvent::ClickOnNode(0));
		assert_eq!(m.state().mode(), DrawMode::DrawingEdge { anchor: 0 });
	}

	#[test]
	fn overlay_updates_need_an_image() {
		let m = run([EditorEvent::SetOverlayWidthMeters(10.0)]);
		assert_eq!(m.state().overlay(), None);
	}

	#[test]
	fn overlay_partial_updates() {
		let m = run([
			EditorEvent::LoadOverlayImage {
				pixel_width: 640,
				pixel_height: 480,
				map_center: p(0),
			},
			EditorEvent::SetOverlayWidthMeters(800.0),
			EditorEvent::SetOverlayHeightMeters(f64::NAN),
			EditorEvent::SetOverlayRotationDeg(15.0),
			EditorEvent::SetOverlayCenter { lng: None, lat: Some(35.5) },
			EditorEvent::SetOverlayOpacity(1.7),
		]);
		let overlay = m.state().overlay().copied().unwrap();
		assert_eq!(overlay.pixel_shape.width, 640.0);
		assert_eq!(overlay.physical_shape_meters.width, 800.0);
		assert_eq!(overlay.physical_shape_meters.height, 480.0);
		assert_eq!(overlay.rotation_deg, 15.0);
		assert_eq!(overlay.center, LngLat::new(p(0).lng, 35.5));
		assert_eq!(overlay.opacity, 1.0);
	}

	#[test]
	fn overlay_extent_must_be_positive() {
		let m = run([
			EditorEvent::LoadOverlayImage {
				pixel_width: 640,
				pixel_height: 480,
				map_center: p(0),
			},
			EditorEvent::SetOverlayWidthMeters(-800.0),
			EditorEvent::SetOverlayHeightMeters(0.0),
		]);
		let overlay = m.state().overlay().copied().unwrap();
		assert_eq!(overlay.physical_shape_meters, Shape::new(640.0, 480.0));
	}

	#[test]
	fn reset_unhighlights_and_clears_overlay() {
		let mut m = run([
			EditorEvent::ClickOnEmptyMap(p(0)),
			EditorEvent::HoverNode(0),
			EditorEvent::LoadOverlayImage {
				pixel_width: 1,
				pixel_height: 1,
				map_center: p(0),
			},
		]);
		assert_eq!(
			m.dispatch(EditorEvent::ResetAll),
			vec![Highlight::off(LayerKind::Nodes, 0)]
		);
		assert_eq!(m.state(), &EditorState::default());
	}
}
