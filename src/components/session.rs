use leptos::prelude::*;
use log::debug;

use super::files;
use crate::config::EditorConfig;
use crate::editor::{EditorEvent, EditorState, EditorStateMachine, Highlight};
use crate::geodesy::LngLat;

/// State machine plus the highlight requests the map has not applied yet.
#[derive(Clone, Debug, Default)]
pub struct SessionModel {
	pub machine: EditorStateMachine,
	pub pending: Vec<Highlight>,
}

/// Reactive handle shared by the map and the side panel through context.
/// All fields are arena signals, so the handle is `Copy`.
#[derive(Clone, Copy)]
pub struct Session {
	pub model: RwSignal<SessionModel>,
	pub config: StoredValue<EditorConfig>,
	/// Last map centre reported by the map; read once per overlay load.
	pub map_center: RwSignal<LngLat>,
	/// Bounds the map should fit on its next frame.
	pub fit_request: RwSignal<Option<(LngLat, LngLat)>>,
	pub basemap: RwSignal<String>,
	/// Object URL of the overlay image. Change it through
	/// [`Session::set_overlay_image`] so the old URL is released.
	pub overlay_image: RwSignal<Option<String>>,
	pub status: RwSignal<Option<String>>,
}

impl Session {
	pub fn new(config: EditorConfig) -> Self {
		let basemap = config
			.basemaps
			.first()
			.map(|s| s.name.clone())
			.unwrap_or_default();
		Self {
			model: RwSignal::new(SessionModel {
				machine: EditorStateMachine::new(config.editor.click_mode),
				pending: Vec::new(),
			}),
			map_center: RwSignal::new(config.map.center()),
			config: StoredValue::new(config),
			fit_request: RwSignal::new(None),
			basemap: RwSignal::new(basemap),
			overlay_image: RwSignal::new(None),
			status: RwSignal::new(None),
		}
	}

	/// Feed one event to the state machine.
	pub fn dispatch(&self, event: EditorEvent) {
		debug!("dispatch {event:?}");
		self.model.update(|m| {
			let highlights = m.machine.dispatch(event);
			m.pending.extend(highlights);
		});
	}

	/// Like [`Session::dispatch`], but skipped when the state would not
	/// change, so high-frequency pointer events do not wake subscribers.
	pub fn dispatch_if_changed(&self, event: EditorEvent) {
		let changed = self.model.with_untracked(|m| {
			crate::editor::transition(m.machine.state(), event.clone(), m.machine.click_mode()).state
				!= *m.machine.state()
		});
		if changed {
			self.dispatch(event);
		}
	}

	/// Tracked read of the editor state.
	pub fn with_state<T>(&self, f: impl FnOnce(&EditorState) -> T) -> T {
		self.model.with(|m| f(m.machine.state()))
	}

	/// Swap the overlay image URL, revoking the one it replaces.
	pub fn set_overlay_image(&self, url: Option<String>) {
		let previous = self.overlay_image.get_untracked();
		if let Some(stale) = files::superseded_url(previous, url.as_deref()) {
			files::revoke_url(&stale);
		}
		self.overlay_image.set(url);
	}

	pub fn set_status(&self, message: impl Into<String>) {
		self.status.set(Some(message.into()));
	}
}
