use leptos::prelude::*;
use log::warn;
use web_sys::HtmlInputElement;

use super::files;
use super::session::Session;
use crate::editor::{EditorEvent, OverlayGeoreferencer};
use crate::graph::features::export_geojson_string;
use crate::graph::interchange::NodeLinkDocument;

fn first_file(input: &HtmlInputElement) -> Option<web_sys::File> {
	input.files().and_then(|list| list.get(0))
}

/// Left-hand panel: file actions, overlay settings, and the node and edge
/// tables.
#[component]
pub fn Sidebar() -> impl IntoView {
	let session = expect_context::<Session>();

	view! {
		<aside class="sidebar">
			<FileActions />
			<BaseMapSelector />
			<OverlaySettings />
			<NodeTable />
			<EdgeTable />
			<p class="status">{move || session.status.get()}</p>
		</aside>
	}
}

#[component]
fn FileActions() -> impl IntoView {
	let session = expect_context::<Session>();

	let on_import = move |ev: leptos::ev::Event| {
		let input: HtmlInputElement = event_target(&ev);
		let Some(file) = first_file(&input) else {
			return;
		};
		let started = files::read_text(&file, move |text| {
			let document = text.and_then(|t| NodeLinkDocument::from_json_str(&t).map_err(|e| e.to_string()));
			match document {
				Ok(document) => {
					session.set_overlay_image(None);
					session.dispatch(EditorEvent::import(document));
					session.set_status("Graph imported");
				}
				Err(err) => {
					warn!("import rejected: {err}");
					session.set_status(format!("Import failed: {err}"));
				}
			}
		});
		if started.is_err() {
			session.set_status("Could not read the selected file");
		}
		input.set_value("");
	};

	let export_node_link = move |_| {
		let text = session
			.model
			.with_untracked(|m| NodeLinkDocument::from_graph(m.machine.state().graph()).to_json_string());
		let result = text
			.map_err(|e| e.to_string())
			.and_then(|t| files::download_json("graph.json", &t).map_err(|e| format!("{e:?}")));
		if let Err(err) = result {
			warn!("node-link export failed: {err}");
			session.set_status(format!("Export failed: {err}"));
		}
	};

	let export_geojson = move |_| {
		let text = session
			.model
			.with_untracked(|m| export_geojson_string(m.machine.state().graph()));
		let result = text
			.map_err(|e| e.to_string())
			.and_then(|t| files::download_json("graph.geojson", &t).map_err(|e| format!("{e:?}")));
		if let Err(err) = result {
			warn!("GeoJSON export failed: {err}");
			session.set_status(format!("Export failed: {err}"));
		}
	};

	let on_reset = move |_| {
		let confirmed = web_sys::window()
			.and_then(|w| w.confirm_with_message("All the nodes and edges will be deleted.").ok())
			.unwrap_or(false);
		if confirmed {
			session.dispatch(EditorEvent::ResetAll);
			session.set_overlay_image(None);
			session.status.set(None);
		}
	};

	let on_add_image = move |ev: leptos::ev::Event| {
		let input: HtmlInputElement = event_target(&ev);
		let Some(file) = first_file(&input) else {
			return;
		};
		let started = files::load_image(&file, move |image, url| {
			let (pixel_width, pixel_height) = (image.natural_width(), image.natural_height());
			session.dispatch(EditorEvent::LoadOverlayImage {
				pixel_width,
				pixel_height,
				map_center: session.map_center.get_untracked(),
			});
			session.set_overlay_image(Some(url));

			let origin = session.config.with_value(|c| c.projection.origin());
			let bounds = session.model.with_untracked(|m| {
				m.machine
					.state()
					.overlay()
					.map(|o| OverlayGeoreferencer::new(origin).quad(o).fit_bounds())
			});
			session.fit_request.set(bounds);
		});
		if started.is_err() {
			session.set_status("Could not load the selected image");
		}
		input.set_value("");
	};

	view! {
		<section class="file-actions">
			<label class="button">
				"Import"
				<input type="file" accept=".json,application/json" style="display: none;" on:change=on_import />
			</label>
			<button on:click=export_node_link>"Export node-link"</button>
			<button on:click=export_geojson>"Export GeoJSON"</button>
			<button on:click=on_reset>"Reset"</button>
			<label class="button">
				"Add image"
				<input type="file" accept="image/*" style="display: none;" on:change=on_add_image />
			</label>
		</section>
	}
}

#[component]
fn BaseMapSelector() -> impl IntoView {
	let session = expect_context::<Session>();
	let names: Vec<String> = session
		.config
		.with_value(|c| c.basemaps.iter().map(|s| s.name.clone()).collect());

	view! {
		<label class="basemap-selector">
			"Base map "
			<select
				prop:value=move || session.basemap.get()
				on:change=move |ev| session.basemap.set(event_target_value(&ev))
			>
				{names
					.into_iter()
					.map(|name| view! { <option value=name.clone()>{name.clone()}</option> })
					.collect_view()}
			</select>
		</label>
	}
}

/// Labelled numeric input. Commits on `change`, and only values that parse.
#[component]
fn NumberField(
	label: &'static str,
	#[prop(into)] value: Signal<f64>,
	#[prop(default = "any")] step: &'static str,
	on_commit: Callback<f64>,
) -> impl IntoView {
	let on_change = move |ev: leptos::ev::Event| match event_target_value(&ev).trim().parse::<f64>() {
		Ok(v) => on_commit.run(v),
		Err(_) => warn!("{label}: not a number"),
	};

	view! {
		<label class="number-field">
			<span>{label}</span>
			<input type="number" step=step prop:value=move || value.get() on:change=on_change />
		</label>
	}
}

#[component]
fn OverlaySettings() -> impl IntoView {
	let session = expect_context::<Session>();
	let read = move |f: fn(&crate::editor::OverlayConfig) -> f64| {
		Signal::derive(move || session.with_state(|s| s.overlay().map(f).unwrap_or_default()))
	};

	view! {
		<Show when=move || session.with_state(|s| s.overlay().is_some())>
			<section class="overlay-settings">
				<h2>"Image overlay"</h2>
				<NumberField
					label="Width (m)"
					value=read(|o| o.physical_shape_meters.width)
					on_commit=Callback::new(move |v| session.dispatch(EditorEvent::SetOverlayWidthMeters(v)))
				/>
				<NumberField
					label="Height (m)"
					value=read(|o| o.physical_shape_meters.height)
					on_commit=Callback::new(move |v| session.dispatch(EditorEvent::SetOverlayHeightMeters(v)))
				/>
				<NumberField
					label="Rotation (deg)"
					value=read(|o| o.rotation_deg)
					on_commit=Callback::new(move |v| session.dispatch(EditorEvent::SetOverlayRotationDeg(v)))
				/>
				<NumberField
					label="Center longitude"
					value=read(|o| o.center.lng)
					on_commit=Callback::new(move |v| {
						session.dispatch(EditorEvent::SetOverlayCenter { lng: Some(v), lat: None })
					})
				/>
				<NumberField
					label="Center latitude"
					value=read(|o| o.center.lat)
					on_commit=Callback::new(move |v| {
						session.dispatch(EditorEvent::SetOverlayCenter { lng: None, lat: Some(v) })
					})
				/>
				<NumberField
					label="Opacity"
					step="0.05"
					value=read(|o| o.opacity)
					on_commit=Callback::new(move |v| session.dispatch(EditorEvent::SetOverlayOpacity(v)))
				/>
			</section>
		</Show>
	}
}

#[component]
fn NodeTable() -> impl IntoView {
	let session = expect_context::<Session>();
	let rows = move || {
		session.with_state(|s| {
			let hovered = s.hover_node();
			s.graph()
				.nodes()
				.iter()
				.map(|n| (n.id, n.position, hovered == Some(n.id)))
				.collect::<Vec<_>>()
		})
	};

	view! {
		<details class="node-table" open>
			<summary>"Nodes"</summary>
			<table>
				<thead>
					<tr>
						<th>"ID"</th>
						<th>"Latitude"</th>
						<th>"Longitude"</th>
						<th></th>
					</tr>
				</thead>
				<tbody>
					{move || {
						rows()
							.into_iter()
							.map(|(id, position, hovered)| {
								view! {
									<tr
										class:hovered=hovered
										on:mouseenter=move |_| session.dispatch_if_changed(EditorEvent::HoverNode(id))
										on:mouseleave=move |_| session.dispatch_if_changed(EditorEvent::UnhoverNode)
									>
										<td>{id}</td>
										<td>{format!("{:.6}", position.lat)}</td>
										<td>{format!("{:.6}", position.lng)}</td>
										<td>
											<button on:click=move |_| session.dispatch(EditorEvent::DeleteNode(id))>
												"Delete"
											</button>
										</td>
									</tr>
								}
							})
							.collect_view()
					}}
				</tbody>
			</table>
		</details>
	}
}

#[component]
fn EdgeTable() -> impl IntoView {
	let session = expect_context::<Session>();
	let rows = move || {
		session.with_state(|s| {
			let hovered = s.hover_edge();
			s.graph()
				.edges()
				.iter()
				.map(|e| (e.id, e.source, e.target, hovered == Some(e.id)))
				.collect::<Vec<_>>()
		})
	};

	view! {
		<details class="edge-table" open>
			<summary>"Edges"</summary>
			<table>
				<thead>
					<tr>
						<th>"ID"</th>
						<th>"Endpoints"</th>
						<th></th>
					</tr>
				</thead>
				<tbody>
					{move || {
						rows()
							.into_iter()
							.map(|(id, source, target, hovered)| {
								view! {
									<tr
										class:hovered=hovered
										on:mouseenter=move |_| session.dispatch_if_changed(EditorEvent::HoverEdge(id))
										on:mouseleave=move |_| session.dispatch_if_changed(EditorEvent::UnhoverEdge)
									>
										<td>{id}</td>
										<td>{format!("Node {source} → Node {target}")}</td>
										<td>
											<button on:click=move |_| session.dispatch(EditorEvent::DeleteEdge(id))>
												"Delete"
											</button>
										</td>
									</tr>
								}
							})
							.collect_view()
					}}
				</tbody>
			</table>
		</details>
	}
}
