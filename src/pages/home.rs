use leptos::prelude::*;

use crate::components::network_map::NetworkMap;
use crate::components::session::Session;
use crate::components::sidebar::Sidebar;
use crate::config::EditorConfig;

/// Editor page: side panel on the left, map filling the rest.
#[component]
pub fn Home() -> impl IntoView {
	provide_context(Session::new(EditorConfig::bundled()));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="editor" style="display: flex; height: 100vh; margin: 0;">
				<Sidebar />
				<div class="map-pane" style="flex: 1; position: relative; overflow: hidden;">
					<NetworkMap />
				</div>
			</div>
		</ErrorBoundary>
	}
}
