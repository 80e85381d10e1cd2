use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, KeyboardEvent, MouseEvent,
	WheelEvent,
};

use super::render;
use super::state::{CLICK_SLOP, MapSurface};
use super::viewport::Viewport;
use crate::components::session::Session;
use crate::editor::{EditorEvent, OverlayGeoreferencer, SurfaceAdapter};

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|(w, h)| *w > 0.0 && *h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn local_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Map canvas. Reads the session from context, mirrors its state through a
/// [`SurfaceAdapter`], and turns pointer and keyboard input into editor
/// events.
#[component]
pub fn NetworkMap() -> impl IntoView {
	let session = expect_context::<Session>();
	let config = session.config.get_value();

	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let surface: Rc<RefCell<Option<MapSurface>>> = Rc::new(RefCell::new(None));
	let adapter = Rc::new(RefCell::new(SurfaceAdapter::new(OverlayGeoreferencer::new(
		config.projection.origin(),
	))));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let keydown_cb: Rc<RefCell<Option<Closure<dyn FnMut(KeyboardEvent)>>>> =
		Rc::new(RefCell::new(None));

	let (surface_init, adapter_init) = (surface.clone(), adapter.clone());
	let (animate_init, resize_cb_init, keydown_cb_init) =
		(animate.clone(), resize_cb.clone(), keydown_cb.clone());
	let init_config = config.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("2d canvas context unavailable");
			return;
		};

		let basemap = init_config
			.basemap(&session.basemap.get_untracked())
			.cloned();
		let mut map_surface = MapSurface::new(
			Viewport::new(init_config.map.center(), init_config.map.zoom, w, h),
			basemap.unwrap_or_default(),
			init_config.map.hit_radius_px,
		);
		session.model.with_untracked(|m| {
			adapter_init
				.borrow_mut()
				.sync(m.machine.state(), &[], &mut map_surface)
		});
		*surface_init.borrow_mut() = Some(map_surface);

		let (surface_resize, canvas_resize) = (surface_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *surface_resize.borrow_mut() {
				s.viewport.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		*keydown_cb_init.borrow_mut() = Some(Closure::new(move |ev: KeyboardEvent| {
			if ev.key() == "Escape" {
				session.dispatch_if_changed(EditorEvent::Cancel);
			}
		}));
		if let Some(ref cb) = *keydown_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
		}

		let (surface_anim, animate_inner) = (surface_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref s) = *surface_anim.borrow() {
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Mirror every state change onto the surface.
	let (surface_sync, adapter_sync) = (surface.clone(), adapter.clone());
	Effect::new(move |_| {
		session.model.track();
		let mut highlights = Vec::new();
		session
			.model
			.update_untracked(|m| highlights = std::mem::take(&mut m.pending));
		if let Some(ref mut s) = *surface_sync.borrow_mut() {
			session.model.with_untracked(|m| {
				adapter_sync
					.borrow_mut()
					.sync(m.machine.state(), &highlights, s)
			});
		}
	});

	let (surface_style, style_config) = (surface.clone(), config.clone());
	Effect::new(move |_| {
		let name = session.basemap.get();
		if let (Some(s), Some(style)) =
			(surface_style.borrow_mut().as_mut(), style_config.basemap(&name))
		{
			s.basemap = style.clone();
		}
	});

	let surface_image = surface.clone();
	Effect::new(move |_| {
		let url = session.overlay_image.get();
		let image = url.and_then(|url| {
			let image = HtmlImageElement::new().ok()?;
			image.set_src(&url);
			Some(image)
		});
		if let Some(ref mut s) = *surface_image.borrow_mut() {
			s.overlay_image = image;
		}
	});

	let surface_fit = surface.clone();
	Effect::new(move |_| {
		let Some((sw, ne)) = session.fit_request.get() else {
			return;
		};
		if let Some(ref mut s) = *surface_fit.borrow_mut() {
			s.viewport.fit_bounds(sw, ne, 40.0);
			session.map_center.set(s.viewport.center);
		}
		session.fit_request.set(None);
	});

	let surface_md = surface.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_position(&canvas, &ev);
		if let Some(ref mut s) = *surface_md.borrow_mut() {
			s.pan.active = true;
			s.pan.moved = false;
			s.pan.start_x = x;
			s.pan.start_y = y;
			s.pan.last_x = x;
			s.pan.last_y = y;
		}
	};

	let surface_mm = surface.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_position(&canvas, &ev);

		let hover = {
			let mut guard = surface_mm.borrow_mut();
			let Some(s) = guard.as_mut() else {
				return;
			};
			if s.pan.active {
				if (x - s.pan.start_x).hypot(y - s.pan.start_y) > CLICK_SLOP {
					s.pan.moved = true;
				}
				if s.pan.moved {
					s.viewport.pan_by(x - s.pan.last_x, y - s.pan.last_y);
				}
				s.pan.last_x = x;
				s.pan.last_y = y;
				None
			} else {
				let node = s.node_at(x, y);
				let edge = node.is_none().then(|| s.edge_at(x, y)).flatten();
				Some((node, edge, s.viewport.unproject(x, y)))
			}
		};

		// Dispatch only after the surface borrow is released.
		if let Some((node, edge, pos)) = hover {
			session.dispatch_if_changed(node.map_or(EditorEvent::UnhoverNode, EditorEvent::HoverNode));
			session.dispatch_if_changed(edge.map_or(EditorEvent::UnhoverEdge, EditorEvent::HoverEdge));
			session.dispatch_if_changed(EditorEvent::PointerMove(pos));
		}
	};

	let surface_mu = surface.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_position(&canvas, &ev);
		let event = {
			let mut guard = surface_mu.borrow_mut();
			let Some(s) = guard.as_mut() else {
				return;
			};
			let was_click = s.pan.active && !s.pan.moved;
			s.pan.active = false;
			if was_click {
				Some(match s.node_at(x, y) {
					Some(id) => EditorEvent::ClickOnNode(id),
					None => EditorEvent::ClickOnEmptyMap(s.viewport.unproject(x, y)),
				})
			} else {
				session.map_center.set(s.viewport.center);
				None
			}
		};
		if let Some(event) = event {
			session.dispatch(event);
		}
	};

	let surface_ml = surface.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *surface_ml.borrow_mut() {
			s.pan.active = false;
		}
		session.dispatch_if_changed(EditorEvent::UnhoverNode);
		session.dispatch_if_changed(EditorEvent::UnhoverEdge);
	};

	let surface_wh = surface.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_position(&canvas, &ev);
		if let Some(ref mut s) = *surface_wh.borrow_mut() {
			let delta = if ev.delta_y() > 0.0 { -0.5 } else { 0.5 };
			s.viewport.zoom_around(x, y, delta);
			session.map_center.set(s.viewport.center);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="network-map-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: crosshair;"
		/>
	}
}
