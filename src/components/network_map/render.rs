use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{MapSurface, NODE_RADIUS};
use crate::editor::LayerKind;

const FEATURE_COLOR: &str = "rgba(255, 0, 136, 0.4)";
const HIGHLIGHT_COLOR: &str = "#f00";

pub fn render(surface: &MapSurface, ctx: &CanvasRenderingContext2d) {
	let (w, h) = (surface.viewport.width, surface.viewport.height);
	ctx.set_fill_style_str(&surface.basemap.background);
	ctx.fill_rect(0.0, 0.0, w, h);
	draw_graticule(surface, ctx);
	draw_overlay(surface, ctx);
	draw_edges(surface, ctx);
	draw_preview(surface, ctx);
	draw_nodes(surface, ctx);
}

fn draw_graticule(surface: &MapSurface, ctx: &CanvasRenderingContext2d) {
	let v = &surface.viewport;
	let step = v.graticule_step();
	let top_left = v.unproject(0.0, 0.0);
	let bottom_right = v.unproject(v.width, v.height);

	ctx.set_stroke_style_str(&surface.basemap.grid);
	ctx.set_line_width(1.0);
	ctx.begin_path();
	let mut lng = (top_left.lng / step).floor() * step;
	while lng <= bottom_right.lng {
		let (x, _) = v.project(crate::geodesy::LngLat::new(lng, v.center.lat));
		ctx.move_to(x, 0.0);
		ctx.line_to(x, v.height);
		lng += step;
	}
	let mut lat = (bottom_right.lat / step).floor() * step;
	while lat <= top_left.lat {
		let (_, y) = v.project(crate::geodesy::LngLat::new(v.center.lng, lat));
		ctx.move_to(0.0, y);
		ctx.line_to(v.width, y);
		lat += step;
	}
	ctx.stroke();
}

fn draw_overlay(surface: &MapSurface, ctx: &CanvasRenderingContext2d) {
	let Some(placement) = &surface.overlay else {
		return;
	};
	let [nw, ne, se, sw] = placement.corners.map(|c| surface.viewport.project(c));

	if let Some(image) = &surface.overlay_image {
		let (iw, ih) = (image.natural_width() as f64, image.natural_height() as f64);
		if iw > 0.0 && ih > 0.0 {
			// Affine map taking the image's top-left, top-right and
			// bottom-left pixels onto nw, ne and sw.
			ctx.save();
			ctx.set_global_alpha(placement.opacity);
			let _ = ctx.set_transform(
				(ne.0 - nw.0) / iw,
				(ne.1 - nw.1) / iw,
				(sw.0 - nw.0) / ih,
				(sw.1 - nw.1) / ih,
				nw.0,
				nw.1,
			);
			let _ = ctx.draw_image_with_html_image_element(image, 0.0, 0.0);
			ctx.restore();
		}
	}

	ctx.set_stroke_style_str(FEATURE_COLOR);
	ctx.set_line_width(1.0);
	ctx.begin_path();
	ctx.move_to(nw.0, nw.1);
	for (x, y) in [ne, se, sw] {
		ctx.line_to(x, y);
	}
	ctx.close_path();
	ctx.stroke();
}

fn draw_edges(surface: &MapSurface, ctx: &CanvasRenderingContext2d) {
	for (id, line) in &surface.edges {
		// Dangling edges arrive as empty lines and stay invisible.
		let Some((first, rest)) = line.split_first() else {
			continue;
		};
		let highlighted = surface.is_highlighted(LayerKind::Edges, *id);
		ctx.set_stroke_style_str(if highlighted { HIGHLIGHT_COLOR } else { FEATURE_COLOR });
		ctx.set_line_width(if highlighted { 5.0 } else { 3.0 });
		ctx.begin_path();
		let (x, y) = surface.viewport.project(*first);
		ctx.move_to(x, y);
		for p in rest {
			let (x, y) = surface.viewport.project(*p);
			ctx.line_to(x, y);
		}
		ctx.stroke();
	}
}

fn draw_preview(surface: &MapSurface, ctx: &CanvasRenderingContext2d) {
	let Some((from, to)) = surface.preview else {
		return;
	};
	let (x1, y1) = surface.viewport.project(from);
	let (x2, y2) = surface.viewport.project(to);
	ctx.set_stroke_style_str(FEATURE_COLOR);
	ctx.set_line_width(3.0);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(3.0),
		&JsValue::from_f64(3.0),
	));
	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(x2, y2);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(surface: &MapSurface, ctx: &CanvasRenderingContext2d) {
	for (id, p) in &surface.nodes {
		let (x, y) = surface.viewport.project(*p);
		ctx.begin_path();
		let _ = ctx.arc(x, y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(FEATURE_COLOR);
		ctx.fill();

		if surface.is_highlighted(LayerKind::Nodes, *id) {
			ctx.set_stroke_style_str(HIGHLIGHT_COLOR);
			ctx.set_line_width(2.0);
			ctx.stroke();
		}
	}
}
