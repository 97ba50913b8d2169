use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use crate::engine::minimap::MiniMapFrame;
use crate::engine::scene::{ADD_COLOR, COLLAPSE_COLOR, EXPAND_COLOR, EdgeShape, NodeShape, Scene};
use crate::engine::{Rect, Size, Theme, Viewport};

const FONT_FAMILY: &str = "Inter, system-ui, -apple-system, sans-serif";

/// Paints `scene` through `viewport` onto a surface of `size` pixels.
pub fn draw_scene(ctx: &CanvasRenderingContext2d, scene: &Scene, viewport: &Viewport, size: Size) {
	ctx.set_fill_style_str(&scene.background);
	ctx.fill_rect(0.0, 0.0, size.width, size.height);
	ctx.save();
	let _ = ctx.translate(viewport.pan.x, viewport.pan.y);
	let _ = ctx.scale(viewport.zoom, viewport.zoom);
	for edge in &scene.edges {
		draw_edge(ctx, edge);
	}
	for node in &scene.nodes {
		draw_node(ctx, node);
	}
	ctx.restore();
}

fn draw_edge(ctx: &CanvasRenderingContext2d, edge: &EdgeShape) {
	ctx.set_stroke_style_str(&edge.color);
	ctx.set_line_width(edge.width);
	ctx.set_line_cap("round");
	ctx.begin_path();
	ctx.move_to(edge.from.x, edge.from.y);
	ctx.bezier_curve_to(
		edge.control1.x,
		edge.control1.y,
		edge.control2.x,
		edge.control2.y,
		edge.to.x,
		edge.to.y,
	);
	ctx.stroke();

	let [tip, left, right] = edge.arrow();
	ctx.set_fill_style_str(&edge.color);
	ctx.begin_path();
	ctx.move_to(tip.x, tip.y);
	ctx.line_to(left.x, left.y);
	ctx.line_to(right.x, right.y);
	ctx.close_path();
	ctx.fill();
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, r: Rect, radius: f64) {
	let radius = radius.min(r.width / 2.0).min(r.height / 2.0).max(0.0);
	ctx.begin_path();
	ctx.move_to(r.x + radius, r.y);
	let _ = ctx.arc_to(r.right(), r.y, r.right(), r.bottom(), radius);
	let _ = ctx.arc_to(r.right(), r.bottom(), r.x, r.bottom(), radius);
	let _ = ctx.arc_to(r.x, r.bottom(), r.x, r.y, radius);
	let _ = ctx.arc_to(r.x, r.y, r.right(), r.y, radius);
	ctx.close_path();
}

fn circle(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
}

fn line(ctx: &CanvasRenderingContext2d, x1: f64, y1: f64, x2: f64, y2: f64) {
	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(x2, y2);
	ctx.stroke();
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &NodeShape) {
	rounded_rect(ctx, node.rect, node.corner_radius);
	ctx.set_fill_style_str(&node.fill);
	ctx.fill();
	ctx.set_stroke_style_str(&node.stroke);
	ctx.set_line_width(node.stroke_width);
	ctx.stroke();

	if let Some(badge) = node.child_badge {
		circle(ctx, badge.center.x, badge.center.y, badge.radius);
		ctx.set_fill_style_str("#ffffff");
		ctx.fill();
		ctx.set_stroke_style_str(&node.fill);
		ctx.set_line_width(2.0);
		ctx.stroke();
	}

	if !node.editing {
		ctx.set_fill_style_str(&node.text_color);
		ctx.set_font(&format!(
			"{} {}px {FONT_FAMILY}",
			node.font_weight, node.font_size
		));
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		for (at, text) in node.line_positions() {
			let _ = ctx.fill_text(text, at.x, at.y);
		}
	}

	if let Some(toggle) = &node.toggle {
		let c = toggle.circle.center;
		circle(ctx, c.x, c.y, toggle.circle.radius);
		ctx.set_fill_style_str(if toggle.expanded {
			COLLAPSE_COLOR
		} else {
			EXPAND_COLOR
		});
		ctx.fill();
		ctx.set_stroke_style_str("#ffffff");
		ctx.set_line_width(2.0);
		ctx.stroke();
		ctx.set_line_width(3.0);
		line(ctx, c.x - 6.0, c.y, c.x + 6.0, c.y);
		if !toggle.expanded {
			line(ctx, c.x, c.y - 6.0, c.x, c.y + 6.0);
		}
	}

	if let Some(add) = node.add_button {
		let c = add.center;
		circle(ctx, c.x, c.y, add.radius);
		ctx.set_fill_style_str(ADD_COLOR);
		ctx.fill();
		ctx.set_stroke_style_str("#ffffff");
		ctx.set_line_width(2.0);
		ctx.stroke();
		ctx.set_line_width(3.0);
		line(ctx, c.x - 6.0, c.y, c.x + 6.0, c.y);
		line(ctx, c.x, c.y - 6.0, c.x, c.y + 6.0);
	}
}

pub fn draw_minimap(ctx: &CanvasRenderingContext2d, frame: &MiniMapFrame, theme: &Theme) {
	let size = frame.size;
	ctx.set_fill_style_str(&theme.controls_background);
	ctx.fill_rect(0.0, 0.0, size.width, size.height);

	ctx.set_stroke_style_str(&theme.connection_color);
	ctx.set_line_width(1.0);
	for (from, to) in &frame.links {
		line(ctx, from.x, from.y, to.x, to.y);
	}
	for node in &frame.nodes {
		ctx.set_fill_style_str(&node.color);
		ctx.fill_rect(node.rect.x, node.rect.y, node.rect.width, node.rect.height);
	}

	let w = frame.window;
	ctx.set_global_alpha(0.15);
	ctx.set_fill_style_str(&theme.selected_node_border);
	ctx.fill_rect(w.x, w.y, w.width, w.height);
	ctx.set_global_alpha(1.0);
	ctx.set_stroke_style_str(&theme.selected_node_border);
	ctx.set_line_width(2.0);
	ctx.stroke_rect(w.x, w.y, w.width, w.height);
}
