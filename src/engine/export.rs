//! Structured, vector and raster output.
//!
//! JSON carries only [`MindMapData`]; viewport and session state never leave
//! the engine. SVG is written straight from a [`Scene`], so it shows exactly
//! what the canvas shows. Raster capture itself needs a drawing surface and
//! lives in the browser adapter; this module only plans it.

use std::fmt::Write as _;

use log::info;

use super::config::ExportConfig;
use super::error::MindMapError;
use super::scene::{ADD_COLOR, COLLAPSE_COLOR, EXPAND_COLOR, Scene};
use super::types::{MindMapData, Rect};
use super::viewport::Viewport;

pub fn export_json(data: &MindMapData) -> Result<String, MindMapError> {
	serde_json::to_string_pretty(data).map_err(|e| MindMapError::ExportFailure(e.to_string()))
}

/// Parses and validates a map. Nothing is normalised, so a successful
/// import of an export is field-for-field identical to the original.
pub fn import_json(json: &str) -> Result<MindMapData, MindMapError> {
	let data: MindMapData =
		serde_json::from_str(json).map_err(|e| MindMapError::InvalidGraph(e.to_string()))?;
	data.validate()?;
	info!("imported map with {} node(s)", data.nodes.len());
	Ok(data)
}

fn escape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for ch in text.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(ch),
		}
	}
	out
}

/// Standalone SVG document of `scene`, cropped to its bounds plus `padding`.
pub fn svg_markup(scene: &Scene, padding: f64) -> Result<String, MindMapError> {
	let area = scene
		.bounds
		.map(|b| b.inflate(padding))
		.unwrap_or(Rect::new(0.0, 0.0, 2.0 * padding, 2.0 * padding));
	write_svg(scene, area).map_err(|e| MindMapError::ExportFailure(e.to_string()))
}

fn write_svg(scene: &Scene, area: Rect) -> Result<String, std::fmt::Error> {
	let mut svg = String::new();
	writeln!(
		svg,
		r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="{x} {y} {w} {h}">"#,
		x = area.x,
		y = area.y,
		w = area.width,
		h = area.height,
	)?;
	writeln!(
		svg,
		r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
		area.x,
		area.y,
		area.width,
		area.height,
		escape(&scene.background)
	)?;

	for edge in &scene.edges {
		writeln!(
			svg,
			r#"<path d="M {} {} C {} {}, {} {}, {} {}" fill="none" stroke="{}" stroke-width="{}" stroke-linecap="round"/>"#,
			edge.from.x,
			edge.from.y,
			edge.control1.x,
			edge.control1.y,
			edge.control2.x,
			edge.control2.y,
			edge.to.x,
			edge.to.y,
			escape(&edge.color),
			edge.width
		)?;
		let [tip, left, right] = edge.arrow();
		writeln!(
			svg,
			r#"<polygon points="{},{} {},{} {},{}" fill="{}"/>"#,
			tip.x,
			tip.y,
			left.x,
			left.y,
			right.x,
			right.y,
			escape(&edge.color)
		)?;
	}

	for node in &scene.nodes {
		let r = node.rect;
		writeln!(svg, r#"<g data-node-id="{}">"#, escape(&node.id))?;
		writeln!(
			svg,
			r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
			r.x,
			r.y,
			r.width,
			r.height,
			node.corner_radius,
			escape(&node.fill),
			escape(&node.stroke),
			node.stroke_width
		)?;
		if let Some(badge) = node.child_badge {
			writeln!(
				svg,
				r##"<circle cx="{}" cy="{}" r="{}" fill="#ffffff" stroke="{}" stroke-width="2"/>"##,
				badge.center.x,
				badge.center.y,
				badge.radius,
				escape(&node.fill)
			)?;
		}
		if let Some(toggle) = &node.toggle {
			let c = toggle.circle;
			let fill = if toggle.expanded {
				COLLAPSE_COLOR
			} else {
				EXPAND_COLOR
			};
			writeln!(
				svg,
				r##"<circle cx="{}" cy="{}" r="{}" fill="{fill}" stroke="#ffffff" stroke-width="2"/>"##,
				c.center.x, c.center.y, c.radius
			)?;
		}
		if let Some(add) = node.add_button {
			writeln!(
				svg,
				r##"<circle cx="{}" cy="{}" r="{}" fill="{ADD_COLOR}" stroke="#ffffff" stroke-width="2"/>"##,
				add.center.x, add.center.y, add.radius
			)?;
		}
		for (at, line) in node.line_positions() {
			writeln!(
				svg,
				r#"<text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" fill="{}" font-size="{}" font-weight="{}" font-family="Inter, system-ui, sans-serif">{}</text>"#,
				at.x,
				at.y,
				escape(&node.text_color),
				node.font_size,
				node.font_weight,
				escape(line)
			)?;
		}
		writeln!(svg, "</g>")?;
	}
	svg.push_str("</svg>\n");
	Ok(svg)
}

/// Size and transform of an off-screen raster capture. Independent of the
/// interactive viewport: the whole map always fits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterPlan {
	pub width: u32,
	pub height: u32,
	pub viewport: Viewport,
}

pub fn raster_plan(scene: &Scene, config: &ExportConfig) -> Result<RasterPlan, MindMapError> {
	let bounds = scene
		.bounds
		.ok_or_else(|| MindMapError::ExportFailure("nothing to render".into()))?;
	if config.raster_width == 0 || config.raster_height == 0 {
		return Err(MindMapError::ExportFailure(
			"raster surface has zero area".into(),
		));
	}
	let (width, height) = (config.raster_width, config.raster_height);
	Ok(RasterPlan {
		width,
		height,
		viewport: Viewport::fit(bounds, width as f64, height as f64, config.raster_padding),
	})
}
