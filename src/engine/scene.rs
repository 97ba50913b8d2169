//! Render-agnostic drawing list.
//!
//! A [`Scene`] is everything a backend needs to paint the map in world
//! coordinates: the canvas renderer, the SVG writer and the raster capture
//! all consume the same list, and hit-testing uses the same control
//! geometry, so what is drawn is exactly what is clickable.

use super::config::MetricsConfig;
use super::metrics;
use super::session::Session;
use super::theme::Theme;
use super::types::{MindMapData, Node, Point, Rect};

pub const ROOT_CORNER_RADIUS: f64 = 25.0;
pub const CORNER_RADIUS: f64 = 20.0;
pub const TOGGLE_OFFSET: f64 = 18.0;
pub const TOGGLE_RADIUS: f64 = 12.0;
pub const ADD_OFFSET: f64 = 20.0;
pub const ADD_RADIUS: f64 = 14.0;
const BADGE_INSET: f64 = 8.0;
const BADGE_RADIUS: f64 = 4.0;
const MAX_CONTROL_OFFSET: f64 = 50.0;
pub const ARROW_SIZE: f64 = 8.0;

pub const COLLAPSE_COLOR: &str = "#ef4444";
pub const EXPAND_COLOR: &str = "#3b82f6";
pub const ADD_COLOR: &str = "#10b981";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
	pub center: Point,
	pub radius: f64,
}

impl Circle {
	pub fn contains(&self, p: Point) -> bool {
		self.center.distance(p) <= self.radius
	}
}

/// Expand/collapse button left of a node that has children.
pub fn toggle_button(node: &Node) -> Option<Circle> {
	node.has_children().then(|| Circle {
		center: Point::new(node.x - TOGGLE_OFFSET, node.y + node.height / 2.0),
		radius: TOGGLE_RADIUS,
	})
}

/// Add-child button right of the selected node.
pub fn add_button(node: &Node) -> Circle {
	Circle {
		center: Point::new(node.x + node.width + ADD_OFFSET, node.y + node.height / 2.0),
		radius: ADD_RADIUS,
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeShape {
	pub id: String,
	pub from: Point,
	pub control1: Point,
	pub control2: Point,
	pub to: Point,
	pub color: String,
	pub width: f64,
	/// Direction of the arrowhead at `to`, in radians.
	pub arrow_angle: f64,
}

impl EdgeShape {
	/// Triangle of the arrowhead: tip first.
	pub fn arrow(&self) -> [Point; 3] {
		let (cos, sin) = (self.arrow_angle.cos(), self.arrow_angle.sin());
		let back = Point::new(self.to.x - cos * ARROW_SIZE, self.to.y - sin * ARROW_SIZE);
		let (px, py) = (-sin * ARROW_SIZE * 0.5, cos * ARROW_SIZE * 0.5);
		[
			self.to,
			Point::new(back.x + px, back.y + py),
			Point::new(back.x - px, back.y - py),
		]
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toggle {
	pub circle: Circle,
	pub expanded: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeShape {
	pub id: String,
	pub rect: Rect,
	pub corner_radius: f64,
	pub fill: String,
	pub stroke: String,
	pub stroke_width: f64,
	pub text_color: String,
	pub lines: Vec<String>,
	pub font_size: f64,
	pub font_weight: u16,
	pub line_height: f64,
	pub selected: bool,
	/// Text is being edited in an overlay; backends skip the label.
	pub editing: bool,
	pub child_badge: Option<Circle>,
	pub toggle: Option<Toggle>,
	pub add_button: Option<Circle>,
}

impl NodeShape {
	/// Baseline-centred y of each label line.
	pub fn line_positions(&self) -> impl Iterator<Item = (Point, &str)> {
		let step = self.font_size * self.line_height;
		let center = self.rect.center();
		let top = center.y - step * (self.lines.len() as f64 - 1.0) / 2.0;
		self.lines
			.iter()
			.enumerate()
			.map(move |(i, line)| (Point::new(center.x, top + step * i as f64), line.as_str()))
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	pub background: String,
	pub edges: Vec<EdgeShape>,
	/// Paint order; the last node is on top.
	pub nodes: Vec<NodeShape>,
	/// World bounds of the visible nodes, `None` for an empty map.
	pub bounds: Option<Rect>,
}

impl Scene {
	pub fn build(
		data: &MindMapData,
		session: &Session,
		theme: &Theme,
		metrics_config: &MetricsConfig,
	) -> Self {
		let visible = data.visible_nodes();

		let edges = data
			.connections
			.iter()
			.filter_map(|conn| {
				let from = data.node(&conn.from_node_id)?;
				let to = data.node(&conn.to_node_id)?;
				if !from.is_expanded || !data.is_visible(&from.id) {
					return None;
				}
				edge_shape(&conn.id, from, to, &theme.connection_color, conn.width)
			})
			.collect();

		let nodes = visible
			.iter()
			.map(|node| node_shape(node, session, theme, metrics_config))
			.collect();

		Scene {
			background: theme.background.clone(),
			edges,
			nodes,
			bounds: MindMapData::bounds(visible.iter().copied()),
		}
	}
}

fn edge_shape(id: &str, from: &Node, to: &Node, color: &str, width: f64) -> Option<EdgeShape> {
	let (a, b) = (from.center(), to.center());
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let distance = dx.hypot(dy);
	if distance == 0.0 {
		return None;
	}
	let (ux, uy) = (dx / distance, dy / distance);
	let start = Point::new(a.x + ux * from.width / 2.0, a.y + uy * from.height / 2.0);
	let end = Point::new(b.x - ux * to.width / 2.0, b.y - uy * to.height / 2.0);
	let offset = MAX_CONTROL_OFFSET.min(distance / 4.0);

	Some(EdgeShape {
		id: id.into(),
		from: start,
		control1: Point::new(start.x + ux * offset, start.y + uy * offset),
		control2: Point::new(end.x - ux * offset, end.y - uy * offset),
		to: end,
		color: color.into(),
		width,
		arrow_angle: uy.atan2(ux),
	})
}

fn node_shape(node: &Node, session: &Session, theme: &Theme, metrics_config: &MetricsConfig) -> NodeShape {
	let text = metrics::measure(&node.text, node.level, metrics_config);
	let selected = session.is_selected(&node.id);
	let (stroke, stroke_width) = match (selected, node.is_root()) {
		(true, _) => (theme.selected_node_border.clone(), 4.0),
		(false, true) => ("#ffffff".to_string(), 4.0),
		(false, false) => ("#ffffff".to_string(), 3.0),
	};

	NodeShape {
		id: node.id.clone(),
		rect: node.rect(),
		corner_radius: if node.is_root() {
			ROOT_CORNER_RADIUS
		} else {
			CORNER_RADIUS
		}
		.min(node.height / 2.0),
		fill: node.color.clone(),
		stroke,
		stroke_width,
		text_color: theme.text_color.clone(),
		lines: text.lines,
		font_size: text.style.font_size,
		font_weight: text.style.font_weight,
		line_height: text.style.line_height,
		selected,
		editing: session.editing_node_id() == Some(node.id.as_str()),
		child_badge: node.has_children().then(|| Circle {
			center: Point::new(
				node.x + node.width - BADGE_INSET,
				node.y + node.height - BADGE_INSET,
			),
			radius: BADGE_RADIUS,
		}),
		toggle: toggle_button(node).map(|circle| Toggle {
			circle,
			expanded: node.is_expanded,
		}),
		add_button: selected.then(|| add_button(node)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::types::Side;

	fn sample() -> (MindMapData, String, String) {
		let metrics = MetricsConfig::default();
		let mut data = MindMapData::with_root("Root", "#000", 400.0, 300.0, &metrics);
		let a = data.add_child("root", Some(Side::Right), "A", "#111", &metrics).unwrap();
		let a1 = data.add_child(&a, None, "A1", "#222", &metrics).unwrap();
		data.node_mut(&a).unwrap().x = 700.0;
		data.node_mut(&a1).unwrap().x = 1000.0;
		(data, a, a1)
	}

	fn build(data: &MindMapData, session: &Session) -> Scene {
		Scene::build(data, session, &Theme::default(), &MetricsConfig::default())
	}

	#[test]
	fn edges_start_and_end_on_node_borders() {
		let (data, a, _) = sample();
		let scene = build(&data, &Session::new());
		assert_eq!(scene.edges.len(), 2);
		let edge = &scene.edges[0];
		let (root, child) = (data.root().unwrap(), data.node(&a).unwrap());
		assert!((edge.from.x - root.rect().right()).abs() < 1.0);
		assert!((edge.to.x - child.x).abs() < 1.0);
		assert!(edge.control1.x > edge.from.x && edge.control2.x < edge.to.x);
		assert!(edge.arrow_angle.abs() < 0.2);
	}

	#[test]
	fn collapsed_parent_hides_edges_and_descendants() {
		let (mut data, a, a1) = sample();
		data.toggle_expand(&a).unwrap();
		let scene = build(&data, &Session::new());
		assert!(scene.nodes.iter().all(|n| n.id != a1));
		assert_eq!(scene.edges.len(), 1);
		let toggle = scene.nodes.iter().find(|n| n.id == a).unwrap().toggle.clone();
		assert!(!toggle.unwrap().expanded);
	}

	#[test]
	fn coincident_nodes_draw_no_edge() {
		let metrics = MetricsConfig::default();
		let mut data = MindMapData::with_root("Root", "#000", 0.0, 0.0, &metrics);
		let child = data.add_child("root", None, "Root", "#000", &metrics).unwrap();
		let center = data.root().unwrap().center();
		let node = data.node_mut(&child).unwrap();
		node.x = center.x - node.width / 2.0;
		node.y = center.y - node.height / 2.0;
		assert!(build(&data, &Session::new()).edges.is_empty());
	}

	#[test]
	fn only_selected_node_gets_add_button() {
		let (data, a, _) = sample();
		let mut session = Session::new();
		session.selected_node_id = Some(a.clone());
		let scene = build(&data, &session);
		for node in &scene.nodes {
			assert_eq!(node.add_button.is_some(), node.id == a);
			assert_eq!(node.selected, node.id == a);
		}
		let selected = scene.nodes.iter().find(|n| n.id == a).unwrap();
		assert_eq!(selected.stroke, Theme::default().selected_node_border);
	}

	#[test]
	fn label_lines_are_centred_on_the_node() {
		let metrics = MetricsConfig::default();
		let mut data = MindMapData::with_root("Root", "#000", 0.0, 0.0, &metrics);
		data.update_text("root", "first line\nsecond line", &metrics).unwrap();
		let scene = build(&data, &Session::new());
		let node = &scene.nodes[0];
		let ys: Vec<f64> = node.line_positions().map(|(p, _)| p.y).collect();
		assert_eq!(ys.len(), 2);
		assert!(((ys[0] + ys[1]) / 2.0 - node.rect.center().y).abs() < 1e-9);
	}
}
