use serde::{Deserialize, Serialize};

/// Half-plane of the map a subtree occupies, relative to the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
	/// Subtree grows towards negative x.
	Left,
	/// Subtree grows towards positive x.
	Right,
}

impl Side {
	/// `-1.0` for left, `1.0` for right.
	pub fn sign(self) -> f64 {
		match self {
			Side::Left => -1.0,
			Side::Right => 1.0,
		}
	}

	/// Direction (radians) pointing away from the root on this side.
	pub fn angle(self) -> f64 {
		match self {
			Side::Left => std::f64::consts::PI,
			Side::Right => 0.0,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

/// Axis-aligned rectangle, origin at the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	pub fn right(&self) -> f64 {
		self.x + self.width
	}

	pub fn bottom(&self) -> f64 {
		self.y + self.height
	}

	pub fn center(&self) -> Point {
		Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}

	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
	}

	pub fn union(&self, other: &Rect) -> Rect {
		let (x, y) = (self.x.min(other.x), self.y.min(other.y));
		Rect::new(
			x,
			y,
			self.right().max(other.right()) - x,
			self.bottom().max(other.bottom()) - y,
		)
	}

	pub fn inflate(&self, by: f64) -> Rect {
		Rect::new(
			self.x - by,
			self.y - by,
			self.width + 2.0 * by,
			self.height + 2.0 * by,
		)
	}
}

/// A single idea on the map.
///
/// `x`/`y` are the world-space top-left corner; `width`/`height` are derived
/// from `text` by [`crate::engine::metrics`] and never edited directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	pub id: String,
	pub text: String,
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
	pub color: String,
	pub level: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent_id: Option<String>,
	#[serde(default = "expanded_by_default")]
	pub is_expanded: bool,
	#[serde(default)]
	pub children: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub side: Option<Side>,
}

fn expanded_by_default() -> bool {
	true
}

impl Node {
	pub fn rect(&self) -> Rect {
		Rect::new(self.x, self.y, self.width, self.height)
	}

	pub fn center(&self) -> Point {
		self.rect().center()
	}

	pub fn is_root(&self) -> bool {
		self.parent_id.is_none()
	}

	pub fn has_children(&self) -> bool {
		!self.children.is_empty()
	}
}

/// The drawn edge for a parent→child link. Always derived from the tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
	pub id: String,
	pub from_node_id: String,
	pub to_node_id: String,
	pub color: String,
	pub width: f64,
}

/// The persisted graph handed to and received from the host.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapData {
	pub nodes: Vec<Node>,
	pub connections: Vec<Connection>,
	pub root_node_id: String,
}
