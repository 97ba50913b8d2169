//! Overview of the whole map with the current viewport window on top.

use super::config::MinimapConfig;
use super::types::{MindMapData, Point, Rect, Size};
use super::viewport::Viewport;

/// World area shown when the map has no nodes at all.
const EMPTY_BOUNDS: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

/// Mapping between world space and mini-map pixels, derived from the
/// current node bounds every time it is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MiniMap {
	pub bounds: Rect,
	pub scale: f64,
	pub size: Size,
}

impl MiniMap {
	pub fn new(data: &MindMapData, config: &MinimapConfig) -> Self {
		let bounds = MindMapData::bounds(&data.nodes)
			.map(|b| b.inflate(config.padding))
			.unwrap_or(EMPTY_BOUNDS);
		let scale = (config.width / bounds.width.max(1.0))
			.min(config.height / bounds.height.max(1.0))
			.min(config.max_scale);
		Self {
			bounds,
			scale,
			size: Size {
				width: config.width,
				height: config.height,
			},
		}
	}

	pub fn to_mini(&self, world: Point) -> Point {
		Point::new(
			(world.x - self.bounds.x) * self.scale,
			(world.y - self.bounds.y) * self.scale,
		)
	}

	pub fn from_mini(&self, mini: Point) -> Point {
		Point::new(
			mini.x / self.scale + self.bounds.x,
			mini.y / self.scale + self.bounds.y,
		)
	}

	fn rect_to_mini(&self, r: Rect) -> Rect {
		let origin = self.to_mini(Point::new(r.x, r.y));
		Rect::new(origin.x, origin.y, r.width * self.scale, r.height * self.scale)
	}

	/// Everything the mini-map draws, in mini-map pixels.
	pub fn frame(&self, data: &MindMapData, viewport: &Viewport, min_node_size: f64) -> MiniMapFrame {
		let nodes = data
			.nodes
			.iter()
			.map(|node| {
				let mut r = self.rect_to_mini(node.rect());
				r.width = r.width.max(min_node_size);
				r.height = r.height.max(min_node_size);
				MiniNode {
					rect: r,
					color: node.color.clone(),
				}
			})
			.collect();
		let links = data
			.connections
			.iter()
			.filter_map(|c| {
				let from = data.node(&c.from_node_id)?;
				let to = data.node(&c.to_node_id)?;
				Some((self.to_mini(from.center()), self.to_mini(to.center())))
			})
			.collect();
		MiniMapFrame {
			size: self.size,
			nodes,
			links,
			window: self.rect_to_mini(viewport.visible_world_rect()),
		}
	}

	/// Re-centres `viewport` on the world point under a mini-map click,
	/// leaving zoom alone.
	pub fn navigate(&self, viewport: &mut Viewport, mini: Point) {
		viewport.center_on(self.from_mini(mini));
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct MiniNode {
	pub rect: Rect,
	pub color: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MiniMapFrame {
	pub size: Size,
	pub nodes: Vec<MiniNode>,
	pub links: Vec<(Point, Point)>,
	/// Current viewport window. May extend past the mini-map edges; the
	/// backend clips it.
	pub window: Rect,
}
