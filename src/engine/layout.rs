//! Node placement.
//!
//! Two tiers: [`auto_organize`] rebuilds every position from the tree
//! (deterministic, left/right symmetric around the root), while
//! [`place_new_child`] positions a single fresh node without touching the
//! rest. [`resolve_collisions`] relaxes whatever either of them, or a drag,
//! left too close together. It is best-effort: the iteration cap bounds the
//! work, not the residual overlap.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use log::debug;

use super::config::{CollisionConfig, LayoutConfig};
use super::error::MindMapError;
use super::types::{MindMapData, Point, Side};

const EPSILON: f64 = 1e-6;
const GOLDEN_ANGLE: f64 = PI * (3.0 - 2.236_067_977_499_79);

struct Shape {
	width: f64,
	height: f64,
	children: Vec<String>,
}

/// Positions computed for one pass, applied in bulk afterwards.
struct Placement<'a> {
	shapes: &'a HashMap<String, Shape>,
	config: &'a LayoutConfig,
	extents: HashMap<String, f64>,
	placed: HashMap<String, (Point, Side)>,
}

impl Placement<'_> {
	fn spacing(&self, level: u32) -> (f64, f64) {
		let decay = self.config.level_decay.powi(level.saturating_sub(1) as i32);
		(
			self.config.horizontal_gap * decay,
			(self.config.vertical_spacing * decay).max(self.config.min_vertical_spacing),
		)
	}

	/// Vertical room a subtree needs: its own height or its stacked children.
	fn extent(&mut self, id: &str, level: u32, visiting: &mut HashSet<String>) -> f64 {
		if let Some(&e) = self.extents.get(id) {
			return e;
		}
		let Some(shape) = self.shapes.get(id) else {
			return 0.0;
		};
		if !visiting.insert(id.to_string()) {
			return shape.height;
		}
		let children = shape.children.clone();
		let own = shape.height;
		let block = self.block(&children, level + 1, visiting).1;
		let extent = own.max(block);
		self.extents.insert(id.to_string(), extent);
		extent
	}

	/// `(step, span)` for a run of siblings stacked at `level`.
	fn block(&mut self, ids: &[String], level: u32, visiting: &mut HashSet<String>) -> (f64, f64) {
		if ids.is_empty() {
			return (0.0, 0.0);
		}
		let widest = ids
			.iter()
			.map(|c| self.extent(c, level, visiting))
			.fold(0.0, f64::max);
		let (_, spacing) = self.spacing(level);
		let step = spacing.max(widest + self.config.sibling_gap);
		(step, step * (ids.len() - 1) as f64 + widest)
	}

	/// Stacks `ids` beside the parent box, centred on the parent's centre line.
	fn stack(
		&mut self,
		parent: (Point, f64, f64),
		ids: &[String],
		level: u32,
		side: Side,
		visiting: &mut HashSet<String>,
	) {
		let (origin, parent_width, parent_height) = parent;
		let (gap, _) = self.spacing(level);
		let (step, _) = self.block(ids, level, visiting);
		let center_y = origin.y + parent_height / 2.0;
		let middle = (ids.len() as f64 - 1.0) / 2.0;

		for (i, id) in ids.iter().enumerate() {
			let Some(shape) = self.shapes.get(id) else { continue };
			let (width, height) = (shape.width, shape.height);
			let children = shape.children.clone();
			let x = match side {
				Side::Right => origin.x + parent_width + gap,
				Side::Left => origin.x - gap - width,
			};
			let y = center_y + (i as f64 - middle) * step - height / 2.0;
			let at = Point::new(x, y);
			if self.placed.insert(id.clone(), (at, side)).is_some() {
				continue;
			}
			self.stack((at, width, height), &children, level + 1, side, visiting);
		}
	}
}

/// Rebuilds every position: root at the anchor, level-1 nodes split into a
/// left and a right column, each subtree stacked evenly outward.
pub fn auto_organize(data: &mut MindMapData, config: &LayoutConfig) -> Result<(), MindMapError> {
	let root = data
		.root()
		.ok_or_else(|| MindMapError::InvalidGraph("no root to organize around".into()))?;
	let root_center_x = config.root_anchor.x + root.width / 2.0;

	let mut left = Vec::new();
	let mut right = Vec::new();
	for child in data.children_of(&data.root_node_id) {
		let side = child.side.unwrap_or(if child.center().x < root_center_x {
			Side::Left
		} else {
			Side::Right
		});
		match side {
			Side::Left => left.push(child.id.clone()),
			Side::Right => right.push(child.id.clone()),
		}
	}

	let shapes: HashMap<String, Shape> = data
		.nodes
		.iter()
		.map(|n| {
			(
				n.id.clone(),
				Shape {
					width: n.width,
					height: n.height,
					children: n.children.clone(),
				},
			)
		})
		.collect();
	let root_box = (config.root_anchor, root.width, root.height);

	let mut placement = Placement {
		shapes: &shapes,
		config,
		extents: HashMap::new(),
		placed: HashMap::new(),
	};
	let mut visiting = HashSet::from([data.root_node_id.clone()]);
	placement.stack(root_box, &right, 1, Side::Right, &mut visiting);
	placement.stack(root_box, &left, 1, Side::Left, &mut visiting);
	let placed = placement.placed;

	for node in &mut data.nodes {
		if node.is_root() {
			node.x = config.root_anchor.x;
			node.y = config.root_anchor.y;
			node.side = None;
		} else if let Some((at, side)) = placed.get(&node.id) {
			node.x = at.x;
			node.y = at.y;
			node.side = Some(*side);
		}
	}
	debug!(
		"auto-organized {} node(s): {} left, {} right",
		placed.len(),
		left.len(),
		right.len()
	);
	Ok(())
}

/// Positions a freshly added node relative to its parent.
///
/// The first child points straight away from the root; later siblings fan
/// out alternately above and below that direction, within
/// `max_fan_spread`, a little further out the deeper they are.
pub fn place_new_child(
	data: &mut MindMapData,
	child_id: &str,
	config: &LayoutConfig,
) -> Result<Point, MindMapError> {
	let child = data
		.node(child_id)
		.ok_or_else(|| MindMapError::unknown_node(child_id))?;
	let parent_id = child.parent_id.clone().ok_or_else(|| {
		MindMapError::InvalidOperation("the root is placed by auto-organize only".into())
	})?;
	let parent = data
		.node(&parent_id)
		.ok_or_else(|| MindMapError::unknown_node(&parent_id))?;
	let root = data
		.root()
		.ok_or_else(|| MindMapError::InvalidGraph("missing root".into()))?;

	let side = child.side.unwrap_or(Side::Right);
	let parent_center = parent.center();
	let away = Point::new(
		parent_center.x - root.center().x,
		parent_center.y - root.center().y,
	);
	let base_angle = if parent.is_root() || away.x.hypot(away.y) < EPSILON {
		side.angle()
	} else {
		away.y.atan2(away.x)
	};

	// siblings on the other side of the root fan out on their own
	let index = parent
		.children
		.iter()
		.filter(|c| data.node(c).and_then(|n| n.side).unwrap_or(Side::Right) == side)
		.position(|c| c == child_id)
		.unwrap_or(0);
	let angle = base_angle + fan_offset(index, config);
	let distance = config.placement_distance + config.placement_growth * child.level.saturating_sub(1) as f64;

	let center = Point::new(
		parent_center.x + distance * angle.cos(),
		parent_center.y + distance * angle.sin(),
	);
	let (width, height) = (child.width, child.height);
	let origin = Point::new(center.x - width / 2.0, center.y - height / 2.0);

	if let Some(child) = data.node_mut(child_id) {
		child.x = origin.x;
		child.y = origin.y;
	}
	Ok(origin)
}

fn fan_offset(index: usize, config: &LayoutConfig) -> f64 {
	if index == 0 {
		return 0.0;
	}
	let ring = index.div_ceil(2) as f64;
	let direction = if index % 2 == 1 { 1.0 } else { -1.0 };
	(direction * ring * config.fan_step).clamp(-config.max_fan_spread, config.max_fan_spread)
}

/// Outcome of a [`resolve_collisions`] pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionReport {
	pub iterations: usize,
	/// Pairs still closer than the threshold when the pass stopped.
	pub remaining: usize,
}

impl CollisionReport {
	pub fn resolved(&self) -> bool {
		self.remaining == 0
	}
}

/// Pushes apart every pair of nodes whose centres are closer than
/// `min_distance`, sharing the displacement between both (or giving it all
/// to the free node when the other is the pinned root). Stops early once no
/// pair violates the threshold.
pub fn resolve_collisions(data: &mut MindMapData, config: &CollisionConfig) -> CollisionReport {
	let count = data.nodes.len();
	let mut centers: Vec<Point> = data.nodes.iter().map(|n| n.center()).collect();
	let pinned: Vec<bool> = data
		.nodes
		.iter()
		.map(|n| config.pin_root && n.is_root())
		.collect();

	let mut moved = vec![Point::default(); count];
	let mut iterations = 0;
	let mut remaining = count_violations(&centers, config.min_distance);
	while remaining > 0 && iterations < config.max_iterations {
		iterations += 1;
		let mut shift = vec![Point::default(); count];
		for i in 0..count {
			for j in (i + 1)..count {
				let (dx, dy) = (centers[j].x - centers[i].x, centers[j].y - centers[i].y);
				let distance = dx.hypot(dy);
				if distance >= config.min_distance - EPSILON {
					continue;
				}
				let (ux, uy, push) = if distance > EPSILON {
					(
						dx / distance,
						dy / distance,
						(config.min_distance - distance) * config.stiffness,
					)
				} else {
					// coincident centres: no direction to repel along
					let angle = (i * count + j) as f64 * GOLDEN_ANGLE;
					(angle.cos(), angle.sin(), config.nudge)
				};
				let (share_i, share_j) = match (pinned[i], pinned[j]) {
					(true, true) => (0.0, 0.0),
					(true, false) => (0.0, push),
					(false, true) => (push, 0.0),
					(false, false) => (push / 2.0, push / 2.0),
				};
				shift[i].x -= ux * share_i;
				shift[i].y -= uy * share_i;
				shift[j].x += ux * share_j;
				shift[j].y += uy * share_j;
			}
		}
		for ((center, total), delta) in centers.iter_mut().zip(moved.iter_mut()).zip(&shift) {
			center.x += delta.x;
			center.y += delta.y;
			total.x += delta.x;
			total.y += delta.y;
		}
		remaining = count_violations(&centers, config.min_distance);
	}

	for (node, total) in data.nodes.iter_mut().zip(&moved) {
		node.x += total.x;
		node.y += total.y;
	}
	if remaining > 0 {
		debug!("collision pass stopped after {iterations} iteration(s) with {remaining} pair(s) left");
	}
	CollisionReport {
		iterations,
		remaining,
	}
}

fn count_violations(centers: &[Point], min_distance: f64) -> usize {
	let mut count = 0;
	for (i, a) in centers.iter().enumerate() {
		for b in &centers[i + 1..] {
			if a.distance(*b) < min_distance - EPSILON {
				count += 1;
			}
		}
	}
	count
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::config::MetricsConfig;

	fn base() -> MindMapData {
		MindMapData::with_root("Root", "#000", 400.0, 300.0, &MetricsConfig::default())
	}

	fn add(data: &mut MindMapData, parent: &str, side: Option<Side>) -> String {
		data.add_child(parent, side, "child", "#fff", &MetricsConfig::default())
			.unwrap()
	}

	#[test]
	fn organize_stacks_right_children_symmetrically() {
		let mut data = base();
		let ids: Vec<String> = (0..3).map(|_| add(&mut data, "root", Some(Side::Right))).collect();
		auto_organize(&mut data, &LayoutConfig::default()).unwrap();

		let root = data.root().unwrap().clone();
		let centers: Vec<Point> = ids.iter().map(|id| data.node(id).unwrap().center()).collect();
		assert!(centers.iter().all(|c| c.x > root.center().x));
		assert!(centers.windows(2).all(|w| w[0].y < w[1].y));
		let gaps: Vec<f64> = centers.windows(2).map(|w| w[1].y - w[0].y).collect();
		assert!((gaps[0] - gaps[1]).abs() < 1e-9);
		assert!((centers[0].y + centers[2].y - 2.0 * root.center().y).abs() < 1e-9);
		assert!((centers[1].y - root.center().y).abs() < 1e-9);
	}

	#[test]
	fn organize_places_left_side_mirrored() {
		let mut data = base();
		let l = add(&mut data, "root", Some(Side::Left));
		let r = add(&mut data, "root", Some(Side::Right));
		auto_organize(&mut data, &LayoutConfig::default()).unwrap();
		let root = data.root().unwrap();
		let (left, right) = (data.node(&l).unwrap(), data.node(&r).unwrap());
		assert!(left.x + left.width < root.x);
		assert!(right.x > root.x + root.width);
		assert_eq!(root.x - (left.x + left.width), right.x - (root.x + root.width));
	}

	#[test]
	fn organize_assigns_sides_to_every_descendant() {
		let mut data = base();
		let a = add(&mut data, "root", Some(Side::Left));
		let a1 = add(&mut data, &a, None);
		let a11 = add(&mut data, &a1, None);
		for id in [&a, &a1, &a11] {
			data.node_mut(id).unwrap().side = None;
		}
		data.node_mut(&a).unwrap().x = 0.0;
		auto_organize(&mut data, &LayoutConfig::default()).unwrap();
		for id in [&a, &a1, &a11] {
			assert_eq!(data.node(id).unwrap().side, Some(Side::Left));
		}
		assert_eq!(data.root().unwrap().side, None);
		assert!(data.node(&a11).unwrap().x < data.node(&a1).unwrap().x);
	}

	#[test]
	fn organize_is_idempotent() {
		let mut data = base();
		let a = add(&mut data, "root", None);
		let b = add(&mut data, "root", None);
		add(&mut data, &a, None);
		add(&mut data, &a, None);
		add(&mut data, &b, None);
		let config = LayoutConfig::default();
		auto_organize(&mut data, &config).unwrap();
		let first = data.clone();
		auto_organize(&mut data, &config).unwrap();
		assert_eq!(first, data);
	}

	#[test]
	fn organize_keeps_sibling_subtrees_apart() {
		let mut data = base();
		let a = add(&mut data, "root", Some(Side::Right));
		let b = add(&mut data, "root", Some(Side::Right));
		for _ in 0..4 {
			add(&mut data, &a, None);
			add(&mut data, &b, None);
		}
		auto_organize(&mut data, &LayoutConfig::default()).unwrap();
		let lowest_a = data
			.children_of(&a)
			.iter()
			.map(|n| n.y + n.height)
			.fold(f64::MIN, f64::max);
		let highest_b = data
			.children_of(&b)
			.iter()
			.map(|n| n.y)
			.fold(f64::MAX, f64::min);
		assert!(lowest_a <= highest_b);
	}

	#[test]
	fn first_child_points_away_from_root() {
		let mut data = base();
		let child = add(&mut data, "root", Some(Side::Right));
		place_new_child(&mut data, &child, &LayoutConfig::default()).unwrap();
		let (root, node) = (data.root().unwrap(), data.node(&child).unwrap());
		assert!(node.x > root.x);
		assert!((node.center().y - root.center().y).abs() < 1e-9);

		let left = add(&mut data, "root", Some(Side::Left));
		place_new_child(&mut data, &left, &LayoutConfig::default()).unwrap();
		assert!(data.node(&left).unwrap().center().x < root_center_x(&data));
	}

	#[test]
	fn first_left_child_ignores_right_siblings() {
		let mut data = base();
		let config = LayoutConfig::default();
		let right = add(&mut data, "root", Some(Side::Right));
		place_new_child(&mut data, &right, &config).unwrap();
		let left = add(&mut data, "root", Some(Side::Left));
		place_new_child(&mut data, &left, &config).unwrap();

		let (root, node) = (data.root().unwrap().center(), data.node(&left).unwrap().center());
		assert!(node.x < root.x);
		assert!((node.y - root.y).abs() < 1e-9);
	}

	fn root_center_x(data: &MindMapData) -> f64 {
		data.root().unwrap().center().x
	}

	#[test]
	fn later_siblings_fan_out_within_bounds() {
		let config = LayoutConfig::default();
		assert_eq!(fan_offset(0, &config), 0.0);
		assert!(fan_offset(1, &config) > 0.0);
		assert!(fan_offset(2, &config) < 0.0);
		assert_eq!(fan_offset(1, &config), -fan_offset(2, &config));
		assert_eq!(fan_offset(40, &config), -config.max_fan_spread);
	}

	#[test]
	fn deeper_children_land_further_out() {
		let mut data = base();
		let config = LayoutConfig::default();
		let a = add(&mut data, "root", Some(Side::Right));
		place_new_child(&mut data, &a, &config).unwrap();
		let a1 = add(&mut data, &a, None);
		place_new_child(&mut data, &a1, &config).unwrap();
		let (pa, pa1) = (data.node(&a).unwrap().center(), data.node(&a1).unwrap().center());
		let root = data.root().unwrap().center();
		assert!(pa.distance(pa1) > root.distance(pa));
		assert!(pa1.x > pa.x);
	}

	#[test]
	fn collisions_push_overlapping_siblings_apart() {
		let mut data = base();
		let a = add(&mut data, "root", Some(Side::Right));
		let b = add(&mut data, "root", Some(Side::Right));
		for (id, y) in [(&a, 500.0), (&b, 510.0)] {
			let node = data.node_mut(id).unwrap();
			node.x = 800.0;
			node.y = y;
		}
		let config = CollisionConfig::default();
		let report = resolve_collisions(&mut data, &config);
		assert!(report.resolved());
		let d = data.node(&a).unwrap().center().distance(data.node(&b).unwrap().center());
		assert!(d >= config.min_distance - 1e-6);
	}

	#[test]
	fn coincident_nodes_get_nudged_apart() {
		let mut data = base();
		let a = add(&mut data, "root", None);
		let b = add(&mut data, "root", None);
		for id in [&a, &b] {
			let node = data.node_mut(id).unwrap();
			node.x = 900.0;
			node.y = 900.0;
		}
		let report = resolve_collisions(&mut data, &CollisionConfig::default());
		assert!(report.resolved());
		let (na, nb) = (data.node(&a).unwrap(), data.node(&b).unwrap());
		assert!(na.x.is_finite() && nb.y.is_finite());
		assert!(na.center().distance(nb.center()) > 0.0);
	}

	#[test]
	fn pinned_root_never_moves() {
		let mut data = base();
		let a = add(&mut data, "root", None);
		{
			let root_center = data.root().unwrap().center();
			let node = data.node_mut(&a).unwrap();
			node.x = root_center.x - node.width / 2.0 + 5.0;
			node.y = root_center.y - node.height / 2.0;
		}
		let before = data.root().unwrap().clone();
		resolve_collisions(&mut data, &CollisionConfig::default());
		assert_eq!(data.root().unwrap(), &before);
	}

	#[test]
	fn iteration_cap_reports_leftovers() {
		let mut data = base();
		let ids: Vec<String> = (0..6).map(|_| add(&mut data, "root", None)).collect();
		for id in &ids {
			let node = data.node_mut(id).unwrap();
			node.x = 2000.0;
			node.y = 2000.0;
		}
		let config = CollisionConfig {
			max_iterations: 1,
			min_distance: 500.0,
			..CollisionConfig::default()
		};
		let report = resolve_collisions(&mut data, &config);
		assert_eq!(report.iterations, 1);
		assert!(!report.resolved());
	}

	#[test]
	fn spread_out_graph_is_untouched() {
		let mut data = base();
		let a = add(&mut data, "root", Some(Side::Right));
		auto_organize(&mut data, &LayoutConfig::default()).unwrap();
		let before = data.clone();
		let report = resolve_collisions(&mut data, &CollisionConfig::default());
		assert_eq!(report.iterations, 0);
		assert_eq!(data.node(&a), before.node(&a));
	}
}
