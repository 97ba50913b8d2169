//! Tree-derived relationships and structural edits on [`MindMapData`].
//!
//! Every edit checks its preconditions before touching the graph, so a
//! rejected call leaves the data exactly as it was.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use super::config::MetricsConfig;
use super::error::MindMapError;
use super::metrics;
use super::types::{Connection, MindMapData, Node, Rect, Side};

pub const CONNECTION_COLOR: &str = "#666666";
pub const CONNECTION_WIDTH: f64 = 2.0;

impl MindMapData {
	/// A map holding only a root node with its top-left corner at `(x, y)`.
	pub fn with_root(
		text: &str,
		color: &str,
		x: f64,
		y: f64,
		metrics_config: &MetricsConfig,
	) -> Self {
		let size = metrics::node_size(text, 0, metrics_config);
		let root = Node {
			id: "root".into(),
			text: text.into(),
			x,
			y,
			width: size.width,
			height: size.height,
			color: color.into(),
			level: 0,
			parent_id: None,
			is_expanded: true,
			children: Vec::new(),
			side: None,
		};
		MindMapData {
			root_node_id: root.id.clone(),
			nodes: vec![root],
			connections: Vec::new(),
		}
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	pub fn root(&self) -> Option<&Node> {
		self.node(&self.root_node_id)
	}

	fn require(&self, id: &str) -> Result<&Node, MindMapError> {
		self.node(id).ok_or_else(|| MindMapError::unknown_node(id))
	}

	/// Depth of `id` below the root, walking `parent_id` links.
	pub fn level_of(&self, id: &str) -> Result<u32, MindMapError> {
		let mut current = self.require(id)?;
		let mut level = 0u32;
		while let Some(parent_id) = &current.parent_id {
			level += 1;
			if level as usize > self.nodes.len() {
				return Err(MindMapError::Cycle {
					node_id: id.to_string(),
				});
			}
			current = self.node(parent_id).ok_or_else(|| {
				MindMapError::InvalidGraph(format!(
					"node `{}` points at missing parent `{parent_id}`",
					current.id
				))
			})?;
		}
		Ok(level)
	}

	/// Nodes sharing `id`'s parent, in the parent's display order.
	pub fn siblings_of(&self, id: &str) -> Vec<&Node> {
		let Some(parent_id) = self.node(id).and_then(|n| n.parent_id.as_deref()) else {
			return Vec::new();
		};
		self.children_of(parent_id)
			.into_iter()
			.filter(|n| n.id != id)
			.collect()
	}

	pub fn children_of(&self, id: &str) -> Vec<&Node> {
		self.node(id)
			.map(|n| n.children.iter().filter_map(|c| self.node(c)).collect())
			.unwrap_or_default()
	}

	/// All descendants of `id` in pre-order, excluding `id` itself.
	pub fn descendants_of(&self, id: &str) -> Vec<String> {
		let mut out = Vec::new();
		let mut stack: Vec<&str> = match self.node(id) {
			Some(n) => n.children.iter().rev().map(String::as_str).collect(),
			None => return out,
		};
		let mut seen = HashSet::new();
		while let Some(next) = stack.pop() {
			if !seen.insert(next) {
				continue;
			}
			out.push(next.to_string());
			if let Some(n) = self.node(next) {
				stack.extend(n.children.iter().rev().map(String::as_str));
			}
		}
		out
	}

	/// Ids of nodes whose ancestors are all expanded. These are the only
	/// nodes that get drawn or hit-tested.
	pub fn visible_ids(&self) -> HashSet<String> {
		let mut visible = HashSet::new();
		let mut queue = VecDeque::from([self.root_node_id.as_str()]);
		while let Some(id) = queue.pop_front() {
			let Some(node) = self.node(id) else { continue };
			if !visible.insert(node.id.clone()) {
				continue;
			}
			if node.is_expanded {
				queue.extend(node.children.iter().map(String::as_str));
			}
		}
		visible
	}

	pub fn visible_nodes(&self) -> Vec<&Node> {
		let visible = self.visible_ids();
		self.nodes
			.iter()
			.filter(|n| visible.contains(&n.id))
			.collect()
	}

	pub fn is_visible(&self, id: &str) -> bool {
		let mut current = self.node(id);
		let mut steps = 0;
		while let Some(node) = current {
			let Some(parent_id) = &node.parent_id else {
				return true;
			};
			let parent = self.node(parent_id);
			if parent.is_some_and(|p| !p.is_expanded) || steps > self.nodes.len() {
				return false;
			}
			current = parent;
			steps += 1;
		}
		false
	}

	/// Bounding box of the given nodes, `None` when the iterator is empty.
	pub fn bounds<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Option<Rect> {
		nodes
			.into_iter()
			.map(Node::rect)
			.reduce(|acc, r| acc.union(&r))
	}

	/// Side a new child of `parent_id` belongs to.
	///
	/// Children of the root take `requested`, or whichever side has fewer
	/// nodes. Deeper nodes inherit their parent's side; a parent with no side
	/// yet falls back to its position relative to the root.
	pub fn side_for_child(&self, parent_id: &str, requested: Option<Side>) -> Result<Side, MindMapError> {
		let parent = self.require(parent_id)?;
		if parent.is_root() {
			if let Some(side) = requested {
				return Ok(side);
			}
			let (mut left, mut right) = (0usize, 0usize);
			for child in self.children_of(parent_id) {
				match self.side_by_position(child) {
					Side::Left => left += 1,
					Side::Right => right += 1,
				}
			}
			return Ok(if right <= left { Side::Right } else { Side::Left });
		}
		Ok(parent.side.unwrap_or_else(|| self.side_by_position(parent)))
	}

	pub(crate) fn side_by_position(&self, node: &Node) -> Side {
		if let Some(side) = node.side {
			return side;
		}
		match self.root() {
			Some(root) if node.center().x < root.center().x => Side::Left,
			_ => Side::Right,
		}
	}

	fn fresh_id(&self, prefix: &str, taken: impl Fn(&str) -> bool) -> String {
		let mut n = self.nodes.len() + self.connections.len() + 1;
		loop {
			let candidate = format!("{prefix}-{n}");
			if !taken(&candidate) {
				return candidate;
			}
			n += 1;
		}
	}

	/// Appends a new child under `parent_id` and its connection.
	///
	/// The child starts on top of its parent; callers position it afterwards
	/// (see [`crate::engine::layout::place_new_child`]).
	pub fn add_child(
		&mut self,
		parent_id: &str,
		side: Option<Side>,
		text: &str,
		color: &str,
		metrics_config: &MetricsConfig,
	) -> Result<String, MindMapError> {
		let parent = self.require(parent_id)?;
		let level = self.level_of(parent_id)? + 1;
		let side = self.side_for_child(parent_id, side)?;
		let size = metrics::node_size(text, level, metrics_config);
		let (px, py) = (parent.x, parent.y);

		let id = self.fresh_id("node", |c| self.node(c).is_some());
		let connection_id = self.fresh_id("conn", |c| self.connections.iter().any(|x| x.id == c));

		self.nodes.push(Node {
			id: id.clone(),
			text: text.into(),
			x: px,
			y: py,
			width: size.width,
			height: size.height,
			color: color.into(),
			level,
			parent_id: Some(parent_id.into()),
			is_expanded: true,
			children: Vec::new(),
			side: Some(side),
		});
		if let Some(parent) = self.node_mut(parent_id) {
			parent.children.push(id.clone());
			parent.is_expanded = true;
		}
		self.connections.push(Connection {
			id: connection_id,
			from_node_id: parent_id.into(),
			to_node_id: id.clone(),
			color: CONNECTION_COLOR.into(),
			width: CONNECTION_WIDTH,
		});
		debug!("added node {id} under {parent_id} on {side:?}");
		Ok(id)
	}

	/// Removes `id`, its whole subtree and every connection touching them.
	/// Returns the removed ids, `id` first.
	pub fn delete_node(&mut self, id: &str) -> Result<Vec<String>, MindMapError> {
		let node = self.require(id)?;
		let Some(parent_id) = node.parent_id.clone() else {
			return Err(MindMapError::InvalidOperation(
				"the root node cannot be deleted".into(),
			));
		};

		let mut removed = vec![id.to_string()];
		removed.extend(self.descendants_of(id));
		let doomed: HashSet<&str> = removed.iter().map(String::as_str).collect();

		self.nodes.retain(|n| !doomed.contains(n.id.as_str()));
		self.connections.retain(|c| {
			!doomed.contains(c.from_node_id.as_str()) && !doomed.contains(c.to_node_id.as_str())
		});
		if let Some(parent) = self.node_mut(&parent_id) {
			parent.children.retain(|c| c != id);
		}
		debug!("deleted {} node(s) starting at {id}", removed.len());
		Ok(removed)
	}

	/// Replaces the text of `id` and resizes it in place.
	pub fn update_text(
		&mut self,
		id: &str,
		text: &str,
		metrics_config: &MetricsConfig,
	) -> Result<(), MindMapError> {
		let level = self.level_of(id)?;
		let size = metrics::node_size(text, level, metrics_config);
		let node = self.node_mut(id).ok_or_else(|| MindMapError::unknown_node(id))?;
		node.text = text.into();
		node.width = size.width;
		node.height = size.height;
		Ok(())
	}

	/// Flips `is_expanded` and returns the new value.
	pub fn toggle_expand(&mut self, id: &str) -> Result<bool, MindMapError> {
		let node = self.node_mut(id).ok_or_else(|| MindMapError::unknown_node(id))?;
		node.is_expanded = !node.is_expanded;
		Ok(node.is_expanded)
	}

	/// Rewrites every `level` from the parent links, breadth-first from the root.
	pub fn recompute_levels(&mut self) {
		let mut levels: HashMap<String, u32> = HashMap::new();
		let mut queue = VecDeque::from([(self.root_node_id.clone(), 0u32)]);
		while let Some((id, level)) = queue.pop_front() {
			if levels.contains_key(&id) {
				continue;
			}
			if let Some(node) = self.node(&id) {
				queue.extend(node.children.iter().map(|c| (c.clone(), level + 1)));
			}
			levels.insert(id, level);
		}
		for node in &mut self.nodes {
			if let Some(level) = levels.get(&node.id) {
				node.level = *level;
			}
		}
	}

	/// Checks every structural invariant of a loadable graph.
	pub fn validate(&self) -> Result<(), MindMapError> {
		let invalid = |msg: String| Err(MindMapError::InvalidGraph(msg));

		let mut ids = HashSet::new();
		for node in &self.nodes {
			if !ids.insert(node.id.as_str()) {
				return invalid(format!("duplicate node id `{}`", node.id));
			}
		}

		let Some(root) = self.root() else {
			return invalid(format!("root `{}` does not exist", self.root_node_id));
		};
		if root.parent_id.is_some() {
			return invalid(format!("root `{}` has a parent", root.id));
		}
		if root.side.is_some() {
			return invalid("the root must not carry a side".into());
		}
		if let Some(extra) = self.nodes.iter().find(|n| n.is_root() && n.id != root.id) {
			return invalid(format!("second parentless node `{}`", extra.id));
		}

		for node in &self.nodes {
			if let Some(parent_id) = &node.parent_id {
				let Some(parent) = self.node(parent_id) else {
					return invalid(format!(
						"node `{}` points at missing parent `{parent_id}`",
						node.id
					));
				};
				if parent.children.iter().filter(|c| *c == &node.id).count() != 1 {
					return invalid(format!(
						"parent `{parent_id}` does not list `{}` exactly once",
						node.id
					));
				}
			}
			for child_id in &node.children {
				if self.node(child_id).and_then(|c| c.parent_id.as_deref()) != Some(&node.id) {
					return invalid(format!(
						"`{}` lists `{child_id}` as a child but it is not its parent",
						node.id
					));
				}
			}
		}

		let reachable = self.descendants_of(&root.id).len() + 1;
		if reachable != self.nodes.len() {
			return invalid(format!(
				"{} node(s) are unreachable from the root (cycle or detached subtree)",
				self.nodes.len() - reachable.min(self.nodes.len())
			));
		}

		let mut incoming: HashMap<&str, usize> = HashMap::new();
		for conn in &self.connections {
			let (Some(_), Some(to)) = (self.node(&conn.from_node_id), self.node(&conn.to_node_id))
			else {
				return invalid(format!("connection `{}` has a dangling endpoint", conn.id));
			};
			if to.parent_id.as_deref() != Some(conn.from_node_id.as_str()) {
				return invalid(format!(
					"connection `{}` does not follow a parent link",
					conn.id
				));
			}
			*incoming.entry(to.id.as_str()).or_default() += 1;
		}
		for node in self.nodes.iter().filter(|n| !n.is_root()) {
			if incoming.get(node.id.as_str()).copied().unwrap_or(0) != 1 {
				return invalid(format!(
					"node `{}` needs exactly one incoming connection",
					node.id
				));
			}
		}
		Ok(())
	}
}
