//! The engine facade: graph, viewport and interaction session behind one
//! small command interface.
//!
//! Hosts translate raw input into verbs (`pointer_down`, `add_child`,
//! `commit_edit`, ...) and read back a [`Scene`]. Every verb that commits a
//! change to the graph notifies the change listener exactly once; transient
//! states such as drag frames do not.

use std::fmt;

use log::{debug, info, warn};

use super::config::EngineConfig;
use super::error::MindMapError;
use super::export::{self, RasterPlan};
use super::layout::{self, CollisionReport};
use super::minimap::{MiniMap, MiniMapFrame};
use super::scene::{self, Scene};
use super::session::{DragState, EditBuffer, FormatCommand, Mode, PanState, Session};
use super::theme::Theme;
use super::types::{MindMapData, Node, Point, Side};
use super::viewport::Viewport;

/// What lies under a screen point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hit {
	Node(String),
	Toggle(String),
	AddChild(String),
}

type ChangeListener = Box<dyn FnMut(&MindMapData)>;

pub struct MindMapEngine {
	data: MindMapData,
	viewport: Viewport,
	session: Session,
	config: EngineConfig,
	theme: Theme,
	listener: Option<ChangeListener>,
}

impl fmt::Debug for MindMapEngine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MindMapEngine")
			.field("data", &self.data)
			.field("viewport", &self.viewport)
			.field("session", &self.session)
			.field("config", &self.config)
			.field("theme", &self.theme.id)
			.field("listening", &self.listener.is_some())
			.finish()
	}
}

impl MindMapEngine {
	/// Takes `data` as the authoritative state. A graph that fails
	/// validation is refused, never repaired.
	pub fn load(
		mut data: MindMapData,
		config: EngineConfig,
		width: f64,
		height: f64,
	) -> Result<Self, MindMapError> {
		config.validate()?;
		data.validate()?;
		data.recompute_levels();
		info!(
			"loaded map `{}` with {} node(s)",
			data.root_node_id,
			data.nodes.len()
		);
		Ok(Self {
			viewport: Viewport::new(&config.viewport, width, height),
			data,
			session: Session::new(),
			config,
			theme: Theme::default(),
			listener: None,
		})
	}

	/// A map with a single root at the layout anchor.
	pub fn blank(
		text: &str,
		config: EngineConfig,
		width: f64,
		height: f64,
	) -> Result<Self, MindMapError> {
		config.validate()?;
		let anchor = config.layout.root_anchor;
		let data = MindMapData::with_root(
			text,
			&config.default_node_color,
			anchor.x,
			anchor.y,
			&config.metrics,
		);
		Ok(Self {
			viewport: Viewport::new(&config.viewport, width, height),
			data,
			session: Session::new(),
			config,
			theme: Theme::default(),
			listener: None,
		})
	}

	pub fn on_change(&mut self, listener: impl FnMut(&MindMapData) + 'static) {
		self.listener = Some(Box::new(listener));
	}

	fn emit(&mut self) {
		if let Some(listener) = self.listener.as_mut() {
			listener(&self.data);
		}
	}

	pub fn data(&self) -> &MindMapData {
		&self.data
	}

	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	pub fn session(&self) -> &Session {
		&self.session
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn theme(&self) -> &Theme {
		&self.theme
	}

	pub fn mode(&self) -> Mode {
		self.session.mode()
	}

	pub fn set_theme(&mut self, theme: Theme) {
		debug!("theme set to {}", theme.id);
		self.theme = theme;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport.resize(width, height);
	}

	fn require(&self, id: &str) -> Result<&Node, MindMapError> {
		self.data.node(id).ok_or_else(|| MindMapError::unknown_node(id))
	}

	// hit-testing

	/// Topmost visible thing under `screen`. The selected node's add button
	/// wins over everything, then nodes in reverse paint order with their
	/// toggle buttons.
	pub fn hit_test(&self, screen: Point) -> Option<Hit> {
		let world = self.viewport.screen_to_world(screen);
		if !world.x.is_finite() || !world.y.is_finite() {
			return None;
		}
		let visible = self.data.visible_nodes();
		let selected = self
			.session
			.selected_node_id
			.as_deref()
			.and_then(|id| visible.iter().find(|n| n.id == id));
		if let Some(node) = selected.filter(|n| scene::add_button(n).contains(world)) {
			return Some(Hit::AddChild(node.id.clone()));
		}
		for node in visible.iter().rev() {
			if scene::toggle_button(node).is_some_and(|c| c.contains(world)) {
				return Some(Hit::Toggle(node.id.clone()));
			}
			if node.rect().contains(world) {
				return Some(Hit::Node(node.id.clone()));
			}
		}
		None
	}

	// pointer input, screen coordinates

	pub fn pointer_down(&mut self, screen: Point) -> Result<(), MindMapError> {
		let hit = self.hit_test(screen);
		if let Some(editing) = self.session.editing_node_id() {
			if hit == Some(Hit::Node(editing.to_string())) {
				return Ok(());
			}
			self.commit_current_edit()?;
		}
		match hit {
			Some(Hit::Toggle(id)) => {
				self.toggle_expand(&id)?;
			}
			Some(Hit::AddChild(id)) => {
				self.add_child(&id, None)?;
			}
			Some(Hit::Node(id)) => {
				self.select(&id)?;
				self.begin_drag(&id, self.viewport.screen_to_world(screen))?;
			}
			None => self.session.pan = Some(PanState { last: screen }),
		}
		Ok(())
	}

	/// Returns true when something moved and the surface needs a redraw.
	pub fn pointer_move(&mut self, screen: Point) -> bool {
		if self.session.drag.is_some() {
			let world = self.viewport.screen_to_world(screen);
			return self.drag_to(world);
		}
		if let Some(pan) = self.session.pan.as_mut() {
			let (dx, dy) = (screen.x - pan.last.x, screen.y - pan.last.y);
			pan.last = screen;
			self.viewport.pan_by(dx, dy);
			return true;
		}
		false
	}

	pub fn pointer_up(&mut self) -> Option<CollisionReport> {
		self.session.pan = None;
		self.commit_drag()
	}

	/// Leaving the surface ends a gesture the same way releasing does.
	pub fn pointer_leave(&mut self) -> Option<CollisionReport> {
		self.pointer_up()
	}

	pub fn double_click(&mut self, screen: Point) -> Result<(), MindMapError> {
		match self.hit_test(screen) {
			Some(Hit::Node(id)) => self.begin_edit(&id),
			_ => Ok(()),
		}
	}

	pub fn wheel(&mut self, screen: Point, delta_y: f64) -> bool {
		self.viewport
			.wheel(screen, delta_y, self.config.viewport.wheel_step)
	}

	// selection and dragging

	pub fn select(&mut self, id: &str) -> Result<(), MindMapError> {
		self.require(id)?;
		if !self.data.is_visible(id) {
			return Err(MindMapError::InvalidOperation(format!(
				"node `{id}` is inside a collapsed subtree"
			)));
		}
		self.session.selected_node_id = Some(id.to_string());
		Ok(())
	}

	pub fn deselect(&mut self) {
		self.session.selected_node_id = None;
	}

	/// Starts dragging `id`; `world` is the cursor position.
	pub fn begin_drag(&mut self, id: &str, world: Point) -> Result<(), MindMapError> {
		let node = self.require(id)?;
		self.session.drag = Some(DragState {
			node_id: id.to_string(),
			offset: Point::new(world.x - node.x, world.y - node.y),
			moved: false,
		});
		Ok(())
	}

	pub fn drag_to(&mut self, world: Point) -> bool {
		let Some(drag) = self.session.drag.as_mut() else {
			return false;
		};
		let Some(node) = self.data.nodes.iter_mut().find(|n| n.id == drag.node_id) else {
			self.session.drag = None;
			return false;
		};
		node.x = world.x - drag.offset.x;
		node.y = world.y - drag.offset.y;
		drag.moved = true;
		true
	}

	/// Ends a drag. A drag that moved the node relaxes collisions and
	/// counts as one committed change; a plain click commits nothing.
	pub fn commit_drag(&mut self) -> Option<CollisionReport> {
		let drag = self.session.drag.take()?;
		if !drag.moved {
			return None;
		}
		let report = layout::resolve_collisions(&mut self.data, &self.config.collision);
		debug!("dropped {} ({} collision iteration(s))", drag.node_id, report.iterations);
		self.emit();
		Some(report)
	}

	// text editing

	/// Opens the inline editor on `id`. Any other edit in progress is
	/// committed first, so at most one node is ever being edited.
	pub fn begin_edit(&mut self, id: &str) -> Result<(), MindMapError> {
		if self.session.editing_node_id() == Some(id) {
			return Ok(());
		}
		self.select(id)?;
		if self.session.editing.is_some() {
			self.commit_current_edit()?;
		}
		let text = self.require(id)?.text.clone();
		self.session.drag = None;
		self.session.editing = Some(EditBuffer::open(id, &text));
		Ok(())
	}

	pub fn update_edit_text(&mut self, text: &str) {
		if let Some(buffer) = self.session.editing.as_mut() {
			buffer.set_text(text);
		}
	}

	/// Applies a formatting command to the open editor. Without one it
	/// does nothing and returns false.
	pub fn apply_format(&mut self, command: FormatCommand) -> bool {
		match self.session.editing.as_mut() {
			Some(buffer) => {
				buffer.apply(command);
				true
			}
			None => false,
		}
	}

	/// Writes `text` to the node being edited and closes the editor. Blank
	/// text, or the text exactly as the editor opened with it, keeps the
	/// stored label. A resized node pushes its neighbours away; the report
	/// of that pass is returned for a committed change.
	pub fn commit_edit(&mut self, text: &str) -> Result<Option<CollisionReport>, MindMapError> {
		let Some(buffer) = self.session.editing.take() else {
			return Ok(None);
		};
		let text = text.trim_end_matches('\n');
		if text.trim().is_empty() || text == buffer.opened_text || text == buffer.original {
			return Ok(None);
		}
		self.data
			.update_text(&buffer.node_id, text, &self.config.metrics)?;
		let report = layout::resolve_collisions(&mut self.data, &self.config.collision);
		debug!(
			"relabelled {} ({} collision iteration(s))",
			buffer.node_id, report.iterations
		);
		self.emit();
		Ok(Some(report))
	}

	pub fn commit_current_edit(&mut self) -> Result<Option<CollisionReport>, MindMapError> {
		let Some(text) = self.session.editing.as_ref().map(|b| b.text.clone()) else {
			return Ok(None);
		};
		self.commit_edit(&text)
	}

	/// Drops the open editor; the node keeps its previous text.
	pub fn cancel_edit(&mut self) {
		self.session.editing = None;
	}

	// structure

	/// Adds a child under `parent_id`, places it beside its siblings and
	/// selects it.
	pub fn add_child(&mut self, parent_id: &str, side: Option<Side>) -> Result<String, MindMapError> {
		let level = self.data.level_of(parent_id)? + 1;
		let color = match &self.session.picked_color {
			Some(color) => color.clone(),
			None => self.theme.node_color(level).to_string(),
		};
		let id = self.data.add_child(
			parent_id,
			side,
			&self.config.default_node_text,
			&color,
			&self.config.metrics,
		)?;
		layout::place_new_child(&mut self.data, &id, &self.config.layout)?;
		layout::resolve_collisions(&mut self.data, &self.config.collision);
		self.session.selected_node_id = Some(id.clone());
		self.emit();
		Ok(id)
	}

	/// The selected node, unless it sits inside a collapsed subtree.
	fn visible_selection(&self) -> Option<String> {
		self.session
			.selected_node_id
			.clone()
			.filter(|id| self.data.is_visible(id))
	}

	/// `Ok(None)` when nothing visible is selected.
	pub fn add_child_to_selected(&mut self) -> Result<Option<String>, MindMapError> {
		match self.visible_selection() {
			Some(parent) => self.add_child(&parent, None).map(Some),
			None => Ok(None),
		}
	}

	pub fn delete_node(&mut self, id: &str) -> Result<Vec<String>, MindMapError> {
		let removed = self.data.delete_node(id).inspect_err(|e| warn!("{e}"))?;
		self.session.forget(&removed);
		self.emit();
		Ok(removed)
	}

	pub fn delete_selected(&mut self) -> Result<Option<Vec<String>>, MindMapError> {
		match self.visible_selection() {
			Some(id) => self.delete_node(&id).map(Some),
			None => Ok(None),
		}
	}

	/// Flips expansion. A selection or drag that ends up inside the
	/// collapsed subtree is dropped.
	pub fn toggle_expand(&mut self, id: &str) -> Result<bool, MindMapError> {
		let expanded = self.data.toggle_expand(id)?;
		if !expanded {
			if self.visible_selection().is_none() {
				self.session.selected_node_id = None;
			}
			let hidden_drag = self
				.session
				.drag
				.as_ref()
				.is_some_and(|d| !self.data.is_visible(&d.node_id));
			if hidden_drag {
				self.session.drag = None;
			}
		}
		self.emit();
		Ok(expanded)
	}

	pub fn auto_organize(&mut self) -> Result<CollisionReport, MindMapError> {
		layout::auto_organize(&mut self.data, &self.config.layout)?;
		let report = layout::resolve_collisions(&mut self.data, &self.config.collision);
		self.emit();
		Ok(report)
	}

	/// Remembers `color` for new nodes and paints the selected node with it.
	pub fn set_color(&mut self, color: &str) {
		self.session.picked_color = Some(color.to_string());
		let Some(id) = self.visible_selection() else {
			return;
		};
		if let Some(node) = self.data.node_mut(&id) {
			node.color = color.to_string();
			self.emit();
		}
	}

	/// Replaces the whole map with imported JSON. On error the current map
	/// stays as it is.
	pub fn import_json(&mut self, json: &str) -> Result<(), MindMapError> {
		let mut data = export::import_json(json)?;
		data.recompute_levels();
		self.data = data;
		self.session = Session::new();
		self.emit();
		Ok(())
	}

	// keyboard

	/// Handles a DOM `key` value. Returns true when the key was consumed.
	pub fn handle_key(&mut self, key: &str, shift: bool) -> Result<bool, MindMapError> {
		if self.session.editing.is_some() {
			return match key {
				"Enter" if !shift => self.commit_current_edit().map(|_| true),
				"Escape" => {
					self.cancel_edit();
					Ok(true)
				}
				_ => Ok(false),
			};
		}
		let Some(selected) = self.visible_selection() else {
			return Ok(false);
		};
		match key {
			"Tab" => self.add_child(&selected, None).map(|_| true),
			"Delete" | "Backspace" => self.delete_node(&selected).map(|_| true),
			"F2" | "Enter" => self.begin_edit(&selected).map(|_| true),
			" " => self.toggle_expand(&selected).map(|_| true),
			"Escape" => {
				self.deselect();
				Ok(true)
			}
			_ => Ok(false),
		}
	}

	// viewport

	pub fn set_zoom(&mut self, zoom: f64) {
		self.viewport.set_zoom(zoom);
	}

	pub fn set_pan(&mut self, pan: Point) {
		self.viewport.set_pan(pan);
	}

	pub fn zoom_in(&mut self) {
		self.viewport.zoom_by(self.config.viewport.button_step);
	}

	pub fn zoom_out(&mut self) {
		self.viewport.zoom_by(1.0 / self.config.viewport.button_step);
	}

	pub fn reset_view(&mut self) {
		self.viewport.reset();
	}

	pub fn center_on_root(&mut self) {
		if let Some(root) = self.data.root() {
			self.viewport.center_on(root.center());
		}
	}

	// mini-map

	pub fn minimap(&self) -> MiniMap {
		MiniMap::new(&self.data, &self.config.minimap)
	}

	pub fn minimap_frame(&self) -> MiniMapFrame {
		self.minimap()
			.frame(&self.data, &self.viewport, self.config.minimap.min_node_size)
	}

	/// Centres the main view on the world point under a mini-map position.
	pub fn minimap_navigate(&mut self, mini: Point) {
		let map = self.minimap();
		map.navigate(&mut self.viewport, mini);
	}

	// output

	pub fn scene(&self) -> Scene {
		Scene::build(&self.data, &self.session, &self.theme, &self.config.metrics)
	}

	pub fn export_json(&self) -> Result<String, MindMapError> {
		export::export_json(&self.data)
	}

	/// The scene as exported: selection and editing decorations left out.
	fn export_scene(&self) -> Scene {
		Scene::build(
			&self.data,
			&Session::new(),
			&self.theme,
			&self.config.metrics,
		)
	}

	pub fn export_svg(&self) -> Result<String, MindMapError> {
		let svg = export::svg_markup(&self.export_scene(), self.config.export.svg_padding)?;
		info!("exported svg ({} bytes)", svg.len());
		Ok(svg)
	}

	/// The off-screen scene and transform for a full-map raster capture.
	pub fn raster_plan(&self) -> Result<(Scene, RasterPlan), MindMapError> {
		let scene = self.export_scene();
		let plan = export::raster_plan(&scene, &self.config.export)?;
		Ok((scene, plan))
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;
	use crate::engine::config::MetricsConfig;
	use crate::engine::session::TextAlign;

	fn engine() -> MindMapEngine {
		MindMapEngine::blank("Root", EngineConfig::default(), 800.0, 600.0).unwrap()
	}

	fn counting(engine: &mut MindMapEngine) -> Rc<RefCell<usize>> {
		let count = Rc::new(RefCell::new(0));
		let inner = count.clone();
		engine.on_change(move |_| *inner.borrow_mut() += 1);
		count
	}

	fn screen_center_of(engine: &MindMapEngine, id: &str) -> Point {
		let node = engine.data().node(id).unwrap();
		engine.viewport().world_to_screen(node.center())
	}

	#[test]
	fn load_rejects_invalid_graph() {
		let mut data = engine().data().clone();
		data.root_node_id = "ghost".into();
		assert!(matches!(
			MindMapEngine::load(data, EngineConfig::default(), 800.0, 600.0),
			Err(MindMapError::InvalidGraph(_))
		));
	}

	#[test]
	fn load_and_blank_reject_inverted_zoom_range() {
		let mut config = EngineConfig::default();
		config.viewport.min_zoom = 3.0;
		config.viewport.max_zoom = 2.0;
		let data = engine().data().clone();
		assert!(matches!(
			MindMapEngine::load(data, config.clone(), 800.0, 600.0),
			Err(MindMapError::InvalidConfig(_))
		));
		assert!(matches!(
			MindMapEngine::blank("Root", config, 800.0, 600.0),
			Err(MindMapError::InvalidConfig(_))
		));
	}

	#[test]
	fn pointer_down_selects_and_drag_commits_once() {
		let mut engine = engine();
		let count = counting(&mut engine);
		let at = screen_center_of(&engine, "root");
		engine.pointer_down(at).unwrap();
		assert_eq!(engine.mode(), Mode::Dragging);
		assert!(engine.pointer_move(Point::new(at.x + 40.0, at.y + 10.0)));
		assert!(engine.pointer_move(Point::new(at.x + 50.0, at.y + 20.0)));
		assert_eq!(*count.borrow(), 0);
		assert!(engine.pointer_up().is_some());
		assert_eq!(*count.borrow(), 1);
		assert_eq!(engine.mode(), Mode::Selected);
		let root = engine.data().root().unwrap();
		assert_eq!((root.x, root.y), (450.0, 320.0));
	}

	#[test]
	fn click_without_move_commits_nothing() {
		let mut engine = engine();
		let count = counting(&mut engine);
		engine.pointer_down(screen_center_of(&engine, "root")).unwrap();
		assert!(engine.pointer_up().is_none());
		assert_eq!(*count.borrow(), 0);
		assert!(engine.session().is_selected("root"));
	}

	#[test]
	fn background_drag_pans() {
		let mut engine = engine();
		engine.pointer_down(Point::new(5.0, 5.0)).unwrap();
		assert_eq!(engine.mode(), Mode::Panning);
		engine.pointer_move(Point::new(25.0, 0.0));
		engine.pointer_up();
		assert_eq!(engine.viewport().pan, Point::new(20.0, -5.0));
		assert_eq!(engine.mode(), Mode::Idle);
	}

	#[test]
	fn add_child_selects_new_node_and_places_it_outward() {
		let mut engine = engine();
		let count = counting(&mut engine);
		let id = engine.add_child("root", Some(Side::Right)).unwrap();
		assert!(engine.session().is_selected(&id));
		let (root, child) = (engine.data().root().unwrap(), engine.data().node(&id).unwrap());
		assert!(child.x > root.x);
		assert_eq!(child.text, "New idea");
		assert_eq!(child.color, Theme::default().node_color(1));
		assert_eq!(*count.borrow(), 1);
	}

	#[test]
	fn add_button_hit_adds_child() {
		let mut engine = engine();
		engine.select("root").unwrap();
		let button = scene::add_button(engine.data().root().unwrap()).center;
		let at = engine.viewport().world_to_screen(button);
		assert_eq!(engine.hit_test(at), Some(Hit::AddChild("root".into())));
		engine.pointer_down(at).unwrap();
		assert_eq!(engine.data().nodes.len(), 2);
		assert_eq!(engine.mode(), Mode::Selected);
	}

	#[test]
	fn toggle_button_hides_descendants_from_hit_testing() {
		let mut engine = engine();
		let a = engine.add_child("root", Some(Side::Right)).unwrap();
		let a1 = engine.add_child(&a, None).unwrap();
		let a1_at = screen_center_of(&engine, &a1);
		assert_eq!(engine.hit_test(a1_at), Some(Hit::Node(a1.clone())));

		let toggle = scene::toggle_button(engine.data().node(&a).unwrap()).unwrap();
		let at = engine.viewport().world_to_screen(toggle.center);
		engine.pointer_down(at).unwrap();
		assert!(!engine.data().node(&a).unwrap().is_expanded);
		assert_ne!(engine.hit_test(a1_at), Some(Hit::Node(a1.clone())));
		assert!(engine.data().node(&a1).is_some());
		assert!(!engine.session().is_selected(&a1));
	}

	#[test]
	fn deleting_root_changes_nothing() {
		let mut engine = engine();
		engine.add_child("root", None).unwrap();
		let count = counting(&mut engine);
		let before = engine.data().clone();
		assert!(matches!(
			engine.delete_node("root"),
			Err(MindMapError::InvalidOperation(_))
		));
		assert_eq!(engine.data(), &before);
		assert_eq!(*count.borrow(), 0);
	}

	#[test]
	fn deleting_selected_clears_selection() {
		let mut engine = engine();
		let a = engine.add_child("root", None).unwrap();
		engine.begin_edit(&a).unwrap();
		engine.cancel_edit();
		let removed = engine.delete_selected().unwrap().unwrap();
		assert_eq!(removed, vec![a]);
		assert_eq!(engine.mode(), Mode::Idle);
		assert_eq!(engine.delete_selected().unwrap(), None);
	}

	#[test]
	fn edit_commit_and_cancel() {
		let mut engine = engine();
		let count = counting(&mut engine);
		engine.begin_edit("root").unwrap();
		assert_eq!(engine.mode(), Mode::Editing);
		assert!(engine.session().editing.as_ref().unwrap().all_selected);
		engine.update_edit_text("Anatomy");
		engine.handle_key("Enter", false).unwrap();
		assert_eq!(engine.data().root().unwrap().text, "Anatomy");
		assert_eq!(engine.mode(), Mode::Selected);
		assert_eq!(*count.borrow(), 1);

		engine.begin_edit("root").unwrap();
		engine.update_edit_text("Physiology");
		engine.handle_key("Escape", false).unwrap();
		assert_eq!(engine.data().root().unwrap().text, "Anatomy");
		assert_eq!(*count.borrow(), 1);
	}

	#[test]
	fn untouched_edit_keeps_bracketed_label() {
		let mut engine = engine();
		engine.begin_edit("root").unwrap();
		engine.update_edit_text("Na+ <K+> gradient");
		engine.commit_current_edit().unwrap();
		let count = counting(&mut engine);

		engine.begin_edit("root").unwrap();
		assert_eq!(engine.commit_current_edit().unwrap(), None);
		assert_eq!(engine.data().root().unwrap().text, "Na+ <K+> gradient");

		engine
			.data
			.update_text("root", "<b>Bold</b> idea", &MetricsConfig::default())
			.unwrap();
		engine.begin_edit("root").unwrap();
		assert_eq!(engine.commit_current_edit().unwrap(), None);
		assert_eq!(engine.data().root().unwrap().text, "<b>Bold</b> idea");
		assert_eq!(*count.borrow(), 0);
	}

	#[test]
	fn committed_text_relaxes_collisions() {
		let mut engine = engine();
		let a = engine.add_child("root", Some(Side::Right)).unwrap();
		let b = engine.add_child("root", Some(Side::Right)).unwrap();
		let min = engine.config().collision.min_distance;
		engine.data.node_mut(&b).unwrap().y = engine.data().node(&a).unwrap().y + 20.0;

		engine.begin_edit(&a).unwrap();
		engine.update_edit_text("A much longer label\nover two lines");
		let report = engine.commit_current_edit().unwrap().expect("text changed");

		let (na, nb) = (engine.data().node(&a).unwrap(), engine.data().node(&b).unwrap());
		let gap = na.center().distance(nb.center());
		assert!(gap >= min - 1e-6 || !report.resolved());
	}

	#[test]
	fn shift_enter_keeps_editing() {
		let mut engine = engine();
		engine.begin_edit("root").unwrap();
		assert!(!engine.handle_key("Enter", true).unwrap());
		assert_eq!(engine.mode(), Mode::Editing);
	}

	#[test]
	fn clicking_elsewhere_commits_edit() {
		let mut engine = engine();
		engine.begin_edit("root").unwrap();
		engine.update_edit_text("Committed");
		let inside = screen_center_of(&engine, "root");
		engine.pointer_down(inside).unwrap();
		assert_eq!(engine.mode(), Mode::Editing);
		engine.pointer_down(Point::new(2.0, 2.0)).unwrap();
		engine.pointer_up();
		assert_eq!(engine.data().root().unwrap().text, "Committed");
		assert!(engine.session().editing.is_none());
	}

	#[test]
	fn only_one_node_edits_at_a_time() {
		let mut engine = engine();
		let a = engine.add_child("root", None).unwrap();
		engine.begin_edit("root").unwrap();
		engine.update_edit_text("First");
		engine.begin_edit(&a).unwrap();
		assert_eq!(engine.session().editing_node_id(), Some(a.as_str()));
		assert_eq!(engine.data().root().unwrap().text, "First");
	}

	#[test]
	fn formatting_is_a_no_op_outside_editing() {
		let mut engine = engine();
		assert!(!engine.apply_format(FormatCommand::Bold));
		engine.begin_edit("root").unwrap();
		assert!(engine.apply_format(FormatCommand::Align(TextAlign::Right)));
		assert_eq!(
			engine.session().editing.as_ref().unwrap().format.align,
			TextAlign::Right
		);
	}

	#[test]
	fn keyboard_shortcuts_drive_selection() {
		let mut engine = engine();
		assert!(!engine.handle_key("Tab", false).unwrap());
		engine.select("root").unwrap();
		assert!(engine.handle_key("Tab", false).unwrap());
		let child = engine.session().selected_node_id.clone().unwrap();
		assert_ne!(child, "root");
		assert!(engine.handle_key("Delete", false).unwrap());
		assert!(engine.data().node(&child).is_none());
		engine.select("root").unwrap();
		assert!(engine.handle_key("Escape", false).unwrap());
		assert_eq!(engine.mode(), Mode::Idle);
	}

	#[test]
	fn collapsing_drops_a_selection_it_hides() {
		let mut engine = engine();
		let a = engine.add_child("root", None).unwrap();
		let a1 = engine.add_child(&a, None).unwrap();
		assert_eq!(engine.session().selected_node_id.as_deref(), Some(a1.as_str()));

		engine.toggle_expand(&a).unwrap();
		assert_eq!(engine.session().selected_node_id, None);
		assert!(!engine.handle_key("Tab", false).unwrap());
		assert!(!engine.handle_key("F2", false).unwrap());
		assert_eq!(engine.data().nodes.len(), 3);
	}

	#[test]
	fn hidden_selection_acts_as_no_selection() {
		let mut engine = engine();
		let a = engine.add_child("root", None).unwrap();
		let a1 = engine.add_child(&a, None).unwrap();
		engine.data.node_mut(&a).unwrap().is_expanded = false;
		engine.session.selected_node_id = Some(a1.clone());

		assert!(!engine.handle_key("Tab", false).unwrap());
		assert!(!engine.handle_key("Delete", false).unwrap());
		assert!(!engine.handle_key("F2", false).unwrap());
		assert_eq!(engine.add_child_to_selected().unwrap(), None);
		assert_eq!(engine.delete_selected().unwrap(), None);
		assert!(engine.data().node(&a1).is_some());
		assert_eq!(engine.data().nodes.len(), 3);
	}

	#[test]
	fn picked_colour_applies_to_selection_and_new_nodes() {
		let mut engine = engine();
		engine.select("root").unwrap();
		engine.set_color("#EF4444");
		assert_eq!(engine.data().root().unwrap().color, "#EF4444");
		let child = engine.add_child("root", None).unwrap();
		assert_eq!(engine.data().node(&child).unwrap().color, "#EF4444");
	}

	#[test]
	fn zoom_buttons_respect_limits_and_centre() {
		let mut engine = engine();
		let center = engine.viewport().screen_center();
		let world = engine.viewport().screen_to_world(center);
		engine.zoom_in();
		assert!((engine.viewport().zoom - 1.2).abs() < 1e-9);
		let back = engine.viewport().world_to_screen(world);
		assert!((back.x - center.x).abs() < 1e-9 && (back.y - center.y).abs() < 1e-9);
		for _ in 0..50 {
			engine.zoom_out();
		}
		assert_eq!(engine.viewport().zoom, 0.2);
		engine.reset_view();
		assert_eq!(engine.viewport().zoom, 1.0);
	}

	#[test]
	fn center_on_root_keeps_zoom() {
		let mut engine = engine();
		engine.set_zoom(2.0);
		engine.center_on_root();
		assert_eq!(engine.viewport().zoom, 2.0);
		let at = screen_center_of(&engine, "root");
		assert!((at.x - 400.0).abs() < 1e-9 && (at.y - 300.0).abs() < 1e-9);
	}

	#[test]
	fn import_replaces_map_and_failed_import_keeps_it() {
		let mut engine = engine();
		let json = {
			let mut other =
				MindMapEngine::blank("Other", EngineConfig::default(), 800.0, 600.0).unwrap();
			other.add_child("root", None).unwrap();
			other.export_json().unwrap()
		};
		let before = engine.data().clone();
		assert!(engine.import_json("not json").is_err());
		assert_eq!(engine.data(), &before);
		engine.import_json(&json).unwrap();
		assert_eq!(engine.data().root().unwrap().text, "Other");
		assert_eq!(engine.data().nodes.len(), 2);
	}

	#[test]
	fn raster_plan_ignores_interactive_view() {
		let mut engine = engine();
		engine.add_child("root", None).unwrap();
		engine.set_zoom(4.0);
		engine.set_pan(Point::new(-900.0, 40.0));
		let (scene, plan) = engine.raster_plan().unwrap();
		assert!(scene.nodes.iter().all(|n| !n.selected));
		assert_ne!(plan.viewport.zoom, 4.0);
	}

	#[test]
	fn minimap_click_moves_view_not_zoom() {
		let mut engine = engine();
		engine.set_zoom(1.5);
		let map = engine.minimap();
		let root_center = engine.data().root().unwrap().center();
		engine.minimap_navigate(map.to_mini(root_center));
		assert_eq!(engine.viewport().zoom, 1.5);
		let at = screen_center_of(&engine, "root");
		assert!((at.x - 400.0).abs() < 1e-6 && (at.y - 300.0).abs() < 1e-6);
	}
}
