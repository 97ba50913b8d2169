//! Transient interaction state: selection, drag, pan and the inline editor.
//!
//! Owned by the engine and never serialized with the graph.

use serde::{Deserialize, Serialize};

use super::types::Point;

/// Which of the interaction states the session is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
	Idle,
	Selected,
	Dragging,
	Panning,
	Editing,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DragState {
	pub node_id: String,
	/// World-space cursor position minus the node origin at pointer-down.
	pub offset: Point,
	pub moved: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanState {
	pub last: Point,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
	#[default]
	Left,
	Center,
	Right,
}

impl TextAlign {
	pub fn as_css(self) -> &'static str {
		match self {
			TextAlign::Left => "left",
			TextAlign::Center => "center",
			TextAlign::Right => "right",
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFormat {
	pub bold: bool,
	pub italic: bool,
	pub underline: bool,
	pub align: TextAlign,
	pub bullet_list: bool,
	pub font_size: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FormatCommand {
	Bold,
	Italic,
	Underline,
	BulletList,
	Align(TextAlign),
	FontSize(f64),
}

pub const BULLET: &str = "• ";

/// The in-progress text of the node being edited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditBuffer {
	pub node_id: String,
	pub text: String,
	/// Stored label before editing began; kept on cancel.
	pub original: String,
	/// `original` as the editor first showed it. Committing this unchanged
	/// leaves the stored label alone.
	pub opened_text: String,
	/// The whole text is selected, as it is right after entering edit mode.
	pub all_selected: bool,
	pub format: TextFormat,
}

impl EditBuffer {
	pub fn open(node_id: &str, raw_text: &str) -> Self {
		let text = strip_markup(raw_text);
		Self {
			node_id: node_id.into(),
			original: raw_text.into(),
			opened_text: text.clone(),
			text,
			all_selected: true,
			format: TextFormat::default(),
		}
	}

	pub fn set_text(&mut self, text: &str) {
		self.text = text.into();
		self.all_selected = false;
	}

	pub fn apply(&mut self, command: FormatCommand) {
		let format = &mut self.format;
		match command {
			FormatCommand::Bold => format.bold = !format.bold,
			FormatCommand::Italic => format.italic = !format.italic,
			FormatCommand::Underline => format.underline = !format.underline,
			FormatCommand::Align(align) => format.align = align,
			FormatCommand::FontSize(size) if size.is_finite() && size > 0.0 => {
				format.font_size = Some(size)
			}
			FormatCommand::FontSize(_) => {}
			FormatCommand::BulletList => {
				format.bullet_list = !format.bullet_list;
				self.text = toggle_bullets(&self.text, format.bullet_list);
			}
		}
	}
}

fn toggle_bullets(text: &str, on: bool) -> String {
	text.split('\n')
		.map(|line| {
			let bare = line.strip_prefix(BULLET).unwrap_or(line);
			if on && !bare.is_empty() {
				format!("{BULLET}{bare}")
			} else {
				bare.to_string()
			}
		})
		.collect::<Vec<_>>()
		.join("\n")
}

/// Tags the editor itself produces. Anything else in angle brackets is
/// label text.
const EDITOR_TAGS: &[&str] = &[
	"b", "strong", "i", "em", "u", "br", "p", "div", "li", "ul", "ol", "span", "font",
];

/// Lowercase tag name when `inner` (the text between `<` and `>`) is an
/// editor tag, opening or closing.
fn editor_tag(inner: &str) -> Option<String> {
	let inner = inner.trim();
	let rest = inner.strip_prefix('/').unwrap_or(inner);
	let name: String = rest
		.chars()
		.take_while(|c| c.is_ascii_alphanumeric())
		.collect::<String>()
		.to_ascii_lowercase();
	let tail = &rest[name.len()..];
	let well_formed = tail.is_empty() || tail.starts_with([' ', '\t', '\n', '/']);
	(well_formed && EDITOR_TAGS.contains(&name.as_str())).then_some(name)
}

fn break_line(out: &mut String) {
	if !out.is_empty() && !out.ends_with('\n') {
		out.push('\n');
	}
}

/// Plain text of a possibly rich-text label: `<br>` and block boundaries
/// become newlines, other editor tags vanish, common entities are decoded.
pub fn strip_markup(input: &str) -> String {
	if !input.contains('<') && !input.contains('&') {
		return input.to_string();
	}
	let mut out = String::with_capacity(input.len());
	let mut chars = input.char_indices().peekable();
	while let Some((i, ch)) = chars.next() {
		match ch {
			'<' => {
				let tag = input[i..]
					.find('>')
					.and_then(|end| editor_tag(&input[i + 1..i + end]).map(|tag| (end, tag)));
				let Some((end, name)) = tag else {
					out.push('<');
					continue;
				};
				match name.as_str() {
					"br" => out.push('\n'),
					"p" | "div" | "li" => break_line(&mut out),
					_ => {}
				}
				while chars.peek().is_some_and(|(j, _)| *j <= i + end) {
					chars.next();
				}
			}
			'&' => {
				let rest = &input[i..];
				let entity = [
					("&amp;", '&'),
					("&lt;", '<'),
					("&gt;", '>'),
					("&quot;", '"'),
					("&#39;", '\''),
					("&nbsp;", ' '),
				]
				.into_iter()
				.find(|(name, _)| rest.starts_with(name));
				match entity {
					Some((name, decoded)) => {
						out.push(decoded);
						while chars.peek().is_some_and(|(j, _)| *j < i + name.len()) {
							chars.next();
						}
					}
					None => out.push('&'),
				}
			}
			_ => out.push(ch),
		}
	}
	out.trim_end_matches('\n').to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
	pub selected_node_id: Option<String>,
	pub editing: Option<EditBuffer>,
	pub drag: Option<DragState>,
	pub pan: Option<PanState>,
	/// Colour picked in the toolbar; new nodes use it instead of the palette.
	pub picked_color: Option<String>,
}

impl Session {
	pub fn new() -> Self {
		Self {
			selected_node_id: None,
			editing: None,
			drag: None,
			pan: None,
			picked_color: None,
		}
	}

	pub fn mode(&self) -> Mode {
		if self.editing.is_some() {
			Mode::Editing
		} else if self.drag.is_some() {
			Mode::Dragging
		} else if self.pan.is_some() {
			Mode::Panning
		} else if self.selected_node_id.is_some() {
			Mode::Selected
		} else {
			Mode::Idle
		}
	}

	pub fn is_selected(&self, id: &str) -> bool {
		self.selected_node_id.as_deref() == Some(id)
	}

	pub fn editing_node_id(&self) -> Option<&str> {
		self.editing.as_ref().map(|e| e.node_id.as_str())
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.is_some()
	}

	pub fn is_panning(&self) -> bool {
		self.pan.is_some()
	}

	/// Forgets everything that refers to the given (removed) nodes.
	pub fn forget(&mut self, removed: &[String]) {
		let gone = |id: &str| removed.iter().any(|r| r == id);
		if self.selected_node_id.as_deref().is_some_and(gone) {
			self.selected_node_id = None;
		}
		if self.editing_node_id().is_some_and(gone) {
			self.editing = None;
		}
		if self.drag.as_ref().is_some_and(|d| gone(&d.node_id)) {
			self.drag = None;
		}
	}
}

impl Default for Session {
	fn default() -> Self {
		Self::new()
	}
}
