//! Deterministic text measurement and node sizing.
//!
//! Sizes are a pure function of `(text, level, config)`: glyph advances come
//! from display-cell widths, so the same input always yields the same box on
//! every host, with or without a real font engine behind it.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::config::MetricsConfig;
use super::types::Size;

/// Typography and box rules for one depth of the tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelStyle {
	pub font_size: f64,
	pub font_weight: u16,
	pub max_chars_per_line: usize,
	pub padding_x: f64,
	pub padding_y: f64,
	pub min_width: f64,
	pub min_height: f64,
	pub line_height: f64,
}

// (floor size, offset from base size, weight, max chars, pad x, pad y, min w, min h)
const LEVEL_TABLE: [(f64, f64, u16, usize, f64, f64, f64, f64); 4] = [
	(20.0, 4.0, 900, 28, 48.0, 28.0, 160.0, 64.0),
	(16.0, 2.0, 700, 24, 36.0, 22.0, 120.0, 48.0),
	(14.0, -1.0, 600, 20, 28.0, 18.0, 96.0, 40.0),
	(12.0, -2.0, 500, 18, 24.0, 14.0, 80.0, 34.0),
];

const LINE_HEIGHT: f64 = 1.3;
const BOLD_ADVANCE: f64 = 1.06;

pub fn level_style(level: u32, base_font_size: f64) -> LevelStyle {
	let row = LEVEL_TABLE[(level as usize).min(LEVEL_TABLE.len() - 1)];
	let (floor, offset, weight, max_chars, padding_x, padding_y, min_width, min_height) = row;
	LevelStyle {
		font_size: (base_font_size + offset).max(floor),
		font_weight: weight,
		max_chars_per_line: max_chars,
		padding_x,
		padding_y,
		min_width,
		min_height,
		line_height: LINE_HEIGHT,
	}
}

/// Measured text block for a node.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBox {
	pub style: LevelStyle,
	pub lines: Vec<String>,
	pub size: Size,
}

pub fn measure(text: &str, level: u32, config: &MetricsConfig) -> TextBox {
	let style = level_style(level, config.base_font_size);
	let lines = wrap_lines(text, style.max_chars_per_line);
	let widest = lines
		.iter()
		.map(|line| line_width(line, &style, config.glyph_advance))
		.fold(0.0, f64::max);
	let text_height = lines.len() as f64 * style.font_size * style.line_height;

	TextBox {
		size: Size {
			width: (widest + style.padding_x).max(style.min_width).ceil(),
			height: (text_height + style.padding_y).max(style.min_height).ceil(),
		},
		style,
		lines,
	}
}

pub fn node_size(text: &str, level: u32, config: &MetricsConfig) -> Size {
	measure(text, level, config).size
}

pub fn line_width(line: &str, style: &LevelStyle, glyph_advance: f64) -> f64 {
	let advance = if style.font_weight >= 700 {
		glyph_advance * BOLD_ADVANCE
	} else {
		glyph_advance
	};
	UnicodeWidthStr::width(line) as f64 * style.font_size * advance
}

/// Greedy word wrap on display columns. Hard newlines always break; words
/// longer than a line are split at the column limit.
pub fn wrap_lines(text: &str, max_cols: usize) -> Vec<String> {
	let max_cols = max_cols.max(1);
	let mut lines = Vec::new();

	for hard_line in text.split('\n') {
		let hard_line = hard_line.strip_suffix('\r').unwrap_or(hard_line);
		let mut current = String::new();
		let mut current_cols = 0;

		for word in hard_line.split_whitespace() {
			for piece in split_long_word(word, max_cols) {
				let cols = UnicodeWidthStr::width(piece.as_str());
				if current.is_empty() {
					current = piece;
					current_cols = cols;
				} else if current_cols + 1 + cols <= max_cols {
					current.push(' ');
					current.push_str(&piece);
					current_cols += 1 + cols;
				} else {
					lines.push(std::mem::take(&mut current));
					current = piece;
					current_cols = cols;
				}
			}
		}
		lines.push(current);
	}
	lines
}

fn split_long_word(word: &str, max_cols: usize) -> Vec<String> {
	if UnicodeWidthStr::width(word) <= max_cols {
		return vec![word.to_string()];
	}
	let mut pieces = Vec::new();
	let mut piece = String::new();
	let mut cols = 0;
	for ch in word.chars() {
		let w = UnicodeWidthChar::width(ch).unwrap_or(0);
		if cols + w > max_cols && !piece.is_empty() {
			pieces.push(std::mem::take(&mut piece));
			cols = 0;
		}
		piece.push(ch);
		cols += w;
	}
	if !piece.is_empty() {
		pieces.push(piece);
	}
	pieces
}
