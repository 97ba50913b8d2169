//! Colour palettes consumed by the scene builder and new-node colouring.

/// Quick-pick colours offered by the toolbar.
pub const QUICK_COLORS: &[&str] = &[
	"#3B82F6", "#EF4444", "#10B981", "#F59E0B", "#8B5CF6", "#EC4899", "#06B6D4", "#84CC16",
	"#F97316", "#6366F1", "#14B8A6", "#F43F5E",
];

const FALLBACK_NODE_COLOR: &str = "#6366f1";

#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
	pub id: String,
	pub name: String,
	pub background: String,
	pub node_colors: Vec<String>,
	pub connection_color: String,
	pub text_color: String,
	pub selected_node_border: String,
	pub controls_background: String,
	pub controls_text: String,
	pub shadow_color: String,
}

impl Theme {
	/// Palette colour for a depth, cycling when the tree is deeper than the palette.
	pub fn node_color(&self, level: u32) -> &str {
		if self.node_colors.is_empty() {
			return FALLBACK_NODE_COLOR;
		}
		&self.node_colors[level as usize % self.node_colors.len()]
	}
}

impl Default for Theme {
	fn default() -> Self {
		builtin_themes().swap_remove(0)
	}
}

#[allow(clippy::too_many_arguments)]
fn theme(
	id: &str,
	name: &str,
	background: &str,
	node_colors: [&str; 12],
	connection_color: &str,
	text_color: &str,
	selected_node_border: &str,
	controls: (&str, &str),
	shadow_color: &str,
) -> Theme {
	Theme {
		id: id.into(),
		name: name.into(),
		background: background.into(),
		node_colors: node_colors.iter().map(|c| c.to_string()).collect(),
		connection_color: connection_color.into(),
		text_color: text_color.into(),
		selected_node_border: selected_node_border.into(),
		controls_background: controls.0.into(),
		controls_text: controls.1.into(),
		shadow_color: shadow_color.into(),
	}
}

pub fn builtin_themes() -> Vec<Theme> {
	vec![
		theme(
			"light",
			"Modern Light",
			"#f8fafc",
			[
				"#6366f1", "#ec4899", "#10b981", "#f59e0b", "#8b5cf6", "#ef4444", "#06b6d4",
				"#84cc16", "#f97316", "#3b82f6", "#14b8a6", "#f43f5e",
			],
			"#64748b",
			"#ffffff",
			"#6366f1",
			("rgba(255, 255, 255, 0.95)", "#374151"),
			"rgba(0, 0, 0, 0.15)",
		),
		theme(
			"dark",
			"Premium Dark",
			"#0f172a",
			[
				"#818cf8", "#f472b6", "#34d399", "#fbbf24", "#a78bfa", "#f87171", "#22d3ee",
				"#a3e635", "#fb923c", "#60a5fa", "#2dd4bf", "#fb7185",
			],
			"#94a3b8",
			"#ffffff",
			"#818cf8",
			("rgba(15, 23, 42, 0.95)", "#e2e8f0"),
			"rgba(0, 0, 0, 0.4)",
		),
		theme(
			"medical",
			"Clinical",
			"#fefefe",
			[
				"#dc2626", "#059669", "#2563eb", "#7c3aed", "#db2777", "#ea580c", "#0891b2",
				"#65a30d", "#be123c", "#9333ea", "#0d9488", "#c2410c",
			],
			"#6b7280",
			"#ffffff",
			"#dc2626",
			("rgba(254, 254, 254, 0.95)", "#374151"),
			"rgba(220, 38, 38, 0.15)",
		),
		theme(
			"nature",
			"Vibrant Nature",
			"#f0fdf4",
			[
				"#16a34a", "#059669", "#0d9488", "#0891b2", "#84cc16", "#65a30d", "#ca8a04",
				"#d97706", "#dc2626", "#be123c", "#7c3aed", "#9333ea",
			],
			"#22c55e",
			"#ffffff",
			"#16a34a",
			("rgba(240, 253, 244, 0.95)", "#166534"),
			"rgba(34, 197, 94, 0.15)",
		),
		theme(
			"ocean",
			"Deep Ocean",
			"#f0f9ff",
			[
				"#0ea5e9", "#0284c7", "#0369a1", "#075985", "#06b6d4", "#0891b2", "#0e7490",
				"#155e75", "#3b82f6", "#2563eb", "#1d4ed8", "#1e40af",
			],
			"#0ea5e9",
			"#ffffff",
			"#0284c7",
			("rgba(240, 249, 255, 0.95)", "#0c4a6e"),
			"rgba(14, 165, 233, 0.15)",
		),
		theme(
			"sunset",
			"Sunset",
			"#fef7ed",
			[
				"#ea580c", "#dc2626", "#be123c", "#a21caf", "#f59e0b", "#d97706", "#c2410c",
				"#b91c1c", "#7c3aed", "#9333ea", "#c026d3", "#db2777",
			],
			"#f97316",
			"#ffffff",
			"#ea580c",
			("rgba(254, 247, 237, 0.95)", "#9a3412"),
			"rgba(249, 115, 22, 0.15)",
		),
		theme(
			"neon",
			"Neon",
			"#0a0a0a",
			[
				"#00ffff", "#ff00ff", "#ffff00", "#00ff00", "#ff0080", "#8000ff", "#ff8000",
				"#0080ff", "#ff4080", "#40ff80", "#8040ff", "#ff8040",
			],
			"#00ffff",
			"#ffffff",
			"#00ffff",
			("rgba(10, 10, 10, 0.9)", "#00ffff"),
			"rgba(0, 255, 255, 0.3)",
		),
		theme(
			"pastel",
			"Pastel",
			"#ffeef8",
			[
				"#ffc1cc", "#ffb3d9", "#c1b3ff", "#b3d9ff", "#b3ffcc", "#ffffb3", "#ffccb3",
				"#d9b3ff", "#ccffb3", "#b3ffff", "#ffb3b3", "#b3ccff",
			],
			"#d1a3ff",
			"#4a4a4a",
			"#ff9ec7",
			("rgba(255, 255, 255, 0.8)", "#6b46c1"),
			"rgba(209, 163, 255, 0.2)",
		),
		theme(
			"galaxy",
			"Galaxy",
			"#1a0033",
			[
				"#9d4edd", "#c77dff", "#e0aaff", "#c8b2db", "#7209b7", "#a663cc", "#4c956c",
				"#61a5c2", "#f72585", "#b5179e", "#7209b7", "#480ca8",
			],
			"#c77dff",
			"#ffffff",
			"#e0aaff",
			("rgba(12, 12, 12, 0.9)", "#e0aaff"),
			"rgba(199, 125, 255, 0.4)",
		),
	]
}

/// Looks a theme up by id, falling back to the default theme.
pub fn theme_by_id(id: &str) -> Theme {
	builtin_themes()
		.into_iter()
		.find(|t| t.id == id)
		.unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn palette_cycles_past_its_length() {
		let mut theme = Theme::default();
		theme.node_colors = vec!["#a".into(), "#b".into()];
		assert_eq!(theme.node_color(0), "#a");
		assert_eq!(theme.node_color(3), "#b");
		assert_eq!(theme.node_color(4), "#a");
	}

	#[test]
	fn empty_palette_falls_back() {
		let mut theme = Theme::default();
		theme.node_colors.clear();
		assert_eq!(theme.node_color(7), FALLBACK_NODE_COLOR);
	}

	#[test]
	fn unknown_theme_id_yields_default() {
		assert_eq!(theme_by_id("does-not-exist").id, "light");
		assert_eq!(theme_by_id("neon").id, "neon");
		assert_eq!(builtin_themes().len(), 9);
	}
}
