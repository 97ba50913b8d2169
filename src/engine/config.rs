//! Tunable constants for layout, collision, viewport and export.
//!
//! Every struct deserializes with `#[serde(default)]`, so a host can pass a
//! partial JSON object and keep the defaults for the rest.

use serde::Deserialize;

use super::error::MindMapError;
use super::types::Point;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	pub layout: LayoutConfig,
	pub collision: CollisionConfig,
	pub viewport: ViewportConfig,
	pub minimap: MinimapConfig,
	pub export: ExportConfig,
	pub metrics: MetricsConfig,
	pub default_node_text: String,
	pub default_node_color: String,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			layout: LayoutConfig::default(),
			collision: CollisionConfig::default(),
			viewport: ViewportConfig::default(),
			minimap: MinimapConfig::default(),
			export: ExportConfig::default(),
			metrics: MetricsConfig::default(),
			default_node_text: "New idea".into(),
			default_node_color: "#3B82F6".into(),
		}
	}
}

impl EngineConfig {
	/// Parses a possibly partial config and checks it.
	pub fn from_json(json: &str) -> Result<Self, MindMapError> {
		let config: Self =
			serde_json::from_str(json).map_err(|e| MindMapError::InvalidConfig(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), MindMapError> {
		self.viewport.validate()
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Top-left corner the root is pinned to by auto-organize.
	pub root_anchor: Point,
	/// Horizontal gap between a level-1 node and the root edge.
	pub horizontal_gap: f64,
	/// Centre-to-centre sibling step at level 1.
	pub vertical_spacing: f64,
	/// Multiplier applied to gap and spacing for every level past the first.
	pub level_decay: f64,
	pub min_vertical_spacing: f64,
	/// Clearance kept between stacked sibling subtrees.
	pub sibling_gap: f64,
	/// Parent-centre to child-centre distance for a freshly added level-1 node.
	pub placement_distance: f64,
	pub placement_growth: f64,
	/// Angular step between siblings fanned out by incremental placement.
	pub fan_step: f64,
	pub max_fan_spread: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			root_anchor: Point::new(400.0, 300.0),
			horizontal_gap: 120.0,
			vertical_spacing: 80.0,
			level_decay: 0.85,
			min_vertical_spacing: 64.0,
			sibling_gap: 16.0,
			placement_distance: 180.0,
			placement_growth: 20.0,
			fan_step: 0.35,
			max_fan_spread: 1.2,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
	pub min_distance: f64,
	pub max_iterations: usize,
	/// Fraction of the overlap removed per iteration.
	pub stiffness: f64,
	/// Separation applied to pairs sharing the exact same centre.
	pub nudge: f64,
	pub pin_root: bool,
}

impl Default for CollisionConfig {
	fn default() -> Self {
		Self {
			min_distance: 60.0,
			max_iterations: 50,
			stiffness: 1.0,
			nudge: 1.0,
			pin_root: true,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Relative zoom change per wheel notch.
	pub wheel_step: f64,
	/// Multiplicative factor of the zoom in/out buttons.
	pub button_step: f64,
}

impl ViewportConfig {
	/// Zoom limits must form a non-empty positive range and both steps must
	/// actually change the zoom.
	pub fn validate(&self) -> Result<(), MindMapError> {
		let invalid = |msg: String| Err(MindMapError::InvalidConfig(msg));
		let (min, max) = (self.min_zoom, self.max_zoom);
		if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
			return invalid(format!("zoom range {min}..={max} is empty or not positive"));
		}
		if !(self.wheel_step > 0.0 && self.wheel_step < 1.0) {
			return invalid(format!("wheel step {} must lie in (0, 1)", self.wheel_step));
		}
		if !(self.button_step.is_finite() && self.button_step > 0.0 && self.button_step != 1.0) {
			return invalid(format!("button step {} must be positive and not 1", self.button_step));
		}
		Ok(())
	}
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.2,
			max_zoom: 5.0,
			wheel_step: 0.1,
			button_step: 1.2,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MinimapConfig {
	pub width: f64,
	pub height: f64,
	pub padding: f64,
	pub max_scale: f64,
	pub min_node_size: f64,
}

impl Default for MinimapConfig {
	fn default() -> Self {
		Self {
			width: 200.0,
			height: 150.0,
			padding: 100.0,
			max_scale: 0.1,
			min_node_size: 2.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
	pub raster_width: u32,
	pub raster_height: u32,
	pub raster_padding: f64,
	pub svg_padding: f64,
}

impl Default for ExportConfig {
	fn default() -> Self {
		Self {
			raster_width: 2400,
			raster_height: 1800,
			raster_padding: 60.0,
			svg_padding: 100.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
	pub base_font_size: f64,
	/// Average glyph advance as a fraction of the font size.
	pub glyph_advance: f64,
}

impl Default for MetricsConfig {
	fn default() -> Self {
		Self {
			base_font_size: 14.0,
			glyph_advance: 0.56,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config =
			EngineConfig::from_json(r#"{"collision": {"min_distance": 90.0}}"#).unwrap();
		assert_eq!(config.collision.min_distance, 90.0);
		assert_eq!(config.collision.max_iterations, 50);
		assert_eq!(config.viewport, ViewportConfig::default());
		assert_eq!(config.default_node_text, "New idea");
	}

	#[test]
	fn inverted_zoom_range_is_rejected() {
		let err = EngineConfig::from_json(r#"{"viewport": {"min_zoom": 3.0, "max_zoom": 2.0}}"#)
			.unwrap_err();
		assert!(matches!(err, MindMapError::InvalidConfig(_)), "{err:?}");
	}

	#[test]
	fn zero_steps_and_bad_json_are_rejected() {
		for json in [
			r#"{"viewport": {"wheel_step": 0.0}}"#,
			r#"{"viewport": {"button_step": -1.2}}"#,
			r#"{"viewport": {"min_zoom": 0.0}}"#,
			r#"{"viewport": 5}"#,
		] {
			assert!(
				matches!(EngineConfig::from_json(json), Err(MindMapError::InvalidConfig(_))),
				"{json}"
			);
		}
		assert!(EngineConfig::default().validate().is_ok());
	}
}
