//! Host-agnostic mind-map core: graph model, text metrics, layout, viewport,
//! interaction session, mini-map, scene building and export.
//!
//! Nothing in here touches the DOM; the browser adapter lives in
//! `components::mind_map` and only reads scenes and forwards input.

pub mod config;
pub mod controller;
pub mod error;
pub mod export;
mod graph;
pub mod layout;
pub mod metrics;
pub mod minimap;
pub mod scene;
pub mod session;
pub mod theme;
pub mod types;
pub mod viewport;

pub use config::EngineConfig;
pub use controller::{Hit, MindMapEngine};
pub use error::MindMapError;
pub use graph::{CONNECTION_COLOR, CONNECTION_WIDTH};
pub use scene::Scene;
pub use session::{FormatCommand, Mode, TextAlign};
pub use theme::{QUICK_COLORS, Theme, builtin_themes, theme_by_id};
pub use types::{Connection, MindMapData, Node, Point, Rect, Side, Size};
pub use viewport::Viewport;
