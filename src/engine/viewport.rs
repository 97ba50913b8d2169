//! Zoom/pan transform between world space and screen pixels.
//!
//! `screen = world * zoom + pan`. Hit-testing, dragging, the mini-map and
//! export all go through [`Viewport::world_to_screen`] and
//! [`Viewport::screen_to_world`]; nothing else does this arithmetic.

use serde::{Deserialize, Serialize};

use super::config::ViewportConfig;
use super::types::{Point, Rect, Size};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
	pub zoom: f64,
	pub pan: Point,
	/// Size of the host surface in screen pixels.
	pub size: Size,
	pub min_zoom: f64,
	pub max_zoom: f64,
}

impl Viewport {
	pub fn new(config: &ViewportConfig, width: f64, height: f64) -> Self {
		Self {
			zoom: 1.0,
			pan: Point::default(),
			size: Size { width, height },
			min_zoom: config.min_zoom,
			max_zoom: config.max_zoom,
		}
	}

	/// A transform that fits `bounds` into `width`×`height` with `padding`
	/// on every side, ignoring the interactive zoom limits.
	pub fn fit(bounds: Rect, width: f64, height: f64, padding: f64) -> Self {
		let inner_w = (width - 2.0 * padding).max(1.0);
		let inner_h = (height - 2.0 * padding).max(1.0);
		let zoom = (inner_w / bounds.width.max(1.0)).min(inner_h / bounds.height.max(1.0));
		let center = bounds.center();
		Self {
			zoom,
			pan: Point::new(width / 2.0 - center.x * zoom, height / 2.0 - center.y * zoom),
			size: Size { width, height },
			min_zoom: zoom,
			max_zoom: zoom,
		}
	}

	pub fn world_to_screen(&self, p: Point) -> Point {
		Point::new(p.x * self.zoom + self.pan.x, p.y * self.zoom + self.pan.y)
	}

	pub fn screen_to_world(&self, p: Point) -> Point {
		Point::new((p.x - self.pan.x) / self.zoom, (p.y - self.pan.y) / self.zoom)
	}

	pub fn world_rect_to_screen(&self, r: Rect) -> Rect {
		let origin = self.world_to_screen(Point::new(r.x, r.y));
		Rect::new(origin.x, origin.y, r.width * self.zoom, r.height * self.zoom)
	}

	/// The world-space rectangle currently visible on the surface.
	pub fn visible_world_rect(&self) -> Rect {
		let origin = self.screen_to_world(Point::default());
		Rect::new(
			origin.x,
			origin.y,
			self.size.width / self.zoom,
			self.size.height / self.zoom,
		)
	}

	fn clamp_zoom(&self, zoom: f64) -> f64 {
		zoom.clamp(self.min_zoom, self.max_zoom)
	}

	/// Sets the zoom about the surface origin.
	pub fn set_zoom(&mut self, zoom: f64) {
		self.zoom = self.clamp_zoom(zoom);
	}

	pub fn set_pan(&mut self, pan: Point) {
		self.pan = pan;
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.pan.x += dx;
		self.pan.y += dy;
	}

	/// Changes zoom while keeping the world point under `anchor` fixed on screen.
	pub fn zoom_at(&mut self, anchor: Point, zoom: f64) {
		let world = self.screen_to_world(anchor);
		self.zoom = self.clamp_zoom(zoom);
		self.pan = Point::new(anchor.x - world.x * self.zoom, anchor.y - world.y * self.zoom);
	}

	/// One wheel notch at `anchor`: positive `delta_y` zooms out, negative in.
	/// Returns false when the wheel did not move.
	pub fn wheel(&mut self, anchor: Point, delta_y: f64, step: f64) -> bool {
		if delta_y == 0.0 || !delta_y.is_finite() {
			return false;
		}
		let factor = if delta_y > 0.0 { 1.0 - step } else { 1.0 + step };
		self.zoom_at(anchor, self.zoom * factor);
		true
	}

	pub fn screen_center(&self) -> Point {
		Point::new(self.size.width / 2.0, self.size.height / 2.0)
	}

	/// Zoom buttons: scale about the centre of the surface.
	pub fn zoom_by(&mut self, factor: f64) {
		self.zoom_at(self.screen_center(), self.zoom * factor);
	}

	/// Pans so that `world` sits in the middle of the surface. Zoom is unchanged.
	pub fn center_on(&mut self, world: Point) {
		let c = self.screen_center();
		self.pan = Point::new(c.x - world.x * self.zoom, c.y - world.y * self.zoom);
	}

	pub fn reset(&mut self) {
		self.zoom = 1.0;
		self.pan = Point::default();
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.size = Size { width, height };
	}
}
