//! Off-screen PNG capture of the whole map.

use js_sys::{Promise, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, CanvasRenderingContext2d, HtmlCanvasElement};

use super::render;
use crate::engine::export::RasterPlan;
use crate::engine::{MindMapError, Scene, Size};

fn failure(context: &str, err: JsValue) -> MindMapError {
	MindMapError::ExportFailure(format!("{context}: {err:?}"))
}

/// Renders `scene` on a detached canvas sized by `plan` and encodes it as
/// PNG. The interactive canvas and the graph are not touched.
pub async fn capture_png(scene: Scene, plan: RasterPlan) -> Result<Vec<u8>, MindMapError> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| MindMapError::ExportFailure("no document".into()))?;
	let canvas: HtmlCanvasElement = document
		.create_element("canvas")
		.map_err(|e| failure("canvas", e))?
		.dyn_into()
		.map_err(|e| failure("canvas", e.into()))?;
	canvas.set_width(plan.width);
	canvas.set_height(plan.height);
	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.map_err(|e| failure("context", e))?
		.ok_or_else(|| MindMapError::ExportFailure("2d context unavailable".into()))?
		.dyn_into()
		.map_err(|e| failure("context", e.into()))?;

	let size = Size {
		width: plan.width as f64,
		height: plan.height as f64,
	};
	render::draw_scene(&ctx, &scene, &plan.viewport, size);

	let encoded = Promise::new(&mut |resolve, reject| {
		let fail = reject.clone();
		let on_blob = Closure::once_into_js(move |blob: JsValue| {
			let _ = if blob.is_null() {
				reject.call1(&JsValue::NULL, &JsValue::from_str("encoder returned no blob"))
			} else {
				resolve.call1(&JsValue::NULL, &blob)
			};
		});
		if let Err(err) = canvas.to_blob(on_blob.unchecked_ref()) {
			let _ = fail.call1(&JsValue::NULL, &err);
		}
	});
	let blob: Blob = JsFuture::from(encoded)
		.await
		.map_err(|e| failure("encode", e))?
		.dyn_into()
		.map_err(|e| failure("encode", e.into()))?;
	let buffer = JsFuture::from(blob.array_buffer())
		.await
		.map_err(|e| failure("read", e))?;
	Ok(Uint8Array::new(&buffer).to_vec())
}
