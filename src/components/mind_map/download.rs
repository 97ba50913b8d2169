//! Hands export output to the browser as a file download.

use js_sys::{Array, Uint8Array};
use log::info;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use crate::engine::MindMapError;

fn js_failure(context: &str, err: JsValue) -> MindMapError {
	MindMapError::ExportFailure(format!("{context}: {err:?}"))
}

pub fn download_text(filename: &str, mime: &str, text: &str) -> Result<(), MindMapError> {
	let parts = Array::of1(&JsValue::from_str(text));
	download(filename, mime, &parts)
}

pub fn download_bytes(filename: &str, mime: &str, bytes: &[u8]) -> Result<(), MindMapError> {
	let parts = Array::of1(&Uint8Array::from(bytes));
	download(filename, mime, &parts)
}

fn download(filename: &str, mime: &str, parts: &Array) -> Result<(), MindMapError> {
	let options = BlobPropertyBag::new();
	options.set_type(mime);
	let blob = Blob::new_with_u8_array_sequence_and_options(parts, &options)
		.map_err(|e| js_failure("blob", e))?;
	let url = Url::create_object_url_with_blob(&blob).map_err(|e| js_failure("object url", e))?;

	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| MindMapError::ExportFailure("no document".into()))?;
	let anchor: HtmlAnchorElement = document
		.create_element("a")
		.map_err(|e| js_failure("anchor", e))?
		.dyn_into()
		.map_err(|e| js_failure("anchor", e.into()))?;
	anchor.set_href(&url);
	anchor.set_download(filename);
	anchor.click();
	let _ = Url::revoke_object_url(&url);
	info!("downloaded {filename} ({} byte blob)", blob.size());
	Ok(())
}
