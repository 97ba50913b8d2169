use leptos::prelude::*;
use log::{info, warn};
use web_sys::MouseEvent;

use super::component::{SharedEngine, dispatch};
use super::{download, raster};
use crate::engine::metrics;
use crate::engine::{
	FormatCommand, MindMapEngine, MindMapError, QUICK_COLORS, TextAlign, builtin_themes,
	theme_by_id,
};

const FONT_STEP: f64 = 2.0;

/// Engine state mirrored into signals for the toolbar and cursor.
#[derive(Clone, Debug, Default, PartialEq)]
pub(super) struct Status {
	pub selected: bool,
	pub editing: bool,
	pub grabbing: bool,
	pub zoom: f64,
}

impl Status {
	pub fn of(engine: &MindMapEngine) -> Self {
		let session = engine.session();
		Self {
			selected: session.selected_node_id.is_some(),
			editing: session.editing.is_some(),
			grabbing: session.is_dragging() || session.is_panning(),
			zoom: engine.viewport().zoom,
		}
	}
}

fn action<F>(engine: &SharedEngine, f: F) -> impl Fn(MouseEvent) + 'static + use<F>
where
	F: Fn(&mut MindMapEngine) -> Result<(), MindMapError> + 'static,
{
	let engine = engine.clone();
	move |_| {
		dispatch(&engine, &f);
	}
}

/// Applies a formatting command and mirrors the buffer back into the
/// editor, since bullet lists rewrite the text itself.
fn format_action<C>(
	engine: &SharedEngine,
	editor_ref: NodeRef<leptos::html::Textarea>,
	command: C,
) -> impl Fn(MouseEvent) + 'static + use<C>
where
	C: Fn(&MindMapEngine) -> FormatCommand + 'static,
{
	let engine = engine.clone();
	move |_| {
		let mut guard = engine.borrow_mut();
		let Some(e) = guard.as_mut() else { return };
		let command = command(e);
		if !e.apply_format(command) {
			return;
		}
		let text = e.session().editing.as_ref().map(|b| b.text.clone());
		if let (Some(textarea), Some(text)) = (editor_ref.get_untracked(), text) {
			if textarea.value() != text {
				textarea.set_value(&text);
			}
			let _ = textarea.focus();
		}
	}
}

fn current_font_size(engine: &MindMapEngine) -> f64 {
	let base = engine.config().metrics.base_font_size;
	engine
		.session()
		.editing
		.as_ref()
		.and_then(|buffer| {
			let level = engine.data().node(&buffer.node_id)?.level;
			Some(
				buffer
					.format
					.font_size
					.unwrap_or(metrics::level_style(level, base).font_size),
			)
		})
		.unwrap_or(base)
}

fn export_png(engine: &SharedEngine) -> impl Fn(MouseEvent) + 'static + use<> {
	let engine = engine.clone();
	move |_| {
		let Some((scene, plan)) = dispatch(&engine, |e| e.raster_plan()) else {
			return;
		};
		wasm_bindgen_futures::spawn_local(async move {
			let outcome = raster::capture_png(scene, plan)
				.await
				.and_then(|bytes| download::download_bytes("mind-map.png", "image/png", &bytes));
			match outcome {
				Ok(()) => info!("png export finished"),
				Err(err) => warn!("{err}"),
			}
		});
	}
}

/// Buttons along the top edge. Formatting buttons keep focus in the
/// editor so using them never commits the edit.
pub(super) fn toolbar(
	engine: SharedEngine,
	editor_ref: NodeRef<leptos::html::Textarea>,
	status: RwSignal<Status>,
) -> impl IntoView {
	let keep_focus = |ev: MouseEvent| ev.prevent_default();
	let no_selection = move || !status.get().selected;
	let not_editing = move || !status.get().editing;

	let swatches = QUICK_COLORS
		.iter()
		.map(|color| {
			let engine = engine.clone();
			view! {
				<button
					class="swatch"
					title=*color
					style:background-color=*color
					on:mousedown=keep_focus
					on:click=move |_| {
						if let Some(ref mut e) = *engine.borrow_mut() {
							e.set_color(color);
						}
					}
				/>
			}
		})
		.collect_view();

	let themes = builtin_themes()
		.into_iter()
		.map(|theme| view! { <option value=theme.id.clone()>{theme.name.clone()}</option> })
		.collect_view();
	let engine_theme = engine.clone();
	let on_theme = move |ev: leptos::ev::Event| {
		if let Some(ref mut e) = *engine_theme.borrow_mut() {
			e.set_theme(theme_by_id(&event_target_value(&ev)));
		}
	};

	view! {
		<div class="mind-map-toolbar">
			<div class="group">
				<button
					title="Add child (Tab)"
					disabled=no_selection
					on:click=action(&engine, |e| e.add_child_to_selected().map(|_| ()))
				>
					"+ Child"
				</button>
				<button
					title="Delete (Del)"
					disabled=no_selection
					on:click=action(&engine, |e| e.delete_selected().map(|_| ()))
				>
					"Delete"
				</button>
				<button title="Auto-organize" on:click=action(&engine, |e| e.auto_organize().map(|_| ()))>
					"Organize"
				</button>
			</div>
			<div class="group">
				<button title="Zoom out" on:click=action(&engine, |e| { e.zoom_out(); Ok(()) })>"−"</button>
				<span class="zoom">{move || format!("{:.0}%", status.get().zoom * 100.0)}</span>
				<button title="Zoom in" on:click=action(&engine, |e| { e.zoom_in(); Ok(()) })>"+"</button>
				<button title="Reset view" on:click=action(&engine, |e| { e.reset_view(); Ok(()) })>"1:1"</button>
				<button title="Centre on root" on:click=action(&engine, |e| { e.center_on_root(); Ok(()) })>
					"Centre"
				</button>
			</div>
			<div class="group">
				<button
					title="Bold"
					disabled=not_editing
					on:mousedown=keep_focus
					on:click=format_action(&engine, editor_ref, |_| FormatCommand::Bold)
				>
					<b>"B"</b>
				</button>
				<button
					title="Italic"
					disabled=not_editing
					on:mousedown=keep_focus
					on:click=format_action(&engine, editor_ref, |_| FormatCommand::Italic)
				>
					<i>"I"</i>
				</button>
				<button
					title="Underline"
					disabled=not_editing
					on:mousedown=keep_focus
					on:click=format_action(&engine, editor_ref, |_| FormatCommand::Underline)
				>
					<u>"U"</u>
				</button>
				<button
					title="Bulleted list"
					disabled=not_editing
					on:mousedown=keep_focus
					on:click=format_action(&engine, editor_ref, |_| FormatCommand::BulletList)
				>
					"•"
				</button>
				<button
					title="Align left"
					disabled=not_editing
					on:mousedown=keep_focus
					on:click=format_action(&engine, editor_ref, |_| FormatCommand::Align(TextAlign::Left))
				>
					"⇤"
				</button>
				<button
					title="Align centre"
					disabled=not_editing
					on:mousedown=keep_focus
					on:click=format_action(&engine, editor_ref, |_| FormatCommand::Align(TextAlign::Center))
				>
					"↔"
				</button>
				<button
					title="Align right"
					disabled=not_editing
					on:mousedown=keep_focus
					on:click=format_action(&engine, editor_ref, |_| FormatCommand::Align(TextAlign::Right))
				>
					"⇥"
				</button>
				<button
					title="Smaller text"
					disabled=not_editing
					on:mousedown=keep_focus
					on:click=format_action(
						&engine,
						editor_ref,
						|e| FormatCommand::FontSize((current_font_size(e) - FONT_STEP).max(8.0)),
					)
				>
					"A−"
				</button>
				<button
					title="Larger text"
					disabled=not_editing
					on:mousedown=keep_focus
					on:click=format_action(
						&engine,
						editor_ref,
						|e| FormatCommand::FontSize(current_font_size(e) + FONT_STEP),
					)
				>
					"A+"
				</button>
			</div>
			<div class="group swatches">{swatches}</div>
			<div class="group">
				<select title="Theme" on:change=on_theme>
					{themes}
				</select>
				<button
					title="Export JSON"
					on:click=action(
						&engine,
						|e| {
							let json = e.export_json()?;
							download::download_text("mind-map.json", "application/json", &json)
						},
					)
				>
					"JSON"
				</button>
				<button
					title="Export SVG"
					on:click=action(
						&engine,
						|e| {
							let svg = e.export_svg()?;
							download::download_text("mind-map.svg", "image/svg+xml", &svg)
						},
					)
				>
					"SVG"
				</button>
				<button title="Export PNG" on:click=export_png(&engine)>
					"PNG"
				</button>
			</div>
		</div>
	}
}
