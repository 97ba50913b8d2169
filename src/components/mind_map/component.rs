use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Element, FocusEvent, HtmlCanvasElement, HtmlTextAreaElement,
	KeyboardEvent, MouseEvent, WheelEvent, Window,
};

use super::render;
use super::toolbar::{Status, toolbar};
use crate::engine::metrics;
use crate::engine::session::TextFormat;
use crate::engine::{EngineConfig, MindMapData, MindMapEngine, MindMapError, Point, Rect};

pub(super) type SharedEngine = Rc<RefCell<Option<MindMapEngine>>>;

/// Runs `f` against the mounted engine and logs a rejected command.
pub(super) fn dispatch<R>(
	engine: &SharedEngine,
	f: impl FnOnce(&mut MindMapEngine) -> Result<R, MindMapError>,
) -> Option<R> {
	match engine.borrow_mut().as_mut().map(f)? {
		Ok(value) => Some(value),
		Err(err) => {
			warn!("{err}");
			None
		}
	}
}

/// Where and how the inline editor is shown, in screen pixels.
#[derive(Clone, Debug, PartialEq)]
struct EditOverlay {
	node_id: String,
	rect: Rect,
	font_size: f64,
	font_weight: u16,
	format: TextFormat,
	background: String,
	text_color: String,
}

impl EditOverlay {
	fn of(engine: &MindMapEngine) -> Option<Self> {
		let buffer = engine.session().editing.as_ref()?;
		let node = engine.data().node(&buffer.node_id)?;
		let viewport = engine.viewport();
		let style = metrics::level_style(node.level, engine.config().metrics.base_font_size);
		Some(Self {
			node_id: node.id.clone(),
			rect: viewport.world_rect_to_screen(node.rect()),
			font_size: buffer.format.font_size.unwrap_or(style.font_size) * viewport.zoom,
			font_weight: if buffer.format.bold { 900 } else { style.font_weight },
			format: buffer.format.clone(),
			background: node.color.clone(),
			text_color: engine.theme().text_color.clone(),
		})
	}

	fn apply(&self, textarea: &HtmlTextAreaElement) {
		let style = web_sys::HtmlElement::style(textarea);
		let px = |v: f64| format!("{v}px");
		let _ = style.set_property("display", "block");
		let _ = style.set_property("left", &px(self.rect.x));
		let _ = style.set_property("top", &px(self.rect.y));
		let _ = style.set_property("width", &px(self.rect.width));
		let _ = style.set_property("height", &px(self.rect.height));
		let _ = style.set_property("font-size", &px(self.font_size));
		let _ = style.set_property("font-weight", &self.font_weight.to_string());
		let _ = style.set_property(
			"font-style",
			if self.format.italic { "italic" } else { "normal" },
		);
		let _ = style.set_property(
			"text-decoration",
			if self.format.underline { "underline" } else { "none" },
		);
		let _ = style.set_property("text-align", self.format.align.as_css());
		let _ = style.set_property("background", &self.background);
		let _ = style.set_property("color", &self.text_color);
	}
}

/// Shows, moves or hides the editor textarea to match the engine. A newly
/// opened editor gets the buffer text, focus and a full selection.
fn sync_editor(
	engine: &MindMapEngine,
	shown: &RefCell<Option<EditOverlay>>,
	editor_ref: NodeRef<leptos::html::Textarea>,
) {
	let next = EditOverlay::of(engine);
	if *shown.borrow() == next {
		return;
	}
	let Some(textarea) = editor_ref.get_untracked() else {
		return;
	};
	let opened = next.as_ref().map(|o| &o.node_id) != shown.borrow().as_ref().map(|o| &o.node_id);
	match &next {
		Some(overlay) => {
			overlay.apply(&textarea);
			if opened {
				if let Some(buffer) = &engine.session().editing {
					textarea.set_value(&buffer.text);
				}
				let _ = textarea.focus();
				textarea.select();
			}
		}
		None => {
			let _ = web_sys::HtmlElement::style(&textarea).set_property("display", "none");
		}
	}
	*shown.borrow_mut() = next;
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn is_form_field(ev: &KeyboardEvent) -> bool {
	ev.target()
		.and_then(|t| t.dyn_into::<Element>().ok())
		.is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT"))
}

#[component]
pub fn MindMapCanvas(
	#[prop(into)] data: Signal<MindMapData>,
	#[prop(optional)] config: Option<EngineConfig>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] on_change: Option<Callback<MindMapData>>,
) -> impl IntoView {
	let config = config.unwrap_or_default();
	let (mini_width, mini_height) = (config.minimap.width, config.minimap.height);
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let minimap_ref = NodeRef::<leptos::html::Canvas>::new();
	let editor_ref = NodeRef::<leptos::html::Textarea>::new();
	let engine: SharedEngine = Rc::new(RefCell::new(None));
	let shown_editor: Rc<RefCell<Option<EditOverlay>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let keydown_cb: Rc<RefCell<Option<Closure<dyn FnMut(KeyboardEvent)>>>> =
		Rc::new(RefCell::new(None));
	let status = RwSignal::new(Status::default());
	let load_error = RwSignal::new(None::<String>);
	let minimap_open = RwSignal::new(true);
	let (engine_init, animate_init, resize_cb_init, keydown_cb_init) = (
		engine.clone(),
		animate.clone(),
		resize_cb.clone(),
		keydown_cb.clone(),
	);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = context_2d(&canvas) else {
			warn!("canvas has no 2d context");
			return;
		};
		match MindMapEngine::load(data.get_untracked(), config.clone(), w, h) {
			Ok(mut loaded) => {
				if let Some(callback) = on_change {
					loaded.on_change(move |data| callback.run(data.clone()));
				}
				loaded.center_on_root();
				*engine_init.borrow_mut() = Some(loaded);
			}
			Err(err) => {
				warn!("refusing to render: {err}");
				load_error.set(Some(err.to_string()));
				return;
			}
		}

		if fullscreen {
			let (engine_resize, canvas_resize) = (engine_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut e) = *engine_resize.borrow_mut() {
					e.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let engine_keys = engine_init.clone();
		*keydown_cb_init.borrow_mut() = Some(Closure::new(move |ev: KeyboardEvent| {
			if is_form_field(&ev) {
				return;
			}
			let key = ev.key();
			if dispatch(&engine_keys, |e| e.handle_key(&key, ev.shift_key())) == Some(true) {
				ev.prevent_default();
			}
		}));
		if let Some(ref cb) = *keydown_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
		}

		let (engine_anim, animate_inner, shown) =
			(engine_init.clone(), animate_init.clone(), shown_editor.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref e) = *engine_anim.borrow() {
				let viewport = e.viewport();
				render::draw_scene(&ctx, &e.scene(), viewport, viewport.size);
				if minimap_open.get_untracked() {
					if let Some(mini) = minimap_ref.get_untracked().as_ref().and_then(context_2d) {
						render::draw_minimap(&mini, &e.minimap_frame(), e.theme());
					}
				}
				sync_editor(e, &shown, editor_ref);
				let next = Status::of(e);
				if status.get_untracked() != next {
					status.set(next);
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(window) = web_sys::window() {
					let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
		info!("mind map mounted at {w}x{h}");
	});

	let engine_md = engine.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		if let Some(at) = local_point(canvas_ref, &ev) {
			dispatch(&engine_md, |e| e.pointer_down(at));
		}
	};

	let engine_mm = engine.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(at) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut e) = *engine_mm.borrow_mut() {
			e.pointer_move(at);
		}
	};

	let engine_mu = engine.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut e) = *engine_mu.borrow_mut() {
			e.pointer_up();
		}
	};

	let engine_ml = engine.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut e) = *engine_ml.borrow_mut() {
			e.pointer_leave();
		}
	};

	let engine_dc = engine.clone();
	let on_dblclick = move |ev: MouseEvent| {
		if let Some(at) = local_point(canvas_ref, &ev) {
			dispatch(&engine_dc, |e| e.double_click(at));
		}
	};

	let engine_wh = engine.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(at) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut e) = *engine_wh.borrow_mut() {
			e.wheel(at, ev.delta_y());
		}
	};

	let engine_in = engine.clone();
	let on_input = move |ev: leptos::ev::Event| {
		if let Some(ref mut e) = *engine_in.borrow_mut() {
			e.update_edit_text(&event_target_value(&ev));
		}
	};

	let engine_kd = engine.clone();
	let on_editor_keydown = move |ev: KeyboardEvent| {
		ev.stop_propagation();
		let key = ev.key();
		if dispatch(&engine_kd, |e| e.handle_key(&key, ev.shift_key())) == Some(true) {
			ev.prevent_default();
		}
	};

	// focus leaving the editor commits it, the same as Enter
	let engine_bl = engine.clone();
	let on_blur = move |_: FocusEvent| {
		dispatch(&engine_bl, |e| e.commit_current_edit());
	};

	let mini_dragging = Rc::new(Cell::new(false));
	let (engine_mini_down, dragging_down) = (engine.clone(), mini_dragging.clone());
	let on_mini_down = move |ev: MouseEvent| {
		ev.prevent_default();
		dragging_down.set(true);
		let Some(at) = local_point(minimap_ref, &ev) else {
			return;
		};
		if let Some(ref mut e) = *engine_mini_down.borrow_mut() {
			e.minimap_navigate(at);
		}
	};
	let (engine_mini_move, dragging_move) = (engine.clone(), mini_dragging.clone());
	let on_mini_move = move |ev: MouseEvent| {
		if !dragging_move.get() {
			return;
		}
		let Some(at) = local_point(minimap_ref, &ev) else {
			return;
		};
		if let Some(ref mut e) = *engine_mini_move.borrow_mut() {
			e.minimap_navigate(at);
		}
	};
	let (dragging_up, dragging_leave) = (mini_dragging.clone(), mini_dragging);
	let on_mini_up = move |_: MouseEvent| dragging_up.set(false);
	let on_mini_leave = move |_: MouseEvent| dragging_leave.set(false);

	view! {
		<div class="mind-map">
			{move || {
				load_error
					.get()
					.map(|msg| {
						view! { <div class="mind-map-error">"Cannot display this map: " {msg}</div> }
					})
			}}
			{toolbar(engine.clone(), editor_ref, status)}
			<canvas
				node_ref=canvas_ref
				class="mind-map-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:dblclick=on_dblclick
				on:wheel=on_wheel
				style:cursor=move || if status.get().grabbing { "grabbing" } else { "grab" }
			/>
			<textarea
				node_ref=editor_ref
				class="mind-map-editor"
				style="display: none;"
				on:input=on_input
				on:keydown=on_editor_keydown
				on:blur=on_blur
			/>
			<div class="mind-map-minimap">
				<button
					class="minimap-toggle"
					title="Open mini-map"
					style:display=move || if minimap_open.get() { "none" } else { "flex" }
					on:click=move |_| minimap_open.set(true)
				>
					"Map"
				</button>
				<div
					class="minimap-panel"
					style:display=move || if minimap_open.get() { "block" } else { "none" }
				>
					<div class="minimap-header">
						<span>"Overview"</span>
						<button title="Close mini-map" on:click=move |_| minimap_open.set(false)>
							"×"
						</button>
					</div>
					<canvas
						node_ref=minimap_ref
						width=mini_width.to_string()
						height=mini_height.to_string()
						on:mousedown=on_mini_down
						on:mousemove=on_mini_move
						on:mouseup=on_mini_up
						on:mouseleave=on_mini_leave
						style="display: block; cursor: crosshair;"
					/>
				</div>
			</div>
		</div>
	}
}
