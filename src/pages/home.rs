use leptos::prelude::*;
use log::{info, warn};

use crate::components::mind_map::MindMapCanvas;
use crate::engine::layout;
use crate::engine::{EngineConfig, MindMapData, MindMapError, Side, Theme};

/// Topics of the sample map, grouped by the branch they hang off.
const SAMPLE_BRANCHES: &[(&str, Side, &[&str])] = &[
	("Heart", Side::Right, &["Atria", "Ventricles", "Valves"]),
	("Vessels", Side::Right, &["Arteries", "Veins", "Capillaries"]),
	("Blood", Side::Left, &["Plasma", "Red cells", "Platelets"]),
	("Regulation", Side::Left, &["Heart rate", "Blood pressure"]),
];

/// A small two-level study map, laid out and coloured by depth.
fn sample_map(config: &EngineConfig, theme: &Theme) -> Result<MindMapData, MindMapError> {
	let anchor = config.layout.root_anchor;
	let mut data = MindMapData::with_root(
		"Cardiovascular system",
		theme.node_color(0),
		anchor.x,
		anchor.y,
		&config.metrics,
	);
	let root = data.root_node_id.clone();
	for (branch, side, topics) in SAMPLE_BRANCHES {
		let branch_id =
			data.add_child(&root, Some(*side), branch, theme.node_color(1), &config.metrics)?;
		for topic in *topics {
			data.add_child(&branch_id, None, topic, theme.node_color(2), &config.metrics)?;
		}
	}
	layout::auto_organize(&mut data, &config.layout)?;
	Ok(data)
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = EngineConfig::default();
	let map = sample_map(&config, &Theme::default()).unwrap_or_else(|err| {
		warn!("sample map unavailable, starting blank: {err}");
		let anchor = config.layout.root_anchor;
		MindMapData::with_root(
			"Central idea",
			&config.default_node_color,
			anchor.x,
			anchor.y,
			&config.metrics,
		)
	});
	let node_count = RwSignal::new(map.nodes.len());
	let revision = RwSignal::new(0_usize);
	let map_data = Signal::derive(move || map.clone());

	let on_change = Callback::new(move |data: MindMapData| {
		info!("map changed: {} node(s)", data.nodes.len());
		node_count.set(data.nodes.len());
		revision.update(|r| *r += 1);
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-map">
				<MindMapCanvas data=map_data config=config fullscreen=true on_change=on_change />
				<div class="map-overlay">
					<h1>"Mind Map"</h1>
					<p class="subtitle">
						"Double-click to edit. Tab adds a child. Drag the background to pan, scroll to zoom."
					</p>
					<p class="subtitle">
						{move || format!("{} nodes, {} edits", node_count.get(), revision.get())}
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
