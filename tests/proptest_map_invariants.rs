//! Property-based invariant tests for the mind-map engine.
//!
//! 1. Any sequence of add/delete edits keeps exactly one root.
//! 2. Connections always follow parent links, one per non-root node.
//! 3. JSON export then import yields the same graph.
//! 4. Auto-organize is idempotent.
//! 5. Screen/world conversion is invertible for every zoom and pan.

use mind_map_canvas::engine::config::{EngineConfig, MetricsConfig, ViewportConfig};
use mind_map_canvas::engine::{MindMapData, Point, Side, Viewport, export, layout};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
enum Edit {
	Add { parent: usize, side: Option<Side>, text: String },
	Delete { target: usize },
}

fn side() -> impl Strategy<Value = Option<Side>> {
	prop_oneof![Just(None), Just(Some(Side::Left)), Just(Some(Side::Right))]
}

fn edit() -> impl Strategy<Value = Edit> {
	prop_oneof![
		3 => (any::<usize>(), side(), "[a-zA-Z &<>]{0,24}")
			.prop_map(|(parent, side, text)| Edit::Add { parent, side, text }),
		1 => any::<usize>().prop_map(|target| Edit::Delete { target }),
	]
}

/// Replays `edits` on a fresh map, picking targets by index modulo the
/// current node count. Rejected edits (deleting the root) are skipped.
fn build(edits: &[Edit]) -> MindMapData {
	let metrics = MetricsConfig::default();
	let mut data = MindMapData::with_root("Root", "#3B82F6", 400.0, 300.0, &metrics);
	for edit in edits {
		let count = data.nodes.len();
		match edit {
			Edit::Add { parent, side, text } => {
				let parent_id = data.nodes[parent % count].id.clone();
				data
					.add_child(&parent_id, *side, text, "#10B981", &metrics)
					.expect("parent exists");
			}
			Edit::Delete { target } => {
				let id = data.nodes[target % count].id.clone();
				let _ = data.delete_node(&id);
			}
		}
	}
	data
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Exactly one root
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn edits_keep_a_single_root(edits in proptest::collection::vec(edit(), 0..40)) {
		let data = build(&edits);
		let roots: Vec<_> = data.nodes.iter().filter(|n| n.parent_id.is_none()).collect();
		prop_assert_eq!(roots.len(), 1);
		prop_assert_eq!(&roots[0].id, &data.root_node_id);
		prop_assert!(data.validate().is_ok());
	}
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Connection consistency
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn connections_follow_parent_links(edits in proptest::collection::vec(edit(), 0..40)) {
		let data = build(&edits);
		for conn in &data.connections {
			prop_assert!(data.node(&conn.from_node_id).is_some(), "dangling {}", conn.id);
			prop_assert!(data.node(&conn.to_node_id).is_some(), "dangling {}", conn.id);
		}
		for node in data.nodes.iter().filter(|n| n.parent_id.is_some()) {
			let incoming = data
				.connections
				.iter()
				.filter(|c| c.to_node_id == node.id)
				.count();
			prop_assert_eq!(incoming, 1, "node {} has {} incoming", &node.id, incoming);
		}
	}
}

// ═════════════════════════════════════════════════════════════════════════
// 3. JSON round-trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn json_round_trip_is_lossless(
		edits in proptest::collection::vec(edit(), 0..30),
		collapse in any::<usize>(),
	) {
		let mut data = build(&edits);
		layout::auto_organize(&mut data, &EngineConfig::default().layout).expect("has root");
		let count = data.nodes.len();
		data.nodes[collapse % count].is_expanded = false;

		let json = export::export_json(&data).expect("serializable");
		let back = export::import_json(&json).expect("valid graph");
		prop_assert_eq!(back, data);
	}
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Layout idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn auto_organize_twice_changes_nothing(edits in proptest::collection::vec(edit(), 0..40)) {
		let config = EngineConfig::default().layout;
		let mut data = build(&edits);
		layout::auto_organize(&mut data, &config).expect("has root");
		let first = data.clone();
		layout::auto_organize(&mut data, &config).expect("has root");
		prop_assert_eq!(data, first);
	}
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Coordinate inverse law
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn screen_world_conversion_inverts(
		zoom in 0.2f64..=5.0,
		pan_x in -5000.0f64..5000.0,
		pan_y in -5000.0f64..5000.0,
		x in -1.0e5f64..1.0e5,
		y in -1.0e5f64..1.0e5,
	) {
		let mut viewport = Viewport::new(&ViewportConfig::default(), 1280.0, 720.0);
		viewport.set_zoom(zoom);
		viewport.set_pan(Point::new(pan_x, pan_y));
		let p = Point::new(x, y);

		let back = viewport.screen_to_world(viewport.world_to_screen(p));
		prop_assert!((back.x - p.x).abs() < 1e-6, "x {} -> {}", p.x, back.x);
		prop_assert!((back.y - p.y).abs() < 1e-6, "y {} -> {}", p.y, back.y);

		let forward = viewport.world_to_screen(viewport.screen_to_world(p));
		prop_assert!((forward.x - p.x).abs() < 1e-6);
		prop_assert!((forward.y - p.y).abs() < 1e-6);
	}
}
