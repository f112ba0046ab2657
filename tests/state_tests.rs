//! State Tests
//!
//! Sanitization, stack bounds, lock policy and migration of fabrication
//! states through the public mutation API.

use pretty_assertions::assert_eq;
use serde_json::json;

use fabrica::engine::{SamplingSpace, TransformPatch};
use fabrica::layers::{
    catalog, BlendMode, ExecutionMode, ExecutionPath, FabricationState, MapTarget, MAX_LAYERS,
    MAX_LAYER_NUMBER, MAX_WARNINGS, STATE_VERSION,
};
use fabrica::state::{
    migrate_state, parse_recipe, LEGACY_MIGRATION_WARNING, RECIPE_TOOL_TAG,
    UNSUPPORTED_SHAPE_WARNING,
};

fn assert_idempotent(state: &FabricationState) {
    assert_eq!(&state.sanitized(), state);
}

// === Sanitize idempotence ===

#[test]
fn test_sanitize_idempotent_on_malformed_input() {
    let inputs = [
        json!({}),
        json!({"layers": "nope"}),
        json!({
            "layers": [
                {"id": "layer-4", "generatorId": "mystery", "strength": 7, "name": "   "},
                {"id": "layer-4", "blendMode": "dissolve", "mapTarget": "ao"},
                {"generatorId": "tile_grid", "params": {"columns": -3, "grooveWidth": "wide"}},
                {"transform": {"scale": 1e9, "rotationDeg": 725, "offsetU": -0.25}}
            ],
            "activeLayerId": "layer-99",
            "nextLayerId": -4,
            "baseColor": "zzz",
            "textureSize": 3000,
            "previewMode": "NORMAL"
        }),
        json!({"noiseType": "worley", "strength": "0.3", "textureSize": "300"}),
        json!(42),
        json!({"layers": [{"id": " layer-5"}, {"id": ""}]}),
        json!({"layers": [{"id": "layer-4294967295"}, {"id": "layer-4294967295"}]}),
        json!({"layers": [{"id": "layer-1"}, {}], "nextLayerId": 4294967295u64}),
    ];
    for input in inputs {
        let state = migrate_state(&input);
        assert_idempotent(&state);
        assert_eq!(state.version, STATE_VERSION);
        assert!(!state.layers.is_empty());
        assert!(state.layer(&state.active_layer_id).is_some());
    }
}

#[test]
fn test_sanitize_normalizes_malformed_layers() {
    let state = migrate_state(&json!({
        "layers": [
            {"id": "layer-4", "generatorId": "mystery", "strength": 7},
            {"id": "layer-4", "mapTarget": "ao"}
        ],
        "baseColor": "ABC",
        "textureSize": 700
    }));
    assert_eq!(state.layers[0].generator_id, "value_fbm");
    assert_eq!(state.layers[0].strength, 1.0);
    assert_eq!(state.layers[1].id, "layer-5");
    assert_eq!(state.layers[1].map_target, MapTarget::OrmAo);
    assert_eq!(state.next_layer_id, 6);
    assert_eq!(state.base_color, "#aabbcc");
    assert_eq!(state.texture_size, 512);
    assert_eq!(
        state.status_warnings,
        vec!["Unknown generator \"mystery\"; using value_fbm."]
    );
}

#[test]
fn test_every_setter_returns_sanitized_state() {
    let state = FabricationState::default()
        .add_layer_from_catalog("streak_flow:rain_streaks")
        .duplicate_layer("layer-2")
        .set_strength("layer-3", -2.0)
        .set_transform("layer-2", &TransformPatch::default().scale(1000.0).rotation(-540.0))
        .set_param("layer-1", "octaves", 99.0)
        .rename_layer("layer-1", &"x".repeat(500))
        .set_base_color("#FfF")
        .set_texture_size(1500)
        .reorder_layers(&["layer-3", "layer-1"]);
    assert_idempotent(&state);
    let ids: Vec<&str> = state.layers.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["layer-3", "layer-1", "layer-2"]);
    assert_eq!(state.layer("layer-3").unwrap().strength, 0.0);
    assert_eq!(state.layer("layer-1").unwrap().params.get_f64("octaves"), 8.0);
    assert_eq!(state.base_color, "#ffffff");
    assert_eq!(state.texture_size, 1024);
}

// === Stack bounds ===

#[test]
fn test_stack_never_exceeds_max_layers() {
    let mut state = FabricationState::default();
    for _ in 0..MAX_LAYERS + 3 {
        state = state.add_layer_from_catalog("blotch");
    }
    assert_eq!(state.layers.len(), MAX_LAYERS);
    assert_eq!(
        state.status_warnings,
        vec![format!("Layer limit of {} reached; new layer not added.", MAX_LAYERS)]
    );

    let state = state.duplicate_layer("layer-1");
    assert_eq!(state.layers.len(), MAX_LAYERS);
}

#[test]
fn test_oversized_input_is_truncated() {
    let layers: Vec<_> = (1..=20).map(|n| json!({"id": format!("layer-{}", n)})).collect();
    let state = migrate_state(&json!({ "layers": layers }));
    assert_eq!(state.layers.len(), MAX_LAYERS);
    assert_eq!(state.next_layer_id, 21);
    assert_eq!(state.status_warnings.len(), 1);
}

#[test]
fn test_removing_every_layer_leaves_one() {
    let state = FabricationState::default()
        .add_layer_from_catalog("crackle")
        .remove_layer("layer-1")
        .remove_layer("layer-2");
    assert_eq!(state.layers.len(), 1);
    assert_eq!(state.layers[0].id, "layer-3");
    assert_eq!(state.active_layer_id, "layer-3");
}

#[test]
fn test_trimmed_id_advances_counter() {
    let state = migrate_state(&json!({"layers": [{"id": " layer-5"}, {"id": ""}]}));
    let ids: Vec<&str> = state.layers.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["layer-5", "layer-6"]);
    assert_eq!(state.next_layer_id, 7);
}

#[test]
fn test_extreme_layer_numbers_keep_ids_unique() {
    let state = migrate_state(&json!({
        "layers": [{"id": "layer-4294967295"}, {"id": "layer-4294967295"}]
    }));
    assert_eq!(state.layers[0].id, "layer-4294967295");
    assert_eq!(state.layers[1].id, "layer-1");
    assert!(state.next_layer_id <= MAX_LAYER_NUMBER);

    let recipe = json!({
        "tool": RECIPE_TOOL_TAG,
        "version": 1,
        "state": {"layers": [{"id": "layer-4294967295"}, {"id": "layer-4294967295"}]}
    });
    assert_eq!(parse_recipe(&recipe.to_string()).unwrap(), state);
}

#[test]
fn test_exhausted_counter_still_adds_unique_layers() {
    let mut state = migrate_state(&json!({
        "layers": [{"id": "layer-1"}, {"id": "layer-2"}],
        "nextLayerId": 4294967295u64
    }));
    assert_eq!(state.next_layer_id, MAX_LAYER_NUMBER);

    state = state.add_layer_from_catalog("blotch").duplicate_layer("layer-1");
    let ids: Vec<&str> = state.layers.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["layer-1", "layer-4", "layer-2", "layer-3"]);
    assert_eq!(state.next_layer_id, MAX_LAYER_NUMBER);
    assert_eq!(state.sanitized(), state);
}

#[test]
fn test_ids_are_never_reused() {
    let state = FabricationState::default()
        .add_layer_from_catalog("cellular")
        .remove_layer("layer-2")
        .add_layer_from_catalog("cellular");
    assert_eq!(state.layers[1].id, "layer-3");
}

#[test]
fn test_warnings_are_capped() {
    let mut state = FabricationState::default();
    for n in 0..MAX_WARNINGS + 10 {
        state = state.set_strength(&format!("ghost-{}", n), 0.5);
    }
    assert_eq!(state.status_warnings.len(), MAX_WARNINGS);
    assert_eq!(
        state.status_warnings[0],
        "Unknown layer \"ghost-10\"; strength change ignored."
    );
    assert!(state.clear_warnings().status_warnings.is_empty());
}

// === Lock policy ===

#[test]
fn test_locked_layer_refuses_edits_with_one_warning() {
    let locked = FabricationState::default().set_lock("layer-1", true);
    let before = locked.layers[0].clone();

    let after = locked
        .set_strength("layer-1", 0.2)
        .set_strength("layer-1", 0.3)
        .set_blend_mode("layer-1", BlendMode::Add)
        .set_strength("layer-1", 0.4);

    assert_eq!(after.layers[0], before);
    assert_eq!(
        after.status_warnings,
        vec![
            "Layer \"Value fBm\" is locked; strength change ignored.".to_string(),
            "Layer \"Value fBm\" is locked; blend mode change ignored.".to_string(),
        ]
    );
}

#[test]
fn test_every_content_setter_respects_lock() {
    let locked = FabricationState::default().set_lock("layer-1", true);
    let edits: [(&str, fn(&FabricationState) -> FabricationState); 13] = [
        ("rename", |s| s.rename_layer("layer-1", "Renamed")),
        ("description change", |s| s.set_layer_description("layer-1", "notes")),
        ("blend mode change", |s| s.set_blend_mode("layer-1", BlendMode::Max)),
        ("strength change", |s| s.set_strength("layer-1", 0.1)),
        ("map target change", |s| s.set_map_target("layer-1", MapTarget::Normal)),
        ("transform change", |s| s.set_transform("layer-1", &TransformPatch::default().scale(3.0))),
        ("preset change", |s| s.set_preset("layer-1", "soft_clouds")),
        ("parameter change", |s| s.set_param("layer-1", "octaves", 2.0)),
        ("execution mode change", |s| s.set_execution_mode("layer-1", ExecutionMode::Manual)),
        ("manual path change", |s| s.set_manual_path("layer-1", ExecutionPath::TextureBaked)),
        ("dynamic runtime change", |s| s.set_dynamic_runtime("layer-1", true)),
        ("large-scale flag change", |s| s.set_large_scale_world("layer-1", true)),
        ("generator change", |s| s.replace_layer_generator("layer-1", "crackle")),
    ];

    for (action, edit) in edits {
        let after = edit(&locked);
        assert_eq!(after.layers[0], locked.layers[0], "{}", action);
        assert_eq!(
            after.status_warnings,
            vec![format!("Layer \"Value fBm\" is locked; {} ignored.", action)],
        );
    }
}

#[test]
fn test_locked_layer_still_toggles_and_moves() {
    let state = FabricationState::default()
        .add_layer_from_catalog("blotch")
        .set_lock("layer-1", true)
        .set_solo("layer-1", true)
        .reorder_layers(&["layer-2", "layer-1"]);
    assert!(state.status_warnings.is_empty());
    assert!(state.layer("layer-1").unwrap().solo);
    assert_eq!(state.layers[1].id, "layer-1");

    let removed = state.remove_layer("layer-1");
    assert_eq!(removed.layers.len(), 2);
    assert_eq!(removed.status_warnings.len(), 1);

    let unlocked = state.set_lock("layer-1", false).remove_layer("layer-1");
    assert_eq!(unlocked.layers.len(), 1);
}

#[test]
fn test_duplicate_of_locked_layer_is_editable() {
    let state = FabricationState::default()
        .set_lock("layer-1", true)
        .duplicate_layer("layer-1")
        .set_strength("layer-2", 0.25);
    assert_eq!(state.layers[1].strength, 0.25);
    assert!(!state.layers[1].lock);
    assert_eq!(state.layers[1].name, "Value fBm copy");
}

// === Execution and transform settings ===

#[test]
fn test_manual_path_kept_in_auto_mode() {
    let state = FabricationState::default()
        .set_manual_path("layer-1", ExecutionPath::Shader)
        .set_execution_mode("layer-1", ExecutionMode::Auto);
    assert_eq!(state.layers[0].execution.manual_path, ExecutionPath::Shader);
}

#[test]
fn test_world_space_request_downgraded() {
    let state = FabricationState::default().set_transform(
        "layer-1",
        &TransformPatch::default().space(SamplingSpace::World).scale(2.0),
    );
    assert_eq!(state.layers[0].transform.scale, 2.0);
    assert_eq!(
        state.status_warnings,
        vec!["World-space sampling is not supported; layer \"Value fBm\" uses UV space."]
    );
}

#[test]
fn test_catalog_entries_all_add_cleanly() {
    for entry in catalog() {
        let state = FabricationState::default().add_layer_from_catalog(&entry.id());
        assert_eq!(state.layers.len(), 2, "{}", entry.id());
        assert_eq!(state.layers[1].name, entry.label());
        assert!(state.status_warnings.is_empty(), "{}", entry.id());
    }
}

// === Migration ===

#[test]
fn test_legacy_state_migrates_once() {
    let state = migrate_state(&json!({
        "generatorId": "line_bands",
        "params": {"count": 12},
        "blendMode": "screen",
        "previewMode": "normal"
    }));
    assert_eq!(state.layers.len(), 1);
    assert_eq!(state.layers[0].generator_id, "line_bands");
    assert_eq!(state.layers[0].blend_mode, BlendMode::Screen);
    assert_eq!(state.status_warnings, vec![LEGACY_MIGRATION_WARNING]);

    let again = migrate_state(&serde_json::to_value(&state).unwrap());
    assert_eq!(again, state);
}

#[test]
fn test_unsupported_shape_gets_defaults() {
    let state = migrate_state(&json!("just text"));
    assert_eq!(state.layers.len(), 1);
    assert_eq!(state.status_warnings, vec![UNSUPPORTED_SHAPE_WARNING]);
}
