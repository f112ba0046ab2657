//! State shape migration
//!
//! Upgrades loosely shaped state JSON to the current layered shape before
//! it is read. Steps are applied one version at a time, so a future
//! version 3 only needs a `2 -> 3` entry in the registry.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use tracing::info;

use crate::layers::{FabricationState, STATE_VERSION};

/// Version of the single-layer shape that predates layer stacks
pub const LEGACY_STATE_VERSION: u32 = 1;

pub const LEGACY_MIGRATION_WARNING: &str = "Migrated legacy single-layer state to layered format.";

pub const UNSUPPORTED_SHAPE_WARNING: &str = "Unsupported state shape; defaults applied.";

/// One upgrade step: rewrites a version N object into a version N+1 object
type MigrationFn = fn(Map<String, Value>) -> Map<String, Value>;

fn migration_registry() -> BTreeMap<u32, MigrationFn> {
    let mut registry: BTreeMap<u32, MigrationFn> = BTreeMap::new();
    registry.insert(LEGACY_STATE_VERSION, migrate_v1_to_v2);
    registry
}

/// Result of upgrading a state value
#[derive(Debug, Clone, PartialEq)]
pub struct MigratedState {
    /// Object in the current layered shape
    pub value: Value,
    /// Version the input was detected as
    pub from_version: u32,
    pub warnings: Vec<String>,
}

/// Version of a state object.
///
/// An explicit integer `version` wins. Without one, an object that has no
/// `layers` key is the legacy shape.
pub fn detect_state_version(value: &Value) -> u32 {
    let explicit = value
        .get("version")
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite() && v.fract() == 0.0 && *v >= 1.0)
        .map(|v| v.min(u32::MAX as f64) as u32);

    match explicit {
        Some(version) => version,
        None if value.get("layers").is_none() => LEGACY_STATE_VERSION,
        None => STATE_VERSION,
    }
}

/// Upgrade `value` to the current shape. Never fails; anything unreadable
/// becomes an empty object plus a warning.
pub fn migrate_state_value(value: &Value) -> MigratedState {
    let Some(object) = value.as_object() else {
        return MigratedState {
            value: Value::Object(Map::new()),
            from_version: STATE_VERSION,
            warnings: vec![UNSUPPORTED_SHAPE_WARNING.to_string()],
        };
    };

    let from_version = detect_state_version(value);
    let mut warnings = Vec::new();

    if from_version > STATE_VERSION {
        warnings.push(format!(
            "State version {} is newer than supported version {}; reading best-effort.",
            from_version, STATE_VERSION
        ));
        return MigratedState {
            value: value.clone(),
            from_version,
            warnings,
        };
    }

    let registry = migration_registry();
    let mut object = object.clone();
    let mut version = from_version;
    while version < STATE_VERSION {
        let Some(step) = registry.get(&version) else {
            break;
        };
        object = step(object);
        version += 1;
        object.insert("version".to_string(), json!(version));
    }

    if from_version < STATE_VERSION {
        warnings.push(LEGACY_MIGRATION_WARNING.to_string());
        info!(from = from_version, to = STATE_VERSION, "Migrated state");
    }

    MigratedState {
        value: Value::Object(object),
        from_version,
        warnings,
    }
}

/// Migrate then read a state from any supported shape.
///
/// Migration warnings are recorded on the returned state.
pub fn migrate_state(value: &Value) -> FabricationState {
    let migrated = migrate_state_value(value);
    let mut state = FabricationState::from_value(&migrated.value);
    for warning in migrated.warnings {
        state.push_warning(warning);
    }
    state
}

// ============================================================================
// Migration Steps
// ============================================================================

/// Kind names used by single-layer states
fn legacy_generator_id(name: &str) -> &str {
    match name.trim() {
        "fbm" | "value" | "perlin" => "value_fbm",
        "ridged" => "ridged_fbm",
        "directional" => "directional_fbm",
        "bands" | "lines" | "stripes" => "line_bands",
        "tiles" | "grid" => "tile_grid",
        "cells" | "voronoi" | "worley" => "cellular",
        other => other,
    }
}

/// Keys that stay on the state; everything else describes the one layer
const STATE_KEYS: [&str; 6] = [
    "previewMode",
    "baseColor",
    "textureSize",
    "exportTargets",
    "executionAssistantQuestions",
    "statusWarnings",
];

const LAYER_KEYS: [&str; 11] = [
    "name",
    "description",
    "presetId",
    "blendMode",
    "strength",
    "lock",
    "solo",
    "mapTarget",
    "transform",
    "params",
    "execution",
];

fn migrate_v1_to_v2(legacy: Map<String, Value>) -> Map<String, Value> {
    let mut layer = Map::new();
    layer.insert("id".to_string(), json!("layer-1"));

    let generator = legacy
        .get("generatorId")
        .or_else(|| legacy.get("noiseType"))
        .and_then(Value::as_str);
    if let Some(generator) = generator {
        layer.insert(
            "generatorId".to_string(),
            json!(legacy_generator_id(generator)),
        );
    }
    for key in LAYER_KEYS {
        if let Some(value) = legacy.get(key) {
            layer.insert(key.to_string(), value.clone());
        }
    }

    let mut state = Map::new();
    state.insert("layers".to_string(), Value::Array(vec![Value::Object(layer)]));
    state.insert("activeLayerId".to_string(), json!("layer-1"));
    state.insert("nextLayerId".to_string(), json!(2));
    for key in STATE_KEYS {
        if let Some(value) = legacy.get(key) {
            state.insert(key.to_string(), value.clone());
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{BlendMode, MapTarget};

    #[test]
    fn test_detect_version() {
        assert_eq!(detect_state_version(&json!({"generatorId": "cellular"})), 1);
        assert_eq!(detect_state_version(&json!({"layers": []})), STATE_VERSION);
        assert_eq!(detect_state_version(&json!({"version": 7, "layers": []})), 7);
        assert_eq!(detect_state_version(&json!({"version": 1.5, "layers": []})), 2);
    }

    #[test]
    fn test_legacy_state_becomes_one_layer() {
        let legacy = json!({
            "noiseType": "voronoi",
            "params": {"scale": 6},
            "blendMode": "multiply",
            "strength": 0.4,
            "mapTarget": "orm_roughness",
            "baseColor": "#ABC",
            "textureSize": 1024
        });
        let state = migrate_state(&legacy);
        assert_eq!(state.layers.len(), 1);
        let layer = &state.layers[0];
        assert_eq!(layer.id, "layer-1");
        assert_eq!(layer.generator_id, "cellular");
        assert_eq!(layer.blend_mode, BlendMode::Multiply);
        assert_eq!(layer.strength, 0.4);
        assert_eq!(layer.map_target, MapTarget::OrmRoughness);
        assert_eq!(layer.params.get_f64("scale"), 6.0);
        assert_eq!(state.base_color, "#aabbcc");
        assert_eq!(state.texture_size, 1024);
        assert_eq!(state.next_layer_id, 2);
        assert_eq!(state.status_warnings, vec![LEGACY_MIGRATION_WARNING]);
    }

    #[test]
    fn test_non_object_gives_defaults() {
        let state = migrate_state(&json!([1, 2, 3]));
        let mut expected = FabricationState::default();
        expected.push_warning(UNSUPPORTED_SHAPE_WARNING);
        assert_eq!(state, expected);
    }

    #[test]
    fn test_newer_version_read_best_effort() {
        let value = json!({
            "version": 9,
            "layers": [{"id": "layer-3", "generatorId": "blotch"}],
            "futureField": true
        });
        let state = migrate_state(&value);
        assert_eq!(state.layers[0].generator_id, "blotch");
        assert_eq!(state.version, STATE_VERSION);
        assert!(state.status_warnings[0].starts_with("State version 9 is newer"));
    }

    #[test]
    fn test_current_state_passes_through() {
        let value = json!({"version": 2, "layers": [{"id": "layer-1"}]});
        let migrated = migrate_state_value(&value);
        assert_eq!(migrated.value, value);
        assert!(migrated.warnings.is_empty());
    }

    #[test]
    fn test_migration_is_stable_on_its_output() {
        let once = migrate_state(&json!({"generatorId": "bands"}));
        let value = serde_json::to_value(&once).unwrap();
        let twice = migrate_state(&value);
        assert_eq!(once, twice);
    }
}
