//! Noise layer model
//!
//! A layer is one generator invocation plus everything needed to place and
//! composite it: blend mode, strength, target channel, UV transform and the
//! execution configuration read by the path classifier.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::UvTransform;
use crate::generators::{
    resolve_generator, truncate_text, NoiseGenerator, NoiseParams, DEFAULT_GENERATOR_ID,
};

pub const MAX_NAME_LEN: usize = 64;
pub const MAX_DESCRIPTION_LEN: usize = 280;
pub const MAX_ID_LEN: usize = 64;

// ============================================================================
// Enums
// ============================================================================

/// Compositing operator for a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Normal,
    Add,
    Subtract,
    Multiply,
    Screen,
    Max,
    Min,
}

impl BlendMode {
    pub const ALL: [BlendMode; 7] = [
        BlendMode::Normal,
        BlendMode::Add,
        BlendMode::Subtract,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Max,
        BlendMode::Min,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Add => "add",
            BlendMode::Subtract => "subtract",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Max => "max",
            BlendMode::Min => "min",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|m| m.as_str() == wanted)
    }
}

/// Material channel a layer feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapTarget {
    Normal,
    #[default]
    Albedo,
    OrmAo,
    OrmRoughness,
    OrmMetalness,
}

impl MapTarget {
    pub const ALL: [MapTarget; 5] = [
        MapTarget::Normal,
        MapTarget::Albedo,
        MapTarget::OrmAo,
        MapTarget::OrmRoughness,
        MapTarget::OrmMetalness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MapTarget::Normal => "normal",
            MapTarget::Albedo => "albedo",
            MapTarget::OrmAo => "orm_ao",
            MapTarget::OrmRoughness => "orm_roughness",
            MapTarget::OrmMetalness => "orm_metalness",
        }
    }

    /// Albedo and the three packed ORM channels preview together
    pub fn is_albedo_family(&self) -> bool {
        !matches!(self, MapTarget::Normal)
    }

    /// Parse a target name; bare `ao`/`roughness`/`metalness` are accepted
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "normal" => Some(MapTarget::Normal),
            "albedo" => Some(MapTarget::Albedo),
            "orm_ao" | "ao" => Some(MapTarget::OrmAo),
            "orm_roughness" | "roughness" => Some(MapTarget::OrmRoughness),
            "orm_metalness" | "metalness" => Some(MapTarget::OrmMetalness),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Auto,
    Manual,
}

impl ExecutionMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(ExecutionMode::Auto),
            "manual" => Some(ExecutionMode::Manual),
            _ => None,
        }
    }
}

/// Where a layer's noise is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPath {
    /// Live per-pixel evaluation
    Shader,
    /// Precomputed once into a texture
    TextureBaked,
    /// Low-frequency bake plus live detail
    #[default]
    Hybrid,
}

impl ExecutionPath {
    pub const ALL: [ExecutionPath; 3] = [
        ExecutionPath::Shader,
        ExecutionPath::TextureBaked,
        ExecutionPath::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionPath::Shader => "shader",
            ExecutionPath::TextureBaked => "texture_baked",
            ExecutionPath::Hybrid => "hybrid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|p| p.as_str() == wanted)
    }
}

impl std::fmt::Display for ExecutionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution hints and manual override for one layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionConfig {
    pub mode: ExecutionMode,
    /// Only authoritative when `mode == Manual`
    pub manual_path: ExecutionPath,
    /// Inputs to this layer vary at runtime
    pub dynamic_runtime: bool,
    /// Layer tiles over large physical extents
    pub large_scale_world: bool,
}

impl ExecutionConfig {
    fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        Self {
            mode: read_str(value, "mode")
                .and_then(ExecutionMode::parse)
                .unwrap_or(defaults.mode),
            manual_path: read_str(value, "manualPath")
                .and_then(ExecutionPath::parse)
                .unwrap_or(defaults.manual_path),
            dynamic_runtime: read_bool(value, "dynamicRuntime").unwrap_or(false),
            large_scale_world: read_bool(value, "largeScaleWorld").unwrap_or(false),
        }
    }
}

// ============================================================================
// NoiseLayer
// ============================================================================

/// One entry in the noise stack
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoiseLayer {
    /// Stable id, unique within a stack (`layer-N`)
    pub id: String,
    pub generator_id: String,
    pub name: String,
    pub description: String,
    /// `None` once parameters diverge from any preset
    pub preset_id: Option<String>,
    pub blend_mode: BlendMode,
    pub strength: f64,
    pub lock: bool,
    pub solo: bool,
    pub map_target: MapTarget,
    pub transform: UvTransform,
    pub params: NoiseParams,
    pub execution: ExecutionConfig,
}

impl NoiseLayer {
    /// Fresh layer running `generator` at its defaults
    pub fn new(id: impl Into<String>, generator: &dyn NoiseGenerator) -> Self {
        Self {
            id: id.into(),
            generator_id: generator.id().to_string(),
            name: generator.label().to_string(),
            description: String::new(),
            preset_id: None,
            blend_mode: BlendMode::default(),
            strength: 1.0,
            lock: false,
            solo: false,
            map_target: MapTarget::default(),
            transform: UvTransform::IDENTITY,
            params: generator.defaults(),
            execution: ExecutionConfig::default(),
        }
    }

    pub fn generator(&self) -> &'static dyn NoiseGenerator {
        resolve_generator(&self.generator_id)
    }

    /// Read a layer from loosely shaped JSON without validating it.
    ///
    /// Missing fields get defaults; the stack assigns ids and sanitizes.
    pub fn from_value(value: &Value) -> Self {
        let generator_id = read_str(value, "generatorId");
        let mut layer = Self::new(
            read_str(value, "id").unwrap_or_default(),
            resolve_generator(generator_id.unwrap_or(DEFAULT_GENERATOR_ID)),
        );
        if let Some(generator_id) = generator_id {
            layer.generator_id = generator_id.to_string();
        }

        if let Some(name) = read_str(value, "name") {
            layer.name = name.to_string();
        }
        if let Some(description) = read_str(value, "description") {
            layer.description = description.to_string();
        }
        layer.preset_id = read_str(value, "presetId").map(str::to_string);
        if let Some(mode) = read_str(value, "blendMode").and_then(BlendMode::parse) {
            layer.blend_mode = mode;
        }
        if let Some(strength) = read_f64(value, "strength") {
            layer.strength = strength;
        }
        layer.lock = read_bool(value, "lock").unwrap_or(false);
        layer.solo = read_bool(value, "solo").unwrap_or(false);
        if let Some(target) = read_str(value, "mapTarget").and_then(MapTarget::parse) {
            layer.map_target = target;
        }
        if let Some(transform) = value.get("transform") {
            layer.transform = UvTransform {
                scale: read_f64(transform, "scale").unwrap_or(1.0),
                rotation_deg: read_f64(transform, "rotationDeg").unwrap_or(0.0),
                offset_u: read_f64(transform, "offsetU").unwrap_or(0.0),
                offset_v: read_f64(transform, "offsetV").unwrap_or(0.0),
            };
        }
        if let Some(params) = value.get("params") {
            layer.params = NoiseParams::from_json(params);
        }
        if let Some(execution) = value.get("execution") {
            layer.execution = ExecutionConfig::from_value(execution);
        }
        layer
    }

    /// Normalize every field into its declared domain.
    ///
    /// An unknown generator falls back to the default kind and records a
    /// warning. The id is trimmed but uniqueness is the stack's concern.
    pub fn sanitize(&self, warnings: &mut Vec<String>) -> Self {
        let generator = self.generator();
        if generator.id() != self.generator_id {
            warnings.push(format!(
                "Unknown generator \"{}\"; using {}.",
                self.generator_id,
                generator.id()
            ));
        }

        let name = truncate_text(&self.name, MAX_NAME_LEN);
        let preset_id = self
            .preset_id
            .as_deref()
            .filter(|id| generator.preset(id).is_some())
            .map(str::to_string);

        Self {
            id: truncate_text(&self.id, MAX_ID_LEN),
            generator_id: generator.id().to_string(),
            name: if name.is_empty() {
                generator.label().to_string()
            } else {
                name
            },
            description: truncate_text(&self.description, MAX_DESCRIPTION_LEN),
            preset_id,
            blend_mode: self.blend_mode,
            strength: if self.strength.is_finite() {
                self.strength.clamp(0.0, 1.0)
            } else {
                1.0
            },
            lock: self.lock,
            solo: self.solo,
            map_target: self.map_target,
            transform: self.transform.sanitized(),
            params: generator.sanitize(&self.params),
            execution: self.execution,
        }
    }

    /// Sanitize, discarding warnings
    pub fn sanitized(&self) -> Self {
        self.sanitize(&mut Vec::new())
    }

    /// Whether this layer changes the output at all
    pub fn is_active(&self) -> bool {
        self.strength > 0.0
    }
}

// ============================================================================
// Lenient JSON readers
// ============================================================================

pub(crate) fn read_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Numbers, or numeric strings
pub(crate) fn read_f64(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn read_bool(value: &Value, key: &str) -> Option<bool> {
    match value.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::get_generator;
    use serde_json::json;

    #[test]
    fn test_new_layer_defaults() {
        let layer = NoiseLayer::new("layer-1", get_generator("cellular").unwrap());
        assert_eq!(layer.generator_id, "cellular");
        assert_eq!(layer.name, "Cellular");
        assert_eq!(layer.strength, 1.0);
        assert_eq!(layer.map_target, MapTarget::Albedo);
        assert!(layer.transform.is_identity());
        assert_eq!(layer.params.get_f64("scale"), 8.0);
    }

    #[test]
    fn test_enum_parsing_is_lenient() {
        assert_eq!(BlendMode::parse(" Screen "), Some(BlendMode::Screen));
        assert_eq!(BlendMode::parse("overlay"), None);
        assert_eq!(MapTarget::parse("roughness"), Some(MapTarget::OrmRoughness));
        assert_eq!(MapTarget::parse("orm-ao"), Some(MapTarget::OrmAo));
        assert_eq!(ExecutionPath::parse("texture-baked"), Some(ExecutionPath::TextureBaked));
    }

    #[test]
    fn test_albedo_family() {
        assert!(!MapTarget::Normal.is_albedo_family());
        assert!(MapTarget::OrmMetalness.is_albedo_family());
    }

    #[test]
    fn test_sanitize_clamps_and_warns_on_unknown_generator() {
        let value = json!({
            "id": "layer-3",
            "generatorId": "perlin",
            "name": "   ",
            "strength": 4.0,
            "presetId": "veins",
            "params": {"scale": 9000}
        });
        let mut warnings = Vec::new();
        let layer = NoiseLayer::from_value(&value).sanitize(&mut warnings);
        assert_eq!(layer.generator_id, "value_fbm");
        assert_eq!(layer.name, "Value fBm");
        assert_eq!(layer.strength, 1.0);
        assert_eq!(layer.preset_id, None);
        assert_eq!(layer.params.get_f64("scale"), 256.0);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("perlin"));
    }

    #[test]
    fn test_serialized_layer_reads_back() {
        let mut layer = NoiseLayer::new("layer-7", get_generator("line_bands").unwrap());
        layer.blend_mode = BlendMode::Multiply;
        layer.map_target = MapTarget::OrmRoughness;
        layer.preset_id = Some("pinstripe".to_string());
        layer.execution.mode = ExecutionMode::Manual;
        layer.transform.rotation_deg = 30.0;
        let layer = layer.sanitized();

        let value = serde_json::to_value(&layer).unwrap();
        assert_eq!(value["mapTarget"], "orm_roughness");
        assert_eq!(value["execution"]["manualPath"], "hybrid");
        assert_eq!(NoiseLayer::from_value(&value).sanitized(), layer);
    }
}
