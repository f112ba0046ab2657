//! Fabrication state: the whole layer stack plus preview/export settings
//!
//! Every state that leaves this crate has been through `sanitized()`.
//! Sanitizing is total and idempotent; problems become warning strings
//! rather than errors.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::layer::{read_bool, read_f64, read_str, NoiseLayer};
use crate::generators::resolve_generator;

// ============================================================================
// Constants
// ============================================================================

/// Layered state shape; version 1 is the legacy single-layer shape
pub const STATE_VERSION: u32 = 2;

pub const MAX_LAYERS: usize = 12;

pub const MAX_WARNINGS: usize = 32;

/// Upper bound of the `layer-N` counter; larger numbers in ids are ignored
pub const MAX_LAYER_NUMBER: u32 = 1_000_000_000;

pub const TEXTURE_SIZES: [u32; 4] = [256, 512, 1024, 2048];

pub const DEFAULT_TEXTURE_SIZE: u32 = 512;

pub const DEFAULT_BASE_COLOR: &str = "#808080";

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
    #[default]
    Albedo,
    Normal,
}

impl PreviewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewMode::Albedo => "albedo",
            PreviewMode::Normal => "normal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "albedo" => Some(PreviewMode::Albedo),
            "normal" => Some(PreviewMode::Normal),
            _ => None,
        }
    }
}

/// Output channels requested for export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTargets {
    pub normal: bool,
    pub albedo: bool,
    pub orm: bool,
}

impl Default for ExportTargets {
    fn default() -> Self {
        Self {
            normal: false,
            albedo: true,
            orm: false,
        }
    }
}

/// Yes/no hints that nudge the execution classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantQuestions {
    /// Parameters are animated at runtime
    pub parameters_animate: bool,
    /// Surfaces repeat the texture over large areas
    pub surfaces_tile_large_areas: bool,
    /// Texture memory is scarce on the target
    pub texture_memory_constrained: bool,
}

// ============================================================================
// FabricationState
// ============================================================================

/// The complete editable noise stack
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricationState {
    pub version: u32,
    pub layers: Vec<NoiseLayer>,
    pub active_layer_id: String,
    /// Monotonic counter for fresh `layer-N` ids
    pub next_layer_id: u32,
    pub preview_mode: PreviewMode,
    /// `#rrggbb`, lower-case
    pub base_color: String,
    pub texture_size: u32,
    pub export_targets: ExportTargets,
    pub execution_assistant_questions: AssistantQuestions,
    pub status_warnings: Vec<String>,
}

impl Default for FabricationState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            layers: vec![default_layer(1)],
            active_layer_id: layer_id(1),
            next_layer_id: 2,
            preview_mode: PreviewMode::default(),
            base_color: DEFAULT_BASE_COLOR.to_string(),
            texture_size: DEFAULT_TEXTURE_SIZE,
            export_targets: ExportTargets::default(),
            execution_assistant_questions: AssistantQuestions::default(),
            status_warnings: Vec::new(),
        }
    }
}

impl FabricationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(&self, layer_id: &str) -> Option<&NoiseLayer> {
        self.layers.iter().find(|l| l.id == layer_id)
    }

    pub fn active_layer(&self) -> Option<&NoiseLayer> {
        self.layer(&self.active_layer_id)
    }

    /// Append a warning unless it is already present; the oldest entries
    /// are dropped beyond `MAX_WARNINGS`.
    pub fn push_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.status_warnings.contains(&message) {
            return;
        }
        warn!("{}", message);
        self.status_warnings.push(message);
        if self.status_warnings.len() > MAX_WARNINGS {
            let excess = self.status_warnings.len() - MAX_WARNINGS;
            self.status_warnings.drain(..excess);
        }
    }

    /// Allocate the next `layer-N` id not held by any layer
    pub(crate) fn allocate_layer_id(&mut self) -> String {
        let taken: HashSet<String> = self.layers.iter().map(|l| l.id.clone()).collect();
        fresh_layer_id(&mut self.next_layer_id, &taken)
    }

    /// Normalize the whole state.
    ///
    /// - layers are sanitized, given unique ids and capped at `MAX_LAYERS`
    /// - an empty stack gets one default layer
    /// - the active id always names an existing layer
    /// - base color, texture size and warnings are normalized
    pub fn sanitized(&self) -> Self {
        let mut warnings = Vec::new();
        let mut layers: Vec<NoiseLayer> = self
            .layers
            .iter()
            .map(|layer| layer.sanitize(&mut warnings))
            .collect();

        let mut next_id = self.next_layer_id.clamp(1, MAX_LAYER_NUMBER);
        for layer in &layers {
            if let Some(n) = parse_layer_number(&layer.id) {
                next_id = next_id.max(n + 1);
            }
        }

        let mut taken: HashSet<String> = layers.iter().map(|l| l.id.clone()).collect();
        let mut seen = HashSet::new();
        for layer in &mut layers {
            if layer.id.is_empty() || seen.contains(&layer.id) {
                layer.id = fresh_layer_id(&mut next_id, &taken);
                taken.insert(layer.id.clone());
            }
            seen.insert(layer.id.clone());
        }

        if layers.len() > MAX_LAYERS {
            layers.truncate(MAX_LAYERS);
            warnings.push(format!(
                "Stack exceeds {} layers; extra layers dropped.",
                MAX_LAYERS
            ));
        }
        if layers.is_empty() {
            let id = fresh_layer_id(&mut next_id, &HashSet::new());
            layers.push(NoiseLayer::new(id, resolve_generator("")));
        }

        let active_layer_id = if layers.iter().any(|l| l.id == self.active_layer_id) {
            self.active_layer_id.clone()
        } else {
            layers[0].id.clone()
        };

        let mut state = Self {
            version: STATE_VERSION,
            layers,
            active_layer_id,
            next_layer_id: next_id,
            preview_mode: self.preview_mode,
            base_color: normalize_hex_color(&self.base_color)
                .unwrap_or_else(|| DEFAULT_BASE_COLOR.to_string()),
            texture_size: snap_texture_size(self.texture_size as f64),
            export_targets: self.export_targets,
            execution_assistant_questions: self.execution_assistant_questions,
            status_warnings: Vec::new(),
        };

        let mut existing: Vec<String> = Vec::new();
        for message in &self.status_warnings {
            if !existing.contains(message) {
                existing.push(message.clone());
            }
        }
        if existing.len() > MAX_WARNINGS {
            existing.drain(..existing.len() - MAX_WARNINGS);
        }
        state.status_warnings = existing;
        for message in warnings {
            state.push_warning(message);
        }
        state
    }

    /// Read a layered (version 2) state from loosely shaped JSON.
    ///
    /// Legacy shapes must be migrated first. The result is sanitized.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let layers = value
            .get("layers")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(NoiseLayer::from_value).collect())
            .unwrap_or_default();

        let export_targets = value
            .get("exportTargets")
            .map(|targets| ExportTargets {
                normal: read_bool(targets, "normal").unwrap_or(defaults.export_targets.normal),
                albedo: read_bool(targets, "albedo").unwrap_or(defaults.export_targets.albedo),
                orm: read_bool(targets, "orm").unwrap_or(defaults.export_targets.orm),
            })
            .unwrap_or(defaults.export_targets);

        let questions = value
            .get("executionAssistantQuestions")
            .map(|q| AssistantQuestions {
                parameters_animate: read_bool(q, "parametersAnimate").unwrap_or(false),
                surfaces_tile_large_areas: read_bool(q, "surfacesTileLargeAreas")
                    .unwrap_or(false),
                texture_memory_constrained: read_bool(q, "textureMemoryConstrained")
                    .unwrap_or(false),
            })
            .unwrap_or_default();

        let status_warnings = value
            .get("statusWarnings")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            version: STATE_VERSION,
            layers,
            active_layer_id: read_str(value, "activeLayerId")
                .unwrap_or_default()
                .to_string(),
            next_layer_id: read_f64(value, "nextLayerId")
                .filter(|n| n.is_finite() && *n >= 1.0)
                .map(|n| n.min(MAX_LAYER_NUMBER as f64) as u32)
                .unwrap_or(1),
            preview_mode: read_str(value, "previewMode")
                .and_then(PreviewMode::parse)
                .unwrap_or_default(),
            base_color: read_str(value, "baseColor")
                .unwrap_or(DEFAULT_BASE_COLOR)
                .to_string(),
            texture_size: read_f64(value, "textureSize")
                .map(snap_texture_size)
                .unwrap_or(DEFAULT_TEXTURE_SIZE),
            export_targets,
            execution_assistant_questions: questions,
            status_warnings,
        }
        .sanitized()
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub(crate) fn layer_id(n: u32) -> String {
    format!("layer-{}", n)
}

/// Counter value of a `layer-N` id, below `MAX_LAYER_NUMBER`
fn parse_layer_number(id: &str) -> Option<u32> {
    id.strip_prefix("layer-")?
        .parse()
        .ok()
        .filter(|n| *n < MAX_LAYER_NUMBER)
}

/// Next unused `layer-N` id from the counter. Once the counter is
/// exhausted the lowest free number is handed out instead.
fn fresh_layer_id(next_id: &mut u32, taken: &HashSet<String>) -> String {
    while *next_id < MAX_LAYER_NUMBER {
        let id = layer_id(*next_id);
        *next_id += 1;
        if !taken.contains(&id) {
            return id;
        }
    }
    (1..MAX_LAYER_NUMBER)
        .map(layer_id)
        .find(|id| !taken.contains(id))
        .unwrap_or_else(|| layer_id(MAX_LAYER_NUMBER))
}

fn default_layer(n: u32) -> NoiseLayer {
    NoiseLayer::new(layer_id(n), resolve_generator(""))
}

/// Closest supported texture size; non-finite input gives the default
pub fn snap_texture_size(size: f64) -> u32 {
    if !size.is_finite() {
        return DEFAULT_TEXTURE_SIZE;
    }
    TEXTURE_SIZES
        .iter()
        .copied()
        .min_by(|a, b| {
            let da = (*a as f64 - size).abs();
            let db = (*b as f64 - size).abs();
            da.total_cmp(&db)
        })
        .unwrap_or(DEFAULT_TEXTURE_SIZE)
}

/// Normalize `#rgb` / `#rrggbb` (hash optional, any case) to `#rrggbb`
pub fn normalize_hex_color(input: &str) -> Option<String> {
    let hex = input.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    Some(format!("#{}", expanded.to_ascii_lowercase()))
}
