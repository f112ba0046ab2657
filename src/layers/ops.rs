//! State mutation API
//!
//! Every operation takes the current state by reference and returns a new,
//! re-sanitized state. Nothing here fails: rejected edits leave the state
//! unchanged apart from a recorded warning.
//!
//! Locked layers refuse edits to their content (params, transform, blend,
//! strength, target, name, description, preset, execution). Lock and solo
//! toggles, reordering and duplication stay available.

use tracing::debug;

use super::catalog::{find_entry, CatalogEntry};
use super::layer::{BlendMode, ExecutionMode, ExecutionPath, MapTarget, NoiseLayer};
use super::stack::{
    normalize_hex_color, snap_texture_size, AssistantQuestions, ExportTargets, FabricationState,
    PreviewMode, MAX_LAYERS,
};
use crate::engine::TransformPatch;
use crate::generators::ParamValue;

impl FabricationState {
    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Apply `edit` to one unlocked layer of a copy of this state
    fn edit_layer<F>(&self, layer_id: &str, action: &str, edit: F) -> Self
    where
        F: FnOnce(&mut NoiseLayer, &mut Vec<String>),
    {
        let mut next = self.clone();
        let mut warnings = Vec::new();
        match next.layers.iter_mut().find(|l| l.id == layer_id) {
            None => warnings.push(unknown_layer(layer_id, action)),
            Some(layer) if layer.lock => warnings.push(locked_layer(&layer.name, action)),
            Some(layer) => edit(layer, &mut warnings),
        }
        next.finish(warnings)
    }

    /// Apply `edit` to one layer regardless of its lock
    fn edit_layer_unlocked<F>(&self, layer_id: &str, action: &str, edit: F) -> Self
    where
        F: FnOnce(&mut NoiseLayer),
    {
        let mut next = self.clone();
        let mut warnings = Vec::new();
        match next.layers.iter_mut().find(|l| l.id == layer_id) {
            Some(layer) => edit(layer),
            None => warnings.push(unknown_layer(layer_id, action)),
        }
        next.finish(warnings)
    }

    fn finish(mut self, warnings: Vec<String>) -> Self {
        for message in warnings {
            self.push_warning(message);
        }
        self.sanitized()
    }

    fn layer_from_entry(&mut self, entry: &CatalogEntry) -> NoiseLayer {
        let mut layer = NoiseLayer::new(self.allocate_layer_id(), entry.generator);
        layer.name = entry.label();
        layer.preset_id = entry.preset.map(|p| p.id.to_string());
        layer.params = entry.params();
        layer
    }

    // ========================================================================
    // Stack structure
    // ========================================================================

    /// Append a layer built from a catalog entry and make it active
    pub fn add_layer_from_catalog(&self, entry_id: &str) -> Self {
        let mut next = self.clone();
        let Some(entry) = find_entry(entry_id) else {
            return next.finish(vec![unknown_entry(entry_id)]);
        };
        if next.layers.len() >= MAX_LAYERS {
            return next.finish(vec![format!(
                "Layer limit of {} reached; new layer not added.",
                MAX_LAYERS
            )]);
        }
        let layer = next.layer_from_entry(&entry);
        debug!(layer_id = %layer.id, entry = %entry.id(), "Added layer");
        next.active_layer_id = layer.id.clone();
        next.layers.push(layer);
        next.finish(Vec::new())
    }

    /// Swap a layer's generator for a catalog entry, keeping its placement
    pub fn replace_layer_generator(&self, layer_id: &str, entry_id: &str) -> Self {
        let Some(entry) = find_entry(entry_id) else {
            return self.clone().finish(vec![unknown_entry(entry_id)]);
        };
        self.edit_layer(layer_id, "generator change", |layer, _| {
            layer.generator_id = entry.generator.id().to_string();
            layer.name = entry.label();
            layer.preset_id = entry.preset.map(|p| p.id.to_string());
            layer.params = entry.params();
        })
    }

    /// Insert a copy right after the source layer; the copy becomes active
    pub fn duplicate_layer(&self, layer_id: &str) -> Self {
        let mut next = self.clone();
        let Some(index) = next.layers.iter().position(|l| l.id == layer_id) else {
            return next.finish(vec![unknown_layer(layer_id, "duplicate")]);
        };
        if next.layers.len() >= MAX_LAYERS {
            return next.finish(vec![format!(
                "Layer limit of {} reached; duplicate not added.",
                MAX_LAYERS
            )]);
        }
        let mut copy = next.layers[index].clone();
        copy.id = next.allocate_layer_id();
        copy.name = format!("{} copy", copy.name);
        copy.lock = false;
        next.active_layer_id = copy.id.clone();
        next.layers.insert(index + 1, copy);
        next.finish(Vec::new())
    }

    /// Remove a layer. Removing the last layer leaves a fresh default layer.
    pub fn remove_layer(&self, layer_id: &str) -> Self {
        let mut next = self.clone();
        let Some(index) = next.layers.iter().position(|l| l.id == layer_id) else {
            return next.finish(vec![unknown_layer(layer_id, "removal")]);
        };
        if next.layers[index].lock {
            let warning = locked_layer(&next.layers[index].name, "removal");
            return next.finish(vec![warning]);
        }
        next.layers.remove(index);
        if next.active_layer_id == layer_id {
            // Prefer the neighbour that slid into the removed slot
            let neighbour = index.min(next.layers.len().saturating_sub(1));
            next.active_layer_id = next
                .layers
                .get(neighbour)
                .map(|l| l.id.clone())
                .unwrap_or_default();
        }
        next.finish(Vec::new())
    }

    pub fn set_active_layer(&self, layer_id: &str) -> Self {
        let mut next = self.clone();
        if next.layer(layer_id).is_none() {
            return next.finish(vec![unknown_layer(layer_id, "selection")]);
        }
        next.active_layer_id = layer_id.to_string();
        next.finish(Vec::new())
    }

    /// Reorder by an explicit id list.
    ///
    /// Unknown and repeated ids are ignored; layers not named keep their
    /// relative order after the named ones.
    pub fn reorder_layers(&self, order: &[&str]) -> Self {
        let mut next = self.clone();
        let mut remaining = std::mem::take(&mut next.layers);
        let mut ordered = Vec::with_capacity(remaining.len());
        for id in order {
            if let Some(index) = remaining.iter().position(|l| l.id == *id) {
                ordered.push(remaining.remove(index));
            }
        }
        ordered.extend(remaining);
        next.layers = ordered;
        next.finish(Vec::new())
    }

    // ========================================================================
    // Layer fields
    // ========================================================================

    pub fn rename_layer(&self, layer_id: &str, name: &str) -> Self {
        self.edit_layer(layer_id, "rename", |layer, _| layer.name = name.to_string())
    }

    pub fn set_layer_description(&self, layer_id: &str, description: &str) -> Self {
        self.edit_layer(layer_id, "description change", |layer, _| {
            layer.description = description.to_string()
        })
    }

    pub fn set_lock(&self, layer_id: &str, lock: bool) -> Self {
        self.edit_layer_unlocked(layer_id, "lock change", |layer| layer.lock = lock)
    }

    pub fn set_solo(&self, layer_id: &str, solo: bool) -> Self {
        self.edit_layer_unlocked(layer_id, "solo change", |layer| layer.solo = solo)
    }

    pub fn set_blend_mode(&self, layer_id: &str, mode: BlendMode) -> Self {
        self.edit_layer(layer_id, "blend mode change", |layer, _| layer.blend_mode = mode)
    }

    pub fn set_strength(&self, layer_id: &str, strength: f64) -> Self {
        self.edit_layer(layer_id, "strength change", |layer, _| layer.strength = strength)
    }

    pub fn set_map_target(&self, layer_id: &str, target: MapTarget) -> Self {
        self.edit_layer(layer_id, "map target change", |layer, _| layer.map_target = target)
    }

    /// Merge a partial transform. World-space requests are sampled in UV.
    pub fn set_transform(&self, layer_id: &str, patch: &TransformPatch) -> Self {
        self.edit_layer(layer_id, "transform change", |layer, warnings| {
            if patch.requests_world_space() {
                warnings.push(format!(
                    "World-space sampling is not supported; layer \"{}\" uses UV space.",
                    layer.name
                ));
            }
            layer.transform = layer.transform.patched(patch);
        })
    }

    pub fn set_execution_mode(&self, layer_id: &str, mode: ExecutionMode) -> Self {
        self.edit_layer(layer_id, "execution mode change", |layer, _| {
            layer.execution.mode = mode
        })
    }

    pub fn set_manual_path(&self, layer_id: &str, path: ExecutionPath) -> Self {
        self.edit_layer(layer_id, "manual path change", |layer, _| {
            layer.execution.manual_path = path
        })
    }

    pub fn set_dynamic_runtime(&self, layer_id: &str, dynamic: bool) -> Self {
        self.edit_layer(layer_id, "dynamic runtime change", |layer, _| {
            layer.execution.dynamic_runtime = dynamic
        })
    }

    pub fn set_large_scale_world(&self, layer_id: &str, large_scale: bool) -> Self {
        self.edit_layer(layer_id, "large-scale flag change", |layer, _| {
            layer.execution.large_scale_world = large_scale
        })
    }

    /// Reset parameters to sanitized defaults with the preset applied
    pub fn set_preset(&self, layer_id: &str, preset_id: &str) -> Self {
        self.edit_layer(layer_id, "preset change", |layer, warnings| {
            let generator = layer.generator();
            match generator.preset_params(preset_id) {
                Some(params) => {
                    layer.params = params;
                    layer.preset_id = Some(preset_id.to_string());
                }
                None => warnings.push(format!(
                    "Unknown preset \"{}\" for generator \"{}\".",
                    preset_id,
                    generator.id()
                )),
            }
        })
    }

    /// Set one parameter; the layer no longer matches any preset
    pub fn set_param(&self, layer_id: &str, key: &str, value: impl Into<ParamValue>) -> Self {
        let value = value.into();
        self.edit_layer(layer_id, "parameter change", |layer, warnings| {
            let generator = layer.generator();
            if !generator.schema().iter().any(|spec| spec.key == key) {
                warnings.push(format!(
                    "Generator \"{}\" has no parameter \"{}\".",
                    generator.id(),
                    key
                ));
                return;
            }
            layer.params.insert(key, value);
            layer.preset_id = None;
        })
    }

    // ========================================================================
    // Stack settings
    // ========================================================================

    pub fn set_preview_mode(&self, mode: PreviewMode) -> Self {
        let mut next = self.clone();
        next.preview_mode = mode;
        next.finish(Vec::new())
    }

    /// Accepts `#rgb` or `#rrggbb`; anything else keeps the current color
    pub fn set_base_color(&self, color: &str) -> Self {
        let mut next = self.clone();
        match normalize_hex_color(color) {
            Some(color) => {
                next.base_color = color;
                next.finish(Vec::new())
            }
            None => next.finish(vec![format!("Invalid base color \"{}\" ignored.", color)]),
        }
    }

    /// Snaps to the nearest supported size
    pub fn set_texture_size(&self, size: u32) -> Self {
        let mut next = self.clone();
        next.texture_size = snap_texture_size(size as f64);
        next.finish(Vec::new())
    }

    pub fn set_export_targets(&self, targets: ExportTargets) -> Self {
        let mut next = self.clone();
        next.export_targets = targets;
        next.finish(Vec::new())
    }

    pub fn set_assistant_questions(&self, questions: AssistantQuestions) -> Self {
        let mut next = self.clone();
        next.execution_assistant_questions = questions;
        next.finish(Vec::new())
    }

    pub fn clear_warnings(&self) -> Self {
        let mut next = self.clone();
        next.status_warnings.clear();
        next.finish(Vec::new())
    }
}

fn unknown_layer(layer_id: &str, action: &str) -> String {
    format!("Unknown layer \"{}\"; {} ignored.", layer_id, action)
}

fn locked_layer(name: &str, action: &str) -> String {
    format!("Layer \"{}\" is locked; {} ignored.", name, action)
}

fn unknown_entry(entry_id: &str) -> String {
    format!("Unknown catalog entry \"{}\".", entry_id)
}
