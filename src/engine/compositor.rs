//! Compositor
//!
//! Folds the eligible layers of a stack into one field. Starts from flat
//! mid-grey, then for each layer in order: generate, transform, blend.

use std::fmt;

use tracing::debug;

use super::field::ScalarField;
use crate::layers::{BlendMode, FabricationState, MapTarget, NoiseLayer, PreviewMode};

/// Value of the flat base every composite starts from
pub const BASE_LEVEL: f32 = 0.5;

/// Which layers a render includes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPass {
    /// Editor preview: albedo shows the whole albedo/ORM family
    Preview(PreviewMode),
    /// A single export channel, exact target match
    Channel(MapTarget),
}

impl RenderPass {
    pub fn accepts(&self, target: MapTarget) -> bool {
        match self {
            RenderPass::Preview(PreviewMode::Albedo) => target.is_albedo_family(),
            RenderPass::Preview(PreviewMode::Normal) => target == MapTarget::Normal,
            RenderPass::Channel(channel) => target == *channel,
        }
    }
}

impl fmt::Display for RenderPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderPass::Preview(mode) => write!(f, "{} preview", mode.as_str()),
            RenderPass::Channel(target) => write!(f, "{} channel", target.as_str()),
        }
    }
}

/// Output of one generation call
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub width: u32,
    pub height: u32,
    pub field: ScalarField,
    /// Layers that were blended, in stack order
    pub contributing_layer_ids: Vec<String>,
    /// Input state plus any warnings raised while generating
    pub updated_state: FabricationState,
}

/// Blend one sample. `strength` is in [0, 1].
#[inline]
pub fn blend(mode: BlendMode, dst: f64, src: f64, strength: f64) -> f64 {
    let mix = |a: f64, b: f64| a * (1.0 - strength) + b * strength;
    let out = match mode {
        BlendMode::Normal => mix(dst, src),
        BlendMode::Add => dst + src * strength,
        BlendMode::Subtract => dst - src * strength,
        BlendMode::Multiply => mix(dst, dst * src),
        BlendMode::Screen => mix(dst, 1.0 - (1.0 - dst) * (1.0 - src)),
        BlendMode::Max => dst.max(src * strength),
        BlendMode::Min => mix(dst, dst.min(src)),
    };
    out.clamp(0.0, 1.0)
}

/// Blend `src` into `dst` sample by sample. Sizes must match.
pub fn blend_into(dst: &mut ScalarField, src: &ScalarField, mode: BlendMode, strength: f64) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.data_mut().iter_mut().zip(src.data()) {
        *d = blend(mode, *d as f64, *s as f64, strength) as f32;
    }
}

/// Layers that take part in `pass`, in stack order.
///
/// Any solo layer restricts the candidates to solo layers. Zero-strength
/// layers never participate.
pub fn eligible_layers(state: &FabricationState, pass: RenderPass) -> Vec<&NoiseLayer> {
    let any_solo = state.layers.iter().any(|l| l.solo);
    state
        .layers
        .iter()
        .filter(|l| !any_solo || l.solo)
        .filter(|l| l.is_active())
        .filter(|l| pass.accepts(l.map_target))
        .collect()
}

/// Render one layer at `width` x `height`, transformed but not blended
pub fn render_layer(layer: &NoiseLayer, width: u32, height: u32) -> ScalarField {
    let generated = layer.generator().generate(width, height, &layer.params);
    layer.transform.apply(&generated)
}

/// Composite the stack at its texture size for its preview mode
pub fn generate(state: &FabricationState) -> GenerationResult {
    let size = state.texture_size;
    generate_pass(state, size, size, RenderPass::Preview(state.preview_mode))
}

/// Composite the stack at an explicit size for its preview mode
pub fn generate_sized(state: &FabricationState, width: u32, height: u32) -> GenerationResult {
    generate_pass(state, width, height, RenderPass::Preview(state.preview_mode))
}

/// Composite the layers eligible for `pass`.
///
/// Never fails: with no eligible layers the flat base is returned and the
/// updated state carries a warning.
pub fn generate_pass(
    state: &FabricationState,
    width: u32,
    height: u32,
    pass: RenderPass,
) -> GenerationResult {
    let mut updated_state = state.sanitized();
    let mut field = ScalarField::filled(width, height, BASE_LEVEL);

    let layers = eligible_layers(&updated_state, pass);
    let contributing_layer_ids: Vec<String> = layers.iter().map(|l| l.id.clone()).collect();

    for layer in &layers {
        let layer_field = render_layer(layer, width, height);
        blend_into(&mut field, &layer_field, layer.blend_mode, layer.strength);
    }

    if contributing_layer_ids.is_empty() {
        updated_state.push_warning(format!(
            "No active layers for the {}; showing flat base.",
            pass
        ));
    }

    debug!(
        width,
        height,
        pass = %pass,
        layers = contributing_layer_ids.len(),
        "Generated composite"
    );

    GenerationResult {
        width,
        height,
        field,
        contributing_layer_ids,
        updated_state,
    }
}
