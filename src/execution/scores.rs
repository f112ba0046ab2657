//! Static layer scoring
//!
//! Three scores in [0, 1] estimated from a layer's generator, parameters
//! and transform alone. Nothing is rendered or timed.

use serde::{Deserialize, Serialize};

use crate::kernel::clamp01;
use crate::layers::{AssistantQuestions, NoiseLayer};

/// Calibration constants for the score formulas
pub mod weights {
    /// log2 frequency where the high-frequency score starts rising
    pub const HF_LOG_FLOOR: f64 = 3.0;
    /// log2 span over which the high-frequency score rises to 1
    pub const HF_LOG_SPAN: f64 = 7.0;
    /// log2 frequency at which the inverse-frequency world term reaches 0
    pub const WORLD_LOG_SPAN: f64 = 8.0;
    /// Transform scale under which a layer counts as zoomed out
    pub const SMALL_TRANSFORM_SCALE: f64 = 0.75;
    pub const SMALL_TRANSFORM_BOOST: f64 = 0.2;
    pub const LARGE_SCALE_FLAG_BOOST: f64 = 0.35;
    pub const HF_WORLD_PENALTY: f64 = 0.3;
    pub const TILING_HINT_BOOST: f64 = 0.1;
    pub const MEMORY_HINT_PENALTY: f64 = 0.1;
    pub const OCTAVE_COST: f64 = 0.05;
    /// Octaves included in every base cost
    pub const FREE_OCTAVES: f64 = 3.0;
    pub const TRANSFORM_ROTATION_COST: f64 = 0.08;
    pub const GENERATOR_ROTATION_COST: f64 = 0.04;
    pub const ANIMATION_COST_FACTOR: f64 = 0.5;
}

/// Scores for one layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerScores {
    /// Estimated dominant frequency in cycles per UV unit
    pub estimated_frequency: f64,
    pub high_frequency: f64,
    pub large_scale: f64,
    pub static_cost: f64,
}

/// Per-kind base evaluation cost
pub fn base_cost(generator_id: &str) -> f64 {
    match generator_id {
        "value_fbm" => 0.35,
        "ridged_fbm" => 0.40,
        "directional_fbm" => 0.40,
        "line_bands" => 0.15,
        "tile_grid" => 0.20,
        "cellular" => 0.55,
        "edge_wear" => 0.35,
        "micro_grain" => 0.25,
        "streak_flow" => 0.60,
        "crackle" => 0.75,
        "blotch" => 0.30,
        _ => 0.35,
    }
}

/// Dominant spatial frequency of a layer, including its transform scale.
///
/// Stretch only enters the estimate for directional fBm and streak flow.
pub fn estimate_frequency(layer: &NoiseLayer) -> f64 {
    let p = &layer.params;
    let fbm_frequency = || {
        let octaves = p.get_f64("octaves").max(1.0);
        p.get_f64("scale") * p.get_f64("lacunarity").powf((octaves - 1.0) / 2.0)
    };

    let frequency = match layer.generator_id.as_str() {
        "value_fbm" => fbm_frequency(),
        "ridged_fbm" => fbm_frequency() * 1.5,
        "directional_fbm" => {
            fbm_frequency() / p.get_f64("stretchU").min(p.get_f64("stretchV")).max(0.05)
        }
        "line_bands" => p.get_f64("count") / p.get_f64("width").max(0.05).sqrt(),
        "tile_grid" => {
            p.get_f64("columns").max(p.get_f64("rows"))
                / p.get_f64("grooveWidth").max(0.005).sqrt()
        }
        "cellular" => 2.0 * p.get_f64("scale"),
        "edge_wear" => 0.75 * p.get_f64("breakupScale"),
        "micro_grain" => {
            let octaves = p.get_f64("octaves").max(1.0);
            p.get_f64("scale") * p.get_f64("lacunarity").powf(octaves - 1.0)
        }
        "streak_flow" => p.get_f64("scale") * p.get_f64("stretch"),
        "crackle" => p.get_f64("scale") / p.get_f64("width").max(0.01).sqrt(),
        "blotch" => p.get_f64("scale"),
        _ => fbm_frequency(),
    };

    let frequency = frequency * layer.transform.scale;
    if frequency.is_finite() {
        frequency.max(0.0)
    } else {
        0.0
    }
}

/// Score a layer. `questions` are the stack-wide assistant hints.
pub fn score_layer(layer: &NoiseLayer, questions: &AssistantQuestions) -> LayerScores {
    use weights::*;

    let frequency = estimate_frequency(layer);
    let log_f = frequency.max(1.0).log2();

    let high_frequency = clamp01((log_f - HF_LOG_FLOOR) / HF_LOG_SPAN);

    let mut world = clamp01(1.0 - log_f / WORLD_LOG_SPAN);
    if layer.transform.scale < SMALL_TRANSFORM_SCALE {
        world += SMALL_TRANSFORM_BOOST;
    }
    if layer.execution.large_scale_world {
        world += LARGE_SCALE_FLAG_BOOST;
    }
    world -= HF_WORLD_PENALTY * high_frequency;
    if questions.surfaces_tile_large_areas {
        world += TILING_HINT_BOOST;
    }
    if questions.texture_memory_constrained {
        world -= MEMORY_HINT_PENALTY;
    }

    LayerScores {
        estimated_frequency: frequency,
        high_frequency,
        large_scale: clamp01(world),
        static_cost: static_cost(layer, questions),
    }
}

fn static_cost(layer: &NoiseLayer, questions: &AssistantQuestions) -> f64 {
    use weights::*;

    if layer.execution.dynamic_runtime {
        return 0.0;
    }

    let p = &layer.params;
    let mut cost = base_cost(&layer.generator_id);
    cost += OCTAVE_COST * (p.get_f64("octaves") - FREE_OCTAVES).max(0.0);
    if layer.transform.rotation_deg.rem_euclid(90.0) != 0.0 {
        cost += TRANSFORM_ROTATION_COST;
    }
    if p.get_f64("rotation") != 0.0 || p.get_f64("direction") != 0.0 {
        cost += GENERATOR_ROTATION_COST;
    }
    if questions.parameters_animate {
        cost *= ANIMATION_COST_FACTOR;
    }
    if questions.texture_memory_constrained {
        cost -= MEMORY_HINT_PENALTY;
    }
    clamp01(cost)
}
