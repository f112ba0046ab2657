//! Execution path classification
//!
//! Walks the stack once, left to right. A dynamic-runtime layer forces live
//! evaluation on itself and on every later layer; otherwise the three
//! scores pick a path. Manual mode replaces the recommendation and a
//! confirmed per-call override replaces both.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::scores::{score_layer, LayerScores};
use crate::layers::{AssistantQuestions, ExecutionMode, ExecutionPath, FabricationState, NoiseLayer};

/// Classification thresholds.
///
/// Hand-tuned calibration values; keep them as they are.
pub mod thresholds {
    /// High-frequency score at or above which a layer counts as detailed
    pub const HIGH_FREQUENCY: f64 = 0.62;
    /// Large-scale score at or above which a layer counts as world-scale
    pub const LARGE_SCALE: f64 = 0.6;
    /// Static cost at or above which a layer counts as expensive
    pub const STATIC_COST: f64 = 0.7;
}

/// Confirmed per-layer path choices keyed by layer id
pub type PathOverrides = BTreeMap<String, ExecutionPath>;

/// Classification of one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerExecutionAnalysis {
    pub layer_id: String,
    pub generator_id: String,
    pub mode: ExecutionMode,
    pub manual_path: ExecutionPath,
    pub dynamic_runtime: bool,
    /// An earlier layer in the stack is dynamic
    pub inherited_dynamic: bool,
    pub large_scale_world: bool,
    pub scores: LayerScores,
    pub recommended_path: ExecutionPath,
    pub final_path: ExecutionPath,
    pub reasons: Vec<String>,
}

/// Layer ids grouped by final path, in stack order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSummary {
    pub shader: Vec<String>,
    pub texture_baked: Vec<String>,
    pub hybrid: Vec<String>,
}

/// Classification of a whole stack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub layers: Vec<LayerExecutionAnalysis>,
}

impl ExecutionPlan {
    pub fn layer(&self, layer_id: &str) -> Option<&LayerExecutionAnalysis> {
        self.layers.iter().find(|a| a.layer_id == layer_id)
    }

    pub fn summary(&self) -> ExecutionSummary {
        let mut summary = ExecutionSummary::default();
        for analysis in &self.layers {
            let bucket = match analysis.final_path {
                ExecutionPath::Shader => &mut summary.shader,
                ExecutionPath::TextureBaked => &mut summary.texture_baked,
                ExecutionPath::Hybrid => &mut summary.hybrid,
            };
            bucket.push(analysis.layer_id.clone());
        }
        summary
    }
}

/// Assistant answers, confirmed overrides and the resulting analysis, as
/// embedded in an exported recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionDecisionAssistant {
    pub questions: AssistantQuestions,
    pub overrides: PathOverrides,
    pub layers: Vec<LayerExecutionAnalysis>,
}

impl ExecutionDecisionAssistant {
    pub fn new(state: &FabricationState, overrides: &PathOverrides) -> Self {
        Self {
            questions: state.execution_assistant_questions,
            overrides: overrides.clone(),
            layers: classify_stack_with_overrides(state, overrides).layers,
        }
    }
}

/// Derive a path from flags and scores; first matching rule wins
pub fn recommend_path(
    scores: &LayerScores,
    dynamic_runtime: bool,
    inherited_dynamic: bool,
) -> (ExecutionPath, &'static str) {
    if dynamic_runtime {
        return (
            ExecutionPath::Shader,
            "Inputs vary at runtime; the layer must be evaluated live.",
        );
    }
    if inherited_dynamic {
        return (
            ExecutionPath::Shader,
            "An earlier layer is dynamic; live evaluation carries forward.",
        );
    }

    let high_frequency = scores.high_frequency >= thresholds::HIGH_FREQUENCY;
    let large_scale = scores.large_scale >= thresholds::LARGE_SCALE;
    let expensive = scores.static_cost >= thresholds::STATIC_COST;

    if expensive && !high_frequency {
        (
            ExecutionPath::TextureBaked,
            "Expensive to evaluate without fine detail; bake it.",
        )
    } else if expensive && large_scale {
        (
            ExecutionPath::TextureBaked,
            "Expensive and spread over large areas; bake it.",
        )
    } else if high_frequency && large_scale {
        (
            ExecutionPath::Hybrid,
            "Fine detail over large areas; bake the base and add live detail.",
        )
    } else if high_frequency {
        (
            ExecutionPath::Shader,
            "Fine detail that baking would blur; evaluate live.",
        )
    } else if large_scale {
        (
            ExecutionPath::TextureBaked,
            "Low-frequency and large-scale; bake it.",
        )
    } else {
        (
            ExecutionPath::Hybrid,
            "No score crosses a threshold; hybrid is the default.",
        )
    }
}

/// Classify every layer without overrides
pub fn classify_stack(state: &FabricationState) -> ExecutionPlan {
    classify_stack_with_overrides(state, &PathOverrides::new())
}

/// Classify every layer; `overrides` beat both recommendation and manual mode
pub fn classify_stack_with_overrides(
    state: &FabricationState,
    overrides: &PathOverrides,
) -> ExecutionPlan {
    let questions = &state.execution_assistant_questions;
    let mut dynamic_seen = false;
    let mut layers = Vec::with_capacity(state.layers.len());

    for layer in &state.layers {
        let analysis = classify_layer(layer, questions, dynamic_seen, overrides.get(&layer.id));
        dynamic_seen |= layer.execution.dynamic_runtime;
        layers.push(analysis);
    }

    let plan = ExecutionPlan { layers };
    let summary = plan.summary();
    debug!(
        shader = summary.shader.len(),
        texture_baked = summary.texture_baked.len(),
        hybrid = summary.hybrid.len(),
        "Classified stack"
    );
    plan
}

fn classify_layer(
    layer: &NoiseLayer,
    questions: &AssistantQuestions,
    inherited_dynamic: bool,
    override_path: Option<&ExecutionPath>,
) -> LayerExecutionAnalysis {
    let execution = &layer.execution;
    let scores = score_layer(layer, questions);
    let (recommended_path, why) =
        recommend_path(&scores, execution.dynamic_runtime, inherited_dynamic);

    let mut reasons = vec![
        format!(
            "Scores: high-frequency {:.2}, large-scale {:.2}, static cost {:.2}.",
            scores.high_frequency, scores.large_scale, scores.static_cost
        ),
        why.to_string(),
    ];

    let mut final_path = recommended_path;
    if execution.mode == ExecutionMode::Manual {
        final_path = execution.manual_path;
        reasons.push(format!("Manual mode selects {}.", final_path));
        if recommended_path == ExecutionPath::Shader
            && (execution.dynamic_runtime || inherited_dynamic)
            && final_path != ExecutionPath::Shader
        {
            reasons.push("Manual path overrides the live-evaluation requirement.".to_string());
        }
    }
    if let Some(path) = override_path {
        final_path = *path;
        reasons.push(format!("Confirmed override selects {}.", final_path));
    }

    LayerExecutionAnalysis {
        layer_id: layer.id.clone(),
        generator_id: layer.generator_id.clone(),
        mode: execution.mode,
        manual_path: execution.manual_path,
        dynamic_runtime: execution.dynamic_runtime,
        inherited_dynamic,
        large_scale_world: execution.large_scale_world,
        scores,
        recommended_path,
        final_path,
        reasons,
    }
}
