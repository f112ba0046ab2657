//! Execution Path Classifier
//!
//! Static per-layer analysis recommending live (`shader`), precomputed
//! (`texture_baked`) or combined (`hybrid`) evaluation.

mod classifier;
mod scores;

pub use classifier::{
    classify_stack, classify_stack_with_overrides, recommend_path, thresholds,
    ExecutionDecisionAssistant, ExecutionPlan, ExecutionSummary, LayerExecutionAnalysis,
    PathOverrides,
};
pub use scores::{base_cost, estimate_frequency, score_layer, weights, LayerScores};
