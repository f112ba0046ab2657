//! Field Engine Module
//!
//! Scalar field buffers and the pipeline that turns a fabrication state
//! into one composite field:
//! - Field storage and digests
//! - Per-layer UV transform
//! - Compositing of eligible layers

pub mod compositor;
pub mod field;
pub mod transform;

pub use compositor::{
    blend, blend_into, eligible_layers, generate, generate_pass, generate_sized, render_layer,
    GenerationResult, RenderPass, BASE_LEVEL,
};
pub use field::{FieldStats, ScalarField};
pub use transform::{SamplingSpace, TransformPatch, UvTransform, MAX_SCALE, MIN_SCALE};
