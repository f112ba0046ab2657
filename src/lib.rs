//! Fabrica - Layered Procedural Noise Synthesis
//!
//! A declarative stack of noise layers, each backed by a deterministic 2D
//! kernel and composited through blend operators into one scalar field.
//!
//! # Architecture
//!
//! - `kernel`: integer hashing, value noise and fBm
//! - `generators`: the registry of noise kinds with schemas and presets
//! - `layers`: layer and stack model with copy-on-write mutations
//! - `engine`: field buffers, UV transform and the compositor
//! - `execution`: static shader / baked / hybrid path classification
//! - `state`: migration, export scope, recipes and recipe files
//!
//! Mutation and generation never fail. Problems are sanitized away and
//! recorded as warnings on the state; only the recipe boundary returns
//! errors.

pub mod cli;
pub mod engine;
pub mod error;
pub mod execution;
pub mod generators;
pub mod kernel;
pub mod layers;
pub mod state;

pub use engine::{
    generate, generate_pass, generate_sized, GenerationResult, RenderPass, ScalarField,
};
pub use error::{FabricaError, Result};
pub use execution::{classify_stack, classify_stack_with_overrides, ExecutionPlan};
pub use layers::FabricationState;
pub use state::{export_recipe, parse_recipe, serialize_recipe};
