//! Layer & State Model
//!
//! - `layer`: one noise layer and its enums
//! - `stack`: the full fabrication state and its sanitizer
//! - `ops`: copy-on-write mutation API on `FabricationState`
//! - `catalog`: selectable generator/preset entries

mod catalog;
mod layer;
mod ops;
mod stack;

pub use catalog::{catalog, find_entry, CatalogEntry, CatalogListing};
pub use layer::{
    BlendMode, ExecutionConfig, ExecutionMode, ExecutionPath, MapTarget, NoiseLayer,
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN,
};
pub use stack::{
    normalize_hex_color, snap_texture_size, AssistantQuestions, ExportTargets, FabricationState,
    PreviewMode, DEFAULT_BASE_COLOR, DEFAULT_TEXTURE_SIZE, MAX_LAYERS, MAX_LAYER_NUMBER,
    MAX_WARNINGS, STATE_VERSION, TEXTURE_SIZES,
};
