//! State Persistence Module
//!
//! Everything at the boundary of a fabrication state:
//! - Migration of legacy and loosely shaped state JSON
//! - Export scope and validation
//! - Recipe documents
//! - Recipe files on disk

pub mod export;
pub mod migration;
pub mod recipe;
pub mod storage;

pub use export::{ExportBuckets, ExportScope, OrmPacking};
pub use migration::{
    detect_state_version, migrate_state, migrate_state_value, MigratedState,
    LEGACY_MIGRATION_WARNING, LEGACY_STATE_VERSION, UNSUPPORTED_SHAPE_WARNING,
};
pub use recipe::{
    export_recipe, parse_recipe, parse_recipe_document, parse_recipe_value, serialize_recipe,
    ParsedRecipe, RecipeDocument, RECIPE_TOOL_TAG, RECIPE_VERSION,
};
pub use storage::{
    find_recipes, load_recipe, load_recipe_document, save_recipe, save_recipe_document,
};
