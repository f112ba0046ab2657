//! Error handling for Fabrica
//!
//! Field generation and layer mutation never fail: they sanitize and record
//! warnings on the state. Errors are reserved for the recipe boundary
//! (parsing, export validation, file storage).

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Fabrica operations
pub type Result<T> = std::result::Result<T, FabricaError>;

/// Main error type for Fabrica operations
#[derive(Error, Debug)]
pub enum FabricaError {
    // Recipe Errors
    #[error("Recipe is not valid JSON: {0}")]
    RecipeParse(#[from] serde_json::Error),

    #[error("Malformed recipe: {reason}")]
    MalformedRecipe { reason: String },

    #[error("Recipe tool tag mismatch: found '{found}', expected '{expected}'")]
    ToolMismatch { found: String, expected: String },

    #[error("Unsupported recipe version: {version}")]
    UnsupportedRecipeVersion { version: String },

    // Export Errors
    #[error("Export validation failed: {}", errors.join("; "))]
    ExportValidation { errors: Vec<String> },

    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FabricaError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            FabricaError::RecipeParse(_) => "RECIPE_PARSE",
            FabricaError::MalformedRecipe { .. } => "MALFORMED_RECIPE",
            FabricaError::ToolMismatch { .. } => "TOOL_MISMATCH",
            FabricaError::UnsupportedRecipeVersion { .. } => "UNSUPPORTED_RECIPE_VERSION",
            FabricaError::ExportValidation { .. } => "EXPORT_VALIDATION",
            FabricaError::FileNotFound { .. } => "FILE_NOT_FOUND",
            FabricaError::FileReadError { .. } => "FILE_READ_ERROR",
            FabricaError::FileWriteError { .. } => "FILE_WRITE_ERROR",
        }
    }

    /// Check if the caller can fix the input and try again
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FabricaError::ExportValidation { .. }
                | FabricaError::FileNotFound { .. }
                | FabricaError::FileWriteError { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            FabricaError::RecipeParse(_) | FabricaError::MalformedRecipe { .. } => vec![
                "Check that the file is a recipe exported by fabrica",
                "Re-export the recipe from the editor",
            ],
            FabricaError::ToolMismatch { .. } => vec![
                "The document was produced by a different tool",
                "Remove the 'tool' field to import it as a raw state",
            ],
            FabricaError::UnsupportedRecipeVersion { .. } => {
                vec!["Upgrade fabrica to a version that understands this recipe"]
            }
            FabricaError::ExportValidation { .. } => vec![
                "Assign at least one layer to every enabled export channel",
                "Or disable the export targets that have no contributors",
            ],
            FabricaError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            FabricaError::FileWriteError { .. } => vec![
                "Check that the destination directory is writable",
                "Free up disk space",
            ],
            _ => vec![],
        }
    }
}
