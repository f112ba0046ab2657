//! Recipe documents
//!
//! A recipe is the exportable form of a fabrication state: the sanitized
//! state wrapped with a tool tag, a format version and its export scope.
//!
//! ```json
//! { "tool": "fabrica.noise-stack", "version": 1, "exportScope": {..},
//!   "executionDecisionAssistant": {..}, "exportedAt": "..", "state": {..} }
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::export::ExportScope;
use super::migration::migrate_state;
use crate::error::{FabricaError, Result};
use crate::execution::{ExecutionDecisionAssistant, PathOverrides};
use crate::layers::{ExecutionPath, FabricationState};

/// Tag identifying recipes written by this crate
pub const RECIPE_TOOL_TAG: &str = "fabrica.noise-stack";

/// Newest recipe format this crate reads and the one it writes
pub const RECIPE_VERSION: u32 = 1;

/// Serializable recipe envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDocument {
    pub tool: String,
    pub version: u32,
    pub export_scope: ExportScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_decision_assistant: Option<ExecutionDecisionAssistant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
    pub state: FabricationState,
}

impl RecipeDocument {
    /// Wrap a sanitized copy of `state`
    pub fn new(state: &FabricationState) -> Self {
        let state = state.sanitized();
        Self {
            tool: RECIPE_TOOL_TAG.to_string(),
            version: RECIPE_VERSION,
            export_scope: ExportScope::build(&state),
            execution_decision_assistant: None,
            exported_at: None,
            state,
        }
    }

    /// Attach the assistant answers and confirmed path overrides; the
    /// execution summary in the scope follows the overrides.
    pub fn with_assistant(mut self, overrides: &PathOverrides) -> Self {
        self.export_scope = ExportScope::build_with_overrides(&self.state, overrides);
        self.execution_decision_assistant =
            Some(ExecutionDecisionAssistant::new(&self.state, overrides));
        self
    }

    pub fn exported_at(mut self, at: DateTime<Utc>) -> Self {
        self.exported_at = Some(at.to_rfc3339_opts(SecondsFormat::Millis, true));
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A recipe read back from text
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecipe {
    pub state: FabricationState,
    /// Confirmed overrides from the assistant block; empty when absent
    pub overrides: PathOverrides,
    pub exported_at: Option<String>,
    /// False when the document was a bare state without the envelope
    pub tagged: bool,
}

/// Serialize without validating the export scope
pub fn serialize_recipe(state: &FabricationState) -> Result<String> {
    RecipeDocument::new(state).to_json()
}

/// Validate the export scope, then serialize with the assistant block.
///
/// # Errors
/// `ExportValidation` listing every problem when the scope is not
/// exportable.
pub fn export_recipe(state: &FabricationState, overrides: &PathOverrides) -> Result<String> {
    let document = RecipeDocument::new(state).with_assistant(overrides);
    let errors = document.export_scope.validate();
    if !errors.is_empty() {
        return Err(FabricaError::ExportValidation { errors });
    }
    document.to_json()
}

/// Read a recipe, or a bare state, from text
pub fn parse_recipe(text: &str) -> Result<FabricationState> {
    Ok(parse_recipe_document(text)?.state)
}

/// Read a recipe, keeping the envelope metadata.
///
/// # Errors
/// - `RecipeParse` when the text is not JSON
/// - `MalformedRecipe` for a non-object root, or a tagged document whose
///   version is missing or whose state is not an object
/// - `ToolMismatch` when a tool tag is present but foreign
/// - `UnsupportedRecipeVersion` for a non-integer or too new version
pub fn parse_recipe_document(text: &str) -> Result<ParsedRecipe> {
    let value: Value = serde_json::from_str(text)?;
    parse_recipe_value(&value)
}

pub fn parse_recipe_value(value: &Value) -> Result<ParsedRecipe> {
    let Some(root) = value.as_object() else {
        return Err(malformed("recipe root must be an object"));
    };

    let Some(tool) = root.get("tool") else {
        // Bare state
        return Ok(ParsedRecipe {
            state: migrate_state(value),
            overrides: PathOverrides::new(),
            exported_at: None,
            tagged: false,
        });
    };

    if tool.as_str() != Some(RECIPE_TOOL_TAG) {
        return Err(FabricaError::ToolMismatch {
            found: tool
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| tool.to_string()),
            expected: RECIPE_TOOL_TAG.to_string(),
        });
    }

    check_version(root.get("version"))?;

    let state = match root.get("state") {
        Some(state) if state.is_object() => migrate_state(state),
        _ => return Err(malformed("recipe state must be an object")),
    };

    let overrides = root
        .get("executionDecisionAssistant")
        .and_then(|assistant| assistant.get("overrides"))
        .map(|overrides| read_overrides(overrides, &state))
        .unwrap_or_default();

    let exported_at = root
        .get("exportedAt")
        .and_then(Value::as_str)
        .map(str::to_string);

    info!(
        layers = state.layers.len(),
        overrides = overrides.len(),
        "Parsed recipe"
    );

    Ok(ParsedRecipe {
        state,
        overrides,
        exported_at,
        tagged: true,
    })
}

fn malformed(reason: &str) -> FabricaError {
    FabricaError::MalformedRecipe {
        reason: reason.to_string(),
    }
}

fn check_version(version: Option<&Value>) -> Result<()> {
    let Some(version) = version else {
        return Err(malformed("recipe has no version"));
    };
    match version.as_u64() {
        Some(v) if (1..=RECIPE_VERSION as u64).contains(&v) => Ok(()),
        _ => Err(FabricaError::UnsupportedRecipeVersion {
            version: version.to_string(),
        }),
    }
}

/// Keep overrides that name an existing layer and a known path
fn read_overrides(value: &Value, state: &FabricationState) -> PathOverrides {
    let Some(entries) = value.as_object() else {
        return PathOverrides::new();
    };
    entries
        .iter()
        .filter(|(layer_id, _)| state.layer(layer_id).is_some())
        .filter_map(|(layer_id, path)| {
            path.as_str()
                .and_then(ExecutionPath::parse)
                .map(|path| (layer_id.clone(), path))
        })
        .collect()
}
