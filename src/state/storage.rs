//! Recipe file storage
//!
//! Saves go through a sibling temporary file and a rename, so an
//! interrupted save never leaves a truncated recipe behind.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;
use walkdir::WalkDir;

use super::recipe::{parse_recipe_document, ParsedRecipe, RecipeDocument};
use crate::error::{FabricaError, Result};
use crate::layers::FabricationState;

const RECIPE_EXTENSION: &str = "json";

/// Save `state` as a recipe stamped with the current time. The export
/// scope is not validated.
pub fn save_recipe(path: &Path, state: &FabricationState) -> Result<()> {
    save_recipe_document(path, &RecipeDocument::new(state).exported_at(Utc::now()))
}

/// Write an already built document
pub fn save_recipe_document(path: &Path, document: &RecipeDocument) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| FabricaError::FileWriteError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let content = document.to_json()?;
    let temp_path = temp_sibling(path);
    fs::write(&temp_path, content).map_err(|e| FabricaError::FileWriteError {
        path: temp_path.clone(),
        source: e,
    })?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(FabricaError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        });
    }

    info!(
        path = %path.display(),
        layers = document.state.layers.len(),
        "Saved recipe"
    );
    Ok(())
}

/// Load the state stored in a recipe file
pub fn load_recipe(path: &Path) -> Result<FabricationState> {
    Ok(load_recipe_document(path)?.state)
}

/// Load a recipe file, keeping the envelope metadata
pub fn load_recipe_document(path: &Path) -> Result<ParsedRecipe> {
    if !path.exists() {
        return Err(FabricaError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| FabricaError::FileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let parsed = parse_recipe_document(&content)?;

    info!(path = %path.display(), "Loaded recipe");
    Ok(parsed)
}

/// All `*.json` files below `dir`, sorted by path
pub fn find_recipes(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(FabricaError::FileNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut recipes: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(RECIPE_EXTENSION))
        })
        .map(|entry| entry.path().to_path_buf())
        .collect();

    recipes.sort();
    Ok(recipes)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "recipe".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("stack.json");
        let state = FabricationState::default().add_layer_from_catalog("crackle");

        save_recipe(&path, &state).unwrap();
        assert!(!temp_sibling(&path).exists());

        let parsed = load_recipe_document(&path).unwrap();
        assert_eq!(parsed.state, state.sanitized());
        assert!(parsed.exported_at.is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = load_recipe(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(FabricaError::FileNotFound { .. })));
    }

    #[test]
    fn test_find_recipes_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        for name in ["b.json", "a.JSON", "notes.txt", "sub/c.json"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        let found: Vec<String> = find_recipes(dir.path())
            .unwrap()
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(found, vec!["a.JSON", "b.json", "sub/c.json"]);
    }
}
