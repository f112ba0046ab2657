//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::io;
use std::path::Path;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::engine::{generate_pass, RenderPass};
use crate::error::{FabricaError, Result};
use crate::execution::classify_stack_with_overrides;
use crate::generators::{list_generators, ParamType};
use crate::layers::FabricationState;
use crate::state::{
    find_recipes, load_recipe, load_recipe_document, save_recipe, ExportScope,
};

/// Largest field the `render` command will allocate
pub const MAX_RENDER_SIZE: u32 = 4096;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_warnings(state: &FabricationState) {
    for warning in &state.status_warnings {
        println!("warning: {}", warning);
    }
}

/// List every noise kind with its parameter schema and presets.
pub fn show_generators(as_json: bool) -> Result<()> {
    if as_json {
        let generators: Vec<_> = list_generators()
            .map(|g| {
                json!({
                    "id": g.id(),
                    "label": g.label(),
                    "description": g.description(),
                    "params": g.schema(),
                    "presets": g.presets(),
                })
            })
            .collect();
        return print_json(&generators);
    }

    for generator in list_generators() {
        println!("{} ({})", generator.id(), generator.label());
        println!("    {}", generator.description());
        for spec in generator.schema() {
            let bounds = match spec.param_type {
                ParamType::Range { min, max, default, .. } => {
                    format!("{} .. {}, default {}", min, max, default)
                }
                ParamType::Toggle { default } => format!("on/off, default {}", default),
                ParamType::Select { options, default } => {
                    format!("{}, default {}", options.join("|"), default)
                }
                ParamType::Text { default } => format!("text, default \"{}\"", default),
            };
            println!("    - {:<16} {}", spec.key, bounds);
        }
        let presets: Vec<&str> = generator.presets().iter().map(|p| p.id).collect();
        if !presets.is_empty() {
            println!("    presets: {}", presets.join(", "));
        }
        println!();
    }
    Ok(())
}

/// Write a fresh single-layer recipe.
pub fn new_recipe(path: &Path, entry: Option<&str>, force: bool, as_json: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(FabricaError::FileWriteError {
            path: path.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::AlreadyExists,
                "file exists; pass --force to overwrite",
            ),
        });
    }

    let mut state = FabricationState::default();
    if let Some(entry) = entry {
        state = state.replace_layer_generator("layer-1", entry);
    }
    save_recipe(path, &state)?;

    if as_json {
        return print_json(&json!({
            "path": path.display().to_string(),
            "layers": state.layers.iter().map(|l| &l.id).collect::<Vec<_>>(),
            "warnings": state.status_warnings,
        }));
    }
    println!("Recipe created: {}", path.display());
    print_warnings(&state);
    Ok(())
}

/// Composite a recipe and print statistics, contributors and digest.
pub fn render(
    path: &Path,
    size: Option<u32>,
    pass: Option<RenderPass>,
    as_json: bool,
) -> Result<()> {
    let state = load_recipe(path)?;
    let size = size.unwrap_or(state.texture_size).clamp(1, MAX_RENDER_SIZE);
    let pass = pass.unwrap_or(RenderPass::Preview(state.preview_mode));

    info!("Rendering {} at {}x{} ({})", path.display(), size, size, pass);
    let result = generate_pass(&state, size, size, pass);
    let stats = result.field.stats();
    let digest = result.field.digest();

    if as_json {
        return print_json(&json!({
            "width": result.width,
            "height": result.height,
            "pass": pass.to_string(),
            "min": stats.min,
            "max": stats.max,
            "mean": stats.mean,
            "contributingLayerIds": result.contributing_layer_ids,
            "sha256": digest,
            "warnings": result.updated_state.status_warnings,
        }));
    }

    println!("Rendered {}x{} {}", result.width, result.height, pass);
    println!("  min:    {:.6}", stats.min);
    println!("  max:    {:.6}", stats.max);
    println!("  mean:   {:.6}", stats.mean);
    println!("  layers: {}", result.contributing_layer_ids.join(", "));
    println!("  sha256: {}", digest);
    print_warnings(&result.updated_state);
    Ok(())
}

/// Print the per-layer execution analysis, honoring stored overrides.
pub fn plan(path: &Path, as_json: bool) -> Result<()> {
    let recipe = load_recipe_document(path)?;
    let plan = classify_stack_with_overrides(&recipe.state, &recipe.overrides);

    if as_json {
        return print_json(&json!({
            "layers": plan.layers,
            "summary": plan.summary(),
        }));
    }

    println!("Execution plan: {}", path.display());
    println!("{:-<60}", "");
    for analysis in &plan.layers {
        let marker = if analysis.final_path != analysis.recommended_path {
            format!(" (recommended {})", analysis.recommended_path)
        } else {
            String::new()
        };
        println!(
            "{} [{}] -> {}{}",
            analysis.layer_id, analysis.generator_id, analysis.final_path, marker
        );
        for reason in &analysis.reasons {
            println!("    {}", reason);
        }
    }
    println!("{:-<60}", "");
    let summary = plan.summary();
    println!(
        "shader: {} | texture_baked: {} | hybrid: {}",
        summary.shader.len(),
        summary.texture_baked.len(),
        summary.hybrid.len()
    );
    Ok(())
}

/// Outcome of validating one file
#[derive(Debug, Serialize)]
struct ValidationReport {
    path: String,
    errors: Vec<String>,
}

/// Validate one recipe or every recipe below a directory.
///
/// Returns `Ok(false)` when any file fails; unreadable files count as
/// failures rather than aborting the run.
pub fn validate(path: &Path, as_json: bool) -> Result<bool> {
    let paths = if path.is_dir() {
        find_recipes(path)?
    } else {
        vec![path.to_path_buf()]
    };

    let reports: Vec<ValidationReport> = paths
        .into_iter()
        .map(|path| {
            let errors = match load_recipe_document(&path) {
                Ok(recipe) => {
                    ExportScope::build_with_overrides(&recipe.state, &recipe.overrides).validate()
                }
                Err(e) => vec![e.to_string()],
            };
            ValidationReport {
                path: path.display().to_string(),
                errors,
            }
        })
        .collect();

    let all_valid = reports.iter().all(|r| r.errors.is_empty());

    if as_json {
        print_json(&json!({ "valid": all_valid, "files": reports }))?;
        return Ok(all_valid);
    }

    for report in &reports {
        if report.errors.is_empty() {
            println!("ok    {}", report.path);
        } else {
            println!("FAIL  {}", report.path);
            for error in &report.errors {
                println!("      {}", error);
            }
        }
    }
    if reports.is_empty() {
        warn!("No recipes found in {}", path.display());
    }
    Ok(all_valid)
}

/// Load any supported shape and save it as a current recipe.
pub fn migrate(input: &Path, output: &Path, as_json: bool) -> Result<()> {
    let recipe = load_recipe_document(input)?;
    save_recipe(output, &recipe.state)?;

    if as_json {
        return print_json(&json!({
            "input": input.display().to_string(),
            "output": output.display().to_string(),
            "tagged": recipe.tagged,
            "warnings": recipe.state.status_warnings,
        }));
    }
    println!("Migrated {} -> {}", input.display(), output.display());
    print_warnings(&recipe.state);
    Ok(())
}
