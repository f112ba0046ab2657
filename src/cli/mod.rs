//! CLI Module
//!
//! Command-line interface for inspecting, rendering and validating recipes.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::engine::RenderPass;
use crate::layers::{MapTarget, PreviewMode};

/// Fabrica - layered procedural noise stacks
#[derive(Parser, Debug)]
#[command(name = "fabrica-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List noise kinds with their parameters and presets
    #[command(name = "generators")]
    Generators,

    /// Write a fresh recipe
    #[command(name = "new")]
    New {
        /// Destination recipe path
        path: PathBuf,

        /// Catalog entry for the first layer, e.g. `cellular:pebbles`
        #[arg(short, long)]
        entry: Option<String>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Render a recipe and print field statistics
    #[command(name = "render")]
    Render {
        /// Recipe to render
        recipe: PathBuf,

        /// Square output size; defaults to the recipe's texture size
        #[arg(short, long)]
        size: Option<u32>,

        /// Layers to composite; defaults to the recipe's preview mode
        #[arg(short, long, value_enum)]
        pass: Option<PassArg>,
    },

    /// Print the execution path analysis of a recipe
    #[command(name = "plan")]
    Plan {
        /// Recipe to analyse
        recipe: PathBuf,
    },

    /// Check a recipe, or every recipe in a directory, against the export rules
    #[command(name = "validate")]
    Validate {
        /// Recipe file or directory
        path: PathBuf,
    },

    /// Upgrade any supported state or recipe shape to a current recipe
    #[command(name = "migrate")]
    Migrate {
        /// Input file
        input: PathBuf,

        /// Output recipe path
        output: PathBuf,
    },
}

/// Render pass selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PassArg {
    /// Albedo preview: albedo plus the ORM channels
    Albedo,
    /// Normal preview
    Normal,
    /// ORM ambient occlusion channel only
    Ao,
    /// ORM roughness channel only
    Roughness,
    /// ORM metalness channel only
    Metalness,
}

impl From<PassArg> for RenderPass {
    fn from(pass: PassArg) -> Self {
        match pass {
            PassArg::Albedo => RenderPass::Preview(PreviewMode::Albedo),
            PassArg::Normal => RenderPass::Preview(PreviewMode::Normal),
            PassArg::Ao => RenderPass::Channel(MapTarget::OrmAo),
            PassArg::Roughness => RenderPass::Channel(MapTarget::OrmRoughness),
            PassArg::Metalness => RenderPass::Channel(MapTarget::OrmMetalness),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render_with_pass() {
        let cli = Cli::try_parse_from([
            "fabrica-cli",
            "--json",
            "render",
            "stack.json",
            "--size",
            "64",
            "--pass",
            "roughness",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Commands::Render { size, pass, .. }) => {
                assert_eq!(size, Some(64));
                assert_eq!(pass, Some(PassArg::Roughness));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_pass_mapping() {
        assert_eq!(
            RenderPass::from(PassArg::Ao),
            RenderPass::Channel(MapTarget::OrmAo)
        );
        assert_eq!(
            RenderPass::from(PassArg::Albedo),
            RenderPass::Preview(PreviewMode::Albedo)
        );
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["fabrica-cli", "plan", "a.json", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
