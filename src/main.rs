//! Fabrica CLI
//!
//! Command-line front end for layered noise recipes.

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fabrica::cli::{commands, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!("Fabrica v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd, cli.json),
        None => {
            println!("Fabrica v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands, json: bool) -> Result<()> {
    match cmd {
        Commands::Generators => commands::show_generators(json)?,
        Commands::New { path, entry, force } => {
            commands::new_recipe(&path, entry.as_deref(), force, json)?
        }
        Commands::Render { recipe, size, pass } => {
            commands::render(&recipe, size, pass.map(Into::into), json)?
        }
        Commands::Plan { recipe } => commands::plan(&recipe, json)?,
        Commands::Validate { path } => {
            if !commands::validate(&path, json)? {
                std::process::exit(1);
            }
        }
        Commands::Migrate { input, output } => commands::migrate(&input, &output, json)?,
    }
    Ok(())
}
