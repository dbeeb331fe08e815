//! # Graveyard CLI Module
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP server
//! - `archive` - Archive one mandataris and print the run report
//! - `load` - Add quads from a JSON file to a local store
//! - `dump` - Print every quad of a local store as JSON

mod commands;

use crate::backend::BackendKind;
use clap::{Parser, Subcommand};
use graveyard_core::GraveyardError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Graveyard - archives mandate holders into the graveyard graph.
#[derive(Parser, Debug)]
#[command(name = "graveyard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend
    #[arg(short = 'B', long, global = true, value_enum, default_value = "sparql")]
    pub backend: BackendKind,

    /// Path to the redb database (redb backend only)
    #[arg(short = 'D', long, global = true, default_value = "graveyard.redb")]
    pub database: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve {
        /// Host to bind to (overrides settings)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides settings)
        #[arg(short, long)]
        port: Option<u16>,

        /// JSON quad file loaded into a local backend before serving
        #[arg(long)]
        seed: Option<PathBuf>,
    },

    /// Archive one mandataris
    Archive {
        /// The mandataris uuid
        identifier: String,
    },

    /// Load quads from a JSON file into a local backend
    Load {
        /// Path to the JSON quad file
        file: PathBuf,
    },

    /// Print every quad of a local backend as JSON
    Dump,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), GraveyardError> {
    let settings = crate::config::Settings::load(cli.config.as_deref())?;
    let backend = crate::backend::Backend::open(cli.backend, &settings, &cli.database)?;

    match cli.command {
        Commands::Serve { host, port, seed } => {
            cmd_serve(settings, backend, host, port, seed.as_deref()).await
        }
        Commands::Archive { identifier } => {
            cmd_archive(&settings, &backend, &identifier, cli.json_mode).await
        }
        Commands::Load { file } => cmd_load(&backend, &file, cli.json_mode).await,
        Commands::Dump => cmd_dump(&backend).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "graveyard",
            "archive",
            "abc-123",
            "--backend",
            "memory",
            "--json-mode",
        ])
        .expect("parse");
        assert_eq!(cli.backend, BackendKind::Memory);
        assert!(cli.json_mode);
        assert!(matches!(cli.command, Commands::Archive { ref identifier } if identifier == "abc-123"));
    }
}
