//! # Stagecraft CLI Module
//!
//! This module implements the CLI interface for Stagecraft.
//!
//! ## Available Commands
//!
//! - `init` - Write a fresh live state file
//! - `status` - Summarize the live state
//! - `export` - Download the live state as a portable document
//! - `import` - Replace the live state from a portable document
//! - `validate` - Check a document without importing it
//! - `backup` - Write the live state to a backup slot
//! - `restore` - Replace the live state from a backup slot

mod commands;

use crate::config::StagecraftConfig;
use clap::{Parser, Subcommand};
use stagecraft_core::SessionError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Stagecraft - go-to-market planning sessions
///
/// Export, import, back up and restore the state of a planning session.
#[derive(Parser, Debug)]
#[command(name = "stagecraft")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file (default: ./stagecraft.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the live state file
    #[arg(short = 'S', long, global = true)]
    pub state: Option<PathBuf>,

    /// Path to the backup database
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default live state file
    Init {
        /// Overwrite an existing state file
        #[arg(short, long)]
        force: bool,
    },

    /// Summarize the live state
    Status,

    /// Export the live state as a portable document
    Export {
        /// Output file or directory (default: dated file in the working directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a portable document, replacing the live state
    Import {
        /// Document to import; omitting it imports nothing
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Validate a portable document without importing it
    Validate {
        /// Document to validate
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Write the live state to a backup slot
    Backup {
        /// Backup slot (default: configured backup key)
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Replace the live state from a backup slot
    Restore {
        /// Backup slot (default: configured backup key)
        #[arg(short, long)]
        key: Option<String>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), SessionError> {
    let config = StagecraftConfig::resolve(cli.config.as_deref(), cli.state, cli.store)?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(&config, force, json_mode),
        Some(Commands::Status) => cmd_status(&config, json_mode, cli.verbose),
        Some(Commands::Export { output }) => {
            cmd_export(&config, output.as_deref(), json_mode).await
        }
        Some(Commands::Import { input }) => {
            cmd_import(&config, input.as_deref(), json_mode).await
        }
        Some(Commands::Validate { input }) => cmd_validate(&config, &input, json_mode).await,
        Some(Commands::Backup { key }) => cmd_backup(&config, key.as_deref(), json_mode),
        Some(Commands::Restore { key }) => cmd_restore(&config, key.as_deref(), json_mode),
        None => {
            // No subcommand - show status by default
            cmd_status(&config, json_mode, cli.verbose)
        }
    }
}
