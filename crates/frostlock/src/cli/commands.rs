//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Lock command arguments.
#[derive(Debug, Default, Args)]
pub struct LockCommand {
    /// Use ordinary windows instead of full-screen overlays (for testing)
    #[arg(short, long)]
    pub windowed: bool,

    /// Keep the blurred screenshots after unlocking
    #[arg(short, long)]
    pub keep_images: bool,
}

/// Outputs command arguments.
#[derive(Debug, Args)]
pub struct OutputsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
