//! Command-line interface for frostlock.
//!
//! This module provides the CLI structure for the `frostlock` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use frostlock_core::Verbosity;

pub use commands::{ConfigCommand, LockCommand, OutputsCommand};

/// frostlock - Lock your Wayland session behind a blurred screenshot
///
/// Captures every output, blurs it, and shows a password prompt on top until
/// PAM accepts the password. Running without a command locks the screen.
#[derive(Debug, Parser)]
#[command(name = "frostlock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute (defaults to `lock`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lock the screen
    Lock(LockCommand),

    /// List the outputs that would be locked
    Outputs(OutputsCommand),

    /// Capture and blur every output, keeping the images
    Prepare,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }

    /// The command to run, with a bare invocation meaning `lock`.
    #[must_use]
    pub fn command_or_default(self) -> Command {
        self.command
            .unwrap_or_else(|| Command::Lock(LockCommand::default()))
    }
}
