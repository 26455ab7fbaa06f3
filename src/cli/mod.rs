//! cli
//!
//! Command-line interface layer for tagtrack.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Build the event context, settings and forge from flags and environment
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! [`crate::engine`] for execution. Errors are returned as `anyhow::Error`
//! with context; `main` turns them into an exit status.

pub mod args;
pub mod commands;

pub use args::Cli;

use crate::engine;
use anyhow::Result;

/// Run the CLI application with already-parsed arguments.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        config: cli.config.clone(),
        debug: cli.debug_enabled(),
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}
