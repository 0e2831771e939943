//! cli
//!
//! Command-line interface layer for bespoke.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Does NOT touch the modules root directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! [`crate::engine`] for execution. The first error ends the process.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::engine;
use anyhow::Result;

/// Run an already parsed command line.
///
/// `main.rs` parses first so it can set up logging from the flags.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = engine::Context {
        modules_dir: cli.modules_dir.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}
