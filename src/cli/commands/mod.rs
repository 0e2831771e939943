//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! Handlers do NOT touch the modules root directly.
//!
//! # Async Commands
//!
//! Package commands go through the async engine because they involve
//! network I/O. Each handler builds a `tokio` runtime and blocks on it.

mod completion;
mod config_cmd;
mod init;
mod pkg;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use init::init;
pub use pkg::{add, disable, enable, list, rem, update};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::args::{Command, ConfigAction, PkgAction};
use crate::core::config::Config;
use crate::core::paths::ModulesPaths;
use crate::engine::{Context, ModuleLifecycle};
use crate::forge::create_forge;
use crate::ui::output::Verbosity;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Init => init::init(ctx),
        Command::Pkg { action } => match action {
            PkgAction::Add { murls } => pkg::add(ctx, &murls),
            PkgAction::Rem { ids } => pkg::rem(ctx, &ids),
            PkgAction::Update { ids } => pkg::update(ctx, &ids),
            PkgAction::Enable { id } => pkg::enable(ctx, &id),
            PkgAction::Disable { id } => pkg::disable(ctx, &id),
            PkgAction::List => pkg::list(ctx),
        },
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Verbosity for user-facing output.
fn verbosity(ctx: &Context) -> Verbosity {
    Verbosity::from_flags(ctx.quiet, ctx.debug)
}

/// Modules root: `--modules-dir`, else the configured or default one.
fn modules_root(ctx: &Context, config: &Config) -> Result<PathBuf> {
    match &ctx.modules_dir {
        Some(dir) => Ok(dir.clone()),
        None => config
            .modules_dir()
            .context("Failed to determine the modules directory"),
    }
}

/// Build the lifecycle engine for this invocation.
fn open_lifecycle(ctx: &Context) -> Result<ModuleLifecycle> {
    let config = Config::load().context("Failed to load config")?;
    let root = modules_root(ctx, &config)?;
    let forge = create_forge(&config).context("Failed to set up GitHub client")?;
    Ok(ModuleLifecycle::new(forge, ModulesPaths::new(root)))
}
