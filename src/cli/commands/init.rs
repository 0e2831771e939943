//! init command - Create the modules root and an empty vault

use anyhow::{Context as _, Result};

use super::verbosity;
use crate::core::config::Config;
use crate::core::paths::ModulesPaths;
use crate::core::vault::VaultStore;
use crate::engine::Context;
use crate::ui::output;

/// Create the modules root and an empty vault if they are missing.
pub fn init(ctx: &Context) -> Result<()> {
    let config = Config::load().context("Failed to load config")?;
    let root = super::modules_root(ctx, &config)?;
    let vault = VaultStore::new(&ModulesPaths::new(&root));

    let created = vault
        .init()
        .with_context(|| format!("Failed to create vault at {}", vault.path().display()))?;

    if created {
        output::success(
            format!("Initialized modules root at {}", root.display()),
            verbosity(ctx),
        );
    } else {
        output::print(
            format!("Modules root at {} is already initialized.", root.display()),
            verbosity(ctx),
        );
    }
    Ok(())
}
