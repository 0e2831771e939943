//! config command - Get, set, or list configuration values

use anyhow::{Context as _, Result};

use super::verbosity;
use crate::core::config::schema::CONFIG_KEYS;
use crate::core::config::Config;
use crate::engine::Context;
use crate::ui::output;

/// Get a configuration value.
///
/// Unset keys print nothing.
pub fn get(_ctx: &Context, key: &str) -> Result<()> {
    let config = Config::load().context("Failed to load config")?;
    if let Some(value) = config.global.get_key(key)? {
        println!("{}", value);
    }
    Ok(())
}

/// Set a configuration value.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut config = Config::load().context("Failed to load config")?;
    config
        .global
        .set_key(key, value)
        .with_context(|| format!("Cannot set {}", key))?;
    let path = config.save().context("Failed to write config")?;

    output::success(format!("Set {} = {}", key, value), verbosity(ctx));
    output::debug(format!("wrote {}", path.display()), verbosity(ctx));
    Ok(())
}

/// List all configuration values.
pub fn list(_ctx: &Context) -> Result<()> {
    let config = Config::load().context("Failed to load config")?;

    match config.loaded_from() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# defaults (no config file)"),
    }

    for key in CONFIG_KEYS {
        let value = config.global.get_key(key)?;
        println!("{} = {}", key, value.as_deref().unwrap_or("(not set)"));
    }
    Ok(())
}
