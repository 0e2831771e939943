//! cli::commands::pkg
//!
//! Module management: add, rem, update, enable, disable, list.
//!
//! # Design
//!
//! Multi-target commands run targets in order and stop at the first
//! failure; targets already processed stay processed.

use anyhow::{Context as _, Result};

use super::{open_lifecycle, verbosity};
use crate::core::types::{Identifier, MetadataUrl};
use crate::engine::Context;
use crate::ui::output;

fn parse_id(raw: &str) -> Result<Identifier> {
    Identifier::new(raw).with_context(|| format!("'{}' is not an author/name identifier", raw))
}

/// Install modules from their metadata URLs.
pub fn add(ctx: &Context, murls: &[String]) -> Result<()> {
    let lifecycle = open_lifecycle(ctx)?;
    let verbosity = verbosity(ctx);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        for raw in murls {
            let murl = MetadataUrl::new(raw.as_str());
            let outcome = lifecycle
                .install(&murl)
                .await
                .with_context(|| format!("Failed to install {}", murl))?;
            output::success(
                format!("Installed {} {}", outcome.identifier, outcome.version),
                verbosity,
            );
            output::debug(
                format!(
                    "{} files, {} directories, {} entries skipped",
                    outcome.stats.files, outcome.stats.directories, outcome.stats.skipped
                ),
                verbosity,
            );
        }
        Ok::<(), anyhow::Error>(())
    })
}

/// Remove installed modules. Missing modules are not an error.
pub fn rem(ctx: &Context, ids: &[String]) -> Result<()> {
    let ids = ids.iter().map(|s| parse_id(s)).collect::<Result<Vec<_>>>()?;
    let lifecycle = open_lifecycle(ctx)?;
    let verbosity = verbosity(ctx);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        for id in &ids {
            let removed = lifecycle
                .remove(id)
                .await
                .with_context(|| format!("Failed to remove {}", id))?;
            if removed {
                output::success(format!("Removed {}", id), verbosity);
            } else {
                output::print(format!("{} is not installed", id), verbosity);
            }
        }
        Ok::<(), anyhow::Error>(())
    })
}

/// Update installed modules.
pub fn update(ctx: &Context, ids: &[String]) -> Result<()> {
    let ids = ids.iter().map(|s| parse_id(s)).collect::<Result<Vec<_>>>()?;
    let lifecycle = open_lifecycle(ctx)?;
    let verbosity = verbosity(ctx);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        for id in &ids {
            let outcome = lifecycle
                .update(id)
                .await
                .with_context(|| format!("Failed to update {}", id))?;
            output::success(output::format_update(id, &outcome), verbosity);
        }
        Ok::<(), anyhow::Error>(())
    })
}

/// Mark a module enabled.
pub fn enable(ctx: &Context, id: &str) -> Result<()> {
    toggle(ctx, id, true)
}

/// Mark a module disabled.
pub fn disable(ctx: &Context, id: &str) -> Result<()> {
    toggle(ctx, id, false)
}

fn toggle(ctx: &Context, raw: &str, enabled: bool) -> Result<()> {
    let id = parse_id(raw)?;
    let lifecycle = open_lifecycle(ctx)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        if enabled {
            lifecycle.enable(&id).await
        } else {
            lifecycle.disable(&id).await
        }
    })
    .with_context(|| format!("Failed to {} {}", if enabled { "enable" } else { "disable" }, id))?;

    let state = if enabled { "Enabled" } else { "Disabled" };
    output::success(format!("{} {}", state, id), verbosity(ctx));
    Ok(())
}

/// List vault entries with their installed versions.
pub fn list(ctx: &Context) -> Result<()> {
    let lifecycle = open_lifecycle(ctx)?;
    let modules = lifecycle.list().context("Failed to read the vault")?;

    if modules.is_empty() {
        output::print("No modules installed.", verbosity(ctx));
        return Ok(());
    }

    // The listing is the command's result, so it ignores --quiet
    for status in &modules {
        println!("{}", output::format_module(status));
    }
    Ok(())
}
