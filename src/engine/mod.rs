//! engine
//!
//! Orchestrates module state changes on top of the core components.
//!
//! # Architecture
//!
//! ```text
//! MetadataUrl ─┬─> VersionResolver ─> SourceLocation ─┐
//!              └─> MetadataStore   ─> Metadata       ─┴─> Module
//! Module ─> ArchiveInstaller ─> <modules_root>/<author>/<name>/ ─> VaultStore
//! ```
//!
//! The CLI builds one [`ModuleLifecycle`] per invocation and drives it to
//! completion. Every error propagates to the CLI unchanged.
//!
//! # Modules
//!
//! - [`lifecycle`] - Install, update, remove, enable and disable
//! - [`activation`] - Host-application activation hook

pub mod activation;
pub mod lifecycle;

pub use activation::{Activator, NoopActivator};
pub use lifecycle::{InstallOutcome, ModuleLifecycle, ModuleStatus, UpdateOutcome};

use std::path::PathBuf;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Modules root override (`--modules-dir`).
    pub modules_dir: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}
