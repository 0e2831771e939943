//! Bespoke - a module manager for a customizable desktop client
//!
//! Bespoke installs modules (plugins) straight from GitHub repositories.
//! A module is addressed by the raw URL of its `metadata.json`; bespoke
//! resolves the version segment of that URL, downloads the repository
//! archive and extracts only the module's subtree into the modules root.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates install, update, remove, enable and disable
//! - [`core`] - Domain types, resolution, extraction and the vault
//! - [`forge`] - Abstraction for the remote host (GitHub)
//! - [`ui`] - User-facing output
//!
//! # Invariants
//!
//! 1. Identifiers are unique in the vault
//! 2. One process mutates a modules root at a time
//! 3. An update whose versions match never touches disk

pub mod cli;
pub mod core;
pub mod engine;
pub mod forge;
pub mod ui;
