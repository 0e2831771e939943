//! forge
//!
//! Abstraction for the remote host that serves modules.
//!
//! # Architecture
//!
//! The `Forge` trait covers the three reads module installation needs:
//! branch listing, raw file fetch and archive download. Commands build a
//! forge with [`create_forge`] and hand it to the engine as
//! `Arc<dyn Forge>`; nothing outside this module names a concrete forge.
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait and error type
//! - [`github`]: GitHub implementation (REST API, raw content, archives)
//! - [`mock`]: Mock implementation for deterministic testing
//! - `factory`: Forge creation from configuration
//!
//! # Example
//!
//! ```ignore
//! use bespoke::core::config::Config;
//! use bespoke::forge::create_forge;
//!
//! let forge = create_forge(&Config::load()?)?;
//! let branches = forge.list_branches("Delusoire", "bespoke-modules").await?;
//! ```

mod factory;
pub mod github;
pub mod mock;
mod traits;

pub use factory::create_forge;
pub use traits::*;
