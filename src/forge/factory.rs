//! forge::factory
//!
//! Forge construction from configuration.
//!
//! # Design
//!
//! Commands call [`create_forge`] instead of building a concrete forge,
//! so the engine only ever sees `Arc<dyn Forge>` and tests can hand it a
//! [`MockForge`](super::mock::MockForge) instead.

use std::sync::Arc;

use tracing::debug;

use super::github::GitHubForge;
use super::traits::{Forge, ForgeError};
use crate::core::config::Config;

/// Create the forge described by `config`.
///
/// # Errors
///
/// `NetworkError` if the HTTP client cannot be built.
///
/// # Example
///
/// ```
/// use bespoke::core::config::Config;
/// use bespoke::forge::create_forge;
///
/// let forge = create_forge(&Config::default()).unwrap();
/// assert_eq!(forge.name(), "github");
/// ```
pub fn create_forge(config: &Config) -> Result<Arc<dyn Forge>, ForgeError> {
    let settings = config.github_settings();
    debug!(?settings, "creating GitHub forge");
    Ok(Arc::new(GitHubForge::new(settings)?))
}
