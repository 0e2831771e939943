//! engine::activation
//!
//! Extension point for turning modules on and off inside the host
//! application.
//!
//! Enable and disable always record the flag in the vault first. What the
//! host application does with an enabled module (loading its entries,
//! applying its mixins) is left to an [`Activator`]. The default
//! [`NoopActivator`] does nothing beyond logging.

use std::path::Path;

use tracing::warn;

use crate::core::error::ModuleError;
use crate::core::types::Identifier;

/// Applies a module's enabled state to the host application.
pub trait Activator: Send + Sync {
    /// Make an installed module live. `dir` is its install directory.
    fn activate(&self, id: &Identifier, dir: &Path) -> Result<(), ModuleError>;

    /// Take an installed module out of the host application.
    fn deactivate(&self, id: &Identifier, dir: &Path) -> Result<(), ModuleError>;
}

/// Records nothing and touches nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopActivator;

impl Activator for NoopActivator {
    fn activate(&self, id: &Identifier, _dir: &Path) -> Result<(), ModuleError> {
        warn!(module = %id, "host activation is not implemented; vault flag updated only");
        Ok(())
    }

    fn deactivate(&self, id: &Identifier, _dir: &Path) -> Result<(), ModuleError> {
        warn!(module = %id, "host deactivation is not implemented; vault flag updated only");
        Ok(())
    }
}
