//! core::paths
//!
//! Centralized path routing for the modules root.
//!
//! # Storage Layout
//!
//! Everything lives under the configured modules root:
//! - `vault.json` - Installed-module records
//! - `.lock` - Exclusive lock file
//! - `<author>/<name>/` - One directory per installed module
//! - `<author>/<name>/metadata.json` - The module's manifest, shipped in its archive
//!
//! **Hard rule:** No code outside this module joins paths under the root.
//!
//! # Example
//!
//! ```
//! use bespoke::core::paths::ModulesPaths;
//! use bespoke::core::types::Identifier;
//! use std::path::PathBuf;
//!
//! let paths = ModulesPaths::new("/home/me/.config/bespoke/modules");
//! let id = Identifier::new("a/b").unwrap();
//!
//! assert_eq!(
//!     paths.vault_path(),
//!     PathBuf::from("/home/me/.config/bespoke/modules/vault.json")
//! );
//! assert_eq!(
//!     paths.metadata_path(&id),
//!     PathBuf::from("/home/me/.config/bespoke/modules/a/b/metadata.json")
//! );
//! ```

use std::path::{Path, PathBuf};

use super::types::Identifier;

/// File name of the vault inside the modules root.
pub const VAULT_FILE: &str = "vault.json";

/// File name of a module manifest.
pub const METADATA_FILE: &str = "metadata.json";

/// File name of the modules lock.
pub const LOCK_FILE: &str = ".lock";

/// Path routing for a modules root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulesPaths {
    root: PathBuf,
}

impl ModulesPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The modules root itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to `vault.json`.
    pub fn vault_path(&self) -> PathBuf {
        self.root.join(VAULT_FILE)
    }

    /// Path to the lock file.
    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    /// Install directory of a module.
    pub fn module_dir(&self, id: &Identifier) -> PathBuf {
        self.root.join(id.to_relative_path())
    }

    /// Installed manifest of a module.
    pub fn metadata_path(&self, id: &Identifier) -> PathBuf {
        self.module_dir(id).join(METADATA_FILE)
    }
}
