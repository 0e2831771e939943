//! engine::lifecycle
//!
//! Install, update, remove, enable and disable of modules.
//!
//! # State machine
//!
//! Per identifier:
//!
//! ```text
//! Absent --install--> Installed --remove--> Absent
//! Installed --update (new version)--> Installed
//! Installed --update (same version)--> Installed (no filesystem change)
//! ```
//!
//! Update deletes the old install before extracting the new one. If the
//! download fails in between, the module is left Absent with its vault
//! entry intact; the next update notices the missing manifest and installs
//! fresh.
//!
//! # Concurrency
//!
//! Every mutating operation holds an in-process mutex for its whole
//! duration plus the cross-process [`ModulesLock`]. Reads (`list`) take
//! neither.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::activation::{Activator, NoopActivator};
use crate::core::archive::{ArchiveInstaller, ExtractStats};
use crate::core::error::ModuleError;
use crate::core::metadata::{Metadata, MetadataStore};
use crate::core::ops::lock::ModulesLock;
use crate::core::paths::ModulesPaths;
use crate::core::types::{Identifier, MetadataUrl, Module};
use crate::core::vault::{VaultEntry, VaultStore};
use crate::core::version::VersionResolver;
use crate::forge::Forge;

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub identifier: Identifier,
    pub version: String,
    pub stats: ExtractStats,
}

/// Result of a successful update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Local and remote versions are equal; nothing was touched.
    UpToDate { version: String },
    /// The old install was replaced.
    Updated { from: String, to: String },
    /// No local manifest was found, so the module was installed fresh.
    Reinstalled { version: String },
}

/// An installed module as reported by [`ModuleLifecycle::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStatus {
    pub entry: VaultEntry,
    /// Version from the local manifest, if one is present.
    pub local_version: Option<String>,
}

/// Orchestrates module state changes over one modules root.
pub struct ModuleLifecycle {
    paths: ModulesPaths,
    resolver: VersionResolver,
    metadata: MetadataStore,
    installer: ArchiveInstaller,
    vault: VaultStore,
    activator: Arc<dyn Activator>,
    guard: Mutex<()>,
}

impl ModuleLifecycle {
    pub fn new(forge: Arc<dyn Forge>, paths: ModulesPaths) -> Self {
        Self {
            resolver: VersionResolver::new(Arc::clone(&forge)),
            metadata: MetadataStore::new(Arc::clone(&forge), paths.clone()),
            installer: ArchiveInstaller::new(forge),
            vault: VaultStore::new(&paths),
            activator: Arc::new(NoopActivator),
            guard: Mutex::new(()),
            paths,
        }
    }

    /// Replace the activator used by enable/disable.
    pub fn with_activator(mut self, activator: Arc<dyn Activator>) -> Self {
        self.activator = activator;
        self
    }

    pub fn paths(&self) -> &ModulesPaths {
        &self.paths
    }

    pub fn vault(&self) -> &VaultStore {
        &self.vault
    }

    /// Fetch the manifest and resolve the source location of a metadata URL.
    ///
    /// Both lookups run concurrently.
    pub async fn resolve(&self, murl: &MetadataUrl) -> Result<Module, ModuleError> {
        let (source, metadata) = tokio::try_join!(
            self.resolver.locate(murl),
            self.metadata.fetch_remote(murl)
        )?;
        Ok(Module { metadata, source })
    }

    /// Install the module behind a metadata URL and register it as enabled.
    ///
    /// # Errors
    ///
    /// - `NotFound`/`Parse` if the vault cannot be loaded
    /// - `AlreadyInstalled` if the module directory exists
    /// - `Network`, `Parse` or `Filesystem` from resolution and extraction
    ///   (a partially extracted directory is removed first)
    pub async fn install(&self, murl: &MetadataUrl) -> Result<InstallOutcome, ModuleError> {
        let _guard = self.guard.lock().await;
        let _lock = ModulesLock::acquire(&self.paths)?;

        // Fail on a missing vault before any network traffic
        self.vault.get()?;

        let module = self.resolve(murl).await?;
        let identifier = module.metadata.identifier()?;
        let dest = self.paths.module_dir(&identifier);

        if dest.exists() {
            return Err(ModuleError::AlreadyInstalled(identifier));
        }

        let stats = self.materialize(&module, &dest).await?;
        self.vault
            .upsert(VaultEntry::installed(identifier.clone(), murl.clone()))?;

        info!(module = %identifier, version = %module.metadata.version, "installed");
        Ok(InstallOutcome {
            identifier,
            version: module.metadata.version,
            stats,
        })
    }

    /// Install by bare identifier. Registry lookup does not exist, so this
    /// always fails with `Unsupported`.
    pub async fn install_identifier(&self, id: &Identifier) -> Result<InstallOutcome, ModuleError> {
        Err(ModuleError::Unsupported(format!(
            "installing {} by identifier needs a module registry; use its metadata URL",
            id
        )))
    }

    /// Bring an installed module to the version its metadata URL now serves.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the identifier is not in the vault
    /// - `IdentifierMismatch` if the remote manifest names another module
    /// - `Network`, `Parse` or `Filesystem` otherwise; a failure after the
    ///   old directory was deleted leaves the module Absent
    pub async fn update(&self, id: &Identifier) -> Result<UpdateOutcome, ModuleError> {
        let _guard = self.guard.lock().await;
        let _lock = ModulesLock::acquire(&self.paths)?;

        let entry = self.vault.entry(id)?;
        let remote = self.metadata.fetch_remote(&entry.metadata_url).await?;

        let remote_id = remote.identifier()?;
        if &remote_id != id {
            return Err(ModuleError::IdentifierMismatch {
                expected: id.clone(),
                actual: remote_id,
            });
        }

        let local = self.local_metadata(id)?;
        if let Some(local) = &local {
            if local.version == remote.version {
                debug!(module = %id, version = %local.version, "already up to date");
                return Ok(UpdateOutcome::UpToDate {
                    version: local.version.clone(),
                });
            }
        }

        let source = self.resolver.locate(&entry.metadata_url).await?;
        let dest = self.paths.module_dir(id);
        remove_dir_if_present(&dest)?;

        let module = Module {
            metadata: remote,
            source,
        };
        self.materialize(&module, &dest).await?;

        self.vault.upsert(VaultEntry {
            updated_at: Some(Utc::now()),
            ..entry
        })?;

        let to = module.metadata.version;
        let outcome = match local {
            Some(local) => UpdateOutcome::Updated {
                from: local.version,
                to,
            },
            None => UpdateOutcome::Reinstalled { version: to },
        };
        info!(module = %id, ?outcome, "updated");
        Ok(outcome)
    }

    /// Delete a module's directory and vault entry.
    ///
    /// Absent directories and entries are not errors. Returns whether
    /// anything was removed. A missing or unreadable vault fails with
    /// `NotFound` or `Parse` before anything is deleted.
    pub async fn remove(&self, id: &Identifier) -> Result<bool, ModuleError> {
        let _guard = self.guard.lock().await;
        let _lock = ModulesLock::acquire(&self.paths)?;

        self.vault.get()?;
        let dir_removed = remove_dir_if_present(&self.paths.module_dir(id))?;
        let entry_removed = self.vault.remove(id)?;

        if dir_removed || entry_removed {
            info!(module = %id, "removed");
        } else {
            debug!(module = %id, "nothing to remove");
        }
        Ok(dir_removed || entry_removed)
    }

    /// Mark a module enabled and hand it to the activator.
    pub async fn enable(&self, id: &Identifier) -> Result<(), ModuleError> {
        self.set_enabled(id, true).await
    }

    /// Mark a module disabled and hand it to the activator.
    pub async fn disable(&self, id: &Identifier) -> Result<(), ModuleError> {
        self.set_enabled(id, false).await
    }

    /// Vault entries in file order, with their installed versions.
    pub fn list(&self) -> Result<Vec<ModuleStatus>, ModuleError> {
        self.vault
            .list()?
            .into_iter()
            .map(|entry| -> Result<ModuleStatus, ModuleError> {
                let local_version = self.local_metadata(&entry.identifier)?.map(|m| m.version);
                Ok(ModuleStatus {
                    entry,
                    local_version,
                })
            })
            .collect()
    }

    async fn set_enabled(&self, id: &Identifier, enabled: bool) -> Result<(), ModuleError> {
        let _guard = self.guard.lock().await;
        let _lock = ModulesLock::acquire(&self.paths)?;

        self.vault.toggle(id, enabled)?;

        let dir = self.paths.module_dir(id);
        if enabled {
            self.activator.activate(id, &dir)
        } else {
            self.activator.deactivate(id, &dir)
        }
    }

    /// Installed manifest, or `None` if the module has none on disk.
    fn local_metadata(&self, id: &Identifier) -> Result<Option<Metadata>, ModuleError> {
        match self.metadata.fetch_local(id) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Extract a module into `dest`, deleting the partial tree on failure.
    async fn materialize(&self, module: &Module, dest: &Path) -> Result<ExtractStats, ModuleError> {
        match self.installer.install(&module.source, dest).await {
            Ok(stats) => {
                if !dest.join(crate::core::paths::METADATA_FILE).is_file() {
                    warn!(
                        dest = %dest.display(),
                        subpath = %module.source.path,
                        "archive subtree has no metadata.json"
                    );
                }
                Ok(stats)
            }
            Err(err) => {
                if let Err(cleanup) = remove_dir_if_present(dest) {
                    warn!(dest = %dest.display(), error = %cleanup, "could not clean up failed install");
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for ModuleLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLifecycle")
            .field("paths", &self.paths)
            .field("resolver", &self.resolver)
            .field("vault", &self.vault)
            .finish()
    }
}

/// Recursively delete `dir`. Returns `false` if it did not exist.
fn remove_dir_if_present(dir: &Path) -> Result<bool, ModuleError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ModuleError::fs(dir, e)),
    }
}
