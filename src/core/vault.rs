//! core::vault
//!
//! Persisted record of installed modules.
//!
//! # Storage
//!
//! The vault lives at `<modules_root>/vault.json`:
//!
//! ```json
//! {
//!   "modules": [
//!     { "identifier": "a/b", "metadataURL": "a/repo/main/b/metadata.json", "enabled": true }
//!   ]
//! }
//! ```
//!
//! Entries keep file order and identifiers are unique. A missing or
//! malformed file is a hard error when loading; [`VaultStore::init`]
//! creates an empty one.
//!
//! # Caching
//!
//! A [`VaultStore`] loads the file on first access and keeps it in memory.
//! Every mutation rewrites the whole file (temp file, then rename) and only
//! updates the cache once the write succeeded. Cross-process exclusion is
//! the caller's job (see [`crate::core::ops::lock`]).

use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::ModuleError;
use super::paths::ModulesPaths;
use super::types::{Identifier, MetadataUrl};

/// One installed module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultEntry {
    pub identifier: Identifier,

    /// Source manifest, kept for re-resolution on update.
    #[serde(rename = "metadataURL")]
    pub metadata_url: MetadataUrl,

    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl VaultEntry {
    /// A freshly installed, enabled entry.
    pub fn installed(identifier: Identifier, metadata_url: MetadataUrl) -> Self {
        Self {
            identifier,
            metadata_url,
            enabled: true,
            installed_at: Some(Utc::now()),
            updated_at: None,
        }
    }
}

/// The ordered collection of installed modules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    pub modules: Vec<VaultEntry>,
}

impl Vault {
    pub fn find(&self, id: &Identifier) -> Option<&VaultEntry> {
        self.modules.iter().find(|e| &e.identifier == id)
    }

    fn find_mut(&mut self, id: &Identifier) -> Option<&mut VaultEntry> {
        self.modules.iter_mut().find(|e| &e.identifier == id)
    }

    fn check_unique(&self) -> Result<(), ModuleError> {
        let mut seen = HashSet::new();
        for entry in &self.modules {
            if !seen.insert(&entry.identifier) {
                return Err(ModuleError::Parse(format!(
                    "vault lists {} more than once",
                    entry.identifier
                )));
            }
        }
        Ok(())
    }
}

/// Lazily loaded, write-through handle on a vault file.
#[derive(Debug)]
pub struct VaultStore {
    path: PathBuf,
    cache: Mutex<Option<Vault>>,
}

impl VaultStore {
    /// Handle on the vault under a modules root. Nothing is read yet.
    pub fn new(paths: &ModulesPaths) -> Self {
        Self::at(paths.vault_path())
    }

    /// Handle on a vault file at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty vault file (and its directory) if none exists.
    ///
    /// Returns `true` if a file was created.
    pub fn init(&self) -> Result<bool, ModuleError> {
        if self.path.exists() {
            return Ok(false);
        }
        let mut cache = self.lock();
        write_vault_atomic(&self.path, &Vault::default())?;
        *cache = Some(Vault::default());
        debug!(path = %self.path.display(), "created empty vault");
        Ok(true)
    }

    /// Snapshot of the vault, loading it on first call.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the vault file does not exist
    /// - `Parse` if it is malformed or lists an identifier twice
    /// - `Filesystem` for other read failures
    pub fn get(&self) -> Result<Vault, ModuleError> {
        let mut cache = self.lock();
        Ok(self.loaded(&mut cache)?.clone())
    }

    /// The stored metadata URL of an installed module.
    ///
    /// # Example
    ///
    /// ```
    /// # use bespoke::core::vault::{VaultEntry, VaultStore};
    /// # use bespoke::core::types::{Identifier, MetadataUrl};
    /// # let temp = tempfile::TempDir::new().unwrap();
    /// let store = VaultStore::at(temp.path().join("vault.json"));
    /// store.init().unwrap();
    ///
    /// let id = Identifier::new("a/b").unwrap();
    /// store.upsert(VaultEntry::installed(id.clone(), MetadataUrl::new("a/r/main/metadata.json"))).unwrap();
    ///
    /// assert_eq!(store.find_by_identifier(&id).unwrap().as_str(), "a/r/main/metadata.json");
    /// assert!(store.find_by_identifier(&Identifier::new("x/y").unwrap()).is_err());
    /// ```
    pub fn find_by_identifier(&self, id: &Identifier) -> Result<MetadataUrl, ModuleError> {
        Ok(self.entry(id)?.metadata_url)
    }

    /// The full entry of an installed module.
    pub fn entry(&self, id: &Identifier) -> Result<VaultEntry, ModuleError> {
        let mut cache = self.lock();
        self.loaded(&mut cache)?
            .find(id)
            .cloned()
            .ok_or_else(|| not_in_vault(id))
    }

    /// Record the enabled flag of an installed module.
    pub fn toggle(&self, id: &Identifier, enabled: bool) -> Result<(), ModuleError> {
        self.mutate(|vault| {
            let entry = vault.find_mut(id).ok_or_else(|| not_in_vault(id))?;
            entry.enabled = enabled;
            Ok(())
        })
    }

    /// Insert an entry, or replace the entry with the same identifier in place.
    pub fn upsert(&self, entry: VaultEntry) -> Result<(), ModuleError> {
        self.mutate(|vault| {
            match vault.find_mut(&entry.identifier) {
                Some(existing) => *existing = entry,
                None => vault.modules.push(entry),
            }
            Ok(())
        })
    }

    /// Drop an entry. Returns whether one was present.
    pub fn remove(&self, id: &Identifier) -> Result<bool, ModuleError> {
        let mut removed = false;
        self.mutate(|vault| {
            let before = vault.modules.len();
            vault.modules.retain(|e| &e.identifier != id);
            removed = vault.modules.len() != before;
            Ok(())
        })?;
        Ok(removed)
    }

    /// All entries in file order.
    pub fn list(&self) -> Result<Vec<VaultEntry>, ModuleError> {
        Ok(self.get()?.modules)
    }

    /// Apply `f` to a copy of the vault, persist it, then publish it.
    fn mutate<F>(&self, f: F) -> Result<(), ModuleError>
    where
        F: FnOnce(&mut Vault) -> Result<(), ModuleError>,
    {
        let mut cache = self.lock();
        let mut next = self.loaded(&mut cache)?.clone();
        f(&mut next)?;
        write_vault_atomic(&self.path, &next)?;
        *cache = Some(next);
        Ok(())
    }

    fn loaded<'a>(&self, cache: &'a mut Option<Vault>) -> Result<&'a Vault, ModuleError> {
        if cache.is_none() {
            *cache = Some(read_vault(&self.path)?);
        }
        cache
            .as_ref()
            .ok_or_else(|| ModuleError::NotFound(format!("vault {}", self.path.display())))
    }

    fn lock(&self) -> MutexGuard<'_, Option<Vault>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn not_in_vault(id: &Identifier) -> ModuleError {
    ModuleError::NotFound(format!("{} is not in the vault", id))
}

fn read_vault(path: &Path) -> Result<Vault, ModuleError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ModuleError::NotFound(format!(
                "vault file {} (run `bespoke init`)",
                path.display()
            )))
        }
        Err(e) => return Err(ModuleError::fs(path, e)),
    };

    let vault: Vault = serde_json::from_slice(&bytes)
        .map_err(|e| ModuleError::Parse(format!("{}: {}", path.display(), e)))?;
    vault.check_unique()?;
    debug!(path = %path.display(), modules = vault.modules.len(), "loaded vault");
    Ok(vault)
}

fn write_vault_atomic(path: &Path, vault: &Vault) -> Result<(), ModuleError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ModuleError::fs(parent, e))?;
    }

    let contents = serde_json::to_vec_pretty(vault)
        .map_err(|e| ModuleError::Parse(format!("cannot serialize vault: {}", e)))?;

    let temp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&temp_path).map_err(|e| ModuleError::fs(&temp_path, e))?;
    file.write_all(&contents)
        .and_then(|_| file.sync_all())
        .map_err(|e| ModuleError::fs(&temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| ModuleError::fs(path, e))?;
    Ok(())
}
