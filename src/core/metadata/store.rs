//! core::metadata::store
//!
//! Reading module manifests from the forge or from an installed module.
//!
//! # Architecture
//!
//! Both entry points parse with [`parse_metadata`] and neither caches:
//! every call re-fetches or re-reads. The remote side goes through the
//! [`Forge`] trait so tests can substitute a mock.
//!
//! # Example
//!
//! ```ignore
//! use bespoke::core::metadata::MetadataStore;
//! use bespoke::core::types::MetadataUrl;
//!
//! let store = MetadataStore::new(forge, paths);
//! let remote = store.fetch_remote(&MetadataUrl::new("octo/repo/main/metadata.json")).await?;
//! let local = store.fetch_local(&remote.identifier()?)?;
//! if remote.version != local.version {
//!     println!("update available");
//! }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::sync::Arc;

use tracing::debug;

use super::schema::{parse_metadata, Metadata};
use crate::core::error::ModuleError;
use crate::core::paths::ModulesPaths;
use crate::core::types::{Identifier, MetadataUrl};
use crate::forge::Forge;

/// Manifest reader for remote and installed modules.
#[derive(Clone)]
pub struct MetadataStore {
    forge: Arc<dyn Forge>,
    paths: ModulesPaths,
}

impl MetadataStore {
    pub fn new(forge: Arc<dyn Forge>, paths: ModulesPaths) -> Self {
        Self { forge, paths }
    }

    /// Fetch and parse the manifest behind a metadata URL.
    ///
    /// # Errors
    ///
    /// - `Network` if the fetch fails or returns non-2xx
    /// - `Parse` if the body is not a valid manifest
    pub async fn fetch_remote(&self, murl: &MetadataUrl) -> Result<Metadata, ModuleError> {
        debug!(murl = %murl, "fetching remote metadata");
        let body = self.forge.fetch_raw(murl.as_str()).await?;
        parse_metadata(&body).map_err(|e| ModuleError::Parse(format!("{}: {}", murl, e)))
    }

    /// Read and parse `<modules_root>/<id>/metadata.json`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the module has no installed manifest
    /// - `Filesystem` for any other read failure
    /// - `Parse` if the file is not a valid manifest
    pub fn fetch_local(&self, id: &Identifier) -> Result<Metadata, ModuleError> {
        let path = self.paths.metadata_path(id);
        debug!(path = %path.display(), "reading local metadata");

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ModuleError::NotFound(format!(
                    "no installed metadata for {}",
                    id
                )))
            }
            Err(e) => return Err(ModuleError::fs(path, e)),
        };

        parse_metadata(&bytes)
            .map_err(|e| ModuleError::Parse(format!("{}: {}", path.display(), e)))
    }
}

impl std::fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataStore")
            .field("forge", &self.forge.name())
            .field("paths", &self.paths)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{FailOn, MockForge};
    use crate::forge::ForgeError;
    use tempfile::TempDir;

    const MANIFEST: &[u8] = br#"{"name": "foo", "version": "1.0.0", "authors": ["octo"]}"#;

    fn store(forge: MockForge, temp: &TempDir) -> MetadataStore {
        MetadataStore::new(Arc::new(forge), ModulesPaths::new(temp.path()))
    }

    #[tokio::test]
    async fn fetch_remote_parses_body() {
        let temp = TempDir::new().unwrap();
        let forge =
            MockForge::new().with_raw_file("octo/repo/main/mods/foo/metadata.json", MANIFEST.to_vec());
        let store = store(forge, &temp);

        let meta = store
            .fetch_remote(&MetadataUrl::new("octo/repo/main/mods/foo/metadata.json"))
            .await
            .unwrap();
        assert_eq!(meta.version, "1.0.0");
    }

    #[tokio::test]
    async fn fetch_remote_network_failure() {
        let temp = TempDir::new().unwrap();
        let forge = MockForge::new().fail_on(FailOn::FetchRaw(ForgeError::NetworkError(
            "connection refused".into(),
        )));
        let store = store(forge, &temp);

        let err = store
            .fetch_remote(&MetadataUrl::new("octo/repo/main/metadata.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModuleError::Network(_)));
    }

    #[tokio::test]
    async fn fetch_remote_bad_body_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let forge = MockForge::new().with_raw_file("o/r/v/metadata.json", b"<html>".to_vec());
        let store = store(forge, &temp);

        let err = store
            .fetch_remote(&MetadataUrl::new("o/r/v/metadata.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModuleError::Parse(_)));
    }

    #[test]
    fn fetch_local_reads_installed_manifest() {
        let temp = TempDir::new().unwrap();
        let id = Identifier::new("octo/foo").unwrap();
        let dir = temp.path().join("octo/foo");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("metadata.json"), MANIFEST).unwrap();

        let store = store(MockForge::new(), &temp);
        assert_eq!(store.fetch_local(&id).unwrap().name, "foo");
    }

    #[test]
    fn fetch_local_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = store(MockForge::new(), &temp);
        let err = store
            .fetch_local(&Identifier::new("octo/none").unwrap())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
