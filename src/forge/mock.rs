//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge provides a deterministic implementation of the `Forge` trait
//! for use in tests. It stores branches, raw files and archives in memory and
//! allows configuring failure scenarios.
//!
//! # Example
//!
//! ```
//! use bespoke::forge::mock::MockForge;
//! use bespoke::forge::Forge;
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new()
//!     .with_branches("octo", "repo", &["main", "dev"])
//!     .with_raw_file("octo/repo/main/metadata.json", b"{}".to_vec());
//!
//! let branches = forge.list_branches("octo", "repo").await.unwrap();
//! assert_eq!(branches, vec!["main", "dev"]);
//!
//! let raw = forge.fetch_raw("octo/repo/main/metadata.json").await.unwrap();
//! assert_eq!(raw, b"{}");
//! # });
//! ```

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::traits::{ArchiveReader, Forge, ForgeError};
use crate::core::types::SourceLocation;

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockForgeInner {
    /// Branch names keyed by `owner/repo`.
    branches: HashMap<String, Vec<String>>,
    /// Raw files keyed by their `owner/repo/ref/path` location.
    raw_files: HashMap<String, Vec<u8>>,
    /// Archive bytes keyed by archive path.
    archives: HashMap<String, Vec<u8>>,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail list_branches with the given error.
    ListBranches(ForgeError),
    /// Fail fetch_raw with the given error.
    FetchRaw(ForgeError),
    /// Fail download_archive with the given error.
    DownloadArchive(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    ListBranches { owner: String, repo: String },
    FetchRaw { path: String },
    DownloadArchive { archive_path: String },
}

impl MockForge {
    /// Create a new empty mock forge.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockForgeInner> {
        // A poisoned mock only happens after a test already panicked
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register the branch list of a repository.
    pub fn with_branches(self, owner: &str, repo: &str, branches: &[&str]) -> Self {
        self.lock().branches.insert(
            format!("{}/{}", owner, repo),
            branches.iter().map(|b| b.to_string()).collect(),
        );
        self
    }

    /// Register a raw file.
    pub fn with_raw_file(self, path: &str, contents: Vec<u8>) -> Self {
        self.set_raw_file(path, contents);
        self
    }

    /// Replace or add a raw file on an existing forge.
    pub fn set_raw_file(&self, path: &str, contents: Vec<u8>) {
        self.lock().raw_files.insert(path.to_string(), contents);
    }

    /// Register an archive under its archive path
    /// (see [`SourceLocation::archive_path`]).
    pub fn with_archive(self, archive_path: &str, bytes: Vec<u8>) -> Self {
        self.set_archive(archive_path, bytes);
        self
    }

    /// Replace or add an archive on an existing forge.
    pub fn set_archive(&self, archive_path: &str, bytes: Vec<u8>) {
        self.lock().archives.insert(archive_path.to_string(), bytes);
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail: FailOn) -> Self {
        self.set_fail_on(Some(fail));
        self
    }

    /// Set or clear the failure configuration.
    pub fn set_fail_on(&self, fail: Option<FailOn>) {
        self.lock().fail_on = fail;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Count recorded operations matching a predicate.
    pub fn count_operations(&self, pred: impl Fn(&MockOperation) -> bool) -> usize {
        self.lock().operations.iter().filter(|op| pred(op)).count()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_branches(&self, owner: &str, repo: &str) -> Result<Vec<String>, ForgeError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::ListBranches {
            owner: owner.to_string(),
            repo: repo.to_string(),
        });

        if let Some(FailOn::ListBranches(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        let key = format!("{}/{}", owner, repo);
        inner
            .branches
            .get(&key)
            .cloned()
            .ok_or(ForgeError::NotFound(key))
    }

    async fn fetch_raw(&self, path: &str) -> Result<Vec<u8>, ForgeError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::FetchRaw {
            path: path.to_string(),
        });

        if let Some(FailOn::FetchRaw(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        inner
            .raw_files
            .get(path)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(path.to_string()))
    }

    async fn download_archive(
        &self,
        location: &SourceLocation,
    ) -> Result<ArchiveReader, ForgeError> {
        let archive_path = location.archive_path();
        let mut inner = self.lock();
        inner.operations.push(MockOperation::DownloadArchive {
            archive_path: archive_path.clone(),
        });

        if let Some(FailOn::DownloadArchive(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        let bytes = inner
            .archives
            .get(&archive_path)
            .cloned()
            .ok_or(ForgeError::NotFound(archive_path))?;
        Ok(Box::new(Cursor::new(bytes)))
    }
}
