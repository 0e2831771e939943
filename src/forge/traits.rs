//! forge::traits
//!
//! Forge trait definition for reading modules from remote hosting services.
//!
//! # Design
//!
//! The `Forge` trait is async because forge operations involve network I/O.
//! All methods return `Result` and never retry; callers decide what a
//! failure means.
//!
//! Three reads are needed to install a module:
//! - the repository's branch names (to disambiguate a version segment)
//! - the raw manifest file behind a metadata URL
//! - the gzip-compressed source archive for a resolved reference
//!
//! # Example
//!
//! ```ignore
//! use bespoke::forge::Forge;
//!
//! async fn branches(forge: &dyn Forge) -> Result<(), ForgeError> {
//!     for name in forge.list_branches("octo", "repo").await? {
//!         println!("{}", name);
//!     }
//!     Ok(())
//! }
//! ```

use std::io::Read;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::SourceLocation;

/// Errors from forge operations.
///
/// These error types map to common failure modes when reading from
/// remote hosting services like GitHub.
#[derive(Debug, Clone, Error)]
pub enum ForgeError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error (including timeouts).
    #[error("network error: {0}")]
    NetworkError(String),

    /// The operation is not supported by this forge.
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

/// A readable, gzip-compressed tar stream.
pub type ArchiveReader = Box<dyn Read + Send>;

/// The Forge trait for reading module sources from remote hosting services.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github").
    fn name(&self) -> &'static str;

    /// List every branch name of `owner/repo`, following pagination.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the repository does not exist
    /// - `RateLimited` / `ApiError` / `NetworkError` on transport failures
    async fn list_branches(&self, owner: &str, repo: &str) -> Result<Vec<String>, ForgeError>;

    /// Read a raw file by its `owner/repo/ref/path` location.
    ///
    /// # Errors
    ///
    /// - `NotFound` on 404
    /// - `ApiError` on any other non-2xx status
    async fn fetch_raw(&self, path: &str) -> Result<Vec<u8>, ForgeError>;

    /// Download the source archive for `location`.
    ///
    /// The returned reader yields the archive bytes exactly as served
    /// (gzip-compressed tar). Implementations must not hold the whole
    /// archive in memory.
    async fn download_archive(&self, location: &SourceLocation)
        -> Result<ArchiveReader, ForgeError>;
}
