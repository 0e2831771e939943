//! core::error
//!
//! Error taxonomy shared by the resolution and installation engine.
//!
//! Every component returns failures to its caller without local retry.
//! The only swallowed conditions are an absent directory on remove and
//! unrecognized archive entries during extraction.

use std::path::PathBuf;

use thiserror::Error;

use super::config::ConfigError;
use super::metadata::MetadataError;
use super::ops::lock::LockError;
use super::types::{Identifier, TypeError};
use crate::forge::ForgeError;

/// Errors from module resolution, installation and vault bookkeeping.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// A fetch failed or returned a non-2xx response.
    #[error("network error: {0}")]
    Network(String),

    /// Malformed metadata, metadata URL or archive content.
    #[error("parse error: {0}")]
    Parse(String),

    /// The identifier is absent from the vault (or the local install).
    #[error("not found: {0}")]
    NotFound(String),

    /// A filesystem create/read/write/delete failed.
    #[error("filesystem error at '{path}': {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The operation exists but is not implemented.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A fresh install found the module directory already present.
    #[error("module {0} is already installed")]
    AlreadyInstalled(Identifier),

    /// Remote metadata maps to a different identifier than the vault key.
    #[error("metadata for {expected} now resolves to {actual}")]
    IdentifierMismatch {
        expected: Identifier,
        actual: Identifier,
    },

    /// The modules lock could not be taken.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ModuleError {
    /// Build a filesystem error for `path`.
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ModuleError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// True if this error is the "not found" kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ModuleError::NotFound(_))
    }
}

impl From<TypeError> for ModuleError {
    fn from(err: TypeError) -> Self {
        ModuleError::Parse(err.to_string())
    }
}

impl From<MetadataError> for ModuleError {
    fn from(err: MetadataError) -> Self {
        ModuleError::Parse(err.to_string())
    }
}

impl From<ForgeError> for ModuleError {
    fn from(err: ForgeError) -> Self {
        match err {
            ForgeError::NotImplemented(msg) => ModuleError::Unsupported(msg),
            other => ModuleError::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forge_errors_map_to_network() {
        let err: ModuleError = ForgeError::NotFound("octo/repo".into()).into();
        assert!(matches!(err, ModuleError::Network(_)));

        let err: ModuleError = ForgeError::ApiError {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn type_errors_map_to_parse() {
        let err: ModuleError = TypeError::InvalidIdentifier("x".into()).into();
        assert!(matches!(err, ModuleError::Parse(_)));
    }

    #[test]
    fn filesystem_error_names_path() {
        let err = ModuleError::fs(
            "/tmp/modules/a/b",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/modules/a/b"));
        assert!(!err.is_not_found());
    }
}
