//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Identifier`] - Validated `author/name` module key
//! - [`MetadataUrl`] - Raw-file path of a module manifest
//! - [`CommitHash`] - Full 40-character commit hash
//! - [`VersionReference`] - Commit, tag or branch reference
//! - [`SourceLocation`] - Where a module's files live remotely
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use bespoke::core::types::{CommitHash, Identifier, MetadataUrl};
//!
//! let id = Identifier::new("Delusoire/stats-app").unwrap();
//! assert_eq!(id.author(), "Delusoire");
//! assert_eq!(id.name(), "stats-app");
//!
//! let murl = MetadataUrl::new("octo/repo/main/mods/foo/metadata.json");
//! let parts = murl.split().unwrap();
//! assert_eq!(parts.path, "mods/foo");
//!
//! assert!(Identifier::new("../escape").is_err());
//! assert!(CommitHash::new("not-a-sha").is_err());
//! ```

use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::metadata::Metadata;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("invalid commit hash: {0}")]
    InvalidCommit(String),

    #[error("metadata URL cannot be parsed: {0}")]
    InvalidMetadataUrl(String),
}

/// A validated module identifier of shape `author/name`.
///
/// The identifier doubles as the install directory relative to the
/// modules root, so both segments must be plain path components.
///
/// # Example
///
/// ```
/// use bespoke::core::types::Identifier;
///
/// let id = Identifier::new("a/b").unwrap();
/// assert_eq!(id.as_str(), "a/b");
///
/// assert!(Identifier::new("").is_err());
/// assert!(Identifier::new("a").is_err());
/// assert!(Identifier::new("a/b/c").is_err());
/// assert!(Identifier::new("a/..").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Create a new validated identifier.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidIdentifier` unless the value is exactly
    /// two non-empty plain segments separated by `/`.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        Self::validate(&value)?;
        Ok(Self(value))
    }

    /// Build an identifier from an author and a module name.
    pub fn from_parts(author: &str, name: &str) -> Result<Self, TypeError> {
        Self::new(format!("{}/{}", author, name))
    }

    fn validate(value: &str) -> Result<(), TypeError> {
        let segments: Vec<&str> = value.split('/').collect();
        if segments.len() != 2 {
            return Err(TypeError::InvalidIdentifier(format!(
                "'{}' must have the shape author/name",
                value
            )));
        }

        for segment in segments {
            if segment.is_empty() {
                return Err(TypeError::InvalidIdentifier(format!(
                    "'{}' has an empty segment",
                    value
                )));
            }
            if segment == "." || segment == ".." {
                return Err(TypeError::InvalidIdentifier(format!(
                    "'{}' cannot contain '.' or '..' segments",
                    value
                )));
            }
            if segment.contains('\\') || segment.chars().any(|c| c.is_ascii_control()) {
                return Err(TypeError::InvalidIdentifier(format!(
                    "'{}' contains forbidden characters",
                    value
                )));
            }
        }

        Ok(())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The author segment.
    pub fn author(&self) -> &str {
        self.0.split('/').next().unwrap_or_default()
    }

    /// The module name segment.
    pub fn name(&self) -> &str {
        self.0.split('/').nth(1).unwrap_or_default()
    }

    /// The identifier as a relative filesystem path.
    pub fn to_relative_path(&self) -> PathBuf {
        PathBuf::from(self.author()).join(self.name())
    }
}

impl TryFrom<String> for Identifier {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Prefixes stripped from user-supplied metadata URLs.
const RAW_URL_PREFIXES: &[&str] = &[
    "https://raw.githubusercontent.com/",
    "http://raw.githubusercontent.com/",
];

/// Path of a module manifest on the raw-content host.
///
/// Shape: `<owner>/<repo>/<branch|tag|commit>/path/to/module/metadata.json`.
/// The value is not validated on construction; [`MetadataUrl::split`]
/// interprets it structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataUrl(String);

/// Structural components of a [`MetadataUrl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataUrlParts {
    pub owner: String,
    pub repo: String,
    /// Undisambiguated version segment, still percent-encoded.
    pub version: String,
    /// Module root inside the repository, without trailing slash.
    pub path: String,
}

fn metadata_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<owner>[^/]+)/(?P<repo>[^/]+)/(?P<version>[^/]+)/(?:(?P<path>.*?)/)?metadata\.json$",
        )
        .expect("metadata URL pattern is valid")
    })
}

impl MetadataUrl {
    /// Wrap a metadata URL, stripping a leading raw-content host if present.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        let stripped = RAW_URL_PREFIXES
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix))
            .unwrap_or(trimmed);
        Self(stripped.to_string())
    }

    /// Get the URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the URL into owner, repo, version segment and module path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidMetadataUrl` if the value does not end in
    /// `metadata.json` or lacks the owner/repo/version segments.
    ///
    /// # Example
    ///
    /// ```
    /// use bespoke::core::types::MetadataUrl;
    ///
    /// let parts = MetadataUrl::new("octo/repo/v1.0/metadata.json").split().unwrap();
    /// assert_eq!(parts.owner, "octo");
    /// assert_eq!(parts.repo, "repo");
    /// assert_eq!(parts.version, "v1.0");
    /// assert_eq!(parts.path, "");
    /// ```
    pub fn split(&self) -> Result<MetadataUrlParts, TypeError> {
        let caps = metadata_url_regex()
            .captures(&self.0)
            .ok_or_else(|| TypeError::InvalidMetadataUrl(self.0.clone()))?;

        Ok(MetadataUrlParts {
            owner: caps["owner"].to_string(),
            repo: caps["repo"].to_string(),
            version: caps["version"].to_string(),
            path: caps
                .name("path")
                .map(|m| m.as_str().trim_matches('/').to_string())
                .unwrap_or_default(),
        })
    }
}

impl fmt::Display for MetadataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MetadataUrl {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MetadataUrl {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A full 40-character hexadecimal commit hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitHash(String);

impl CommitHash {
    /// Length of a full SHA-1 commit hash.
    pub const LEN: usize = 40;

    /// Create a validated commit hash.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCommit` unless the value is exactly 40
    /// hexadecimal characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        if value.len() != Self::LEN {
            return Err(TypeError::InvalidCommit(format!(
                "'{}' is not {} characters long",
                value,
                Self::LEN
            )));
        }
        hex::decode(&value)
            .map_err(|e| TypeError::InvalidCommit(format!("'{}': {}", value, e)))?;
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A disambiguated version reference. Exactly one variant is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionReference {
    Commit(CommitHash),
    Tag(String),
    Branch(String),
}

impl VersionReference {
    /// The ref path used by the archive endpoint.
    ///
    /// # Example
    ///
    /// ```
    /// use bespoke::core::types::VersionReference;
    ///
    /// let branch = VersionReference::Branch("main".into());
    /// assert_eq!(branch.archive_ref(), "refs/heads/main");
    ///
    /// let tag = VersionReference::Tag("feature/x".into());
    /// assert_eq!(tag.archive_ref(), "refs/tags/feature/x");
    /// ```
    pub fn archive_ref(&self) -> String {
        match self {
            VersionReference::Commit(hash) => hash.as_str().to_string(),
            VersionReference::Tag(tag) => format!("refs/tags/{}", tag),
            VersionReference::Branch(branch) => format!("refs/heads/{}", branch),
        }
    }

    /// Short name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            VersionReference::Commit(_) => "commit",
            VersionReference::Tag(_) => "tag",
            VersionReference::Branch(_) => "branch",
        }
    }
}

impl fmt::Display for VersionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            VersionReference::Commit(hash) => hash.as_str(),
            VersionReference::Tag(name) | VersionReference::Branch(name) => name,
        };
        write!(f, "{} {}", self.kind(), name)
    }
}

/// Resolved location of a module inside a remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub owner: String,
    pub repo: String,
    pub version: VersionReference,
    /// Module root inside the repository tree (empty for the repo root).
    pub path: String,
}

impl SourceLocation {
    /// Unencoded archive path relative to the archive host, e.g.
    /// `owner/repo/archive/refs/heads/main.tar.gz`. Used as a log and
    /// lookup key; the forge encodes each segment when building the URL.
    pub fn archive_path(&self) -> String {
        format!(
            "{}/{}/archive/{}.tar.gz",
            self.owner,
            self.repo,
            self.version.archive_ref()
        )
    }
}

/// A resolved module: its manifest plus where its files live.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub metadata: Metadata,
    pub source: SourceLocation,
}
