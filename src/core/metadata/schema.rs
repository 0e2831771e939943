//! core::metadata::schema
//!
//! Module manifest (`metadata.json`) schema.
//!
//! # Schema Design
//!
//! - `name`, `version` and `authors` are required; everything else defaults
//! - Unknown fields are tolerated so newer manifests stay readable
//! - Any structural mismatch (wrong types, missing required fields) is a
//!   parse error, never silently patched
//!
//! `dependencies` is recorded but nothing resolves or installs it.
//!
//! # Example
//!
//! ```
//! use bespoke::core::metadata::schema::parse_metadata;
//!
//! let json = br#"{
//!     "name": "stats-app",
//!     "version": "1.2.0",
//!     "authors": ["Delusoire"],
//!     "entries": { "js": "index.js" }
//! }"#;
//!
//! let meta = parse_metadata(json).unwrap();
//! assert_eq!(meta.identifier().unwrap().as_str(), "Delusoire/stats-app");
//! assert_eq!(meta.entries.js.as_deref(), Some("index.js"));
//! assert!(meta.dependencies.is_empty());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{Identifier, TypeError};

/// Errors from manifest parsing.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to parse metadata: {0}")]
    ParseError(String),

    #[error("metadata has no {0}; cannot compute an identifier")]
    MissingField(&'static str),

    #[error("type validation failed: {0}")]
    TypeError(#[from] TypeError),
}

/// A module's declarative manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub name: String,

    /// Opaque version string; only compared for byte equality.
    pub version: String,

    pub authors: Vec<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Relative path to a preview image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,

    /// Relative path to a readme
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,

    #[serde(default)]
    pub entries: Entries,

    /// Identifiers of modules this one expects; informational only.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Host application version range this module supports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify_versions: Option<String>,
}

/// Entry-point files, relative to the module root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub js: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mixin: Option<String>,
}

impl Metadata {
    /// Compute the `author/name` identifier from the first author.
    ///
    /// # Errors
    ///
    /// - `MissingField` if the name or first author is empty
    /// - `TypeError` if the result is not a valid identifier
    pub fn identifier(&self) -> Result<Identifier, MetadataError> {
        if self.name.trim().is_empty() {
            return Err(MetadataError::MissingField("name"));
        }
        let author = self
            .authors
            .first()
            .filter(|a| !a.trim().is_empty())
            .ok_or(MetadataError::MissingField("author"))?;

        Ok(Identifier::from_parts(author, &self.name)?)
    }
}

/// Parse a manifest from raw bytes.
pub fn parse_metadata(bytes: &[u8]) -> Result<Metadata, MetadataError> {
    serde_json::from_slice(bytes).map_err(|e| MetadataError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> &'static str {
        r#"{"name": "foo", "version": "0.1.0", "authors": ["octo"]}"#
    }

    #[test]
    fn parses_minimal_manifest() {
        let meta = parse_metadata(minimal().as_bytes()).unwrap();
        assert_eq!(meta.name, "foo");
        assert_eq!(meta.version, "0.1.0");
        assert_eq!(meta.description, "");
        assert_eq!(meta.entries, Entries::default());
        assert!(meta.spotify_versions.is_none());
    }

    #[test]
    fn parses_full_manifest() {
        let json = r#"{
            "name": "search-on-youtube",
            "tags": ["search"],
            "preview": "./preview.png",
            "version": "0.3.1",
            "authors": ["Delusoire", "someone"],
            "description": "Search a song on YouTube",
            "readme": "./README.md",
            "entries": { "js": "./index.js", "css": "./index.css", "mixin": "./mix.js" },
            "dependencies": ["Delusoire/std"],
            "spotifyVersions": ">=1.2.30"
        }"#;

        let meta = parse_metadata(json.as_bytes()).unwrap();
        assert_eq!(meta.authors.len(), 2);
        assert_eq!(meta.entries.mixin.as_deref(), Some("./mix.js"));
        assert_eq!(meta.dependencies, vec!["Delusoire/std"]);
        assert_eq!(meta.spotify_versions.as_deref(), Some(">=1.2.30"));
        assert_eq!(
            meta.identifier().unwrap().as_str(),
            "Delusoire/search-on-youtube"
        );
    }

    #[test]
    fn tolerates_unknown_fields() {
        let json = r#"{"name": "foo", "version": "1", "authors": ["a"], "homepage": "x"}"#;
        assert!(parse_metadata(json.as_bytes()).is_ok());
    }

    #[test]
    fn missing_required_field_is_error() {
        let json = r#"{"name": "foo", "authors": ["a"]}"#;
        assert!(matches!(
            parse_metadata(json.as_bytes()),
            Err(MetadataError::ParseError(_))
        ));
    }

    #[test]
    fn wrong_shape_is_error() {
        let json = r#"{"name": "foo", "version": "1", "authors": "a"}"#;
        assert!(parse_metadata(json.as_bytes()).is_err());
        assert!(parse_metadata(b"not json").is_err());
    }

    #[test]
    fn identifier_requires_author() {
        let json = r#"{"name": "foo", "version": "1", "authors": []}"#;
        let meta = parse_metadata(json.as_bytes()).unwrap();
        assert!(matches!(
            meta.identifier(),
            Err(MetadataError::MissingField("author"))
        ));
    }

    #[test]
    fn identifier_requires_name() {
        let json = r#"{"name": "", "version": "1", "authors": ["a"]}"#;
        let meta = parse_metadata(json.as_bytes()).unwrap();
        assert!(matches!(
            meta.identifier(),
            Err(MetadataError::MissingField("name"))
        ));
    }

    #[test]
    fn identifier_rejects_path_like_names() {
        let json = r#"{"name": "a/b", "version": "1", "authors": ["x"]}"#;
        let meta = parse_metadata(json.as_bytes()).unwrap();
        assert!(matches!(meta.identifier(), Err(MetadataError::TypeError(_))));
    }
}
