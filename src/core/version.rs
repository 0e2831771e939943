//! core::version
//!
//! Disambiguation of the version segment of a metadata URL.
//!
//! # Algorithm
//!
//! The segment is an opaque string. It is classified in this strict order:
//! 1. Exactly 40 characters: a commit hash (must also be hexadecimal)
//! 2. Exact match of a live branch name of the repository: a branch
//! 3. Anything else: a tag, after percent-decoding (`feature%2Fx` → `feature/x`)
//!
//! Tag existence is never checked here; a wrong tag surfaces later when the
//! archive download fails.
//!
//! # Caching
//!
//! A [`VersionResolver`] remembers each repository's branch list for its
//! lifetime, so resolving many modules from one repository costs a single
//! listing. Commit-length segments never trigger a listing.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use super::error::ModuleError;
use super::types::{CommitHash, MetadataUrl, SourceLocation, VersionReference};
use crate::forge::Forge;

/// Classify a version segment against a known branch list.
///
/// # Errors
///
/// - `Parse` if a 40-character segment is not hexadecimal
/// - `Parse` if a tag segment contains a malformed percent escape
///
/// # Example
///
/// ```
/// use bespoke::core::version::classify;
/// use bespoke::core::types::VersionReference;
///
/// let branches = vec!["main".to_string()];
/// assert_eq!(classify("main", &branches).unwrap(), VersionReference::Branch("main".into()));
/// assert_eq!(classify("v1%2F2", &branches).unwrap(), VersionReference::Tag("v1/2".into()));
/// ```
pub fn classify(version: &str, branches: &[String]) -> Result<VersionReference, ModuleError> {
    if version.chars().count() == CommitHash::LEN {
        return Ok(VersionReference::Commit(CommitHash::new(version)?));
    }

    if branches.iter().any(|b| b == version) {
        return Ok(VersionReference::Branch(version.to_string()));
    }

    Ok(VersionReference::Tag(percent_decode(version)?))
}

/// Decode `%XX` escapes. `+` is kept literally.
///
/// # Errors
///
/// Returns `Parse` for a truncated or non-hex escape, or if the decoded
/// bytes are not UTF-8.
pub fn percent_decode(input: &str) -> Result<String, ModuleError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes
                .get(i + 1..i + 3)
                .and_then(|pair| hex::decode(pair).ok())
                .and_then(|decoded| decoded.first().copied())
                .ok_or_else(|| {
                    ModuleError::Parse(format!("invalid percent escape in '{}'", input))
                })?;
            out.push(escape);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out)
        .map_err(|_| ModuleError::Parse(format!("'{}' does not decode to UTF-8", input)))
}

/// Resolves version segments into typed references.
pub struct VersionResolver {
    forge: Arc<dyn Forge>,
    /// Branch lists keyed by `owner/repo`.
    branches: Mutex<HashMap<String, Arc<Vec<String>>>>,
}

impl VersionResolver {
    pub fn new(forge: Arc<dyn Forge>) -> Self {
        Self {
            forge,
            branches: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a version segment of `owner/repo`.
    ///
    /// # Errors
    ///
    /// - `Network` if listing branches fails (no retry)
    /// - `Parse` per [`classify`]
    pub async fn resolve(
        &self,
        owner: &str,
        repo: &str,
        version: &str,
    ) -> Result<VersionReference, ModuleError> {
        // The commit check comes first and needs no branch list
        if version.chars().count() == CommitHash::LEN {
            return classify(version, &[]);
        }

        let branches = self.branches(owner, repo).await?;
        let reference = classify(version, &branches)?;
        debug!(owner, repo, version, resolved = %reference, "resolved version");
        Ok(reference)
    }

    /// Split a metadata URL and resolve it into a source location.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let loc = resolver.locate(&MetadataUrl::new("octo/repo/main/mods/foo/metadata.json")).await?;
    /// assert_eq!(loc.path, "mods/foo");
    /// ```
    pub async fn locate(&self, murl: &MetadataUrl) -> Result<SourceLocation, ModuleError> {
        let parts = murl.split()?;
        let version = self
            .resolve(&parts.owner, &parts.repo, &parts.version)
            .await?;

        Ok(SourceLocation {
            owner: parts.owner,
            repo: parts.repo,
            version,
            path: parts.path,
        })
    }

    /// Get the cached branch list, fetching it on first use.
    async fn branches(&self, owner: &str, repo: &str) -> Result<Arc<Vec<String>>, ModuleError> {
        let key = format!("{}/{}", owner, repo);
        let mut cache = self.branches.lock().await;

        if let Some(list) = cache.get(&key) {
            return Ok(Arc::clone(list));
        }

        let list = Arc::new(self.forge.list_branches(owner, repo).await?);
        debug!(repo = %key, count = list.len(), "cached branch list");
        cache.insert(key, Arc::clone(&list));
        Ok(list)
    }
}

impl std::fmt::Debug for VersionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionResolver")
            .field("forge", &self.forge.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{FailOn, MockForge, MockOperation};
    use crate::forge::ForgeError;

    const SHA: &str = "abc0123456789abcdef0123456789abcdef01234";

    fn branches(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    mod classify {
        use super::*;

        #[test]
        fn forty_chars_is_commit_even_if_branch() {
            let list = branches(&[SHA]);
            let reference = classify(SHA, &list).unwrap();
            assert!(matches!(reference, VersionReference::Commit(_)));
        }

        #[test]
        fn forty_non_hex_chars_is_error() {
            let v = "g".repeat(40);
            assert!(matches!(classify(&v, &[]), Err(ModuleError::Parse(_))));
        }

        #[test]
        fn branch_match_is_exact() {
            let list = branches(&["main", "dev"]);
            assert_eq!(
                classify("dev", &list).unwrap(),
                VersionReference::Branch("dev".into())
            );
            assert_eq!(
                classify("Dev", &list).unwrap(),
                VersionReference::Tag("Dev".into())
            );
        }

        #[test]
        fn tag_is_percent_decoded() {
            assert_eq!(
                classify("feature%2Fx", &[]).unwrap(),
                VersionReference::Tag("feature/x".into())
            );
        }

        #[test]
        fn encoded_branch_name_is_not_a_branch() {
            let list = branches(&["feature/x"]);
            assert_eq!(
                classify("feature%2Fx", &list).unwrap(),
                VersionReference::Tag("feature/x".into())
            );
        }
    }

    mod percent_decode {
        use super::*;

        #[test]
        fn decodes_escapes() {
            assert_eq!(percent_decode("a%20b%2Fc").unwrap(), "a b/c");
            assert_eq!(percent_decode("%e2%9c%93").unwrap(), "\u{2713}");
        }

        #[test]
        fn keeps_plus() {
            assert_eq!(percent_decode("v1.0+build").unwrap(), "v1.0+build");
        }

        #[test]
        fn rejects_malformed() {
            assert!(percent_decode("bad%2").is_err());
            assert!(percent_decode("bad%zz").is_err());
            assert!(percent_decode("bad%+1").is_err());
            assert!(percent_decode("%ff").is_err());
        }
    }

    #[tokio::test]
    async fn commit_skips_branch_listing() {
        let forge = MockForge::new();
        let resolver = VersionResolver::new(Arc::new(forge.clone()));

        let reference = resolver.resolve("octo", "repo", SHA).await.unwrap();
        assert!(matches!(reference, VersionReference::Commit(_)));
        assert!(forge.operations().is_empty());
    }

    #[tokio::test]
    async fn branch_list_is_cached_per_repo() {
        let forge = MockForge::new()
            .with_branches("octo", "repo", &["main"])
            .with_branches("octo", "other", &["trunk"]);
        let resolver = VersionResolver::new(Arc::new(forge.clone()));

        resolver.resolve("octo", "repo", "main").await.unwrap();
        resolver.resolve("octo", "repo", "v1").await.unwrap();
        resolver.resolve("octo", "other", "trunk").await.unwrap();

        let listings = forge.count_operations(|op| matches!(op, MockOperation::ListBranches { .. }));
        assert_eq!(listings, 2);
    }

    #[tokio::test]
    async fn listing_failure_propagates() {
        let forge = MockForge::new().fail_on(FailOn::ListBranches(ForgeError::NetworkError(
            "down".into(),
        )));
        let resolver = VersionResolver::new(Arc::new(forge));

        let err = resolver.resolve("octo", "repo", "main").await.unwrap_err();
        assert!(matches!(err, ModuleError::Network(_)));
    }

    #[tokio::test]
    async fn locate_commit_url() {
        let resolver = VersionResolver::new(Arc::new(MockForge::new()));
        let murl = MetadataUrl::new(format!("octo/repo/{}/mods/foo/metadata.json", SHA));

        let loc = resolver.locate(&murl).await.unwrap();
        assert_eq!(loc.owner, "octo");
        assert_eq!(loc.repo, "repo");
        assert_eq!(loc.path, "mods/foo");
        assert_eq!(
            loc.version,
            VersionReference::Commit(CommitHash::new(SHA).unwrap())
        );
    }

    #[tokio::test]
    async fn locate_unparseable_url() {
        let resolver = VersionResolver::new(Arc::new(MockForge::new()));
        let err = resolver
            .locate(&MetadataUrl::new("octo/repo/manifest.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModuleError::Parse(_)));
    }
}
