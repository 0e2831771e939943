//! core::archive
//!
//! Selective extraction of repository archives.
//!
//! # Path rewriting
//!
//! Every archive the host serves wraps the tree in one top-level folder
//! (`<repo>-<ref>/`). A single anchored pattern strips that wrapper and the
//! requested subpath in one pass:
//!
//! ```text
//! repo-main/mods/foo/metadata.json   -> <dest>/metadata.json
//! repo-main/mods/foo/src/index.js    -> <dest>/src/index.js
//! repo-main/mods/bar/metadata.json   -> skipped
//! repo-main/mods/foobar/x            -> skipped (segment boundary)
//! ```
//!
//! Directories are created non-recursively, so archives must list a
//! directory before its contents. Symlinks, devices and other entry types
//! are ignored. Any I/O or decode error aborts extraction and leaves the
//! partial tree on disk for the caller to clean up.

use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use flate2::read::GzDecoder;
use regex::Regex;
use tar::Archive;
use tracing::{debug, trace};

use super::error::ModuleError;
use super::types::SourceLocation;
use crate::forge::Forge;

/// Counters reported after an extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub files: usize,
    pub directories: usize,
    /// Entries outside the subpath or of an unsupported type
    pub skipped: usize,
}

/// Downloads a module's source archive and extracts its subtree.
#[derive(Clone)]
pub struct ArchiveInstaller {
    forge: Arc<dyn Forge>,
}

impl ArchiveInstaller {
    pub fn new(forge: Arc<dyn Forge>) -> Self {
        Self { forge }
    }

    /// Materialize `source` into `dest`.
    ///
    /// The download is spooled by the forge; extraction runs on the
    /// blocking pool.
    pub async fn install(
        &self,
        source: &SourceLocation,
        dest: &Path,
    ) -> Result<ExtractStats, ModuleError> {
        debug!(archive = %source.archive_path(), dest = %dest.display(), "downloading archive");
        let reader = self.forge.download_archive(source).await?;

        let subpath = source.path.clone();
        let target = dest.to_path_buf();
        tokio::task::spawn_blocking(move || extract(reader, &subpath, &target))
            .await
            .map_err(|e| ModuleError::fs(dest, io::Error::new(io::ErrorKind::Other, e)))?
    }
}

impl std::fmt::Debug for ArchiveInstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveInstaller")
            .field("forge", &self.forge.name())
            .finish()
    }
}

/// Build the wrapper+subpath matcher. Group 1 captures the suffix.
fn entry_matcher(subpath: &str) -> Result<Regex, ModuleError> {
    let subpath = subpath.trim_matches('/');
    let pattern = if subpath.is_empty() {
        r"^[^/]+/(.*)$".to_string()
    } else {
        format!(r"^[^/]+/{}(?:/(.*))?$", regex::escape(subpath))
    };
    Regex::new(&pattern).map_err(|e| ModuleError::Parse(format!("bad subpath '{}': {}", subpath, e)))
}

/// Resolve a captured suffix under `dest`, rejecting escapes.
fn destination_for(dest: &Path, suffix: &str) -> Result<PathBuf, ModuleError> {
    let relative = Path::new(suffix);
    let safe = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !safe {
        return Err(ModuleError::Parse(format!(
            "archive entry '{}' escapes the module directory",
            suffix
        )));
    }
    Ok(dest.join(relative))
}

/// Extract the `subpath` subtree of a gzip tarball into `dest`.
///
/// `dest` is created (with parents) if missing. Existing files at the
/// same paths are truncated.
///
/// # Errors
///
/// - `Parse` if the stream is not a gzip tarball or an entry path escapes `dest`
/// - `Filesystem` if creating or writing a path fails
pub fn extract<R: Read>(reader: R, subpath: &str, dest: &Path) -> Result<ExtractStats, ModuleError> {
    let matcher = entry_matcher(subpath)?;
    fs::create_dir_all(dest).map_err(|e| ModuleError::fs(dest, e))?;

    let mut archive = Archive::new(GzDecoder::new(reader));
    let entries = archive
        .entries()
        .map_err(|e| ModuleError::Parse(format!("unreadable archive: {}", e)))?;

    let mut stats = ExtractStats::default();

    for entry in entries {
        let mut entry = entry.map_err(|e| ModuleError::Parse(format!("corrupt archive entry: {}", e)))?;
        let raw_path = entry
            .path()
            .map_err(|e| ModuleError::Parse(format!("bad entry path: {}", e)))?
            .to_string_lossy()
            .into_owned();

        let suffix = match matcher.captures(&raw_path) {
            Some(caps) => caps
                .get(1)
                .map(|m| m.as_str().trim_end_matches('/').to_string())
                .unwrap_or_default(),
            None => {
                stats.skipped += 1;
                continue;
            }
        };

        // The subpath root itself
        if suffix.is_empty() {
            continue;
        }

        let target = destination_for(dest, &suffix)?;
        let kind = entry.header().entry_type();

        if kind.is_dir() {
            match fs::create_dir(&target) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && target.is_dir() => {}
                Err(e) => return Err(ModuleError::fs(&target, e)),
            }
            stats.directories += 1;
        } else if kind.is_file() {
            let mut file = fs::File::create(&target).map_err(|e| ModuleError::fs(&target, e))?;
            io::copy(&mut entry, &mut file).map_err(|e| ModuleError::fs(&target, e))?;
            stats.files += 1;
        } else {
            trace!(path = %raw_path, ?kind, "ignoring entry type");
            stats.skipped += 1;
            continue;
        }

        trace!(entry = %raw_path, to = %target.display(), "extracted");
    }

    debug!(
        dest = %dest.display(),
        files = stats.files,
        directories = stats.directories,
        skipped = stats.skipped,
        "extraction finished"
    );
    Ok(stats)
}
