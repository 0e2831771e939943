//! Shared fixtures for integration tests.
//!
//! Builds module manifests and gzip tarballs shaped like the archives
//! GitHub serves (one `<repo>-<ref>/` wrapper folder).

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, EntryType, Header};

pub const OWNER: &str = "octo";
pub const REPO: &str = "repo";

/// A 40-character hex commit hash.
pub const SHA: &str = "abc0123456789abcdef0123456789abcdef01234";

/// Metadata URL of `octo/foo` on the `main` branch.
pub const FOO_MURL: &str = "octo/repo/main/mods/foo/metadata.json";

/// Archive path of the `main` branch of `octo/repo`.
pub const MAIN_ARCHIVE: &str = "octo/repo/archive/refs/heads/main.tar.gz";

/// A manifest for `octo/<name>` at `version`.
pub fn manifest(name: &str, version: &str) -> Vec<u8> {
    format!(
        r#"{{
  "name": "{}",
  "version": "{}",
  "authors": ["octo"],
  "description": "test module",
  "entries": {{ "js": "index.js", "css": "style.css" }},
  "dependencies": []
}}"#,
        name, version
    )
    .into_bytes()
}

/// Builder for in-memory gzip tarballs.
pub struct TarballBuilder {
    builder: Builder<GzEncoder<Vec<u8>>>,
}

impl TarballBuilder {
    pub fn new() -> Self {
        Self {
            builder: Builder::new(GzEncoder::new(Vec::new(), Compression::default())),
        }
    }

    pub fn dir(mut self, path: &str) -> Self {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Directory);
        header.set_mode(0o755);
        header.set_size(0);
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    pub fn file(mut self, path: &str, body: &[u8]) -> Self {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_mode(0o644);
        header.set_size(body.len() as u64);
        self.builder.append_data(&mut header, path, body).unwrap();
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.builder.into_inner().unwrap().finish().unwrap()
    }
}

/// A monorepo archive holding `mods/foo` at `foo_version` and `mods/bar`.
pub fn monorepo_archive(wrapper: &str, foo_version: &str) -> Vec<u8> {
    let root = |p: &str| format!("{}/{}", wrapper, p);
    TarballBuilder::new()
        .dir(&root(""))
        .file(&root("README.md"), b"# monorepo")
        .dir(&root("mods/"))
        .dir(&root("mods/foo/"))
        .file(&root("mods/foo/metadata.json"), &manifest("foo", foo_version))
        .file(&root("mods/foo/index.js"), foo_version.as_bytes())
        .dir(&root("mods/foo/assets/"))
        .file(&root("mods/foo/assets/icon.svg"), b"<svg/>")
        .dir(&root("mods/bar/"))
        .file(&root("mods/bar/metadata.json"), &manifest("bar", "9.9.9"))
        .finish()
}
