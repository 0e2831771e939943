//! End-to-end lifecycle tests.
//!
//! The first group drives `ModuleLifecycle` against the real GitHub forge
//! pointed at a wiremock server; the second uses `MockForge` to check
//! operation counts and failure paths.

mod common;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bespoke::core::error::ModuleError;
use bespoke::core::paths::ModulesPaths;
use bespoke::core::types::{MetadataUrl, VersionReference};
use bespoke::engine::{ModuleLifecycle, UpdateOutcome};
use bespoke::forge::github::{GitHubForge, GitHubSettings};
use bespoke::forge::mock::{MockForge, MockOperation};

use common::*;

fn init_lifecycle(forge: Arc<dyn bespoke::forge::Forge>, temp: &TempDir) -> ModuleLifecycle {
    let lifecycle = ModuleLifecycle::new(forge, ModulesPaths::new(temp.path().join("modules")));
    lifecycle.vault().init().unwrap();
    lifecycle
}

fn foo() -> bespoke::core::types::Identifier {
    bespoke::core::types::Identifier::new("octo/foo").unwrap()
}

// =============================================================================
// Against a fake GitHub
// =============================================================================

mod over_http {
    use super::*;

    async fn github(server: &MockServer) -> Arc<dyn bespoke::forge::Forge> {
        Arc::new(
            GitHubForge::new(GitHubSettings {
                api_base: server.uri(),
                raw_base: server.uri(),
                archive_base: server.uri(),
                token: None,
                timeout: Duration::from_secs(5),
                connect_timeout: Duration::from_secs(5),
            })
            .unwrap(),
        )
    }

    async fn serve_foo(server: &MockServer, version: &str) {
        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/repo/branches"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{ "name": "main" }, { "name": "dev" }])),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/{}", FOO_MURL)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(manifest("foo", version)))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/{}", MAIN_ARCHIVE)))
            .respond_with(
                ResponseTemplate::new(200).set_body_bytes(monorepo_archive("repo-main", version)),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn install_update_remove() {
        let server = MockServer::start().await;
        serve_foo(&server, "1.0.0").await;
        let temp = TempDir::new().unwrap();
        let lifecycle = init_lifecycle(github(&server).await, &temp);
        let root = temp.path().join("modules");

        // Install
        let outcome = lifecycle
            .install(&MetadataUrl::new(format!("https://raw.githubusercontent.com/{}", FOO_MURL)))
            .await
            .unwrap();
        assert_eq!(outcome.identifier, foo());
        assert!(root.join("octo/foo/metadata.json").is_file());
        assert!(root.join("octo/foo/assets/icon.svg").is_file());
        assert!(!root.join("octo/foo/README.md").exists());
        assert!(!root.join("octo/bar").exists());

        let entry = lifecycle.vault().entry(&foo()).unwrap();
        assert_eq!(entry.metadata_url.as_str(), FOO_MURL);

        // Same version: nothing downloaded
        let outcome = lifecycle.update(&foo()).await.unwrap();
        assert!(matches!(outcome, UpdateOutcome::UpToDate { .. }));

        // New version
        serve_foo(&server, "1.1.0").await;
        let outcome = lifecycle.update(&foo()).await.unwrap();
        assert_eq!(
            outcome,
            UpdateOutcome::Updated {
                from: "1.0.0".into(),
                to: "1.1.0".into()
            }
        );
        assert_eq!(
            fs::read_to_string(root.join("octo/foo/index.js")).unwrap(),
            "1.1.0"
        );

        // Remove twice
        assert!(lifecycle.remove(&foo()).await.unwrap());
        assert!(!lifecycle.remove(&foo()).await.unwrap());
        assert!(!root.join("octo/foo").exists());
    }

    #[tokio::test]
    async fn missing_tag_fails_install_and_cleans_up() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/repo/branches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{ "name": "main" }])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/octo/repo/v9/mods/foo/metadata.json"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(manifest("foo", "9")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/octo/repo/archive/refs/tags/v9.tar.gz"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let lifecycle = init_lifecycle(github(&server).await, &temp);

        let err = lifecycle
            .install(&MetadataUrl::new("octo/repo/v9/mods/foo/metadata.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModuleError::Network(_)));
        assert!(!temp.path().join("modules/octo/foo").exists());
        assert!(lifecycle.vault().list().unwrap().is_empty());
    }
}

// =============================================================================
// With the mock forge
// =============================================================================

mod with_mock {
    use super::*;

    #[tokio::test]
    async fn commit_url_resolves_without_branch_listing() {
        let murl = format!("octo/repo/{}/mods/foo/metadata.json", SHA);
        let forge = MockForge::new()
            .with_raw_file(&murl, manifest("foo", "1.0.0"))
            .with_archive(
                &format!("octo/repo/archive/{}.tar.gz", SHA),
                monorepo_archive(&format!("repo-{}", SHA), "1.0.0"),
            );
        let temp = TempDir::new().unwrap();
        let lifecycle = init_lifecycle(Arc::new(forge.clone()), &temp);

        let module = lifecycle.resolve(&MetadataUrl::new(murl.as_str())).await.unwrap();
        assert!(matches!(module.source.version, VersionReference::Commit(ref c) if c.as_str() == SHA));
        assert_eq!(module.source.path, "mods/foo");

        lifecycle.install(&MetadataUrl::new(murl.as_str())).await.unwrap();
        let listings =
            forge.count_operations(|op| matches!(op, MockOperation::ListBranches { .. }));
        assert_eq!(listings, 0);
    }

    #[tokio::test]
    async fn encoded_tag_is_decoded_for_download() {
        let murl = "octo/repo/release%2F2.0/mods/foo/metadata.json";
        let forge = MockForge::new()
            .with_branches("octo", "repo", &["main"])
            .with_raw_file(murl, manifest("foo", "2.0"))
            .with_archive(
                "octo/repo/archive/refs/tags/release/2.0.tar.gz",
                monorepo_archive("repo-release-2.0", "2.0"),
            );
        let temp = TempDir::new().unwrap();
        let lifecycle = init_lifecycle(Arc::new(forge), &temp);

        let outcome = lifecycle.install(&MetadataUrl::new(murl)).await.unwrap();
        assert_eq!(outcome.version, "2.0");
        assert!(temp.path().join("modules/octo/foo/index.js").is_file());
    }

    #[tokio::test]
    async fn several_installs_share_one_branch_listing() {
        let bar_murl = "octo/repo/main/mods/bar/metadata.json";
        let forge = MockForge::new()
            .with_branches("octo", "repo", &["main"])
            .with_raw_file(FOO_MURL, manifest("foo", "1.0.0"))
            .with_raw_file(bar_murl, manifest("bar", "9.9.9"))
            .with_archive(MAIN_ARCHIVE, monorepo_archive("repo-main", "1.0.0"));
        let temp = TempDir::new().unwrap();
        let lifecycle = init_lifecycle(Arc::new(forge.clone()), &temp);

        lifecycle.install(&MetadataUrl::new(FOO_MURL)).await.unwrap();
        lifecycle.install(&MetadataUrl::new(bar_murl)).await.unwrap();

        let listings =
            forge.count_operations(|op| matches!(op, MockOperation::ListBranches { .. }));
        assert_eq!(listings, 1);

        let ids: Vec<_> = lifecycle
            .list()
            .unwrap()
            .into_iter()
            .map(|s| s.entry.identifier.to_string())
            .collect();
        assert_eq!(ids, vec!["octo/foo", "octo/bar"]);
    }

    #[tokio::test]
    async fn unparseable_url_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let forge = MockForge::new();
        let lifecycle = init_lifecycle(Arc::new(forge.clone()), &temp);

        let err = lifecycle
            .install(&MetadataUrl::new("not-a-metadata-url"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModuleError::Parse(_)));
    }

    #[tokio::test]
    async fn malformed_remote_metadata_is_parse_error() {
        let forge = MockForge::new()
            .with_branches("octo", "repo", &["main"])
            .with_raw_file(FOO_MURL, b"{\"name\": 3}".to_vec());
        let temp = TempDir::new().unwrap();
        let lifecycle = init_lifecycle(Arc::new(forge.clone()), &temp);

        let err = lifecycle.install(&MetadataUrl::new(FOO_MURL)).await.unwrap_err();
        assert!(matches!(err, ModuleError::Parse(_)));
        let downloads =
            forge.count_operations(|op| matches!(op, MockOperation::DownloadArchive { .. }));
        assert_eq!(downloads, 0);
    }

    #[tokio::test]
    async fn second_process_is_locked_out() {
        let temp = TempDir::new().unwrap();
        let forge = MockForge::new();
        let lifecycle = init_lifecycle(Arc::new(forge), &temp);

        let _held = bespoke::core::ops::lock::ModulesLock::acquire(lifecycle.paths()).unwrap();
        let err = lifecycle.remove(&foo()).await.unwrap_err();
        assert!(matches!(err, ModuleError::Lock(_)));
    }
}
