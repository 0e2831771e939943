//! forge::github
//!
//! GitHub forge implementation using the REST API, the raw-content host and
//! the archive download endpoint.
//!
//! # Design
//!
//! This module implements the `Forge` trait for GitHub. It uses:
//! - REST API for branch listing (`/repos/{owner}/{repo}/branches`, paginated)
//! - `raw.githubusercontent.com` for manifest files
//! - `github.com/{owner}/{repo}/archive/{ref}.tar.gz` for source archives
//!
//! Every base URL is configurable so the adapter can target GitHub
//! Enterprise or a local test server.
//!
//! # Authentication
//!
//! An optional token is sent only to the REST API. Anonymous requests work
//! for public repositories within the unauthenticated rate limit.
//!
//! # Rate Limiting
//!
//! GitHub has rate limits. This implementation:
//! - Returns `ForgeError::RateLimited` when limits are hit
//! - Does not implement automatic retry (caller's responsibility)
//!
//! # Timeouts
//!
//! Every request is bounded by the configured total and connect timeouts.
//! A timeout surfaces as `ForgeError::NetworkError`.
//!
//! # Example
//!
//! ```ignore
//! use bespoke::forge::github::{GitHubForge, GitHubSettings};
//! use bespoke::forge::Forge;
//!
//! let forge = GitHubForge::new(GitHubSettings::default())?;
//! let branches = forge.list_branches("Delusoire", "bespoke").await?;
//! ```

use std::io::{Seek, SeekFrom, Write};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::traits::{ArchiveReader, Forge, ForgeError};
use crate::core::types::SourceLocation;

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default raw-content base URL.
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Default archive host base URL.
pub const DEFAULT_ARCHIVE_BASE: &str = "https://github.com";

/// User-Agent header value for all requests.
const USER_AGENT_VALUE: &str = "bespoke-cli";

/// GitHub's maximum page size for list endpoints.
const PER_PAGE: usize = 100;

/// Connection settings for [`GitHubForge`].
#[derive(Clone)]
pub struct GitHubSettings {
    pub api_base: String,
    pub raw_base: String,
    pub archive_base: String,
    /// Optional API token, sent only to `api_base`.
    pub token: Option<String>,
    /// Total time allowed for a single request, body included.
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            raw_base: DEFAULT_RAW_BASE.to_string(),
            archive_base: DEFAULT_ARCHIVE_BASE.to_string(),
            token: None,
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSettings")
            .field("api_base", &self.api_base)
            .field("raw_base", &self.raw_base)
            .field("archive_base", &self.archive_base)
            .field("has_token", &self.token.is_some())
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// GitHub forge implementation.
#[derive(Debug)]
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    settings: GitHubSettings,
}

impl GitHubForge {
    /// Create a GitHub forge from settings.
    ///
    /// # Errors
    ///
    /// Returns `ForgeError::NetworkError` if the HTTP client cannot be built.
    pub fn new(settings: GitHubSettings) -> Result<Self, ForgeError> {
        let client = Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|e| ForgeError::NetworkError(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { client, settings })
    }

    /// Build headers for REST API requests.
    fn api_headers(&self) -> Result<HeaderMap, ForgeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        if let Some(token) = &self.settings.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ForgeError::NetworkError("token contains invalid characters".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, owner: &str, repo: &str, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.settings.api_base.trim_end_matches('/'),
            owner,
            repo,
            path
        )
    }

    fn raw_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.settings.raw_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// `<archive_base>/<owner>/<repo>/archive/<ref>.tar.gz`, with every
    /// segment of the ref percent-encoded on its own.
    fn archive_url(&self, location: &SourceLocation) -> Result<Url, ForgeError> {
        let base = &self.settings.archive_base;
        let mut url = Url::parse(base)
            .map_err(|e| ForgeError::NetworkError(format!("invalid archive base '{}': {}", base, e)))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ForgeError::NetworkError(format!("archive base '{}' cannot hold a path", base))
            })?;
            segments
                .pop_if_empty()
                .push(&location.owner)
                .push(&location.repo)
                .push("archive");

            let reference = location.version.archive_ref();
            let mut parts: Vec<String> = reference.split('/').map(str::to_string).collect();
            if let Some(last) = parts.last_mut() {
                last.push_str(".tar.gz");
            }
            segments.extend(parts);
        }
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ForgeError> {
        request.send().await.map_err(map_transport_error)
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            Err(self.error_from_response(response, status).await)
        }
    }

    /// Map a non-2xx response to a `ForgeError`.
    async fn error_from_response(&self, response: Response, status: StatusCode) -> ForgeError {
        let rate_exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "0")
            .unwrap_or(false);
        let url = response.url().to_string();

        // API errors carry a JSON body, raw/archive hosts send plain text
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GitHubErrorResponse>(&body)
            .map(|err| err.message)
            .unwrap_or_else(|_| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    "Unknown error".to_string()
                } else {
                    trimmed.to_string()
                }
            });

        match status {
            StatusCode::NOT_FOUND => ForgeError::NotFound(url),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            StatusCode::FORBIDDEN if rate_exhausted => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> ForgeError {
    if e.is_timeout() {
        ForgeError::NetworkError(format!("request timed out: {}", e))
    } else {
        ForgeError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn list_branches(&self, owner: &str, repo: &str) -> Result<Vec<String>, ForgeError> {
        let mut names = Vec::new();
        let mut page: u32 = 1;

        loop {
            let url = self.repo_url(
                owner,
                repo,
                &format!("branches?per_page={}&page={}", PER_PAGE, page),
            );
            debug!(%url, "listing branches");

            let response = self
                .send(self.client.get(&url).headers(self.api_headers()?))
                .await?;
            let branches: Vec<GitHubBranch> = self.handle_response(response).await?;

            let page_count = branches.len();
            names.extend(branches.into_iter().map(|b| b.name));

            if page_count < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(names)
    }

    async fn fetch_raw(&self, path: &str) -> Result<Vec<u8>, ForgeError> {
        let url = self.raw_url(path);
        debug!(%url, "fetching raw file");

        let response = self.send(self.client.get(&url)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.error_from_response(response, status).await);
        }

        let bytes = response.bytes().await.map_err(map_transport_error)?;
        Ok(bytes.to_vec())
    }

    async fn download_archive(
        &self,
        location: &SourceLocation,
    ) -> Result<ArchiveReader, ForgeError> {
        let url = self.archive_url(location)?;
        debug!(%url, "downloading archive");

        let mut response = self.send(self.client.get(url)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.error_from_response(response, status).await);
        }

        // Spool to an anonymous temp file so the archive never sits in memory
        let mut spool = tempfile::tempfile()
            .map_err(|e| ForgeError::NetworkError(format!("cannot create spool file: {}", e)))?;
        let mut total: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(map_transport_error)? {
            spool
                .write_all(&chunk)
                .map_err(|e| ForgeError::NetworkError(format!("cannot spool archive: {}", e)))?;
            total += chunk.len() as u64;
        }
        spool
            .seek(SeekFrom::Start(0))
            .map_err(|e| ForgeError::NetworkError(format!("cannot rewind spool file: {}", e)))?;
        debug!(bytes = total, "archive downloaded");

        Ok(Box::new(spool))
    }
}

// =============================================================================
// GitHub API response types
// =============================================================================

#[derive(Debug, Deserialize)]
struct GitHubBranch {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GitHubErrorResponse {
    message: String,
}
