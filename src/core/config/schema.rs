//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$BESPOKE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/bespoke/config.toml`
//! 3. `~/.bespoke/config.toml` (canonical write location)
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., base URLs must be http(s), timeouts non-zero).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Keys accepted by `config get` / `config set`.
pub const CONFIG_KEYS: &[&str] = &[
    "modules_dir",
    "github.api_base",
    "github.raw_base",
    "github.archive_base",
    "github.token_env",
    "http.timeout_secs",
    "http.connect_timeout_secs",
];

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// modules_dir = "/home/me/.config/bespoke/modules"
///
/// [github]
/// api_base = "https://api.github.com"
/// token_env = "GITHUB_TOKEN"
///
/// [http]
/// timeout_secs = 60
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Root directory holding installed modules and the vault
    pub modules_dir: Option<PathBuf>,

    /// GitHub endpoints and credentials
    pub github: Option<GitHubConfig>,

    /// HTTP client limits
    pub http: Option<HttpConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.modules_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "modules_dir cannot be empty".to_string(),
                ));
            }
        }

        if let Some(github) = &self.github {
            github.validate()?;
        }

        if let Some(http) = &self.http {
            http.validate()?;
        }

        Ok(())
    }

    /// Read a value by dotted key.
    ///
    /// Returns `Ok(None)` for a known key that is unset.
    pub fn get_key(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let github = self.github.as_ref();
        let http = self.http.as_ref();
        let value = match key {
            "modules_dir" => self.modules_dir.as_ref().map(|p| p.display().to_string()),
            "github.api_base" => github.and_then(|g| g.api_base.clone()),
            "github.raw_base" => github.and_then(|g| g.raw_base.clone()),
            "github.archive_base" => github.and_then(|g| g.archive_base.clone()),
            "github.token_env" => github.and_then(|g| g.token_env.clone()),
            "http.timeout_secs" => http.and_then(|h| h.timeout_secs).map(|v| v.to_string()),
            "http.connect_timeout_secs" => http
                .and_then(|h| h.connect_timeout_secs)
                .map(|v| v.to_string()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    /// Set a value by dotted key, then re-validate.
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let parse_secs = |v: &str| {
            v.parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue(format!("'{}' is not a number", v)))
        };

        match key {
            "modules_dir" => self.modules_dir = Some(PathBuf::from(value)),
            "github.api_base" => {
                self.github.get_or_insert_with(Default::default).api_base = Some(value.into())
            }
            "github.raw_base" => {
                self.github.get_or_insert_with(Default::default).raw_base = Some(value.into())
            }
            "github.archive_base" => {
                self.github.get_or_insert_with(Default::default).archive_base = Some(value.into())
            }
            "github.token_env" => {
                self.github.get_or_insert_with(Default::default).token_env = Some(value.into())
            }
            "http.timeout_secs" => {
                self.http.get_or_insert_with(Default::default).timeout_secs =
                    Some(parse_secs(value)?)
            }
            "http.connect_timeout_secs" => {
                self.http
                    .get_or_insert_with(Default::default)
                    .connect_timeout_secs = Some(parse_secs(value)?)
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }

        self.validate()
    }
}

/// GitHub endpoint configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubConfig {
    /// REST API base (default: https://api.github.com)
    pub api_base: Option<String>,

    /// Raw-content base (default: https://raw.githubusercontent.com)
    pub raw_base: Option<String>,

    /// Archive host base (default: https://github.com)
    pub archive_base: Option<String>,

    /// Environment variable holding an API token (default: GITHUB_TOKEN)
    pub token_env: Option<String>,
}

impl GitHubConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("github.api_base", &self.api_base),
            ("github.raw_base", &self.raw_base),
            ("github.archive_base", &self.archive_base),
        ] {
            if let Some(url) = value {
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(ConfigError::InvalidValue(format!(
                        "{} must start with http:// or https://, got '{}'",
                        name, url
                    )));
                }
            }
        }

        if let Some(var) = &self.token_env {
            if var.is_empty() || var.contains('=') {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid github.token_env '{}'",
                    var
                )));
            }
        }

        Ok(())
    }
}

/// HTTP client limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Total time per request in seconds (default: 60)
    pub timeout_secs: Option<u64>,

    /// Connect timeout in seconds (default: 10)
    pub connect_timeout_secs: Option<u64>,
}

impl HttpConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == Some(0) || self.connect_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "http timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
