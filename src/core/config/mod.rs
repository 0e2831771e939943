//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! bespoke has a single, user-level configuration file. Every key is
//! optional; unset keys fall back to built-in defaults.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$BESPOKE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/bespoke/config.toml`
//! 3. `~/.bespoke/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use bespoke::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("Modules: {}", config.modules_dir().unwrap().display());
//! println!("Timeout: {:?}", config.timeout());
//! ```

pub mod schema;

pub use schema::{GitHubConfig, GlobalConfig, HttpConfig, CONFIG_KEYS};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::forge::github::{
    GitHubSettings, DEFAULT_API_BASE, DEFAULT_ARCHIVE_BASE, DEFAULT_RAW_BASE,
};

/// Env var pointing at an explicit config file.
pub const CONFIG_ENV: &str = "BESPOKE_CONFIG";

/// Default env var holding a GitHub API token.
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    #[error("home directory not found")]
    NoHomeDir,

    #[error("no platform config directory; set modules_dir")]
    NoConfigDir,
}

/// Loaded configuration.
///
/// Accessor methods apply defaults for every unset value.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
}

impl Config {
    /// Wrap an in-memory global config.
    pub fn from_global(global: GlobalConfig) -> Self {
        Self {
            global,
            global_path: None,
        }
    }

    /// Load configuration from default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_global() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let global = Self::read_global_config(path)?;
        global.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(Self {
            global,
            global_path: Some(path.to_path_buf()),
        })
    }

    /// Find the global config file in the standard locations.
    fn find_global() -> Option<PathBuf> {
        // 1. Check $BESPOKE_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/bespoke/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("bespoke/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.bespoke/config.toml
        dirs::home_dir()
            .map(|home| home.join(".bespoke/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a global config file.
    fn read_global_config(path: &Path) -> Result<GlobalConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the write path for global config.
    ///
    /// Returns the file this config was loaded from, else `$BESPOKE_CONFIG`
    /// if set, else `~/.bespoke/config.toml`.
    pub fn write_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.global_path {
            return Ok(path.clone());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".bespoke/config.toml"))
    }

    /// Write the global config atomically, returning the path written.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = self.write_path()?;
        write_config_atomic(&path, &self.global)?;
        Ok(path)
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Root directory for installed modules.
    ///
    /// Defaults to `<platform config dir>/bespoke/modules`.
    pub fn modules_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.global.modules_dir {
            return Ok(dir.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join("bespoke").join("modules"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn api_base(&self) -> &str {
        self.github()
            .and_then(|g| g.api_base.as_deref())
            .unwrap_or(DEFAULT_API_BASE)
    }

    pub fn raw_base(&self) -> &str {
        self.github()
            .and_then(|g| g.raw_base.as_deref())
            .unwrap_or(DEFAULT_RAW_BASE)
    }

    pub fn archive_base(&self) -> &str {
        self.github()
            .and_then(|g| g.archive_base.as_deref())
            .unwrap_or(DEFAULT_ARCHIVE_BASE)
    }

    /// Name of the env var holding the API token.
    pub fn token_env(&self) -> &str {
        self.github()
            .and_then(|g| g.token_env.as_deref())
            .unwrap_or(DEFAULT_TOKEN_ENV)
    }

    /// Total per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.global
                .http
                .as_ref()
                .and_then(|h| h.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.global
                .http
                .as_ref()
                .and_then(|h| h.connect_timeout_secs)
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    /// Build forge settings, reading the token from the environment.
    pub fn github_settings(&self) -> GitHubSettings {
        let token = std::env::var(self.token_env())
            .ok()
            .filter(|t| !t.trim().is_empty());

        GitHubSettings {
            api_base: self.api_base().to_string(),
            raw_base: self.raw_base().to_string(),
            archive_base: self.archive_base().to_string(),
            token,
            timeout: self.timeout(),
            connect_timeout: self.connect_timeout(),
        }
    }

    /// Get the path to the loaded global config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    fn github(&self) -> Option<&GitHubConfig> {
        self.global.github.as_ref()
    }
}

/// Write a serializable value as TOML atomically (temp file, then rename).
fn write_config_atomic<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let contents =
        toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

    // Write to temp file in same directory (for atomic rename)
    let temp_path = path.with_extension("toml.tmp");
    let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(contents.as_bytes())
        .map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

    file.sync_all().map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_empty() {
        let config = Config::default();

        assert_eq!(config.api_base(), "https://api.github.com");
        assert_eq!(config.raw_base(), "https://raw.githubusercontent.com");
        assert_eq!(config.archive_base(), "https://github.com");
        assert_eq!(config.token_env(), "GITHUB_TOKEN");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn modules_dir_override() {
        let config = Config::from_global(GlobalConfig {
            modules_dir: Some(PathBuf::from("/srv/modules")),
            ..Default::default()
        });
        assert_eq!(config.modules_dir().unwrap(), PathBuf::from("/srv/modules"));
    }

    #[test]
    fn load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [github]
            raw_base = "http://127.0.0.1:9000/raw"

            [http]
            connect_timeout_secs = 3
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.raw_base(), "http://127.0.0.1:9000/raw");
        assert_eq!(config.connect_timeout(), Duration::from_secs(3));
        assert_eq!(config.loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "unknown_field = true").unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn invalid_values_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[http]\ntimeout_secs = 0").unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn save_roundtrips_atomically() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();

        let mut config = Config::load_from(&path).unwrap();
        config.global.set_key("http.timeout_secs", "5").unwrap();
        let written = config.save().unwrap();

        assert_eq!(written, path);
        assert!(!path.with_extension("toml.tmp").exists());
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn github_settings_carry_bases_and_timeouts() {
        let config = Config::from_global(GlobalConfig {
            github: Some(GitHubConfig {
                api_base: Some("http://localhost:1".into()),
                token_env: Some("BESPOKE_TEST_TOKEN_THAT_IS_UNSET".into()),
                ..Default::default()
            }),
            ..Default::default()
        });

        let settings = config.github_settings();
        assert_eq!(settings.api_base, "http://localhost:1");
        assert_eq!(settings.raw_base, "https://raw.githubusercontent.com");
        assert!(settings.token.is_none());
        assert_eq!(settings.timeout, Duration::from_secs(60));
    }
}
