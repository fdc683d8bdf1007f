//! Configuration management for SPIMF.
//!
//! Loads configuration from ${SPIMF_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::member::LoginMethod;

/// Environment variable that overrides the configured endpoint.
pub const ENDPOINT_ENV: &str = "SPIMF_ENDPOINT";

/// Returns the default config template with comments.
///
/// Embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for SPIMF configuration and data directories.
    //!
    //! SPIMF_HOME resolution order:
    //! 1. SPIMF_HOME environment variable (if set)
    //! 2. ~/.config/spimf (default)

    use std::path::PathBuf;

    /// Returns the SPIMF home directory.
    ///
    /// Checks SPIMF_HOME env var first, falls back to ~/.config/spimf
    pub fn spimf_home() -> PathBuf {
        if let Ok(home) = std::env::var("SPIMF_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("spimf")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        spimf_home().join("config.toml")
    }

    /// Returns the directory holding the persisted session entries.
    pub fn session_dir() -> PathBuf {
        spimf_home().join("session")
    }

    /// Returns the directory for log files.
    pub fn logs_dir() -> PathBuf {
        spimf_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend endpoint that receives every action.
    pub endpoint: String,

    /// Per-request timeout in seconds (0 disables)
    pub request_timeout_secs: u32,

    /// Login method used when none is given on the command line
    pub default_method: LoginMethod,
}

impl Config {
    pub const DEFAULT_ENDPOINT: &str = "https://script.google.com/macros/s/AKfycbxmgDU2cIPgjRvpX4pyVZIBQKH9KYuqKYXeU1x1jCkgdFszXirSoOeHn9NzUsYw0D-B/exec";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u32 = 20;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from `path`, returning defaults if it is missing.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the commented default template to `path`.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    /// Resolves the endpoint with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the chosen value is not a valid URL.
    pub fn resolve_endpoint(&self) -> Result<String> {
        if let Ok(env_url) = std::env::var(ENDPOINT_ENV) {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                validate_url(trimmed)?;
                return Ok(trimmed.to_string());
            }
        }

        let trimmed = self.endpoint.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.to_string());
        }

        Ok(Self::DEFAULT_ENDPOINT.to_string())
    }

    /// Returns the request timeout, or None when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.request_timeout_secs)))
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            default_method: LoginMethod::default(),
        }
    }
}

fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid SPIMF endpoint URL: {url}"))?;
    Ok(())
}
