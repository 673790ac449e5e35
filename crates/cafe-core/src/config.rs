//! Configuration management for Code Cafe.
//!
//! Loads configuration from ${CAFE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod paths {
    //! Path resolution for Code Cafe configuration and data directories.
    //!
    //! CAFE_HOME resolution order:
    //! 1. CAFE_HOME environment variable (if set)
    //! 2. ~/.config/cafe (default)
    //! 3. ./.cafe when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the Code Cafe home directory.
    pub fn cafe_home() -> PathBuf {
        if let Ok(home) = std::env::var("CAFE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".cafe"),
            |h| h.join(".config").join("cafe"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        cafe_home().join("config.toml")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        cafe_home().join("logs")
    }
}

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Credentials handed to the session collection endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer token. `CAFE_TOKEN` takes precedence when set.
    pub token: Option<String>,
    /// Principal the token belongs to (shown in the UI, used offline).
    pub principal_id: Option<String>,
}

/// Composer presentation bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub min_height: u16,
    pub max_height: u16,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            min_height: 3,
            max_height: 10,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the session collection endpoint.
    pub base_url: String,

    /// Model attached to submitted messages.
    pub model: String,

    /// Use the in-memory backend instead of the server.
    pub offline: bool,

    /// Request timeout in seconds (unset waits forever).
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub composer: ComposerConfig,
}

impl Config {
    const DEFAULT_BASE_URL: &str = "http://localhost:3000";
    const LOCAL_PRINCIPAL: &str = "local";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str::<Config>(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        } else {
            Config::default()
        };

        if let Ok(token) = std::env::var("CAFE_TOKEN")
            && !token.trim().is_empty()
        {
            config.auth.token = Some(token);
        }
        config.composer = config.composer.normalized();

        Ok(config)
    }

    /// Initializes a new config file with the default template.
    /// Fails if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, default_config_template())
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

    /// Returns the request timeout, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Returns the principal to act as, falling back to a local identity offline.
    pub fn principal_id(&self) -> Option<String> {
        match &self.auth.principal_id {
            Some(id) if !id.trim().is_empty() => Some(id.clone()),
            _ if self.offline => Some(Self::LOCAL_PRINCIPAL.to_string()),
            _ => None,
        }
    }

    /// Returns true when enough credentials exist to act as a signed-in principal.
    pub fn has_credentials(&self) -> bool {
        self.offline
            || self
                .auth
                .token
                .as_deref()
                .is_some_and(|token| !token.trim().is_empty())
    }
}

impl ComposerConfig {
    /// Ensures `1 <= min_height <= max_height`.
    fn normalized(self) -> Self {
        let min_height = self.min_height.max(1);
        Self {
            min_height,
            max_height: self.max_height.max(min_height),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: crate::models::DEFAULT_MODEL.to_string(),
            offline: false,
            request_timeout_secs: None,
            auth: AuthConfig::default(),
            composer: ComposerConfig::default(),
        }
    }
}
