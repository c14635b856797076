//! Configuration management for Sharepad.
//!
//! This module handles loading, saving, and managing Sharepad configuration.
//!
//! ## Configuration File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/sharepad/config.toml` |
//! | macOS | `~/Library/Application Support/com.sharepad.Sharepad/config.toml` |
//! | Windows | `%APPDATA%\sharepad\Sharepad\config\config.toml` |
//!
//! ## Example
//!
//! ```rust,ignore
//! use sharepad_core::config::Config;
//!
//! let config = Config::load()?;
//! println!("Polling {} every {:?}", config.client.server_url, config.client.poll_interval);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration struct for Sharepad.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sync server settings
    pub server: ServerConfig,
    /// Client settings
    pub client: ClientConfig,
    /// UI settings
    pub ui: UiConfig,
}

/// Sync server configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP port
    pub port: u16,
    /// Bind to localhost only
    pub localhost_only: bool,
    /// Transport-level request body limit in bytes
    pub max_body_bytes: usize,
    /// Reject oversized images on the server as well as the client
    pub enforce_image_limit: bool,
    /// Image size limit applied when `enforce_image_limit` is set
    pub max_image_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: crate::DEFAULT_PORT,
            localhost_only: false,
            max_body_bytes: crate::DEFAULT_MAX_BODY_BYTES,
            enforce_image_limit: false,
            max_image_bytes: crate::datauri::DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

/// Client configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the sync server
    pub server_url: String,
    /// Interval between polls. Never zero.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Timeout for a single request. Never zero.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Largest image the client will upload
    pub max_image_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: format!("http://localhost:{}", crate::DEFAULT_PORT),
            poll_interval: Duration::from_millis(crate::DEFAULT_POLL_INTERVAL_MS),
            request_timeout: Duration::from_secs(crate::DEFAULT_REQUEST_TIMEOUT_SECS),
            max_image_bytes: crate::datauri::DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

/// UI configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Mode the watch view starts in
    pub default_mode: DisplayMode,
    /// Show a QR code for the server URL
    pub show_qr: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_mode: DisplayMode::Text,
            show_qr: true,
        }
    }
}

/// Which half of the payload a view shows.
///
/// Switched only by the local user, never synchronized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Shared text
    #[default]
    #[serde(alias = "paste")]
    Text,
    /// Shared image
    Image,
}

impl DisplayMode {
    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Text => Self::Image,
            Self::Image => Self::Text,
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Image => f.write_str("image"),
        }
    }
}

impl std::str::FromStr for DisplayMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "paste" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            other => Err(Error::InvalidConfig {
                key: "ui.default_mode".into(),
                reason: format!("unknown mode '{other}', expected text or image"),
            }),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// If the configuration file doesn't exist, returns the default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to the default location.
    ///
    /// Creates the configuration directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigError(format!("Failed to create config directory: {e}"))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| Error::ConfigError(format!("Failed to write config: {e}")))
    }

    /// Get the default configuration directory path.
    #[must_use]
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "sharepad", "Sharepad")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the full path to the configuration file.
    #[must_use]
    pub fn config_path() -> PathBuf {
        Self::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }
}

/// Parse a duration such as `500ms`, `5s` or `2m`.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else if let Some(hours) = s.strip_suffix('h') {
        hours
            .parse::<u64>()
            .ok()
            .and_then(|h| h.checked_mul(3600))
            .map(Duration::from_secs)
    } else {
        None
    }
}

/// Parse a duration that must be longer than zero.
///
/// Used for intervals and timeouts, where zero has no sensible meaning.
pub fn parse_nonzero_duration(s: &str) -> Option<Duration> {
    parse_duration(s).filter(|d| !d.is_zero())
}

/// Render a duration the way the config file stores it.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match super::parse_duration(&s) {
            Some(d) if d.is_zero() => Err(serde::de::Error::custom(format!(
                "duration '{s}' must be greater than zero"
            ))),
            Some(d) => Ok(d),
            None => Err(serde::de::Error::custom(format!(
                "invalid duration format '{s}'"
            ))),
        }
    }
}
