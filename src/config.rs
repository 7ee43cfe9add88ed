//! Configuration file parser for ~/.config/radiox/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, but a warning is logged so typos are
//! visible in the log file.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::onboarding::SENT_DELAY;

pub const DEFAULT_FEED_URL: &str = "https://radioradiox.com/feed/";
pub const DEFAULT_STREAM_URL: &str = "https://www.ophanim.net:8444/s/9220";
pub const DEFAULT_STATION_URL: &str = "https://radioradiox.com";
pub const DEFAULT_APP_URL: &str = "https://radioradiox.com/app";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// RSS feed of the station blog.
    pub feed_url: String,

    /// Live audio stream.
    pub stream_url: String,

    /// Link shared by the "Share RadioRadioX" action.
    pub station_url: String,

    /// Link shared by the "Share the app" action.
    pub app_url: String,

    /// Volume applied when the stream is opened. Clamped to [0, 1] on load.
    pub initial_volume: f32,

    /// Pause between "link sent" and sign-in during onboarding.
    pub sent_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            stream_url: DEFAULT_STREAM_URL.to_string(),
            station_url: DEFAULT_STATION_URL.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
            initial_volume: 1.0,
            sent_delay_ms: SENT_DELAY.as_millis() as u64,
        }
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "feed_url",
        "stream_url",
        "station_url",
        "app_url",
        "initial_volume",
        "sent_delay_ms",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // SEC-014: Check file size before reading
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut config: Config = toml::from_str(&content)?;
        config.initial_volume = if config.initial_volume.is_nan() {
            tracing::warn!("initial_volume is NaN, using default");
            Self::default().initial_volume
        } else {
            config.initial_volume.clamp(0.0, 1.0)
        };

        tracing::info!(
            path = %path.display(),
            feed_url = %config.feed_url,
            stream_url = %config.stream_url,
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn sent_delay(&self) -> Duration {
        Duration::from_millis(self.sent_delay_ms)
    }
}

// ============================================================================
// Tests
// ============================================================================
