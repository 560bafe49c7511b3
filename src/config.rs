//! Configuration file parser for ~/.config/feedreader/config.toml.
//!
//! The config file is optional: a missing or empty file yields
//! `Config::default()`, which carries the stock feed registry. Unknown keys
//! are ignored by serde, though we log a warning for each one.
use crate::feed::{FeedDescriptor, FeedRegistry, RegistryError};
use crate::loader::StalePolicy;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid feed list in config file: {0}")]
    Registry(#[from] RegistryError),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All sections use `#[serde(default)]` so any subset of keys can be given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feed list. Empty means "use the stock registry".
    pub feeds: Vec<FeedDescriptor>,

    pub fetch: FetchConfig,

    pub load: LoadConfig,
}

/// Settings for the HTTP fetcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Retries on 429, 5xx and truncated bodies before giving up.
    pub max_retries: u32,

    /// Base delay for exponential backoff, in milliseconds.
    pub retry_backoff_ms: u64,

    /// Maximum accepted response body size in bytes.
    pub max_feed_size: usize,

    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            retry_backoff_ms: 1000,
            max_feed_size: 10 * 1024 * 1024, // 10MB
            user_agent: concat!("feedreader/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Settings for the feed loader.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Upper bound on a whole load in seconds. 0 = no loader-level timeout.
    pub timeout_secs: u64,

    /// Which settled result wins when loads overlap.
    pub stale_policy: StalePolicy,
}

impl LoadConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 3] = ["feeds", "fetch", "load"];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Feed with blank name or url → `Err(ConfigError::Registry)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
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

        let config = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            feeds = config.feeds.len(),
            stale_policy = ?config.load.stale_policy,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        FeedRegistry::new(config.feeds.clone()).validate()?;
        Ok(config)
    }

    /// Builds the feed registry this configuration describes.
    pub fn registry(&self) -> FeedRegistry {
        if self.feeds.is_empty() {
            FeedRegistry::default()
        } else {
            FeedRegistry::new(self.feeds.clone())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
