//! Run configuration: an optional `secfeed.toml`, then environment overrides.
//!
//! The file is optional. A missing or empty file yields `Config::default()`.
//! Unknown keys are accepted but logged, since they are usually typos.
//! Command-line flags are layered on top by the binary.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::feed::{DEFAULT_REQUEST_DELAY, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

pub const DEFAULT_CONFIG_FILE: &str = "secfeed.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

/// Settings for one aggregation run.
///
/// Every field has a default, so any subset of keys can be given.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base pause between sources, in seconds.
    pub request_delay_secs: u64,

    /// Per-request timeout, in seconds.
    pub request_timeout_secs: u64,

    /// Only fetch the first N catalog sources. 0 = all of them.
    pub max_feeds: usize,

    pub user_agent: String,

    /// Directory for `posts.json` and `summary.json`.
    pub output_dir: PathBuf,

    /// Markdown report destination.
    pub readme_path: PathBuf,

    /// Previous run's report, searched for already-seen ids.
    /// Defaults to `readme_path`.
    pub ledger_path: Option<PathBuf>,

    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_delay_secs: DEFAULT_REQUEST_DELAY.as_secs(),
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_feeds: 0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            output_dir: PathBuf::from("data"),
            readme_path: PathBuf::from("README.md"),
            ledger_path: None,
            debug: false,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 8] = [
        "request_delay_secs",
        "request_timeout_secs",
        "max_feeds",
        "user_agent",
        "output_dir",
        "readme_path",
        "ledger_path",
        "debug",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
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

        Self::from_toml(&content)
    }

    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config file is empty, using defaults");
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
        tracing::debug!(config = ?config, "Loaded configuration");
        Ok(config)
    }

    /// Applies `MAX_FEEDS`, `RATE_LIMIT_DELAY` and `DEBUG_MODE` from the
    /// process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any variable source. Unparsable values are
    /// logged and ignored.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = var("MAX_FEEDS") {
            match raw.trim().parse::<usize>() {
                Ok(n) => self.max_feeds = n,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid MAX_FEEDS"),
            }
        }

        if let Some(raw) = var("RATE_LIMIT_DELAY") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.request_delay_secs = secs,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid RATE_LIMIT_DELAY"),
            }
        }

        if var("DEBUG_MODE").is_some_and(|v| is_debug_value(&v)) {
            self.debug = true;
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn ledger_path(&self) -> &Path {
        self.ledger_path.as_deref().unwrap_or(&self.readme_path)
    }
}

/// `DEBUG_MODE` is on only for "true", in any letter case.
pub fn is_debug_value(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
