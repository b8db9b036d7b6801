//! Configuration management for NetPulse.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - Environment variable and CLI overrides (applied by the CLI)
//! - Validation and defaults

use crate::core::{NetpulseError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete configuration for NetPulse
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data feed configuration
    pub feed: FeedConfig,
    /// Refresh cycle configuration
    pub refresh: RefreshConfig,
    /// Headless API configuration
    pub api: ApiConfig,
    /// Transition notification configuration
    pub notify: NotifyConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// Where check results come from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Feed implementation
    pub source: FeedSource,
    /// Base URL of the collector API for the `http` source
    pub url: String,
    /// JSON file for the `file` source
    pub path: Option<PathBuf>,
}

/// Refresh cycle timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Refresh boundary in wall-clock seconds
    pub interval_secs: u32,
    /// Minimum time a visual refresh stays busy
    #[serde(with = "humantime_serde")]
    pub min_busy: Duration,
    /// Delay before a failed refresh surfaces the offline label
    #[serde(with = "humantime_serde")]
    pub offline_delay: Duration,
    /// Clock tick period
    #[serde(with = "humantime_serde")]
    pub tick: Duration,
}

/// Headless API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Serve the API in headless mode
    pub enabled: bool,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS headers
    pub enable_cors: bool,
}

/// Transition notification configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Webhook receiving status transition embeds
    pub webhook_url: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Log file path
    pub file: Option<PathBuf>,
}

/// Feed implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    /// Collector over HTTP
    Http,
    /// JSON file on disk
    File,
    /// Generated demo data
    Demo,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything
    Trace,
    /// Diagnostic detail
    Debug,
    /// Normal operation
    Info,
    /// Recoverable problems
    Warn,
    /// Failures only
    Error,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            source: FeedSource::Http,
            url: "http://127.0.0.1:3000".to_string(),
            path: None,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            interval_secs: 30,
            min_busy: Duration::from_millis(3000),
            offline_delay: Duration::from_millis(1000),
            tick: Duration::from_secs(1),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            enabled: false,
            port: 3000,
            enable_cors: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            file: None,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Boundaries are computed from seconds-of-minute
        if self.refresh.interval_secs == 0 || self.refresh.interval_secs > 60 {
            return Err(NetpulseError::config(format!(
                "refresh.interval_secs must be between 1 and 60, got {}",
                self.refresh.interval_secs
            )));
        }

        if self.refresh.tick.is_zero() {
            return Err(NetpulseError::config("refresh.tick must be greater than 0"));
        }

        match self.feed.source {
            FeedSource::Http => {
                if !(self.feed.url.starts_with("http://") || self.feed.url.starts_with("https://")) {
                    return Err(NetpulseError::config(format!(
                        "feed.url must be an http(s) URL, got '{}'",
                        self.feed.url
                    )));
                }
            },
            FeedSource::File => {
                if self.feed.path.is_none() {
                    return Err(NetpulseError::config("feed.path is required for the file source"));
                }
            },
            FeedSource::Demo => {},
        }

        if self.api.enabled && self.api.port == 0 {
            return Err(NetpulseError::config("api.port must be greater than 0"));
        }

        if let Some(url) = &self.notify.webhook_url {
            if url.trim().is_empty() {
                return Err(NetpulseError::config("notify.webhook_url must not be empty"));
            }
        }

        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| NetpulseError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Set the feed source
    pub fn feed_source(mut self, source: FeedSource) -> Self {
        self.config.feed.source = source;
        self
    }

    /// Set the collector base URL
    pub fn feed_url(mut self, url: impl Into<String>) -> Self {
        self.config.feed.url = url.into();
        self
    }

    /// Set the feed file
    pub fn feed_path(mut self, path: PathBuf) -> Self {
        self.config.feed.path = Some(path);
        self
    }

    /// Set the refresh interval
    pub fn interval_secs(mut self, secs: u32) -> Self {
        self.config.refresh.interval_secs = secs;
        self
    }

    /// Enable the headless API on a port
    pub fn api_port(mut self, port: u16) -> Self {
        self.config.api.enabled = true;
        self.config.api.port = port;
        self
    }

    /// Set the webhook URL
    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.config.notify.webhook_url = Some(url.into());
        self
    }

    /// Set the log file
    pub fn log_file(mut self, path: PathBuf) -> Self {
        self.config.logging.file = Some(path);
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
