//! Command-line interface for NetPulse.
//!
//! Just run `netpulse` to watch the collector on localhost, or
//! `netpulse --demo` to try it without one.

use crate::application::Application;
use crate::core::config::{ConfigBuilder, FeedSource};
use crate::core::{Config, NetpulseError, Result};
use clap::Parser;
use std::path::PathBuf;

/// Live infrastructure health dashboard
#[derive(Parser, Debug)]
#[command(name = "netpulse")]
#[command(version, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Configuration file path (default: ~/.config/netpulse/config.yaml)
    #[arg(short, long, env = "NETPULSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Collector base URL serving /api/stats
    #[arg(long, env = "NETPULSE_URL", conflicts_with_all = ["file", "demo"])]
    pub url: Option<String>,

    /// Read check results from a JSON file instead of a collector
    #[arg(long, env = "NETPULSE_FILE", conflicts_with = "demo")]
    pub file: Option<PathBuf>,

    /// Use generated demo data
    #[arg(long, env = "NETPULSE_DEMO")]
    pub demo: bool,

    /// Refresh interval in seconds (1-60)
    #[arg(short, long, env = "NETPULSE_INTERVAL")]
    pub interval: Option<u32>,

    /// Run in headless mode (no UI, logs to stderr)
    #[arg(long, env = "NETPULSE_HEADLESS")]
    pub headless: bool,

    /// Serve the JSON API on this port (headless mode)
    #[arg(long, env = "NETPULSE_API_PORT")]
    pub api_port: Option<u16>,

    /// Webhook receiving status transition notifications
    #[arg(long, env = "NETPULSE_WEBHOOK")]
    pub webhook: Option<String>,

    /// Write logs to this file
    #[arg(long, env = "NETPULSE_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, env = "NETPULSE_DEBUG")]
    pub debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,

    /// Show version information
    #[arg(short = 'V', long = "show-version")]
    pub version: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables
    /// 3. Config file
    /// 4. Defaults (lowest priority)
    pub async fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        let config_path = match &self.config {
            Some(path) => Some(path.clone()),
            None => dirs::config_dir()
                .map(|d| d.join("netpulse").join("config.yaml"))
                .filter(|path| path.exists()),
        };

        if let Some(path) = config_path {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => builder = builder.from_yaml(&content)?,
                Err(e) if self.config.is_some() => {
                    // User explicitly specified a config file that doesn't exist
                    return Err(NetpulseError::config(format!(
                        "Failed to read config file {:?}: {}",
                        path, e
                    )));
                },
                Err(_) => {},
            }
        }

        self.build_config_from_args(builder)
    }

    fn build_config_from_args(&self, mut builder: ConfigBuilder) -> Result<Config> {
        // clap already merged environment variables into these fields
        if let Some(url) = &self.url {
            builder = builder.feed_source(FeedSource::Http).feed_url(url.clone());
        }
        if let Some(path) = &self.file {
            builder = builder.feed_source(FeedSource::File).feed_path(path.clone());
        }
        if self.demo {
            builder = builder.feed_source(FeedSource::Demo);
        }
        if let Some(secs) = self.interval {
            builder = builder.interval_secs(secs);
        }
        if let Some(port) = self.api_port {
            builder = builder.api_port(port);
        }
        if let Some(url) = &self.webhook {
            builder = builder.webhook_url(url.clone());
        }
        if let Some(path) = &self.log_file {
            builder = builder.log_file(path.clone());
        }

        builder.debug(self.debug).build()
    }

    /// Initialize logging based on configuration.
    ///
    /// Headless mode logs to stderr. The terminal UI owns the screen, so it
    /// logs only to `logging.file` and otherwise not at all.
    pub fn init_logging(&self, config: &Config) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let level = if config.debug {
            "debug"
        } else {
            config.logging.level.as_str()
        };
        let filter = EnvFilter::try_from_env("NETPULSE_LOG").unwrap_or_else(|_| EnvFilter::new(level));
        let registry = tracing_subscriber::registry().with(filter);

        let result = match (&config.logging.file, self.headless) {
            (Some(path), _) => {
                let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
                registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(std::sync::Mutex::new(file))
                            .with_ansi(false)
                            .with_target(true),
                    )
                    .try_init()
            },
            (None, true) => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_line_number(true)
                        .compact(),
                )
                .try_init(),
            (None, false) => return Ok(()),
        };

        result.map_err(|e| NetpulseError::config(format!("Failed to initialize logging: {}", e)))
    }
}

/// Execute the NetPulse application.
pub async fn execute(cli: Cli) -> Result<()> {
    // Handle version flag first
    if cli.version {
        println!("netpulse {}", env!("CARGO_PKG_VERSION"));
        println!("Live infrastructure health dashboard");
        return Ok(());
    }

    let config = cli.load_config().await?;

    if cli.check_config {
        println!("Configuration is valid!");
        println!("  Feed: {:?}", config.feed.source);
        println!("  Interval: {}s", config.refresh.interval_secs);
        if config.api.enabled {
            println!("  API port: {}", config.api.port);
        }
        if config.notify.webhook_url.is_some() {
            println!("  Webhook: configured");
        }
        return Ok(());
    }

    cli.init_logging(&config)?;
    tracing::debug!(?config, "Configuration loaded");

    let app = Application::new(config)?;
    if cli.headless {
        app.run_headless().await
    } else {
        app.run_terminal().await
    }
}
