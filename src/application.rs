//! Main application entry point for NetPulse.

use crate::api;
use crate::core::{Config, Result};
use crate::engine::{Engine, RefreshSettings, SharedEngine};
use crate::feed::{self, CheckFeed};
use crate::notify::WebhookNotifier;
use crate::runtime::{RefreshHandle, RefreshLoop};
use crate::tui;
use std::sync::Arc;

/// Main application struct that wires the feed, engine and surfaces.
pub struct Application {
    /// Shared dashboard engine
    engine: SharedEngine,
    /// Source of check results
    feed: Arc<dyn CheckFeed>,
    /// Optional transition webhook
    notifier: Option<WebhookNotifier>,
    /// Application configuration
    config: Config,
}

impl Application {
    /// Create a new Application with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        let feed = feed::from_config(&config.feed)?;
        let notifier = config
            .notify
            .webhook_url
            .as_deref()
            .map(WebhookNotifier::new)
            .transpose()?;
        let engine = Engine::new(RefreshSettings::from(&config.refresh)).shared();

        Ok(Self {
            engine,
            feed,
            notifier,
            config,
        })
    }

    fn start_refresh(&self) -> RefreshHandle {
        RefreshLoop::new(Arc::clone(&self.engine), Arc::clone(&self.feed), self.config.refresh.tick)
            .with_notifier(self.notifier.clone())
            .spawn()
    }

    /// Run with the terminal dashboard in the foreground.
    pub async fn run_terminal(self) -> Result<()> {
        tracing::info!("Starting NetPulse with terminal UI");
        let handle = self.start_refresh();

        let result = tui::run_tui(Arc::clone(&self.engine), &handle, self.feed.describe()).await;

        // Stop refreshing when the UI exits
        handle.shutdown();
        result
    }

    /// Run without a UI until Ctrl-C, serving the API when enabled.
    pub async fn run_headless(self) -> Result<()> {
        tracing::info!(feed = %self.feed.describe(), "Starting NetPulse in headless mode");
        let handle = self.start_refresh();

        let api = self.config.api.clone();
        let engine = Arc::clone(&self.engine);
        let server = async move {
            if api.enabled {
                api::start_server(engine, &api).await
            } else {
                std::future::pending().await
            }
        };

        let result = tokio::select! {
            result = server => {
                if let Err(e) = &result {
                    tracing::error!("API server error: {}", e);
                }
                result
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received shutdown signal, stopping...");
                Ok(())
            }
        };

        handle.shutdown();
        result
    }

    /// Get a reference to the shared engine.
    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    /// Get a reference to the feed.
    pub fn feed(&self) -> &Arc<dyn CheckFeed> {
        &self.feed
    }
}
