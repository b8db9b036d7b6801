//! Inbound check-result feeds.
//!
//! A feed answers one question: what are the current check results. It is
//! idempotent from the engine's point of view and never retries; the next
//! refresh cycle is the retry.

pub mod demo;
pub mod file;
pub mod http;

pub use demo::DemoFeed;
pub use file::FileFeed;
pub use http::HttpFeed;

use crate::core::config::{FeedConfig, FeedSource};
use crate::core::{CheckRecord, NetpulseError, Result};
use std::sync::Arc;

/// Source of check results.
#[async_trait::async_trait]
pub trait CheckFeed: Send + Sync {
    /// Fetch the full current record set.
    async fn fetch(&self) -> Result<Vec<CheckRecord>>;

    /// Human-readable description for logs and the UI header.
    fn describe(&self) -> String;
}

/// Build the feed selected by the configuration.
pub fn from_config(config: &FeedConfig) -> Result<Arc<dyn CheckFeed>> {
    let feed: Arc<dyn CheckFeed> = match config.source {
        FeedSource::Http => Arc::new(HttpFeed::new(&config.url)?),
        FeedSource::File => {
            let path = config
                .path
                .clone()
                .ok_or_else(|| NetpulseError::config("feed.path is required for the file source"))?;
            Arc::new(FileFeed::new(path))
        },
        FeedSource::Demo => Arc::new(DemoFeed::new()),
    };
    tracing::info!(feed = %feed.describe(), "Feed configured");
    Ok(feed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let feed = from_config(&FeedConfig::default()).unwrap();
        assert_eq!(feed.describe(), "http://127.0.0.1:3000/api/stats");

        let config = FeedConfig {
            source: FeedSource::File,
            path: None,
            ..Default::default()
        };
        assert!(from_config(&config).is_err());

        let config = FeedConfig {
            source: FeedSource::Demo,
            ..Default::default()
        };
        assert_eq!(from_config(&config).unwrap().describe(), "demo");
    }
}
