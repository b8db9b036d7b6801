//! Collector API feed.

use super::CheckFeed;
use crate::core::{decode_records, CheckRecord, NetpulseError, Result};
use std::time::Duration;

/// Path of the stats endpoint below the collector base URL.
pub const STATS_PATH: &str = "/api/stats";

/// Feed polling `GET <base>/api/stats`.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpFeed {
    /// Create a feed for a collector base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("netpulse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), STATS_PATH),
        })
    }
}

#[async_trait::async_trait]
impl CheckFeed for HttpFeed {
    async fn fetch(&self) -> Result<Vec<CheckRecord>> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| NetpulseError::feed(format!("{}: {}", self.endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetpulseError::feed(format!("{} returned HTTP {}", self.endpoint, status.as_u16())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| NetpulseError::feed(format!("{}: {}", self.endpoint, e)))?;
        let records = decode_records(&body)?;
        tracing::debug!(endpoint = %self.endpoint, records = records.len(), "Fetched check results");
        Ok(records)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
