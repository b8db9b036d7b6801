//! JSON file feed, re-read on every refresh.

use super::CheckFeed;
use crate::core::{decode_records, CheckRecord, NetpulseError, Result};
use std::path::PathBuf;

/// Feed reading a JSON array of records from disk.
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    /// Feed reading the JSON payload at `path` on every fetch.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl CheckFeed for FileFeed {
    async fn fetch(&self) -> Result<Vec<CheckRecord>> {
        let payload = tokio::fs::read(&self.path)
            .await
            .map_err(|e| NetpulseError::feed(format!("{}: {}", self.path.display(), e)))?;
        decode_records(&payload)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
