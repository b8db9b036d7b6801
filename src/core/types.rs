//! Record model for check results.
//!
//! A [`CheckRecord`] is one result for one monitored endpoint and one
//! check kind. Records arrive from the feed as a flat JSON array and are
//! immutable for the lifetime of a refresh cycle.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Category used when a record carries none.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Address label used when counting hosts for records without a target.
pub const UNKNOWN_ADDRESS: &str = "unknown";

/// Message substring marking a check verified through a fallback probe.
pub const VERIFIED_MARKER: &str = "Verified via";

/// Message substring marking a check whose first result is still pending.
pub const SYNCING_MARKER: &str = "Synchronizing";

/// Binary health of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Check passed
    Up,
    /// Check failed
    Down,
}

impl From<bool> for Status {
    fn from(healthy: bool) -> Self {
        if healthy {
            Status::Up
        } else {
            Status::Down
        }
    }
}

/// One check result as produced by the collector.
///
/// Every field decodes leniently: absent, `null` or mistyped values fall
/// back to their defaults so a record is never rejected for missing data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    /// Grouping label; empty means [`DEFAULT_CATEGORY`]
    #[serde(default, deserialize_with = "lenient")]
    pub category: String,
    /// Logical host or group label
    #[serde(default, deserialize_with = "lenient")]
    pub server_name: String,
    /// CIDR range or single-host address the target belongs to
    #[serde(default, deserialize_with = "lenient")]
    pub parent_address: String,
    /// Concrete address checked
    #[serde(default, deserialize_with = "lenient")]
    pub target_address: Option<String>,
    /// Protocol or kind label, e.g. `Ping` or `TCP:443`
    #[serde(default, deserialize_with = "lenient")]
    pub check_type: String,
    /// True when the check passed
    #[serde(default, deserialize_with = "lenient")]
    pub status: bool,
    /// Measured latency in milliseconds
    #[serde(default, deserialize_with = "lenient")]
    pub latency_ms: Option<f64>,
    /// Packet loss percentage reported by ping checks
    #[serde(default, deserialize_with = "lenient")]
    pub packet_loss: Option<f64>,
    /// When the collector produced the result
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Free text; may embed `[12.3ms]` or a verification marker
    #[serde(default, deserialize_with = "lenient")]
    pub message: String,
}

impl CheckRecord {
    /// Category label with the empty case defaulted.
    pub fn category_label(&self) -> &str {
        if self.category.is_empty() {
            DEFAULT_CATEGORY
        } else {
            &self.category
        }
    }

    /// Target address as used for grouping (possibly empty).
    pub fn target(&self) -> &str {
        self.target_address.as_deref().unwrap_or("")
    }

    /// Target address as used for host counting.
    pub fn host_key(&self) -> &str {
        self.target_address.as_deref().unwrap_or(UNKNOWN_ADDRESS)
    }

    /// Binary status of this check.
    pub fn health(&self) -> Status {
        Status::from(self.status)
    }

    /// True when the message carries the fallback-verification marker.
    pub fn is_verified(&self) -> bool {
        self.message.contains(VERIFIED_MARKER)
    }

    /// True when the message says the first result is still pending.
    pub fn is_syncing(&self) -> bool {
        self.message.contains(SYNCING_MARKER)
    }

    /// Identity of a check across snapshots.
    pub fn identity(&self) -> String {
        format!("{}-{}-{}", self.server_name, self.target(), self.check_type)
    }
}

/// True when `parent_address` names a multi-address subnet.
///
/// A subnet has a prefix length and is not a `/32` single host.
pub fn is_subnet(parent_address: &str) -> bool {
    parent_address.contains('/') && !parent_address.ends_with("/32")
}

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decode a feed payload into records.
///
/// The payload must be a JSON array. Elements that are not objects are
/// skipped; object fields are decoded leniently.
pub fn decode_records(payload: &[u8]) -> crate::core::Result<Vec<CheckRecord>> {
    let items: Vec<serde_json::Value> = serde_json::from_slice(payload)
        .map_err(|e| crate::core::NetpulseError::feed(format!("payload is not a JSON array: {}", e)))?;
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            tracing::warn!(index, "Skipping feed entry that is not an object");
            continue;
        }
        match serde_json::from_value(item) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(index, "Skipping undecodable feed entry: {}", e),
        }
    }
    Ok(records)
}
