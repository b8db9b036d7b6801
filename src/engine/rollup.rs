//! Aggregate status and latency for groups of records.

use crate::core::CheckRecord;
use crate::engine::latency::{format_latency, mean_latency};
use serde::Serialize;

/// Status badge shown on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateStatus {
    /// Every check passed
    Online,
    /// A server or subnet group has at least one failing check
    Degraded,
    /// A single address or check is failing
    Offline,
}

impl AggregateStatus {
    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Degraded => "degraded",
            Self::Offline => "offline",
        }
    }

    /// Uppercase badge text.
    pub fn badge(self) -> &'static str {
        match self {
            Self::Online => "ONLINE",
            Self::Degraded => "DEGRADED",
            Self::Offline => "OFFLINE",
        }
    }
}

/// Tree depth a rollup is computed for; only changes the failure label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollupLevel {
    /// Server or subnet group
    Group,
    /// Single address or single check
    Address,
}

/// Aggregate of a record group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rollup {
    /// Combined status
    pub status: AggregateStatus,
    /// Mean usable latency in milliseconds
    pub latency: Option<f64>,
}

impl Rollup {
    /// Compute the rollup for a non-empty group.
    ///
    /// Callers only invoke this on groups produced by bucketing, which are
    /// never empty. An empty slice yields an online rollup without latency.
    pub fn compute(records: &[&CheckRecord], level: RollupLevel) -> Self {
        debug_assert!(!records.is_empty(), "rollup over an empty group");

        let healthy = records.iter().all(|r| r.status);
        let status = match (healthy, level) {
            (true, _) => AggregateStatus::Online,
            (false, RollupLevel::Group) => AggregateStatus::Degraded,
            (false, RollupLevel::Address) => AggregateStatus::Offline,
        };

        Self {
            status,
            latency: mean_latency(records.iter().copied()),
        }
    }

    /// Latency column text, one decimal place or `--`.
    pub fn latency_label(&self) -> String {
        format_latency(self.latency, 1)
    }
}
