//! Top-line counters over the whole record set.

use crate::core::CheckRecord;
use crate::engine::latency::{format_latency, mean_latency};
use serde::Serialize;
use std::collections::HashMap;

/// Classification of one address across all of its checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    /// Every check passed
    Healthy,
    /// At least one check still waits for its first result
    Syncing,
    /// Not syncing and at least one check failed
    Failed,
}

impl HostState {
    /// Classify the checks of one address; syncing wins over failed.
    pub fn classify(checks: &[&CheckRecord]) -> Self {
        if checks.iter().any(|c| c.is_syncing()) {
            Self::Syncing
        } else if checks.iter().all(|c| c.status) {
            Self::Healthy
        } else {
            Self::Failed
        }
    }
}

/// Summary values shown above the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Distinct target addresses
    pub total: usize,
    /// Addresses with every check passing
    pub healthy: usize,
    /// Addresses with a failing check
    pub failed: usize,
    /// Addresses still synchronizing
    pub syncing: usize,
    /// Mean usable latency over all records
    pub avg_latency: Option<f64>,
}

impl Summary {
    /// Compute the summary for a full record set.
    pub fn compute(records: &[CheckRecord]) -> Self {
        let mut hosts: HashMap<&str, Vec<&CheckRecord>> = HashMap::new();
        for record in records {
            hosts.entry(record.host_key()).or_default().push(record);
        }

        let mut summary = Summary {
            total: hosts.len(),
            avg_latency: mean_latency(records),
            ..Default::default()
        };

        for checks in hosts.values() {
            match HostState::classify(checks) {
                HostState::Healthy => summary.healthy += 1,
                HostState::Syncing => summary.syncing += 1,
                HostState::Failed => summary.failed += 1,
            }
        }

        summary
    }

    /// Average latency text, one decimal place or `--`.
    pub fn latency_label(&self) -> String {
        format_latency(self.avg_latency, 1)
    }
}
