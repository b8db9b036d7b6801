//! Status changes between two consecutive snapshots.

use crate::core::{CheckRecord, Status};
use std::collections::HashMap;

/// A check whose status changed since the previous snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Record from the current snapshot
    pub record: CheckRecord,
    /// Previous status
    pub from: Status,
    /// Current status
    pub to: Status,
}

/// Compare two snapshots keyed by check identity.
///
/// A check seen for the first time counts as `Up -> Down` when it is down,
/// and is ignored when it is up.
pub fn detect_transitions(previous: &[CheckRecord], current: &[CheckRecord]) -> Vec<Transition> {
    let before: HashMap<String, Status> = previous.iter().map(|r| (r.identity(), r.health())).collect();

    current
        .iter()
        .filter_map(|record| {
            let to = record.health();
            let from = match before.get(&record.identity()) {
                Some(&old) if old != to => old,
                None if to == Status::Down => Status::Up,
                _ => return None,
            };
            Some(Transition {
                record: record.clone(),
                from,
                to,
            })
        })
        .collect()
}

/// Log a transition: errors for checks going down, warnings for recoveries.
pub fn log_transition(transition: &Transition) {
    let record = &transition.record;
    let line = format!(
        "[CHANGE] {}/{} ({}) -> {:?}",
        record.server_name,
        record.check_type,
        record.target(),
        transition.to
    );
    match transition.to {
        Status::Down => tracing::error!(from = ?transition.from, "{}", line),
        Status::Up => tracing::warn!(from = ?transition.from, "{}", line),
    }
}
