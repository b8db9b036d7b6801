//! Refresh cycle state machine.
//!
//! ```text
//! Idle ──begin──▶ Fetching ──complete──▶ Succeeded | Failed ──settle──▶ Idle
//! ```
//!
//! The controller owns the current record snapshot. It never sleeps or
//! spawns: `complete` returns a [`Settlement`] with the instant at which
//! the driver must call `settle`, which keeps the state machine testable
//! with synthetic clocks.

use crate::core::config::RefreshConfig;
use crate::core::{CheckRecord, Result};
use crate::engine::summary::Summary;
use chrono::{DateTime, Local, Timelike};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Timing knobs of the refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSettings {
    /// Boundary in wall-clock seconds
    pub interval_secs: u32,
    /// Minimum busy time of a visual refresh
    pub min_busy: Duration,
    /// Delay before the offline label after a failure
    pub offline_delay: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self::from(&RefreshConfig::default())
    }
}

impl From<&RefreshConfig> for RefreshSettings {
    fn from(config: &RefreshConfig) -> Self {
        Self {
            interval_secs: config.interval_secs.max(1),
            min_busy: config.min_busy,
            offline_delay: config.offline_delay,
        }
    }
}

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing in flight
    Idle,
    /// A fetch is outstanding
    Fetching,
    /// New records applied, waiting for the busy window to end
    Succeeded,
    /// Fetch failed, waiting to surface the offline label
    Failed,
}

/// Engine status label shown next to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// No refresh has settled yet
    Starting,
    /// A visual refresh is running
    Fetching,
    /// Last refresh succeeded and nothing is syncing
    Synced,
    /// Last refresh succeeded with this many syncing addresses
    Syncing(usize),
    /// Last refresh failed; the records shown are stale
    Offline,
}

impl EngineStatus {
    /// Label text, e.g. `ENGINE: SYNCING (3)`.
    pub fn label(&self) -> String {
        match self {
            Self::Starting => "ENGINE: STARTING".to_string(),
            Self::Fetching => "ENGINE: FETCHING".to_string(),
            Self::Synced => "ENGINE: SYNCED".to_string(),
            Self::Syncing(n) => format!("ENGINE: SYNCING ({})", n),
            Self::Offline => "ENGINE: OFFLINE".to_string(),
        }
    }
}

/// Handle for one outstanding fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    id: u64,
    visual: bool,
    started: Instant,
}

impl FetchTicket {
    /// Whether the refresh shows the busy treatment.
    pub fn is_visual(&self) -> bool {
        self.visual
    }
}

/// Terminal outcome of one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Records were replaced
    Success {
        /// Addresses still synchronizing
        syncing: usize,
    },
    /// Records were kept
    Failure,
}

/// Deferred return to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    ticket_id: u64,
    /// When `settle` should run
    pub due: Instant,
    /// What the fetch produced
    pub outcome: Outcome,
}

/// Result of one clock tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutput {
    /// Wall clock, `HH:MM:SS`
    pub clock: String,
    /// Countdown `[NNs]`, hidden while a visual refresh is busy
    pub countdown: Option<String>,
    /// A periodic refresh should start now
    pub due: bool,
}

/// Owner of the record snapshot and the refresh state machine.
#[derive(Debug)]
pub struct RefreshController {
    settings: RefreshSettings,
    phase: Phase,
    busy: bool,
    visual: bool,
    in_flight: Option<u64>,
    next_ticket: u64,
    last_fetch_sec: Option<u32>,
    records: Arc<Vec<CheckRecord>>,
    summary: Summary,
    status: EngineStatus,
    last_sync: Option<DateTime<Local>>,
    last_error: Option<String>,
}

impl RefreshController {
    /// Create an idle controller with an empty snapshot.
    pub fn new(settings: RefreshSettings) -> Self {
        Self {
            settings,
            phase: Phase::Idle,
            busy: false,
            visual: false,
            in_flight: None,
            next_ticket: 0,
            last_fetch_sec: None,
            records: Arc::new(Vec::new()),
            summary: Summary::default(),
            status: EngineStatus::Starting,
            last_sync: None,
            last_error: None,
        }
    }

    /// Seconds until the next boundary, in `1..=interval`.
    pub fn seconds_until_refresh(&self, second: u32) -> u32 {
        self.settings.interval_secs - (second % self.settings.interval_secs)
    }

    /// Advance the clock.
    ///
    /// A refresh is due once per boundary crossing, never twice within the
    /// same wall-clock second, and never while busy.
    pub fn on_tick(&mut self, now: DateTime<Local>) -> TickOutput {
        let second = now.second();
        let remaining = self.seconds_until_refresh(second);

        let due = remaining == self.settings.interval_secs
            && self.last_fetch_sec != Some(second)
            && !self.busy;
        if due {
            self.last_fetch_sec = Some(second);
        }

        let countdown = if self.busy && self.visual {
            None
        } else {
            Some(format!("[{:02}s]", remaining))
        };

        TickOutput {
            clock: now.format("%H:%M:%S").to_string(),
            countdown,
            due,
        }
    }

    /// Enter `Fetching`, unless a cycle is already in flight.
    pub fn begin(&mut self, visual: bool, now: Instant) -> Option<FetchTicket> {
        if self.busy {
            tracing::debug!(phase = ?self.phase, "Refresh suppressed: cycle already in flight");
            return None;
        }

        let id = self.next_ticket;
        self.next_ticket += 1;
        self.busy = true;
        self.visual = visual;
        self.in_flight = Some(id);
        self.phase = Phase::Fetching;
        if visual {
            self.status = EngineStatus::Fetching;
        }

        tracing::debug!(ticket = id, visual, "Refresh started");
        Some(FetchTicket {
            id,
            visual,
            started: now,
        })
    }

    /// Apply the fetch result.
    ///
    /// On success the snapshot is replaced wholesale and the summary
    /// recomputed; on failure the stale snapshot stays.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<CheckRecord>>,
        now: Instant,
        wall: DateTime<Local>,
    ) -> Settlement {
        match result {
            Ok(records) => {
                self.summary = Summary::compute(&records);
                self.records = Arc::new(records);
                self.last_sync = Some(wall);
                self.last_error = None;
                self.phase = Phase::Succeeded;

                let minimum = if ticket.visual {
                    self.settings.min_busy
                } else {
                    Duration::ZERO
                };
                let remaining = minimum.saturating_sub(now.saturating_duration_since(ticket.started));

                tracing::info!(
                    records = self.records.len(),
                    hosts = self.summary.total,
                    healthy = self.summary.healthy,
                    failed = self.summary.failed,
                    "Refresh applied"
                );

                Settlement {
                    ticket_id: ticket.id,
                    due: now + remaining,
                    outcome: Outcome::Success {
                        syncing: self.summary.syncing,
                    },
                }
            },
            Err(e) => {
                tracing::warn!(category = e.category(), "Refresh failed, keeping stale data: {}", e);
                self.last_error = Some(e.to_string());
                self.phase = Phase::Failed;
                Settlement {
                    ticket_id: ticket.id,
                    due: now + self.settings.offline_delay,
                    outcome: Outcome::Failure,
                }
            },
        }
    }

    /// Return to `Idle` and publish the final engine label.
    ///
    /// Settlements for a ticket that is no longer in flight are ignored.
    pub fn settle(&mut self, settlement: Settlement) -> bool {
        if self.in_flight != Some(settlement.ticket_id) {
            tracing::debug!(ticket = settlement.ticket_id, "Ignoring stale settlement");
            return false;
        }

        self.in_flight = None;
        self.busy = false;
        self.visual = false;
        self.phase = Phase::Idle;
        self.status = match settlement.outcome {
            Outcome::Success { syncing: 0 } => EngineStatus::Synced,
            Outcome::Success { syncing } => EngineStatus::Syncing(syncing),
            Outcome::Failure => EngineStatus::Offline,
        };
        true
    }

    /// Current record snapshot.
    pub fn records(&self) -> Arc<Vec<CheckRecord>> {
        Arc::clone(&self.records)
    }

    /// Current summary values.
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Current engine label state.
    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a cycle is in flight or settling.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether the current cycle shows the busy treatment.
    pub fn is_visual(&self) -> bool {
        self.busy && self.visual
    }

    /// Wall-clock time of the last applied refresh.
    pub fn last_sync(&self) -> Option<DateTime<Local>> {
        self.last_sync
    }

    /// Message of the last failure, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Timing settings.
    pub fn settings(&self) -> &RefreshSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NetpulseError;
    use chrono::TimeZone;

    fn at(second: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 0, second).single().unwrap()
    }

    fn record(target: &str, status: bool, message: &str) -> CheckRecord {
        CheckRecord {
            target_address: Some(target.into()),
            status,
            message: message.into(),
            ..Default::default()
        }
    }

    fn controller() -> RefreshController {
        RefreshController::new(RefreshSettings::default())
    }

    #[test]
    fn test_tick_fires_once_per_boundary() {
        let mut ctl = controller();

        let out = ctl.on_tick(at(29));
        assert!(!out.due);
        assert_eq!(out.countdown.as_deref(), Some("[01s]"));

        let out = ctl.on_tick(at(30));
        assert!(out.due);
        assert_eq!(out.countdown.as_deref(), Some("[30s]"));
        assert_eq!(out.clock, "12:00:30");

        // Same wall-clock second again
        assert!(!ctl.on_tick(at(30)).due);
        assert!(!ctl.on_tick(at(31)).due);
        assert!(ctl.on_tick(at(0)).due);
    }

    #[test]
    fn test_tick_suppressed_while_busy() {
        let mut ctl = controller();
        let now = Instant::now();
        ctl.begin(true, now).unwrap();

        let out = ctl.on_tick(at(0));
        assert!(!out.due);
        assert_eq!(out.countdown, None);
        assert!(ctl.begin(true, now).is_none());
    }

    #[test]
    fn test_non_visual_refresh_keeps_countdown() {
        let mut ctl = controller();
        ctl.begin(false, Instant::now()).unwrap();
        assert_eq!(ctl.status(), EngineStatus::Starting);
        assert_eq!(ctl.on_tick(at(10)).countdown.as_deref(), Some("[20s]"));
    }

    #[test]
    fn test_visual_success_waits_for_minimum() {
        let mut ctl = controller();
        let start = Instant::now();
        let ticket = ctl.begin(true, start).unwrap();
        assert_eq!(ctl.status(), EngineStatus::Fetching);

        let done = start + Duration::from_millis(1200);
        let records = vec![record("10.0.0.1", true, "ok"), record("10.0.0.2", false, "timeout")];
        let settlement = ctl.complete(ticket, Ok(records), done, at(5));

        assert_eq!(settlement.due, start + Duration::from_millis(3000));
        assert_eq!(settlement.outcome, Outcome::Success { syncing: 0 });
        assert_eq!(ctl.phase(), Phase::Succeeded);
        assert!(ctl.is_busy());
        assert_eq!(ctl.records().len(), 2);
        assert_eq!(ctl.summary().failed, 1);
        assert_eq!(ctl.last_sync(), Some(at(5)));

        assert!(ctl.settle(settlement));
        assert_eq!(ctl.phase(), Phase::Idle);
        assert_eq!(ctl.status(), EngineStatus::Synced);
        assert!(!ctl.is_busy());
    }

    #[test]
    fn test_slow_fetch_settles_immediately() {
        let mut ctl = controller();
        let start = Instant::now();
        let ticket = ctl.begin(true, start).unwrap();
        let done = start + Duration::from_secs(5);
        let settlement = ctl.complete(ticket, Ok(vec![]), done, at(5));
        assert_eq!(settlement.due, done);
    }

    #[test]
    fn test_non_visual_success_has_no_minimum() {
        let mut ctl = controller();
        let start = Instant::now();
        let ticket = ctl.begin(false, start).unwrap();
        let settlement = ctl.complete(
            ticket,
            Ok(vec![record("10.0.0.1", false, "Synchronizing status...")]),
            start,
            at(1),
        );
        assert_eq!(settlement.due, start);
        ctl.settle(settlement);
        assert_eq!(ctl.status(), EngineStatus::Syncing(1));
        assert_eq!(ctl.status().label(), "ENGINE: SYNCING (1)");
    }

    #[test]
    fn test_failure_keeps_stale_records() {
        let mut ctl = controller();
        let start = Instant::now();
        let ticket = ctl.begin(false, start).unwrap();
        let settlement = ctl.complete(ticket, Ok(vec![record("10.0.0.1", true, "ok")]), start, at(1));
        ctl.settle(settlement);

        let ticket = ctl.begin(true, start).unwrap();
        let settlement = ctl.complete(ticket, Err(NetpulseError::feed("HTTP 502")), start, at(2));
        assert_eq!(settlement.due, start + Duration::from_millis(1000));
        assert_eq!(settlement.outcome, Outcome::Failure);
        assert_eq!(ctl.records().len(), 1);
        assert_eq!(ctl.last_sync(), Some(at(1)));
        assert_eq!(ctl.last_error(), Some("Feed unavailable: HTTP 502"));

        ctl.settle(settlement);
        assert_eq!(ctl.status(), EngineStatus::Offline);
        assert!(!ctl.is_busy());
    }

    #[test]
    fn test_stale_settlement_is_ignored() {
        let mut ctl = controller();
        let start = Instant::now();
        let ticket = ctl.begin(false, start).unwrap();
        let settlement = ctl.complete(ticket, Ok(vec![]), start, at(1));
        assert!(ctl.settle(settlement));
        assert!(!ctl.settle(settlement));
    }

    #[test]
    fn test_countdown_for_short_interval() {
        let ctl = RefreshController::new(RefreshSettings {
            interval_secs: 15,
            ..RefreshSettings::default()
        });
        assert_eq!(ctl.seconds_until_refresh(14), 1);
        assert_eq!(ctl.seconds_until_refresh(15), 15);
        assert_eq!(ctl.seconds_until_refresh(59), 1);
    }
}
