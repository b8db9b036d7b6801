//! Tree aggregation engine.
//!
//! Everything in here is synchronous and runs to completion. The
//! [`Engine`] composes the refresh controller with the expansion store and
//! the active query; drivers share it as a [`SharedEngine`].

pub mod expansion;
pub mod filter;
pub mod grouping;
pub mod latency;
pub mod refresh;
pub mod render;
pub mod rollup;
pub mod summary;
pub mod transitions;

pub use expansion::{ExpansionState, NodeKey, Section};
pub use refresh::{EngineStatus, FetchTicket, RefreshController, RefreshSettings, Settlement, TickOutput};
pub use render::{render_dashboard, DashboardView, NodeRow, Panel};
pub use rollup::{AggregateStatus, Rollup};
pub use summary::Summary;
pub use transitions::{detect_transitions, Transition};

use crate::core::{CheckRecord, Result};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Engine handle shared by the refresh loop and the outer surfaces.
pub type SharedEngine = Arc<Mutex<Engine>>;

/// Record snapshot, expansion state and query of one dashboard.
#[derive(Debug)]
pub struct Engine {
    controller: RefreshController,
    expansion: ExpansionState,
    query: String,
    has_baseline: bool,
    last_tick: Option<TickOutput>,
}

impl Engine {
    /// Create an engine with seeded expansion state and an empty snapshot.
    pub fn new(settings: RefreshSettings) -> Self {
        Self {
            controller: RefreshController::new(settings),
            expansion: ExpansionState::new(),
            query: String::new(),
            has_baseline: false,
            last_tick: None,
        }
    }

    /// Wrap into a [`SharedEngine`].
    pub fn shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    /// Render with the active query.
    pub fn view(&self) -> DashboardView {
        self.view_with(&self.query)
    }

    /// Render with an explicit query, leaving the active one untouched.
    pub fn view_with(&self, query: &str) -> DashboardView {
        render_dashboard(&self.controller.records(), &self.expansion, query)
    }

    /// Toggle a node key; returns the new membership.
    pub fn toggle(&mut self, key: &str) -> bool {
        let expanded = self.expansion.toggle(key);
        tracing::debug!(key, expanded, "Node toggled");
        expanded
    }

    /// Expansion state.
    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    /// Replace the active query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Active query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Advance the clock.
    pub fn tick(&mut self, now: DateTime<Local>) -> TickOutput {
        let output = self.controller.on_tick(now);
        self.last_tick = Some(output.clone());
        output
    }

    /// Clock and countdown of the most recent tick.
    pub fn last_tick(&self) -> Option<&TickOutput> {
        self.last_tick.as_ref()
    }

    /// Start a refresh if none is in flight.
    pub fn begin(&mut self, visual: bool) -> Option<FetchTicket> {
        self.controller.begin(visual, Instant::now())
    }

    /// Apply a fetch result.
    ///
    /// Also returns the status transitions against the previous snapshot;
    /// the first applied snapshot only establishes the baseline.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<Vec<CheckRecord>>) -> (Settlement, Vec<Transition>) {
        self.complete_at(ticket, result, Instant::now(), Local::now())
    }

    /// [`Engine::complete`] with explicit clocks.
    pub fn complete_at(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<CheckRecord>>,
        now: Instant,
        wall: DateTime<Local>,
    ) -> (Settlement, Vec<Transition>) {
        let previous = self.controller.records();
        let succeeded = result.is_ok();
        let settlement = self.controller.complete(ticket, result, now, wall);

        if !succeeded {
            return (settlement, Vec::new());
        }

        let transitions = if self.has_baseline {
            detect_transitions(&previous, &self.controller.records())
        } else {
            Vec::new()
        };
        self.has_baseline = true;
        (settlement, transitions)
    }

    /// Return to idle after a settlement came due.
    pub fn settle(&mut self, settlement: Settlement) -> bool {
        self.controller.settle(settlement)
    }

    /// Current record snapshot.
    pub fn records(&self) -> Arc<Vec<CheckRecord>> {
        self.controller.records()
    }

    /// Current summary values.
    pub fn summary(&self) -> Summary {
        *self.controller.summary()
    }

    /// Engine label state.
    pub fn status(&self) -> EngineStatus {
        self.controller.status()
    }

    /// Refresh controller.
    pub fn controller(&self) -> &RefreshController {
        &self.controller
    }

    /// Wall-clock time of the last applied refresh.
    pub fn last_sync(&self) -> Option<DateTime<Local>> {
        self.controller.last_sync()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(RefreshSettings::default())
    }
}
