//! Async driver of the refresh cycle.
//!
//! One task owns the clock. It ticks the engine every `refresh.tick`,
//! starts fetches on the feed, applies their results and settles them
//! once the busy window has passed. Every state change bumps a
//! [`watch`] counter so renderers know when to redraw.

use crate::core::{CheckRecord, Result};
use crate::engine::transitions::log_transition;
use crate::engine::{FetchTicket, Settlement, SharedEngine};
use crate::feed::CheckFeed;
use crate::notify::WebhookNotifier;
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Requests accepted by the refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a visual refresh now
    Refresh,
}

type Completion = (FetchTicket, Result<Vec<CheckRecord>>);

/// Handle to a running refresh loop.
///
/// Dropping the handle stops the loop.
#[derive(Debug)]
pub struct RefreshHandle {
    commands: mpsc::Sender<Command>,
    updates: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Ask for a manual refresh; ignored while one is in flight.
    pub fn request_refresh(&self) {
        if self.commands.try_send(Command::Refresh).is_err() {
            tracing::debug!("Refresh request dropped: loop busy or stopped");
        }
    }

    /// Receiver bumped after every engine state change.
    pub fn updates(&self) -> watch::Receiver<u64> {
        self.updates.clone()
    }

    /// Sender for commands, e.g. for another surface.
    pub fn commands(&self) -> mpsc::Sender<Command> {
        self.commands.clone()
    }

    /// Stop the loop.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Refresh loop state.
pub struct RefreshLoop {
    engine: SharedEngine,
    feed: Arc<dyn CheckFeed>,
    notifier: Option<WebhookNotifier>,
    tick: Duration,
}

impl RefreshLoop {
    /// Create a loop for `engine` fed by `feed`.
    pub fn new(engine: SharedEngine, feed: Arc<dyn CheckFeed>, tick: Duration) -> Self {
        Self {
            engine,
            feed,
            notifier: None,
            tick,
        }
    }

    /// Deliver status transitions to a webhook.
    pub fn with_notifier(mut self, notifier: Option<WebhookNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Spawn the loop on the current runtime.
    pub fn spawn(self) -> RefreshHandle {
        let (command_tx, command_rx) = mpsc::channel(8);
        let (update_tx, update_rx) = watch::channel(0u64);
        let task = tokio::spawn(self.run(command_rx, update_tx));
        RefreshHandle {
            commands: command_tx,
            updates: update_rx,
            task,
        }
    }

    async fn run(self, mut commands: mpsc::Receiver<Command>, updates: watch::Sender<u64>) {
        let (done_tx, mut done_rx) = mpsc::channel::<Completion>(4);
        let mut pending: Option<Settlement> = None;
        let publish = || updates.send_modify(|version| *version = version.wrapping_add(1));

        tracing::info!(feed = %self.feed.describe(), "Refresh loop started");

        // Initial load skips the busy treatment
        self.start_fetch(false, &done_tx);
        publish();

        let mut ticker = time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let settle_at = pending.map(|s| time::Instant::from_std(s.due));

            tokio::select! {
                _ = ticker.tick() => {
                    let tick = self.engine.lock().tick(Local::now());
                    if tick.due {
                        self.start_fetch(true, &done_tx);
                    }
                    publish();
                }
                Some((ticket, result)) = done_rx.recv() => {
                    let (settlement, transitions) = self.engine.lock().complete(ticket, result);
                    for transition in &transitions {
                        log_transition(transition);
                    }
                    if let Some(notifier) = &self.notifier {
                        notifier.spawn_notify(transitions);
                    }
                    pending = Some(settlement);
                    publish();
                }
                _ = time::sleep_until(settle_at.unwrap_or_else(time::Instant::now)), if settle_at.is_some() => {
                    if let Some(settlement) = pending.take() {
                        let status = {
                            let mut engine = self.engine.lock();
                            engine.settle(settlement);
                            engine.status()
                        };
                        tracing::debug!(status = %status.label(), "Refresh settled");
                    }
                    publish();
                }
                command = commands.recv() => match command {
                    Some(Command::Refresh) => {
                        self.start_fetch(true, &done_tx);
                        publish();
                    },
                    None => break,
                },
            }
        }

        tracing::info!("Refresh loop stopped");
    }

    fn start_fetch(&self, visual: bool, done: &mpsc::Sender<Completion>) {
        let Some(ticket) = self.engine.lock().begin(visual) else {
            return;
        };

        let feed = Arc::clone(&self.feed);
        let done = done.clone();
        tokio::spawn(async move {
            // A panicking feed still completes the ticket
            let result = match tokio::spawn(async move { feed.fetch().await }).await {
                Ok(result) => result,
                Err(e) => Err(e.into()),
            };
            if done.send((ticket, result)).await.is_err() {
                tracing::debug!("Refresh loop gone before fetch completed");
            }
        });
    }
}
