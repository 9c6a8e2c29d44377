//! Stopwatch state machine.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused <-> Running) -> Idle
//! ```
//!
//! Elapsed time is always `now - start_time`. Pausing freezes the elapsed
//! duration; resuming moves `start_time` back by that amount, so repeated
//! pause/resume cycles never drift.
//!
//! Invalid transitions return `None` and leave the state untouched.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::Result;
use crate::events::Event;
use crate::stats;
use crate::storage::TimeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopwatchState {
    Idle,
    Running,
    Paused,
}

/// One stopwatch per user session, tied to a single activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stopwatch {
    state: StopwatchState,
    activity_id: Option<i64>,
    start_time: Option<DateTime<Utc>>,
    /// Elapsed time frozen at the last pause, in milliseconds.
    #[serde(default)]
    paused_elapsed_ms: i64,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            state: StopwatchState::Idle,
            activity_id: None,
            start_time: None,
            paused_elapsed_ms: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> StopwatchState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != StopwatchState::Idle
    }

    pub fn activity_id(&self) -> Option<i64> {
        self.activity_id
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    /// Time tracked so far. Zero when idle.
    pub fn elapsed(&self, clock: &dyn Clock) -> Duration {
        match self.state {
            StopwatchState::Idle => Duration::zero(),
            StopwatchState::Paused => Duration::milliseconds(self.paused_elapsed_ms),
            StopwatchState::Running => self
                .start_time
                .map(|start| (clock.now() - start).max(Duration::zero()))
                .unwrap_or_else(Duration::zero),
        }
    }

    pub fn snapshot(&self, clock: &dyn Clock) -> Event {
        Event::TimerSnapshot {
            state: self.state,
            activity_id: self.activity_id,
            elapsed_ms: self.elapsed(clock).num_milliseconds(),
            at: clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, activity_id: i64, clock: &dyn Clock) -> Option<Event> {
        if self.state != StopwatchState::Idle {
            return None;
        }
        let now = clock.now();
        self.state = StopwatchState::Running;
        self.activity_id = Some(activity_id);
        self.start_time = Some(now);
        self.paused_elapsed_ms = 0;
        tracing::debug!(activity_id, "stopwatch started");
        Some(Event::TimerStarted {
            activity_id,
            at: now,
        })
    }

    pub fn pause(&mut self, clock: &dyn Clock) -> Option<Event> {
        if self.state != StopwatchState::Running {
            return None;
        }
        let elapsed = self.elapsed(clock);
        self.paused_elapsed_ms = elapsed.num_milliseconds();
        self.state = StopwatchState::Paused;
        Some(Event::TimerPaused {
            elapsed_ms: self.paused_elapsed_ms,
            at: clock.now(),
        })
    }

    pub fn resume(&mut self, clock: &dyn Clock) -> Option<Event> {
        if self.state != StopwatchState::Paused {
            return None;
        }
        let now = clock.now();
        self.start_time = Some(now - Duration::milliseconds(self.paused_elapsed_ms));
        self.state = StopwatchState::Running;
        Some(Event::TimerResumed {
            elapsed_ms: self.paused_elapsed_ms,
            at: now,
        })
    }

    /// Commit the tracked time as an entry and return to idle.
    ///
    /// Returns `Ok(None)` when idle. On `Err` (unknown activity, storage
    /// failure) nothing was written and the stopwatch keeps its state so the
    /// caller can retry or [`discard`](Self::discard). Once the entry is
    /// written the stop succeeds even if the milestone check fails.
    pub fn stop<S: TimeStore + ?Sized>(
        &mut self,
        store: &S,
        clock: &dyn Clock,
    ) -> Result<Option<Vec<Event>>> {
        let Some(activity_id) = self.activity_id.filter(|_| self.is_active()) else {
            return Ok(None);
        };

        let elapsed = self.elapsed(clock);
        let hours = elapsed.num_milliseconds() as f64 / 3_600_000.0;
        let entry_id = store.insert_time_entry(activity_id, hours, clock.local_now(), None)?;

        let now = clock.now();
        *self = Self::new();
        tracing::info!(activity_id, entry_id, hours, "stopwatch committed");
        let reached = stats::record_milestones_after_commit(store, activity_id);

        let mut events = vec![Event::TimerStopped {
            activity_id,
            entry_id,
            hours,
            at: now,
        }];
        events.extend(reached.into_iter().map(|hours_reached| Event::MilestoneReached {
            activity_id,
            hours_reached,
            at: now,
        }));
        Ok(Some(events))
    }

    /// Abandon the current run without committing anything.
    pub fn discard(&mut self, clock: &dyn Clock) -> Option<Event> {
        let activity_id = self.activity_id.filter(|_| self.is_active())?;
        let elapsed_ms = self.elapsed(clock).num_milliseconds();
        *self = Self::new();
        tracing::warn!(activity_id, elapsed_ms, "stopwatch discarded");
        Some(Event::TimerDiscarded {
            activity_id,
            elapsed_ms,
            at: clock.now(),
        })
    }
}
