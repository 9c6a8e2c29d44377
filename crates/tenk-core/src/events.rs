use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{PomodoroPhase, StopwatchState};

/// Every timer state change produces an Event.
/// The presentation layer renders them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        activity_id: i64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        elapsed_ms: i64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        elapsed_ms: i64,
        at: DateTime<Utc>,
    },
    /// Stopwatch stopped and its time committed as an entry.
    TimerStopped {
        activity_id: i64,
        entry_id: i64,
        hours: f64,
        at: DateTime<Utc>,
    },
    /// Stopwatch abandoned without committing anything.
    TimerDiscarded {
        activity_id: i64,
        elapsed_ms: i64,
        at: DateTime<Utc>,
    },
    TimerSnapshot {
        state: StopwatchState,
        activity_id: Option<i64>,
        elapsed_ms: i64,
        at: DateTime<Utc>,
    },
    PomodoroStarted {
        activity_id: i64,
        work_minutes: u32,
        break_minutes: u32,
        total_sessions: u32,
        at: DateTime<Utc>,
    },
    PomodoroPhaseChanged {
        session: u32,
        total_sessions: u32,
        phase: PomodoroPhase,
        duration_secs: i64,
        at: DateTime<Utc>,
    },
    /// Every planned work phase finished; the full work time was committed.
    PomodoroCompleted {
        activity_id: i64,
        entry_id: i64,
        hours: f64,
        at: DateTime<Utc>,
    },
    /// Stopped early. `entry_id` is `None` when stopped during a break.
    PomodoroStopped {
        activity_id: i64,
        entry_id: Option<i64>,
        hours: f64,
        at: DateTime<Utc>,
    },
    PomodoroSnapshot {
        running: bool,
        activity_id: Option<i64>,
        session: u32,
        total_sessions: u32,
        phase: Option<PomodoroPhase>,
        remaining_ms: i64,
        at: DateTime<Utc>,
    },
    MilestoneReached {
        activity_id: i64,
        hours_reached: u32,
        at: DateTime<Utc>,
    },
}
