//! # tenk Core Library
//!
//! Core logic for tracking practice time toward a 10,000-hour mastery goal.
//! Every operation is available through the standalone `tenk` CLI, which is
//! a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timers**: a stopwatch and a Pomodoro cycle, both wall-clock based and
//!   driven by the caller through [`Clock`]. A poll loop ([`Ticker`]) only
//!   refreshes displays; transitions never sleep.
//! - **Storage**: SQLite persistence behind the [`TimeStore`] gateway and
//!   TOML configuration.
//! - **Statistics**: pure aggregates over time entries plus the milestone
//!   ladder.
//!
//! ## Key Components
//!
//! - [`Stopwatch`] and [`Pomodoro`]: timer state machines
//! - [`Database`]: activities, time entries and milestones
//! - [`Config`]: application configuration
//! - [`Overview`] and [`GoalProgress`]: dashboard figures

pub mod clock;
pub mod duration;
pub mod error;
pub mod events;
pub mod stats;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use duration::{format_clock, format_hours, parse_hours};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Event;
pub use stats::{ActivityStats, GoalProgress, Overview, Period};
pub use storage::{
    Activity, ActivityUpdate, Config, Database, DateFilter, EntryQuery, EntryRecord, Milestone,
    NewActivity, TimeStore,
};
pub use timer::{
    Pomodoro, PomodoroPhase, PomodoroPlan, Stopwatch, StopwatchState, TickControl, Ticker,
};
