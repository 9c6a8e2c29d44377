//! Statistics for the mastery dashboard.
//!
//! The aggregate functions in [`engine`] are pure and take `today`
//! explicitly. [`summarize_activity`] and [`record_milestones`] read through
//! the [`TimeStore`](crate::storage::TimeStore) gateway instead.

pub mod engine;
mod milestones;
mod progress;
mod summary;

pub use engine::{
    average_since, best_day, consistency_score, daily_average, daily_totals, hours_by_activity,
    streak, today_hours, total_hours, velocity, week_hours, week_start, BestDay,
};

pub use milestones::{milestones_reached, next_milestone, record_milestones, MILESTONES};
pub(crate) use milestones::record_milestones_after_commit;

pub use progress::{
    estimate_completion_date, format_time_remaining, productivity_score, GoalProgress, Period,
};

pub use summary::{summarize_activity, ActivityHours, ActivityStats, Overview};
