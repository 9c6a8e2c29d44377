use clap::Subcommand;
use serde::Serialize;
use tenk_core::clock::{Clock, SystemClock};
use tenk_core::stats::{self, GoalProgress, Overview, Period};
use tenk_core::storage::{Config, Database, EntryQuery};

use super::{print_json, resolve_activity, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Totals, streak, velocity and consistency
    Overview {
        /// Restrict to a period (today, this_week, last_30_days, ...)
        #[arg(long)]
        period: Option<Period>,
        /// Activity id or name
        #[arg(long)]
        activity: Option<String>,
    },
    /// Progress toward the mastery goal
    Goal {
        /// Activity id or name; defaults to the main activity
        #[arg(long)]
        activity: Option<String>,
    },
}

#[derive(Serialize)]
struct GoalReport {
    activity: String,
    #[serde(flatten)]
    progress: GoalProgress,
}

pub fn run(action: StatsAction) -> CliResult {
    let db = Database::open()?;
    let config = Config::load_or_default();
    let today = SystemClock.today();

    match action {
        StatsAction::Overview { period, activity } => {
            let mut query = match activity {
                Some(reference) => EntryQuery::for_activity(resolve_activity(&db, &reference)?.id),
                None => EntryQuery::all(),
            };
            if let Some(period) = period {
                let (start, end) = period.bounds(today);
                query = query.between(start, end);
            }
            let entries = db.list_entries(query)?;
            print_json(&Overview::compute(&entries, today, &config.stats))?;
        }
        StatsAction::Goal { activity } => {
            let activity = match activity {
                Some(reference) => resolve_activity(&db, &reference)?,
                None => db
                    .main_activity()?
                    .ok_or("no main activity; pass --activity or run `tenk activity set-main`")?,
            };
            let summary = stats::summarize_activity(&db, &activity, today)?;
            let progress = GoalProgress::compute(
                summary.total_hours,
                config.goal.target_hours,
                summary.daily_avg,
                today,
            );
            print_json(&GoalReport {
                activity: activity.name,
                progress,
            })?;
        }
    }
    Ok(())
}
