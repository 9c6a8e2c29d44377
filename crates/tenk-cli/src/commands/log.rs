use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::Subcommand;
use tenk_core::clock::{Clock, SystemClock};
use tenk_core::duration::{format_hours, parse_hours};
use tenk_core::stats::Period;
use tenk_core::storage::{Database, EntryQuery};

use super::{print_json, resolve_activity, CliResult};

#[derive(Subcommand)]
pub enum LogAction {
    /// Log time manually
    Add {
        /// Activity id or name
        activity: String,
        /// Duration, e.g. "2h 30m", "90m" or "1.5"
        duration: String,
        /// Day (YYYY-MM-DD) or time (YYYY-MM-DD HH:MM) the time counts toward
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List time entries
    List {
        /// today, this_week, last_30_days, ...
        #[arg(long)]
        period: Option<Period>,
        /// Activity id or name
        #[arg(long)]
        activity: Option<String>,
    },
}

fn parse_date(input: &str) -> Result<NaiveDateTime, Box<dyn std::error::Error>> {
    let input = input.trim();
    if let Ok(at) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        return Ok(at);
    }
    let day = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{input}' (expected YYYY-MM-DD [HH:MM])"))?;
    Ok(day.and_time(NaiveTime::MIN))
}

pub fn run(action: LogAction) -> CliResult {
    let db = Database::open()?;

    match action {
        LogAction::Add {
            activity,
            duration,
            date,
            notes,
        } => {
            let activity = resolve_activity(&db, &activity)?;
            let hours = parse_hours(&duration)?;
            let date = date.as_deref().map(parse_date).transpose()?;
            let outcome = db.add_time_entry(activity.id, hours, date, notes.as_deref())?;
            println!(
                "Logged {} to {} (entry {})",
                format_hours(hours),
                activity.name,
                outcome.entry_id
            );
            for threshold in &outcome.milestones {
                println!("Milestone reached: {threshold} hours of {}", activity.name);
            }
        }
        LogAction::List { period, activity } => {
            let mut query = match activity {
                Some(reference) => EntryQuery::for_activity(resolve_activity(&db, &reference)?.id),
                None => EntryQuery::all(),
            };
            if let Some(period) = period {
                let (start, end) = period.bounds(SystemClock.today());
                query = query.between(start, end);
            }
            print_json(&db.list_entries(query)?)?;
        }
    }
    Ok(())
}
