pub mod activity;
pub mod config;
pub mod log;
pub mod pomodoro;
pub mod stats;
pub mod timer;

use serde::Serialize;
use tenk_core::storage::{Activity, Database};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Look up an activity by numeric id, falling back to its exact name.
pub fn resolve_activity(
    db: &Database,
    reference: &str,
) -> Result<Activity, Box<dyn std::error::Error>> {
    if let Ok(id) = reference.trim().parse::<i64>() {
        if let Some(activity) = db.get_activity(id)? {
            return Ok(activity);
        }
    }
    db.find_activity_by_name(reference)?
        .ok_or_else(|| format!("activity not found: {reference}").into())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
