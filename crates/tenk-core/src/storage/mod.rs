mod config;
pub mod database;
pub mod gateway;
pub mod migrations;
pub mod models;

pub use config::{ActivityConfig, Config, GoalConfig, PomodoroConfig, StatsConfig, TimerConfig};
pub use database::{Database, EntryOutcome};
pub use gateway::{DateFilter, TimeStore};
pub use models::{Activity, ActivityUpdate, EntryQuery, EntryRecord, Milestone, NewActivity};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory.
///
/// `TENK_HOME` wins when set. Otherwise `~/.config/tenk[-dev]/`, with
/// `TENK_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("TENK_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TENK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("tenk-dev")
            } else {
                base_dir.join("tenk")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
