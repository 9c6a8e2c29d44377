use std::io::Write;

use clap::Subcommand;
use tenk_core::clock::SystemClock;
use tenk_core::duration::format_clock;
use tenk_core::storage::{Config, Database};
use tenk_core::timer::{StopwatchState, TickControl, Ticker};
use tenk_core::{Event, Stopwatch};

use super::{print_json, resolve_activity, CliResult};

const STOPWATCH_KEY: &str = "stopwatch";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start tracking time for an activity
    Start {
        /// Activity id or name
        activity: String,
    },
    /// Pause the running stopwatch
    Pause,
    /// Resume a paused stopwatch
    Resume,
    /// Stop and log the tracked time
    Stop,
    /// Abandon the current run without logging it
    Discard,
    /// Print current stopwatch state as JSON
    Status,
    /// Show a live clock until the stopwatch stops
    Watch,
}

fn load_stopwatch(db: &Database) -> Stopwatch {
    match db.kv_get(STOPWATCH_KEY) {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "discarding unreadable stopwatch state");
            Stopwatch::new()
        }),
        _ => Stopwatch::new(),
    }
}

fn save_stopwatch(db: &Database, stopwatch: &Stopwatch) -> CliResult {
    let json = serde_json::to_string(stopwatch)?;
    db.kv_set(STOPWATCH_KEY, &json)?;
    Ok(())
}

fn report(event: Option<Event>, stopwatch: &Stopwatch, clock: &SystemClock) -> CliResult {
    match event {
        Some(event) => print_json(&event),
        None => {
            eprintln!("no change: stopwatch is {:?}", stopwatch.state());
            print_json(&stopwatch.snapshot(clock))
        }
    }
}

pub fn run(action: TimerAction) -> CliResult {
    let db = Database::open()?;
    let clock = SystemClock;
    let mut stopwatch = load_stopwatch(&db);

    match action {
        TimerAction::Start { activity } => {
            let activity = resolve_activity(&db, &activity)?;
            let event = stopwatch.start(activity.id, &clock);
            report(event, &stopwatch, &clock)?;
        }
        TimerAction::Pause => {
            let event = stopwatch.pause(&clock);
            report(event, &stopwatch, &clock)?;
        }
        TimerAction::Resume => {
            let event = stopwatch.resume(&clock);
            report(event, &stopwatch, &clock)?;
        }
        TimerAction::Stop => match stopwatch.stop(&db, &clock)? {
            Some(events) => print_json(&events)?,
            None => eprintln!("stopwatch is not running"),
        },
        TimerAction::Discard => match stopwatch.discard(&clock) {
            Some(event) => print_json(&event)?,
            None => eprintln!("stopwatch is not running"),
        },
        TimerAction::Status => {
            print_json(&stopwatch.snapshot(&clock))?;
        }
        TimerAction::Watch => {
            let ticker = Ticker::from_config(&Config::load_or_default().timer);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;
            runtime.block_on(ticker.run(|| {
                let current = load_stopwatch(&db);
                let label = match current.state() {
                    StopwatchState::Idle => return Ok(TickControl::Stop),
                    StopwatchState::Running => "running",
                    StopwatchState::Paused => "paused ",
                };
                print!("\r{label} {}", format_clock(current.elapsed(&clock)));
                std::io::stdout().flush()?;
                Ok(TickControl::Continue)
            }))?;
            println!();
            return Ok(());
        }
    }

    save_stopwatch(&db, &stopwatch)?;
    Ok(())
}
