use std::io::Write;

use clap::Subcommand;
use tenk_core::clock::SystemClock;
use tenk_core::duration::format_clock;
use tenk_core::storage::{Config, Database};
use tenk_core::timer::{Pomodoro, PomodoroPhase, PomodoroPlan, TickControl, Ticker};

use super::{print_json, resolve_activity, CliResult};

const POMODORO_KEY: &str = "pomodoro";

#[derive(Subcommand)]
pub enum PomodoroAction {
    /// Start a work/break cycle for an activity
    Start {
        /// Activity id or name
        activity: String,
        /// Work phase length in minutes
        #[arg(long)]
        work: Option<u32>,
        /// Break length in minutes
        #[arg(long = "break")]
        break_minutes: Option<u32>,
        /// Number of work sessions
        #[arg(long)]
        sessions: Option<u32>,
    },
    /// Advance the cycle and print its state as JSON
    Status,
    /// End the cycle early, logging the current work phase
    Stop,
    /// Show a live countdown until the cycle ends
    Watch,
}

fn load_pomodoro(db: &Database) -> Pomodoro {
    match db.kv_get(POMODORO_KEY) {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "discarding unreadable pomodoro state");
            Pomodoro::new()
        }),
        _ => Pomodoro::new(),
    }
}

fn save_pomodoro(db: &Database, pomodoro: &Pomodoro) -> tenk_core::Result<()> {
    let json = serde_json::to_string(pomodoro)?;
    db.kv_set(POMODORO_KEY, &json)
}

pub fn run(action: PomodoroAction) -> CliResult {
    let db = Database::open()?;
    let clock = SystemClock;
    let mut pomodoro = load_pomodoro(&db);

    match action {
        PomodoroAction::Start {
            activity,
            work,
            break_minutes,
            sessions,
        } => {
            let activity = resolve_activity(&db, &activity)?;
            let defaults = Config::load_or_default().pomodoro;
            let plan = PomodoroPlan::new(
                work.unwrap_or(defaults.work_minutes),
                break_minutes.unwrap_or(defaults.break_minutes),
                sessions.unwrap_or(defaults.sessions),
            )?;
            match pomodoro.start(activity.id, plan, &clock) {
                Some(event) => print_json(&event)?,
                None => {
                    eprintln!("a pomodoro cycle is already running");
                    print_json(&pomodoro.snapshot(&clock))?;
                }
            }
        }
        PomodoroAction::Status => {
            let events = pomodoro.tick(&db, &clock)?;
            if !events.is_empty() {
                print_json(&events)?;
            }
            print_json(&pomodoro.snapshot(&clock))?;
        }
        PomodoroAction::Stop => {
            // Phases that already ended are settled before stopping.
            let mut events = pomodoro.tick(&db, &clock)?;
            match pomodoro.stop(&db, &clock)? {
                Some(stopped) => events.extend(stopped),
                None if events.is_empty() => eprintln!("no pomodoro cycle is running"),
                None => {}
            }
            if !events.is_empty() {
                print_json(&events)?;
            }
        }
        PomodoroAction::Watch => {
            let ticker = Ticker::from_config(&Config::load_or_default().timer);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;
            runtime.block_on(ticker.run(|| {
                let mut current = load_pomodoro(&db);
                let events = current.tick(&db, &clock)?;
                save_pomodoro(&db, &current)?;
                for event in &events {
                    println!("\r{}", serde_json::to_string(event)?);
                }
                let Some(session) = current.session() else {
                    return Ok(TickControl::Stop);
                };
                let phase = match session.phase {
                    PomodoroPhase::Work => "work ",
                    PomodoroPhase::Break => "break",
                };
                let remaining = current
                    .remaining(&clock)
                    .unwrap_or_else(chrono::Duration::zero);
                print!(
                    "\r{phase} {}/{} {}",
                    session.current_session,
                    session.plan.total_sessions(),
                    format_clock(remaining)
                );
                std::io::stdout().flush()?;
                Ok(TickControl::Continue)
            }))?;
            return Ok(());
        }
    }

    save_pomodoro(&db, &pomodoro)?;
    Ok(())
}
