use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tenk", version, about = "Track practice time toward 10,000 hours")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Activity management
    Activity {
        #[command(subcommand)]
        action: commands::activity::ActivityAction,
    },
    /// Manual time entries
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Stopwatch control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Pomodoro cycle control
    Pomodoro {
        #[command(subcommand)]
        action: commands::pomodoro::PomodoroAction,
    },
    /// Progress statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TENK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Activity { action } => commands::activity::run(action),
        Commands::Log { action } => commands::log::run(action),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Pomodoro { action } => commands::pomodoro::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
