use clap::Subcommand;
use tenk_core::clock::{Clock, SystemClock};
use tenk_core::stats;
use tenk_core::storage::{ActivityUpdate, Config, Database, NewActivity, TimeStore};

use super::{print_json, resolve_activity, CliResult};

#[derive(Subcommand)]
pub enum ActivityAction {
    /// Create a new activity
    Add {
        /// Activity name
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Color as #RRGGBB
        #[arg(long)]
        color: Option<String>,
        /// Make this the main activity
        #[arg(long)]
        main: bool,
    },
    /// List activities with their stats
    List,
    /// Show one activity with its stats
    Show {
        /// Activity id or name
        activity: String,
    },
    /// Update activity fields
    Update {
        /// Activity id or name
        activity: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete an activity and all of its entries
    Delete {
        /// Activity id or name
        activity: String,
    },
    /// Make an activity the main one
    SetMain {
        /// Activity id or name
        activity: String,
    },
    /// List milestones reached by an activity
    Milestones {
        /// Activity id or name
        activity: String,
    },
}

pub fn run(action: ActivityAction) -> CliResult {
    let db = Database::open()?;
    let today = SystemClock.today();

    match action {
        ActivityAction::Add {
            name,
            description,
            category,
            color,
            main,
        } => {
            let color = match color {
                Some(color) => color,
                None => Config::load_or_default().activity.default_color,
            };
            let new = NewActivity {
                name,
                description,
                category,
                is_main: main,
                color,
            };
            let id = db.create_activity(new)?;
            println!("Activity created: {id}");
        }
        ActivityAction::List => {
            let summaries = db
                .list_activities()?
                .iter()
                .map(|activity| stats::summarize_activity(&db, activity, today))
                .collect::<Result<Vec<_>, _>>()?;
            print_json(&summaries)?;
        }
        ActivityAction::Show { activity } => {
            let activity = resolve_activity(&db, &activity)?;
            print_json(&stats::summarize_activity(&db, &activity, today)?)?;
        }
        ActivityAction::Update {
            activity,
            name,
            description,
            category,
            color,
        } => {
            let activity = resolve_activity(&db, &activity)?;
            let update = ActivityUpdate {
                name,
                description,
                category,
                is_main: None,
                color,
            };
            if update.is_empty() {
                return Err("nothing to update".into());
            }
            db.update_activity(activity.id, update)?;
            println!("Activity updated: {}", activity.id);
        }
        ActivityAction::Delete { activity } => {
            let activity = resolve_activity(&db, &activity)?;
            db.delete_activity(activity.id)?;
            println!("Activity deleted: {} ({})", activity.id, activity.name);
        }
        ActivityAction::SetMain { activity } => {
            let activity = resolve_activity(&db, &activity)?;
            db.set_main_activity(activity.id)?;
            println!("Main activity: {}", activity.name);
        }
        ActivityAction::Milestones { activity } => {
            let activity = resolve_activity(&db, &activity)?;
            print_json(&db.list_milestones(activity.id)?)?;
        }
    }
    Ok(())
}
