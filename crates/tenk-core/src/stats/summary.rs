//! Dashboard-level summaries.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::engine::{self, BestDay};
use crate::error::Result;
use crate::storage::{Activity, DateFilter, EntryRecord, StatsConfig, TimeStore};

/// Per-activity figures shown on an activity card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityStats {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_main: bool,
    pub color: String,
    pub total_hours: f64,
    pub today_hours: f64,
    pub week_hours: f64,
    pub daily_avg: f64,
    pub session_count: u64,
    pub streak: u32,
}

/// Compute an activity's figures from storage aggregates.
pub fn summarize_activity<S: TimeStore + ?Sized>(
    store: &S,
    activity: &Activity,
    today: NaiveDate,
) -> Result<ActivityStats> {
    let id = activity.id;
    let total_hours = store.sum_hours(id, DateFilter::All)?;
    let today_hours = store.sum_hours(id, DateFilter::On(today))?;
    let week_hours = store.sum_hours(id, DateFilter::Since(engine::week_start(today)))?;
    let first = store.min_date(id)?.map(|d| d.date());
    let daily_avg = first.map_or(0.0, |first| engine::average_since(total_hours, first, today));
    let session_count = store.count_entries(id)?;
    let streak = match first {
        Some(first) => store_streak(store, id, first, today)?,
        None => 0,
    };

    Ok(ActivityStats {
        id,
        name: activity.name.clone(),
        description: activity.description.clone(),
        category: activity.category.clone(),
        is_main: activity.is_main,
        color: activity.color.clone(),
        total_hours,
        today_hours,
        week_hours,
        daily_avg,
        session_count,
        streak,
    })
}

/// Walk back from `today` one day at a time; stops at the first empty day
/// or at the activity's first entry.
fn store_streak<S: TimeStore + ?Sized>(
    store: &S,
    activity_id: i64,
    first: NaiveDate,
    today: NaiveDate,
) -> Result<u32> {
    let mut day = today;
    let mut count = 0;
    while day >= first && store.sum_hours(activity_id, DateFilter::On(day))? > 0.0 {
        count += 1;
        day -= Duration::days(1);
    }
    Ok(count)
}

/// Headline block across a set of entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_hours: f64,
    pub today_hours: f64,
    pub week_hours: f64,
    pub daily_average: f64,
    pub streak: u32,
    pub velocity: f64,
    pub consistency_score: f64,
    pub best_day: Option<BestDay>,
    pub session_count: usize,
    pub by_activity: Vec<ActivityHours>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityHours {
    pub name: String,
    pub hours: f64,
}

impl Overview {
    pub fn compute(entries: &[EntryRecord], today: NaiveDate, cfg: &StatsConfig) -> Self {
        Self {
            total_hours: engine::total_hours(entries),
            today_hours: engine::today_hours(entries, today),
            week_hours: engine::week_hours(entries, today),
            daily_average: engine::daily_average(entries, today),
            streak: engine::streak(entries, today),
            velocity: engine::velocity(entries, today, cfg.velocity_days),
            consistency_score: engine::consistency_score(entries, today, cfg.consistency_days),
            best_day: engine::best_day(entries),
            session_count: entries.len(),
            by_activity: engine::hours_by_activity(entries)
                .into_iter()
                .map(|(name, hours)| ActivityHours { name, hours })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, EntryQuery, NewActivity};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn log(db: &Database, id: i64, d: u32, hours: f64) {
        db.add_time_entry(id, hours, Some(day(d).and_hms_opt(12, 0, 0).unwrap()), None)
            .unwrap();
    }

    #[test]
    fn summary_from_gateway() {
        let db = Database::open_memory().unwrap();
        let id = db.create_activity(NewActivity::named("Violin")).unwrap();
        let activity = db.get_activity(id).unwrap().unwrap();
        // 2024-03-13 is a Wednesday.
        log(&db, id, 4, 2.0);
        log(&db, id, 11, 1.0);
        log(&db, id, 12, 1.5);
        log(&db, id, 13, 0.5);
        log(&db, id, 13, 1.0);

        let stats = summarize_activity(&db, &activity, day(13)).unwrap();
        assert_eq!(stats.name, "Violin");
        assert_eq!(stats.total_hours, 6.0);
        assert_eq!(stats.today_hours, 1.5);
        assert_eq!(stats.week_hours, 4.0);
        assert_eq!(stats.session_count, 5);
        assert_eq!(stats.streak, 3);
        assert!((stats.daily_avg - 0.6).abs() < 1e-9);
    }

    #[test]
    fn summary_matches_pure_engine() {
        let db = Database::open_memory().unwrap();
        let id = db.create_activity(NewActivity::named("Go")).unwrap();
        let activity = db.get_activity(id).unwrap().unwrap();
        for (d, h) in [(1, 1.0), (2, 2.5), (5, 0.25), (6, 3.0)] {
            log(&db, id, d, h);
        }
        let entries = db.list_entries(EntryQuery::for_activity(id)).unwrap();
        let stats = summarize_activity(&db, &activity, day(6)).unwrap();
        assert_eq!(stats.streak, engine::streak(&entries, day(6)));
        assert_eq!(stats.total_hours, engine::total_hours(&entries));
        assert_eq!(stats.daily_avg, engine::daily_average(&entries, day(6)));
    }

    #[test]
    fn summary_of_empty_activity() {
        let db = Database::open_memory().unwrap();
        let id = db.create_activity(NewActivity::named("Chess")).unwrap();
        let activity = db.get_activity(id).unwrap().unwrap();
        let stats = summarize_activity(&db, &activity, day(13)).unwrap();
        assert_eq!(stats.total_hours, 0.0);
        assert_eq!(stats.daily_avg, 0.0);
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.session_count, 0);
    }

    #[test]
    fn overview_of_nothing() {
        let overview = Overview::compute(&[], day(1), &StatsConfig::default());
        assert_eq!(overview.total_hours, 0.0);
        assert_eq!(overview.velocity, 0.0);
        assert_eq!(overview.consistency_score, 0.0);
        assert!(overview.best_day.is_none());
        assert!(overview.by_activity.is_empty());
    }

    #[test]
    fn overview_combines_activities() {
        let db = Database::open_memory().unwrap();
        let go = db.create_activity(NewActivity::named("Go")).unwrap();
        let piano = db.create_activity(NewActivity::named("Piano")).unwrap();
        log(&db, go, 9, 7.0);
        log(&db, piano, 10, 1.0);
        log(&db, piano, 10, 2.0);

        let entries = db.list_entries(EntryQuery::all()).unwrap();
        let overview = Overview::compute(&entries, day(10), &StatsConfig::default());
        assert_eq!(overview.total_hours, 10.0);
        assert_eq!(overview.today_hours, 3.0);
        assert_eq!(overview.streak, 2);
        assert_eq!(overview.session_count, 3);
        assert!((overview.velocity - 10.0 / 7.0).abs() < 1e-9);
        assert_eq!(overview.best_day.as_ref().map(|b| b.date), Some(day(9)));
        assert_eq!(overview.by_activity[0].name, "Go");
        assert_eq!(overview.by_activity[1].hours, 3.0);
    }
}
