//! Integration tests for statistics over stored entries.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use tenk_core::clock::Clock;
use tenk_core::stats::{self, GoalProgress, Overview, Period};
use tenk_core::storage::{Database, EntryQuery, EntryRecord, NewActivity, StatsConfig};
use tenk_core::timer::Stopwatch;
use tenk_core::ManualClock;

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

#[test]
fn test_dashboard_for_a_month_of_practice() {
    let db = Database::open_memory().unwrap();
    let go = db
        .create_activity(NewActivity::named("Go").main())
        .unwrap();
    let piano = db.create_activity(NewActivity::named("Piano")).unwrap();

    // Go every day of April, piano on weekends.
    for d in 1..=30 {
        db.add_time_entry(go, 2.0, Some(at(2024, 4, d, 19)), None)
            .unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 4, d).unwrap();
        if chrono::Datelike::weekday(&day).number_from_monday() >= 6 {
            db.add_time_entry(piano, 1.0, Some(at(2024, 4, d, 10)), None)
                .unwrap();
        }
    }

    let today = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
    let entries = db.list_entries(EntryQuery::all()).unwrap();
    let overview = Overview::compute(&entries, today, &StatsConfig::default());

    assert_eq!(overview.total_hours, 60.0 + 8.0);
    assert_eq!(overview.streak, 30);
    assert_eq!(overview.consistency_score, 100.0);
    assert_eq!(overview.by_activity[0].name, "Go");
    assert_eq!(overview.best_day.unwrap().hours, 3.0);

    let main = db.main_activity().unwrap().unwrap();
    let go_stats = stats::summarize_activity(&db, &main, today).unwrap();
    assert_eq!(go_stats.total_hours, 60.0);
    assert_eq!(go_stats.streak, 30);
    assert_eq!(go_stats.daily_avg, 2.0);

    let progress = GoalProgress::compute(go_stats.total_hours, 10_000.0, go_stats.daily_avg, today);
    assert_eq!(progress.next_milestone, Some(100));
    assert_eq!(progress.time_remaining, "13.6 years");
}

#[test]
fn test_period_filters_entries() {
    let db = Database::open_memory().unwrap();
    let id = db.create_activity(NewActivity::named("Go")).unwrap();
    db.add_time_entry(id, 1.0, Some(at(2024, 2, 28, 9)), None)
        .unwrap();
    db.add_time_entry(id, 2.0, Some(at(2024, 3, 1, 9)), None)
        .unwrap();
    db.add_time_entry(id, 4.0, Some(at(2024, 3, 13, 9)), None)
        .unwrap();

    let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
    let (start, end) = Period::LastMonth.bounds(today);
    let last_month = db
        .list_entries(EntryQuery::all().between(start, end))
        .unwrap();
    assert_eq!(stats::total_hours(&last_month), 1.0);

    let (start, end) = Period::ThisMonth.bounds(today);
    let this_month = db
        .list_entries(EntryQuery::for_activity(id).between(start, end))
        .unwrap();
    assert_eq!(stats::total_hours(&this_month), 6.0);
}

fn entries_strategy() -> impl Strategy<Value = Vec<EntryRecord>> {
    prop::collection::vec((0i64..120, 0.0f64..12.0), 0..60).prop_map(|raw| {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        raw.into_iter()
            .enumerate()
            .map(|(i, (offset, hours))| EntryRecord {
                id: i as i64,
                activity_id: 1,
                activity_name: "Go".into(),
                hours,
                date: (base + Duration::days(offset)).and_hms_opt(12, 0, 0).unwrap(),
                notes: None,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_consistency_within_bounds(entries in entries_strategy(), days in 0u32..200) {
        let today = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        let score = stats::consistency_score(&entries, today, days);
        prop_assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn prop_streak_never_exceeds_active_days(entries in entries_strategy()) {
        let today = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        let active = stats::daily_totals(&entries).values().filter(|h| **h > 0.0).count();
        prop_assert!(stats::streak(&entries, today) as usize <= active);
    }

    #[test]
    fn prop_milestones_are_a_prefix(total in 0.0f64..20_000.0) {
        let reached: Vec<u32> = stats::milestones_reached(total).collect();
        prop_assert_eq!(&reached[..], &stats::MILESTONES[..reached.len()]);
        if let Some(next) = stats::next_milestone(total) {
            prop_assert!(f64::from(next) > total);
        }
    }

    #[test]
    fn prop_pause_resume_preserves_elapsed(
        segments in prop::collection::vec((1i64..3_600, 0i64..3_600), 1..8)
    ) {
        let clock = ManualClock::at(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 0);
        let mut sw = Stopwatch::new();
        sw.start(1, &clock).unwrap();

        let mut running_secs = 0;
        for (run, idle) in segments {
            clock.advance_secs(run);
            running_secs += run;
            sw.pause(&clock).unwrap();
            clock.advance_secs(idle);
            prop_assert_eq!(sw.elapsed(&clock), Duration::seconds(running_secs));
            sw.resume(&clock).unwrap();
        }
        prop_assert_eq!(sw.elapsed(&clock), Duration::seconds(running_secs));
        prop_assert!(clock.now() >= sw.start_time().unwrap());
    }
}
