//! Pure aggregate functions over time entries.
//!
//! Nothing here reads the clock: callers pass `today`. Empty input and
//! zero-length windows yield zero rather than an error. No rounding is
//! applied; that is a presentation concern.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::storage::EntryRecord;

/// The single day with the most logged hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestDay {
    pub date: NaiveDate,
    pub hours: f64,
    /// e.g. "March 05, 2024"
    pub formatted_date: String,
}

pub fn total_hours(entries: &[EntryRecord]) -> f64 {
    entries.iter().map(|e| e.hours).sum()
}

pub fn today_hours(entries: &[EntryRecord], today: NaiveDate) -> f64 {
    entries
        .iter()
        .filter(|e| e.day() == today)
        .map(|e| e.hours)
        .sum()
}

/// Monday of the ISO week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// Hours logged since Monday of the current ISO week.
pub fn week_hours(entries: &[EntryRecord], today: NaiveDate) -> f64 {
    let start = week_start(today);
    entries
        .iter()
        .filter(|e| e.day() >= start)
        .map(|e| e.hours)
        .sum()
}

/// Total hours over the days since the first entry, both ends inclusive.
pub fn daily_average(entries: &[EntryRecord], today: NaiveDate) -> f64 {
    let Some(first) = entries.iter().map(EntryRecord::day).min() else {
        return 0.0;
    };
    average_since(total_hours(entries), first, today)
}

/// `total / days(first..=today)`, zero when the span is empty.
pub fn average_since(total: f64, first: NaiveDate, today: NaiveDate) -> f64 {
    let days = (today - first).num_days() + 1;
    if days <= 0 {
        return 0.0;
    }
    total / days as f64
}

/// Summed hours per calendar day.
pub fn daily_totals(entries: &[EntryRecord]) -> BTreeMap<NaiveDate, f64> {
    let mut totals = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.day()).or_insert(0.0) += entry.hours;
    }
    totals
}

/// Summed hours per activity name, largest first.
pub fn hours_by_activity(entries: &[EntryRecord]) -> Vec<(String, f64)> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for entry in entries {
        *totals.entry(entry.activity_name.as_str()).or_insert(0.0) += entry.hours;
    }
    let mut totals: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(name, hours)| (name.to_string(), hours))
        .collect();
    totals.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    totals
}

/// Consecutive days with logged time, walking back from `today`.
///
/// A day without time (including today) ends the streak.
pub fn streak(entries: &[EntryRecord], today: NaiveDate) -> u32 {
    let totals = daily_totals(entries);
    let mut day = today;
    let mut count = 0;
    while totals.get(&day).is_some_and(|hours| *hours > 0.0) {
        count += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    count
}

fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today - Duration::days(i64::from(days))
}

/// Average hours per day over the trailing window.
///
/// Divides by the window length, so idle days pull the value down.
pub fn velocity(entries: &[EntryRecord], today: NaiveDate, days: u32) -> f64 {
    if days == 0 {
        return 0.0;
    }
    let start = window_start(today, days);
    let hours: f64 = entries
        .iter()
        .filter(|e| e.day() >= start)
        .map(|e| e.hours)
        .sum();
    hours / f64::from(days)
}

/// Percentage of days in the trailing window with any logged time, capped at 100.
pub fn consistency_score(entries: &[EntryRecord], today: NaiveDate, days: u32) -> f64 {
    if days == 0 {
        return 0.0;
    }
    let start = window_start(today, days);
    let active = daily_totals(entries)
        .range(start..)
        .filter(|(_, hours)| **hours > 0.0)
        .count();
    (100.0 * active as f64 / f64::from(days)).min(100.0)
}

/// The day with the most hours; the earliest such day on ties.
pub fn best_day(entries: &[EntryRecord]) -> Option<BestDay> {
    let mut best: Option<(NaiveDate, f64)> = None;
    for (date, hours) in daily_totals(entries) {
        if best.map_or(true, |(_, top)| hours > top) {
            best = Some((date, hours));
        }
    }
    best.map(|(date, hours)| BestDay {
        date,
        hours,
        formatted_date: date.format("%B %d, %Y").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn entry(d: u32, hours: f64, name: &str) -> EntryRecord {
        EntryRecord {
            id: 0,
            activity_id: 1,
            activity_name: name.into(),
            hours,
            date: day(d).and_hms_opt(10, 0, 0).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn sums_by_day_and_week() {
        // 2024-03-13 is a Wednesday; the week starts on the 11th.
        let entries = vec![
            entry(10, 4.0, "Go"),
            entry(11, 1.0, "Go"),
            entry(13, 2.0, "Go"),
            entry(13, 0.5, "Piano"),
        ];
        assert_eq!(week_start(day(13)), day(11));
        assert_eq!(total_hours(&entries), 7.5);
        assert_eq!(today_hours(&entries, day(13)), 2.5);
        assert_eq!(week_hours(&entries, day(13)), 3.5);
    }

    #[test]
    fn daily_average_counts_first_day() {
        let entries = vec![entry(1, 3.0, "Go"), entry(3, 3.0, "Go")];
        assert_eq!(daily_average(&entries, day(3)), 2.0);
        assert_eq!(daily_average(&[], day(3)), 0.0);
    }

    #[test]
    fn average_guards_future_first_entry() {
        assert_eq!(average_since(10.0, day(5), day(3)), 0.0);
    }

    #[test]
    fn streak_requires_today() {
        let entries = vec![entry(1, 2.0, "Go"), entry(2, 3.0, "Go")];
        assert_eq!(streak(&entries, day(3)), 0);
        assert_eq!(streak(&entries, day(2)), 2);
    }

    #[test]
    fn streak_breaks_on_gap_and_zero_days() {
        let entries = vec![
            entry(1, 1.0, "Go"),
            entry(3, 0.0, "Go"),
            entry(4, 1.0, "Go"),
            entry(5, 1.0, "Go"),
        ];
        assert_eq!(streak(&entries, day(5)), 2);
        assert_eq!(streak(&[], day(5)), 0);
    }

    #[test]
    fn velocity_divides_by_window() {
        let entries = vec![entry(7, 7.0, "Go")];
        assert_eq!(velocity(&entries, day(10), 7), 1.0);
        assert_eq!(velocity(&entries, day(30), 7), 0.0);
        assert_eq!(velocity(&entries, day(10), 0), 0.0);
    }

    #[test]
    fn consistency_counts_active_days() {
        let entries: Vec<_> = (1..=10).map(|d| entry(d * 2, 1.0, "Go")).collect();
        let score = consistency_score(&entries, day(20), 30);
        assert!((score - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn consistency_is_capped() {
        let entries: Vec<_> = (1..=31).map(|d| entry(d, 1.0, "Go")).collect();
        assert_eq!(consistency_score(&entries, day(31), 30), 100.0);
        assert_eq!(consistency_score(&entries, day(31), 0), 0.0);
    }

    #[test]
    fn best_day_picks_largest_total() {
        let entries = vec![
            entry(4, 2.0, "Go"),
            entry(5, 1.5, "Go"),
            entry(5, 1.5, "Piano"),
            entry(6, 3.0, "Go"),
        ];
        let best = best_day(&entries).unwrap();
        assert_eq!(best.date, day(5));
        assert_eq!(best.hours, 3.0);
        assert_eq!(best.formatted_date, "March 05, 2024");
        assert!(best_day(&[]).is_none());
    }

    #[test]
    fn activity_breakdown_sorted() {
        let entries = vec![
            entry(1, 1.0, "Piano"),
            entry(2, 2.0, "Go"),
            entry(3, 2.5, "Piano"),
        ];
        let breakdown = hours_by_activity(&entries);
        assert_eq!(breakdown[0], ("Piano".to_string(), 3.5));
        assert_eq!(breakdown[1], ("Go".to_string(), 2.0));
    }
}
