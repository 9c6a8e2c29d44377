//! Progress toward the mastery goal and reporting periods.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::engine::week_start;
use super::milestones::next_milestone;
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub total_hours: f64,
    pub target_hours: f64,
    /// 0.0 ..= 100.0
    pub percent: f64,
    pub remaining_hours: f64,
    pub daily_average: f64,
    pub next_milestone: Option<u32>,
    pub estimated_completion: Option<NaiveDate>,
    pub time_remaining: String,
    pub productivity_score: f64,
}

impl GoalProgress {
    pub fn compute(total_hours: f64, target_hours: f64, daily_average: f64, today: NaiveDate) -> Self {
        let percent = if target_hours > 0.0 {
            (total_hours / target_hours * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        let remaining_hours = (target_hours - total_hours).max(0.0);
        Self {
            total_hours,
            target_hours,
            percent,
            remaining_hours,
            daily_average,
            next_milestone: next_milestone(total_hours),
            estimated_completion: estimate_completion_date(remaining_hours, daily_average, today),
            time_remaining: format_time_remaining(remaining_hours, daily_average),
            productivity_score: productivity_score(total_hours, target_hours),
        }
    }
}

/// Day the goal is reached at the current pace. `None` without a pace.
pub fn estimate_completion_date(
    remaining_hours: f64,
    daily_average: f64,
    today: NaiveDate,
) -> Option<NaiveDate> {
    if daily_average.is_nan() || daily_average <= 0.0 {
        return None;
    }
    let days = (remaining_hours.max(0.0) / daily_average).ceil();
    if !days.is_finite() || days > 365.0 * 1000.0 {
        return None;
    }
    today.checked_add_signed(Duration::days(days as i64))
}

/// Human estimate of the time left at the current pace.
pub fn format_time_remaining(remaining_hours: f64, daily_average: f64) -> String {
    if daily_average.is_nan() || daily_average <= 0.0 {
        return "Unable to calculate".into();
    }
    let days = remaining_hours / daily_average;
    if days < 1.0 {
        "Less than 1 day".into()
    } else if days < 7.0 {
        format!("{days:.1} days")
    } else if days < 30.0 {
        format!("{:.1} weeks", days / 7.0)
    } else if days < 365.0 {
        format!("{:.1} months", days / 30.0)
    } else {
        format!("{:.1} years", days / 365.0)
    }
}

/// Score out of 100 that rewards early progress more steeply than late.
pub fn productivity_score(total_hours: f64, target_hours: f64) -> f64 {
    if target_hours.is_nan() || target_hours <= 0.0 {
        return 0.0;
    }
    let progress = total_hours / target_hours * 100.0;
    if progress >= 100.0 {
        100.0
    } else if progress >= 75.0 {
        90.0 + (progress - 75.0) / 25.0 * 10.0
    } else if progress >= 50.0 {
        70.0 + (progress - 50.0) / 25.0 * 20.0
    } else if progress >= 25.0 {
        40.0 + (progress - 25.0) / 25.0 * 30.0
    } else {
        (progress / 25.0 * 40.0).max(0.0)
    }
}

/// Named reporting window relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    ThisYear,
    Last7Days,
    Last30Days,
    Last90Days,
}

impl Period {
    pub const ALL: [Period; 10] = [
        Period::Today,
        Period::Yesterday,
        Period::ThisWeek,
        Period::LastWeek,
        Period::ThisMonth,
        Period::LastMonth,
        Period::ThisYear,
        Period::Last7Days,
        Period::Last30Days,
        Period::Last90Days,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Yesterday => "yesterday",
            Period::ThisWeek => "this_week",
            Period::LastWeek => "last_week",
            Period::ThisMonth => "this_month",
            Period::LastMonth => "last_month",
            Period::ThisYear => "this_year",
            Period::Last7Days => "last_7_days",
            Period::Last30Days => "last_30_days",
            Period::Last90Days => "last_90_days",
        }
    }

    /// Inclusive `(start, end)` days.
    pub fn bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let days = |n: i64| Duration::days(n);
        let month_start = today.with_day(1).unwrap_or(today);
        match self {
            Period::Today => (today, today),
            Period::Yesterday => (today - days(1), today - days(1)),
            Period::ThisWeek => (week_start(today), today),
            Period::LastWeek => {
                let this_week = week_start(today);
                (this_week - days(7), this_week - days(1))
            }
            Period::ThisMonth => (month_start, today),
            Period::LastMonth => {
                let last_day = month_start - days(1);
                (last_day.with_day(1).unwrap_or(last_day), last_day)
            }
            Period::ThisYear => (today.with_ordinal(1).unwrap_or(today), today),
            Period::Last7Days => (today - days(7), today),
            Period::Last30Days => (today - days(30), today),
            Period::Last90Days => (today - days(90), today),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "period".into(),
                message: format!("unknown period '{s}'"),
            })
    }
}
