use chrono::{NaiveDate, NaiveDateTime};

use crate::error::Result;

/// Calendar-day predicate applied to entry timestamps. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    All,
    On(NaiveDate),
    Since(NaiveDate),
    Between(NaiveDate, NaiveDate),
}

impl DateFilter {
    pub fn matches(&self, day: NaiveDate) -> bool {
        match *self {
            DateFilter::All => true,
            DateFilter::On(d) => day == d,
            DateFilter::Since(start) => day >= start,
            DateFilter::Between(start, end) => day >= start && day <= end,
        }
    }
}

/// What the timers and the statistics engine need from storage.
///
/// Each call is its own unit of work; nothing spans calls.
pub trait TimeStore {
    /// Whether an activity with this id exists.
    fn activity_exists(&self, activity_id: i64) -> Result<bool>;

    /// Insert one entry. Fails with `ActivityNotFound` for unknown ids.
    fn insert_time_entry(
        &self,
        activity_id: i64,
        hours: f64,
        date: NaiveDateTime,
        notes: Option<&str>,
    ) -> Result<i64>;

    fn sum_hours(&self, activity_id: i64, filter: DateFilter) -> Result<f64>;

    fn min_date(&self, activity_id: i64) -> Result<Option<NaiveDateTime>>;

    fn count_entries(&self, activity_id: i64) -> Result<u64>;

    fn milestone_exists(&self, activity_id: i64, threshold: u32) -> Result<bool>;

    fn insert_milestone(&self, activity_id: i64, threshold: u32) -> Result<()>;

    /// Mark one activity as main, clearing any other in the same transaction.
    fn set_main_activity(&self, activity_id: i64) -> Result<()>;
}

/// Store whose milestone writes always fail; everything else is delegated.
#[cfg(test)]
pub(crate) struct MilestoneWritesFail<'a>(pub &'a super::Database);

#[cfg(test)]
impl TimeStore for MilestoneWritesFail<'_> {
    fn activity_exists(&self, activity_id: i64) -> Result<bool> {
        self.0.activity_exists(activity_id)
    }

    fn insert_time_entry(
        &self,
        activity_id: i64,
        hours: f64,
        date: NaiveDateTime,
        notes: Option<&str>,
    ) -> Result<i64> {
        self.0.insert_time_entry(activity_id, hours, date, notes)
    }

    fn sum_hours(&self, activity_id: i64, filter: DateFilter) -> Result<f64> {
        self.0.sum_hours(activity_id, filter)
    }

    fn min_date(&self, activity_id: i64) -> Result<Option<NaiveDateTime>> {
        self.0.min_date(activity_id)
    }

    fn count_entries(&self, activity_id: i64) -> Result<u64> {
        self.0.count_entries(activity_id)
    }

    fn milestone_exists(&self, activity_id: i64, threshold: u32) -> Result<bool> {
        self.0.milestone_exists(activity_id, threshold)
    }

    fn insert_milestone(&self, _activity_id: i64, _threshold: u32) -> Result<()> {
        Err(crate::error::DatabaseError::Locked.into())
    }

    fn set_main_activity(&self, activity_id: i64) -> Result<()> {
        self.0.set_main_activity(activity_id)
    }
}
