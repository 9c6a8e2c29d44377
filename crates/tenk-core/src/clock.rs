//! Time source used by the timer state machines.
//!
//! Transition logic never reads the wall clock directly; callers pass a
//! [`Clock`] so tests and simulations can drive time by hand.

use std::cell::Cell;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, Utc};

pub trait Clock {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current wall-clock time in the user's zone, used to date entries.
    fn local_now(&self) -> NaiveDateTime {
        self.now().with_timezone(&Local).naive_local()
    }

    /// Current calendar day in the user's zone.
    fn today(&self) -> NaiveDate {
        self.local_now().date()
    }
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Its local zone is UTC so that calendar-day results do not depend on the
/// machine running the tests.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Start at midnight UTC of the given day plus `hour` hours.
    pub fn at(day: NaiveDate, hour: u32) -> Self {
        let start = day
            .and_hms_opt(hour.min(23), 0, 0)
            .unwrap_or_default()
            .and_utc();
        Self::new(start)
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        self.now.set(instant);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }

    pub fn advance_mins(&self, mins: i64) {
        self.advance(Duration::minutes(mins));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn local_now(&self) -> NaiveDateTime {
        self.now.get().naive_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let clock = ManualClock::at(day, 9);
        let start = clock.now();
        clock.advance_mins(90);
        assert_eq!(clock.now() - start, Duration::minutes(90));
        assert_eq!(clock.today(), day);
    }

    #[test]
    fn manual_clock_crosses_midnight() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let clock = ManualClock::at(day, 23);
        clock.advance_mins(61);
        assert_eq!(clock.today(), day.succ_opt().unwrap());
    }
}
