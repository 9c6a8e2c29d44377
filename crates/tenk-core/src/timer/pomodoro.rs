//! Pomodoro work/break cycle.
//!
//! ```text
//! Stopped -> Work(1) -> Break(1) -> Work(2) -> ... -> Work(n) -> Stopped
//! ```
//!
//! Phases are fixed-size blocks. Completion is detected by polling
//! [`Pomodoro::tick`]; each phase boundary is anchored to the scheduled end of
//! the previous phase, so a late poll catches up without stretching the
//! cycle. Finishing the last work phase ends the cycle and commits the full
//! planned work time as one entry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::stats;
use crate::storage::{PomodoroConfig, TimeStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PomodoroPhase {
    Work,
    Break,
}

/// Phase lengths and session count, fixed when the cycle starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroPlan {
    work_minutes: u32,
    break_minutes: u32,
    total_sessions: u32,
}

impl PomodoroPlan {
    pub fn new(
        work_minutes: u32,
        break_minutes: u32,
        total_sessions: u32,
    ) -> Result<Self, ValidationError> {
        if work_minutes == 0 || break_minutes == 0 {
            return Err(ValidationError::InvalidPlan(
                "work and break phases must last at least one minute".into(),
            ));
        }
        if total_sessions == 0 {
            return Err(ValidationError::InvalidPlan(
                "at least one session is required".into(),
            ));
        }
        Ok(Self {
            work_minutes,
            break_minutes,
            total_sessions,
        })
    }

    pub fn from_config(config: &PomodoroConfig) -> Result<Self, ValidationError> {
        Self::new(config.work_minutes, config.break_minutes, config.sessions)
    }

    pub fn work_minutes(&self) -> u32 {
        self.work_minutes
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    pub fn total_sessions(&self) -> u32 {
        self.total_sessions
    }

    pub fn phase_duration(&self, phase: PomodoroPhase) -> Duration {
        match phase {
            PomodoroPhase::Work => Duration::minutes(i64::from(self.work_minutes)),
            PomodoroPhase::Break => Duration::minutes(i64::from(self.break_minutes)),
        }
    }

    /// Hours credited when every session completes.
    pub fn total_work_hours(&self) -> f64 {
        f64::from(self.work_minutes) * f64::from(self.total_sessions) / 60.0
    }
}

/// A cycle in progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomodoroSession {
    pub activity_id: i64,
    pub plan: PomodoroPlan,
    /// 1-based index of the current work session.
    pub current_session: u32,
    pub phase: PomodoroPhase,
    pub phase_started_at: DateTime<Utc>,
}

impl PomodoroSession {
    fn phase_end(&self) -> DateTime<Utc> {
        self.phase_started_at + self.plan.phase_duration(self.phase)
    }
}

/// Session-scoped Pomodoro controller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pomodoro {
    session: Option<PomodoroSession>,
}

impl Pomodoro {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&PomodoroSession> {
        self.session.as_ref()
    }

    /// Time left in the current phase; negative once overdue.
    pub fn remaining(&self, clock: &dyn Clock) -> Option<Duration> {
        self.session.as_ref().map(|s| s.phase_end() - clock.now())
    }

    pub fn snapshot(&self, clock: &dyn Clock) -> Event {
        let at = clock.now();
        match &self.session {
            Some(s) => Event::PomodoroSnapshot {
                running: true,
                activity_id: Some(s.activity_id),
                session: s.current_session,
                total_sessions: s.plan.total_sessions,
                phase: Some(s.phase),
                remaining_ms: (s.phase_end() - at).num_milliseconds().max(0),
                at,
            },
            None => Event::PomodoroSnapshot {
                running: false,
                activity_id: None,
                session: 0,
                total_sessions: 0,
                phase: None,
                remaining_ms: 0,
                at,
            },
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin the first work phase. `None` if a cycle is already running.
    pub fn start(&mut self, activity_id: i64, plan: PomodoroPlan, clock: &dyn Clock) -> Option<Event> {
        if self.session.is_some() {
            return None;
        }
        let now = clock.now();
        self.session = Some(PomodoroSession {
            activity_id,
            plan,
            current_session: 1,
            phase: PomodoroPhase::Work,
            phase_started_at: now,
        });
        tracing::debug!(activity_id, sessions = plan.total_sessions, "pomodoro started");
        Some(Event::PomodoroStarted {
            activity_id,
            work_minutes: plan.work_minutes,
            break_minutes: plan.break_minutes,
            total_sessions: plan.total_sessions,
            at: now,
        })
    }

    /// Advance through every phase that has ended by now.
    ///
    /// When the cycle completes the full work time is committed. If that
    /// commit fails the cycle stays at its last boundary and the next tick
    /// retries.
    pub fn tick<S: TimeStore + ?Sized>(&mut self, store: &S, clock: &dyn Clock) -> Result<Vec<Event>> {
        let now = clock.now();
        let mut events = Vec::new();

        while let Some(session) = self.session.as_mut() {
            let phase_end = session.phase_end();
            if phase_end > now {
                break;
            }

            match session.phase {
                PomodoroPhase::Work if session.current_session >= session.plan.total_sessions => {
                    let activity_id = session.activity_id;
                    let plan = session.plan;
                    let hours = plan.total_work_hours();
                    let notes = format!(
                        "Pomodoro session: {} sessions x {} minutes",
                        plan.total_sessions, plan.work_minutes
                    );
                    let entry_id =
                        store.insert_time_entry(activity_id, hours, clock.local_now(), Some(&notes))?;
                    self.session = None;
                    tracing::info!(activity_id, entry_id, hours, "pomodoro cycle committed");

                    events.push(Event::PomodoroCompleted {
                        activity_id,
                        entry_id,
                        hours,
                        at: now,
                    });
                    events.extend(milestone_events(store, activity_id, now));
                }
                PomodoroPhase::Work => {
                    session.phase = PomodoroPhase::Break;
                    session.phase_started_at = phase_end;
                    events.push(phase_event(session, phase_end));
                }
                PomodoroPhase::Break => {
                    session.current_session += 1;
                    session.phase = PomodoroPhase::Work;
                    session.phase_started_at = phase_end;
                    events.push(phase_event(session, phase_end));
                }
            }
        }

        Ok(events)
    }

    /// End the cycle early.
    ///
    /// During work the elapsed part of the current work phase is committed;
    /// during a break nothing is. `Ok(None)` if no cycle is running.
    pub fn stop<S: TimeStore + ?Sized>(
        &mut self,
        store: &S,
        clock: &dyn Clock,
    ) -> Result<Option<Vec<Event>>> {
        let Some(session) = self.session.as_ref() else {
            return Ok(None);
        };
        let now = clock.now();
        let activity_id = session.activity_id;

        let mut events = Vec::new();
        match session.phase {
            PomodoroPhase::Work => {
                let elapsed = (now - session.phase_started_at)
                    .max(Duration::zero())
                    .min(session.plan.phase_duration(PomodoroPhase::Work));
                let minutes = elapsed.num_milliseconds() as f64 / 60_000.0;
                let hours = minutes / 60.0;
                let notes = format!("Partial Pomodoro session: {minutes:.1} minutes");
                let entry_id =
                    store.insert_time_entry(activity_id, hours, clock.local_now(), Some(&notes))?;
                self.session = None;
                tracing::info!(activity_id, entry_id, hours, "partial pomodoro committed");

                events.push(Event::PomodoroStopped {
                    activity_id,
                    entry_id: Some(entry_id),
                    hours,
                    at: now,
                });
                events.extend(milestone_events(store, activity_id, now));
            }
            PomodoroPhase::Break => {
                self.session = None;
                tracing::debug!(activity_id, "pomodoro stopped during break");
                events.push(Event::PomodoroStopped {
                    activity_id,
                    entry_id: None,
                    hours: 0.0,
                    at: now,
                });
            }
        }
        Ok(Some(events))
    }
}

fn phase_event(session: &PomodoroSession, at: DateTime<Utc>) -> Event {
    Event::PomodoroPhaseChanged {
        session: session.current_session,
        total_sessions: session.plan.total_sessions,
        phase: session.phase,
        duration_secs: session.plan.phase_duration(session.phase).num_seconds(),
        at,
    }
}

/// Runs after the entry is committed, so it never fails the caller.
fn milestone_events<S: TimeStore + ?Sized>(
    store: &S,
    activity_id: i64,
    at: DateTime<Utc>,
) -> Vec<Event> {
    stats::record_milestones_after_commit(store, activity_id)
        .into_iter()
        .map(|hours_reached| Event::MilestoneReached {
            activity_id,
            hours_reached,
            at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::gateway::MilestoneWritesFail;
    use crate::storage::{Database, DateFilter, NewActivity};
    use chrono::NaiveDate;

    fn setup() -> (Database, i64, ManualClock) {
        let db = Database::open_memory().unwrap();
        let id = db.create_activity(NewActivity::named("Writing")).unwrap();
        let clock = ManualClock::at(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), 8);
        (db, id, clock)
    }

    fn current_phase(p: &Pomodoro) -> (u32, PomodoroPhase) {
        let s = p.session().unwrap();
        (s.current_session, s.phase)
    }

    #[test]
    fn plan_validation() {
        assert!(PomodoroPlan::new(25, 5, 4).is_ok());
        assert!(PomodoroPlan::new(0, 5, 4).is_err());
        assert!(PomodoroPlan::new(25, 0, 4).is_err());
        assert!(PomodoroPlan::new(25, 5, 0).is_err());
        let plan = PomodoroPlan::from_config(&PomodoroConfig::default()).unwrap();
        assert_eq!(plan.total_sessions(), 4);
    }

    #[test]
    fn cannot_start_twice() {
        let (_db, id, clock) = setup();
        let mut p = Pomodoro::new();
        let plan = PomodoroPlan::new(25, 5, 2).unwrap();
        assert!(p.start(id, plan, &clock).is_some());
        assert!(p.start(id, plan, &clock).is_none());
    }

    #[test]
    fn phases_advance_on_tick() {
        let (db, id, clock) = setup();
        let mut p = Pomodoro::new();
        p.start(id, PomodoroPlan::new(25, 5, 3).unwrap(), &clock);

        clock.advance_mins(24);
        assert!(p.tick(&db, &clock).unwrap().is_empty());
        assert_eq!(current_phase(&p), (1, PomodoroPhase::Work));

        clock.advance_mins(1);
        let events = p.tick(&db, &clock).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(current_phase(&p), (1, PomodoroPhase::Break));

        clock.advance_mins(5);
        p.tick(&db, &clock).unwrap();
        assert_eq!(current_phase(&p), (2, PomodoroPhase::Work));
        assert_eq!(p.remaining(&clock), Some(Duration::minutes(25)));
    }

    #[test]
    fn two_sessions_complete_after_one_break() {
        let (db, id, clock) = setup();
        let mut p = Pomodoro::new();
        p.start(id, PomodoroPlan::new(25, 5, 2).unwrap(), &clock);

        clock.advance_mins(25);
        p.tick(&db, &clock).unwrap();
        clock.advance_mins(5);
        p.tick(&db, &clock).unwrap();
        clock.advance_mins(25);
        let events = p.tick(&db, &clock).unwrap();

        assert!(!p.is_running());
        assert!(matches!(events.last(), Some(Event::PomodoroCompleted { .. })));
        let entries = db.list_entries(crate::storage::EntryQuery::for_activity(id)).unwrap();
        assert_eq!(entries.len(), 1);
        assert!((entries[0].hours - 50.0 / 60.0).abs() < 1e-9);
        assert_eq!(
            entries[0].notes.as_deref(),
            Some("Pomodoro session: 2 sessions x 25 minutes")
        );
    }

    #[test]
    fn late_poll_catches_up() {
        let (db, id, clock) = setup();
        let mut p = Pomodoro::new();
        p.start(id, PomodoroPlan::new(25, 5, 3).unwrap(), &clock);

        // Work 1, break 1, and 10 minutes into work 2.
        clock.advance_mins(40);
        let events = p.tick(&db, &clock).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(current_phase(&p), (2, PomodoroPhase::Work));
        assert_eq!(p.remaining(&clock), Some(Duration::minutes(15)));

        // Far past the end of the whole cycle.
        clock.advance_mins(600);
        p.tick(&db, &clock).unwrap();
        assert!(!p.is_running());
        assert!((db.sum_hours(id, DateFilter::All).unwrap() - 75.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn stop_mid_work_commits_partial() {
        let (db, id, clock) = setup();
        let mut p = Pomodoro::new();
        p.start(id, PomodoroPlan::new(25, 5, 4).unwrap(), &clock);
        clock.advance_mins(12);

        let events = p.stop(&db, &clock).unwrap().unwrap();
        assert!(!p.is_running());
        match &events[0] {
            Event::PomodoroStopped { entry_id, hours, .. } => {
                assert!(entry_id.is_some());
                assert!((hours - 0.2).abs() < 1e-9);
            }
            other => panic!("unexpected event {other:?}"),
        }
        let entries = db.list_entries(crate::storage::EntryQuery::for_activity(id)).unwrap();
        assert_eq!(
            entries[0].notes.as_deref(),
            Some("Partial Pomodoro session: 12.0 minutes")
        );
    }

    #[test]
    fn stop_mid_break_commits_nothing() {
        let (db, id, clock) = setup();
        let mut p = Pomodoro::new();
        p.start(id, PomodoroPlan::new(25, 5, 4).unwrap(), &clock);
        clock.advance_mins(27);
        p.tick(&db, &clock).unwrap();
        assert_eq!(current_phase(&p), (1, PomodoroPhase::Break));

        let events = p.stop(&db, &clock).unwrap().unwrap();
        assert!(matches!(
            events[0],
            Event::PomodoroStopped { entry_id: None, .. }
        ));
        assert_eq!(db.count_entries(id).unwrap(), 0);
    }

    #[test]
    fn stop_when_stopped_is_none() {
        let (db, _id, clock) = setup();
        assert!(Pomodoro::new().stop(&db, &clock).unwrap().is_none());
    }

    #[test]
    fn failed_commit_keeps_cycle() {
        let (db, id, clock) = setup();
        let mut p = Pomodoro::new();
        p.start(id, PomodoroPlan::new(25, 5, 1).unwrap(), &clock);
        db.delete_activity(id).unwrap();
        clock.advance_mins(25);

        assert!(p.tick(&db, &clock).is_err());
        assert!(p.is_running());
        assert_eq!(current_phase(&p), (1, PomodoroPhase::Work));
    }

    #[test]
    fn completion_survives_failed_milestone_write() {
        let (db, id, clock) = setup();
        db.add_time_entry(id, 99.5, None, None).unwrap();
        let store = MilestoneWritesFail(&db);
        let mut p = Pomodoro::new();
        p.start(id, PomodoroPlan::new(30, 5, 1).unwrap(), &clock);
        clock.advance_mins(30);

        let events = p.tick(&store, &clock).unwrap();
        assert!(matches!(events[..], [Event::PomodoroCompleted { .. }]));
        assert!(!p.is_running());
        assert!(p.tick(&store, &clock).unwrap().is_empty());
        assert_eq!(db.count_entries(id).unwrap(), 2);
        assert!(db.list_milestones(id).unwrap().is_empty());
    }

    #[test]
    fn partial_stop_survives_failed_milestone_write() {
        let (db, id, clock) = setup();
        db.add_time_entry(id, 99.5, None, None).unwrap();
        let store = MilestoneWritesFail(&db);
        let mut p = Pomodoro::new();
        p.start(id, PomodoroPlan::new(50, 5, 2).unwrap(), &clock);
        clock.advance_mins(40);

        let events = p.stop(&store, &clock).unwrap().unwrap();
        assert_eq!(events.len(), 1);
        assert!(!p.is_running());
        assert!(p.stop(&store, &clock).unwrap().is_none());
        assert_eq!(db.count_entries(id).unwrap(), 2);
    }

    #[test]
    fn snapshot_reports_phase() {
        let (_db, id, clock) = setup();
        let mut p = Pomodoro::new();
        match p.snapshot(&clock) {
            Event::PomodoroSnapshot { running, .. } => assert!(!running),
            other => panic!("unexpected event {other:?}"),
        }
        p.start(id, PomodoroPlan::new(25, 5, 2).unwrap(), &clock);
        clock.advance_mins(5);
        match p.snapshot(&clock) {
            Event::PomodoroSnapshot {
                running,
                phase,
                remaining_ms,
                ..
            } => {
                assert!(running);
                assert_eq!(phase, Some(PomodoroPhase::Work));
                assert_eq!(remaining_ms, 20 * 60 * 1000);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
