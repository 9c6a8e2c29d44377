//! SQLite-backed persistence gateway.
//!
//! Provides persistent storage for:
//! - Activities (with the single "main" activity)
//! - Time entries and the milestone markers derived from them
//! - Key-value store for presentation-layer session state

use std::path::Path;

use chrono::{Local, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use serde::{Deserialize, Serialize};

use super::data_dir;
use super::gateway::{DateFilter, TimeStore};
use super::migrations;
use super::models::{Activity, ActivityUpdate, EntryQuery, EntryRecord, Milestone, NewActivity};
use crate::error::{CoreError, DatabaseError, Result, ValidationError};
use crate::stats;

/// Result of logging time: the new row and any thresholds it crossed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryOutcome {
    pub entry_id: i64,
    pub milestones: Vec<u32>,
}

/// SQLite database for activities, entries and milestones.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/tenk.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join("tenk.db"))
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database (for tests and dry runs).
    pub fn open_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Activities ───────────────────────────────────────────────────

    /// Create an activity. Setting it as main clears any previous main.
    pub fn create_activity(&self, new: NewActivity) -> Result<i64> {
        let new = new.validated()?;
        let tx = self.conn.unchecked_transaction()?;
        if new.is_main {
            tx.execute("UPDATE activities SET is_main = 0 WHERE is_main = 1", [])?;
        }
        tx.execute(
            "INSERT INTO activities (name, description, category, is_main, color, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.name,
                new.description,
                new.category,
                new.is_main,
                new.color,
                Local::now().naive_local(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        tracing::info!(activity_id = id, name = %new.name, is_main = new.is_main, "activity created");
        Ok(id)
    }

    /// Apply a partial update. Returns `false` if the activity does not exist.
    pub fn update_activity(&self, id: i64, update: ActivityUpdate) -> Result<bool> {
        let update = update.validated()?;
        let tx = self.conn.unchecked_transaction()?;
        let Some(mut activity) = query_activity(&tx, id)? else {
            return Ok(false);
        };

        if let Some(name) = update.name {
            activity.name = name;
        }
        if let Some(description) = update.description {
            activity.description = Some(description);
        }
        if let Some(category) = update.category {
            activity.category = Some(category);
        }
        if let Some(color) = update.color {
            activity.color = color;
        }
        if let Some(is_main) = update.is_main {
            if is_main {
                tx.execute("UPDATE activities SET is_main = 0 WHERE is_main = 1", [])?;
            }
            activity.is_main = is_main;
        }

        tx.execute(
            "UPDATE activities
             SET name = ?1, description = ?2, category = ?3, is_main = ?4, color = ?5
             WHERE id = ?6",
            params![
                activity.name,
                activity.description,
                activity.category,
                activity.is_main,
                activity.color,
                id,
            ],
        )?;
        tx.commit()?;
        tracing::debug!(activity_id = id, "activity updated");
        Ok(true)
    }

    /// Delete an activity with all of its entries and milestones.
    pub fn delete_activity(&self, id: i64) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let entries = tx.execute("DELETE FROM time_entries WHERE activity_id = ?1", [id])?;
        tx.execute("DELETE FROM milestones WHERE activity_id = ?1", [id])?;
        let removed = tx.execute("DELETE FROM activities WHERE id = ?1", [id])?;
        tx.commit()?;
        if removed > 0 {
            tracing::info!(activity_id = id, entries, "activity deleted");
        }
        Ok(removed > 0)
    }

    pub fn get_activity(&self, id: i64) -> Result<Option<Activity>> {
        query_activity(&self.conn, id)
    }

    pub fn find_activity_by_name(&self, name: &str) -> Result<Option<Activity>> {
        let activity = self
            .conn
            .query_row(
                &format!("{ACTIVITY_SELECT} WHERE name = ?1 ORDER BY id LIMIT 1"),
                [name.trim()],
                activity_from_row,
            )
            .optional()?;
        Ok(activity)
    }

    pub fn list_activities(&self) -> Result<Vec<Activity>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACTIVITY_SELECT} ORDER BY is_main DESC, name"))?;
        let rows = stmt.query_map([], activity_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn main_activity(&self) -> Result<Option<Activity>> {
        let activity = self
            .conn
            .query_row(
                &format!("{ACTIVITY_SELECT} WHERE is_main = 1 ORDER BY id LIMIT 1"),
                [],
                activity_from_row,
            )
            .optional()?;
        Ok(activity)
    }

    pub fn activity_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM activities ORDER BY name")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ── Entries ──────────────────────────────────────────────────────

    /// Log time against an activity and record any milestones it crosses.
    ///
    /// `date` defaults to now.
    pub fn add_time_entry(
        &self,
        activity_id: i64,
        hours: f64,
        date: Option<NaiveDateTime>,
        notes: Option<&str>,
    ) -> Result<EntryOutcome> {
        let date = date.unwrap_or_else(|| Local::now().naive_local());
        let entry_id = self.insert_time_entry(activity_id, hours, date, notes)?;
        let milestones = stats::record_milestones_after_commit(self, activity_id);
        Ok(EntryOutcome {
            entry_id,
            milestones,
        })
    }

    /// Entries joined with their activity name, oldest first.
    pub fn list_entries(&self, query: EntryQuery) -> Result<Vec<EntryRecord>> {
        let mut sql = String::from(
            "SELECT e.id, e.activity_id, a.name, e.hours, e.date, e.notes
             FROM time_entries e
             JOIN activities a ON a.id = e.activity_id
             WHERE 1 = 1",
        );
        let mut args: Vec<&dyn ToSql> = Vec::new();
        if let Some(activity_id) = &query.activity_id {
            sql.push_str(" AND e.activity_id = ?");
            args.push(activity_id);
        }
        if let Some(start) = &query.start {
            sql.push_str(" AND date(e.date) >= ?");
            args.push(start);
        }
        if let Some(end) = &query.end {
            sql.push_str(" AND date(e.date) <= ?");
            args.push(end);
        }
        sql.push_str(" ORDER BY e.date, e.id");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(args.as_slice(), |row| {
            Ok(EntryRecord {
                id: row.get(0)?,
                activity_id: row.get(1)?,
                activity_name: row.get(2)?,
                hours: row.get(3)?,
                date: row.get(4)?,
                notes: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ── Milestones ───────────────────────────────────────────────────

    pub fn list_milestones(&self, activity_id: i64) -> Result<Vec<Milestone>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, activity_id, hours_reached, reached_at
             FROM milestones
             WHERE activity_id = ?1
             ORDER BY hours_reached",
        )?;
        let rows = stmt.query_map([activity_id], |row| {
            Ok(Milestone {
                id: row.get(0)?,
                activity_id: row.get(1)?,
                hours_reached: row.get(2)?,
                reached_at: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ── Key-value store ──────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl TimeStore for Database {
    fn activity_exists(&self, activity_id: i64) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM activities WHERE id = ?1)",
            [activity_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn insert_time_entry(
        &self,
        activity_id: i64,
        hours: f64,
        date: NaiveDateTime,
        notes: Option<&str>,
    ) -> Result<i64> {
        if !hours.is_finite() || hours < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "hours".into(),
                message: format!("must be a non-negative number, got {hours}"),
            }
            .into());
        }
        if !self.activity_exists(activity_id)? {
            return Err(CoreError::ActivityNotFound { id: activity_id });
        }
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());
        self.conn.execute(
            "INSERT INTO time_entries (activity_id, hours, date, notes) VALUES (?1, ?2, ?3, ?4)",
            params![activity_id, hours, date, notes],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(activity_id, entry_id = id, hours, "time entry inserted");
        Ok(id)
    }

    fn sum_hours(&self, activity_id: i64, filter: DateFilter) -> Result<f64> {
        let base = "SELECT COALESCE(SUM(hours), 0.0) FROM time_entries WHERE activity_id = ?1";
        let sum: f64 = match filter {
            DateFilter::All => self.conn.query_row(base, params![activity_id], |r| r.get(0))?,
            DateFilter::On(day) => self.conn.query_row(
                &format!("{base} AND date(date) = ?2"),
                params![activity_id, day],
                |r| r.get(0),
            )?,
            DateFilter::Since(start) => self.conn.query_row(
                &format!("{base} AND date(date) >= ?2"),
                params![activity_id, start],
                |r| r.get(0),
            )?,
            DateFilter::Between(start, end) => self.conn.query_row(
                &format!("{base} AND date(date) >= ?2 AND date(date) <= ?3"),
                params![activity_id, start, end],
                |r| r.get(0),
            )?,
        };
        Ok(sum)
    }

    fn min_date(&self, activity_id: i64) -> Result<Option<NaiveDateTime>> {
        let first = self.conn.query_row(
            "SELECT MIN(date) FROM time_entries WHERE activity_id = ?1",
            [activity_id],
            |row| row.get::<_, Option<NaiveDateTime>>(0),
        )?;
        Ok(first)
    }

    fn count_entries(&self, activity_id: i64) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM time_entries WHERE activity_id = ?1",
            [activity_id],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn milestone_exists(&self, activity_id: i64, threshold: u32) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM milestones WHERE activity_id = ?1 AND hours_reached = ?2)",
            params![activity_id, threshold],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn insert_milestone(&self, activity_id: i64, threshold: u32) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO milestones (activity_id, hours_reached, reached_at)
             VALUES (?1, ?2, ?3)",
            params![activity_id, threshold, Local::now().naive_local()],
        )?;
        Ok(())
    }

    fn set_main_activity(&self, activity_id: i64) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM activities WHERE id = ?1)",
            [activity_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(CoreError::ActivityNotFound { id: activity_id });
        }
        tx.execute("UPDATE activities SET is_main = 0 WHERE is_main = 1", [])?;
        tx.execute("UPDATE activities SET is_main = 1 WHERE id = ?1", [activity_id])?;
        tx.commit()?;
        tracing::info!(activity_id, "main activity set");
        Ok(())
    }
}

const ACTIVITY_SELECT: &str =
    "SELECT id, name, description, category, is_main, color, created_at FROM activities";

fn query_activity(conn: &Connection, id: i64) -> Result<Option<Activity>> {
    let activity = conn
        .query_row(
            &format!("{ACTIVITY_SELECT} WHERE id = ?1"),
            [id],
            activity_from_row,
        )
        .optional()?;
    Ok(activity)
}

fn activity_from_row(row: &Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        is_main: row.get(4)?,
        color: row.get(5)?,
        created_at: row.get(6)?,
    })
}
