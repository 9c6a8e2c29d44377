//! Database schema migrations for tenk.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(from = current_version, to = SCHEMA_VERSION, "schema migrated");
    }
    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: activities, time entries, milestones and the kv store.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS activities (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            description TEXT,
            category    TEXT,
            is_main     INTEGER NOT NULL DEFAULT 0,
            color       TEXT NOT NULL DEFAULT '#3B82F6',
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS time_entries (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            activity_id INTEGER NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
            hours       REAL NOT NULL CHECK (hours >= 0),
            date        TEXT NOT NULL,
            notes       TEXT
        );

        CREATE TABLE IF NOT EXISTS milestones (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            activity_id   INTEGER NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
            hours_reached INTEGER NOT NULL,
            reached_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: lookup indexes and one milestone row per threshold.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    // Older files may hold duplicate milestone rows; keep the earliest.
    tx.execute(
        "DELETE FROM milestones
         WHERE id NOT IN (
             SELECT MIN(id) FROM milestones GROUP BY activity_id, hours_reached
         )",
        [],
    )?;

    tx.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_entries_activity_date ON time_entries(activity_id, date);
         CREATE INDEX IF NOT EXISTS idx_entries_date ON time_entries(date);
         CREATE UNIQUE INDEX IF NOT EXISTS idx_milestones_activity_threshold
             ON milestones(activity_id, hours_reached);
         CREATE INDEX IF NOT EXISTS idx_activities_is_main ON activities(is_main);",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}
