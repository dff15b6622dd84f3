//! Table definitions and the versioned schema marker.
//!
//! The schema version lives in SQLite's `user_version` pragma. A file with
//! version 0 is either brand new or was written before versioning existed;
//! both are brought up to [`SCHEMA_VERSION`] inside a single transaction.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::error::StoreError;
use crate::models::parse_category_list;
use crate::storage::{category_id, link_category};

/// Schema version written by this build.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    description TEXT,
    due_date    TEXT,
    completed   INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS categories (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL
);

CREATE TABLE IF NOT EXISTS task_categories (
    task_id     INTEGER NOT NULL,
    category_id INTEGER NOT NULL,
    PRIMARY KEY (task_id, category_id),
    FOREIGN KEY (task_id) REFERENCES tasks(id) ON DELETE CASCADE,
    FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS time_records (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id          INTEGER NOT NULL,
    duration_minutes INTEGER NOT NULL,
    recorded_at      TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (task_id) REFERENCES tasks(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_time_records_task ON time_records(task_id);
";

/// Folds duplicate category names and links left by files that predate the
/// unique constraints, then enforces uniqueness with indexes.
const UNIQUE_CATEGORIES: &str = "
UPDATE OR IGNORE task_categories
SET category_id = (
    SELECT MIN(dup.id) FROM categories c
    JOIN categories dup ON dup.name = c.name
    WHERE c.id = task_categories.category_id
)
WHERE category_id IN (SELECT id FROM categories);

DELETE FROM task_categories
WHERE category_id NOT IN (SELECT MIN(id) FROM categories GROUP BY name)
   OR rowid NOT IN (SELECT MIN(rowid) FROM task_categories GROUP BY task_id, category_id);

DELETE FROM categories
WHERE id NOT IN (SELECT MIN(id) FROM categories GROUP BY name);

CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_name ON categories(name);
CREATE UNIQUE INDEX IF NOT EXISTS idx_task_categories_pair
    ON task_categories(task_id, category_id);
";

/// Columns every pre-existing table must already have to be reused as-is.
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("tasks", &["id", "name", "description", "due_date", "completed", "created_at"]),
    ("categories", &["id", "name"]),
    ("task_categories", &["task_id", "category_id"]),
    ("time_records", &["id", "task_id", "duration_minutes", "recorded_at"]),
];

/// Brings the database up to [`SCHEMA_VERSION`]. Safe to call on every open.
pub(crate) fn migrate(conn: &mut Connection) -> Result<(), StoreError> {
    let found: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if found == SCHEMA_VERSION {
        return Ok(());
    }
    if found > SCHEMA_VERSION {
        return Err(StoreError::UnsupportedSchemaVersion {
            found,
            supported: SCHEMA_VERSION,
        });
    }

    let tx = conn.transaction()?;
    let legacy_tasks = table_exists(&tx, "tasks")?;
    for (table, required) in REQUIRED_COLUMNS {
        if !table_exists(&tx, table)? {
            continue;
        }
        let present = table_columns(&tx, table)?;
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !present.iter().any(|p| p == *c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::IncompatibleSchema {
                table: table.to_string(),
                missing,
            });
        }
    }

    tx.execute_batch(SCHEMA)?;
    tx.execute_batch(UNIQUE_CATEGORIES)?;

    if legacy_tasks && table_columns(&tx, "tasks")?.iter().any(|c| c == "category") {
        let adopted = adopt_flat_categories(&tx)?;
        info!(links = adopted, "adopted legacy single-column categories");
    }

    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;
    if legacy_tasks {
        info!(from = found, to = SCHEMA_VERSION, "upgraded existing task database");
    } else {
        info!(version = SCHEMA_VERSION, "created task database schema");
    }
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool, StoreError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1",
            params![name],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Copies values of an old flat `tasks.category` column into the many-to-many tables.
fn adopt_flat_categories(conn: &Connection) -> Result<usize, StoreError> {
    let rows: Vec<(i64, String)> = {
        let mut stmt = conn.prepare(
            "SELECT id, category FROM tasks WHERE category IS NOT NULL AND TRIM(category) <> ''",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    };

    let mut linked = 0;
    for (task_id, raw) in rows {
        for name in parse_category_list(&raw) {
            let cat = category_id(conn, &name)?;
            linked += link_category(conn, task_id, cat)?;
        }
    }
    Ok(linked)
}
