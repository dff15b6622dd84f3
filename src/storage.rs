use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use tracing::debug;

use crate::error::StoreError;
use crate::models::{NewTask, Task, TaskQuery, TaskSort};
use crate::schema;

const SELECT_TASKS: &str =
    "SELECT id, name, description, due_date, completed, created_at FROM tasks";
const WHERE_INCOMPLETE: &str = "completed = 0";
const WHERE_CATEGORY: &str = "id IN (SELECT tc.task_id FROM task_categories tc \
     JOIN categories c ON c.id = tc.category_id WHERE c.name = ?)";
const ORDER_BY_ID: &str = "ORDER BY id";
// Legacy files may store an empty string instead of NULL.
const ORDER_BY_DUE: &str =
    "ORDER BY (due_date IS NULL OR due_date = '') ASC, due_date ASC, id ASC";

/// Handle to the task database file.
///
/// Holds only the path: every operation opens its own connection, runs to
/// completion (in a transaction when it touches more than one row) and closes it.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Creates a handle without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a handle and makes sure the schema exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(path);
        store.initialize()?;
        Ok(store)
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the database file and tables on first use.
    ///
    /// Calling it again on an initialized file is a no-op.
    pub fn initialize(&self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|source| StoreError::DataDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }
        let mut conn = self.connect()?;
        schema::migrate(&mut conn)
    }

    pub(crate) fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    /// Adds a task together with its category links and returns its id.
    ///
    /// Blank category entries are skipped, the rest are trimmed and created on
    /// demand. The task row and all links are committed together or not at all.
    pub fn add_task(&self, task: &NewTask) -> Result<i64, StoreError> {
        let name = task.name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyTaskName);
        }

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO tasks (name, description, due_date) VALUES (?1, ?2, ?3)",
            params![name, task.description, task.due_date],
        )?;
        let task_id = tx.last_insert_rowid();

        let mut linked = 0;
        for cat in task.categories.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
            let cat_id = category_id(&tx, cat)?;
            linked += link_category(&tx, task_id, cat_id)?;
        }
        tx.commit()?;

        debug!(task_id, categories = linked, "task added");
        Ok(task_id)
    }

    /// Returns the id of the category with exactly this name, creating it if needed.
    pub fn get_or_create_category(&self, name: &str) -> Result<i64, StoreError> {
        let conn = self.connect()?;
        category_id(&conn, name)
    }

    /// Lists tasks matching `query`. Returns an empty vector when nothing matches.
    pub fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, StoreError> {
        let mut clauses = Vec::new();
        let mut args: Vec<&dyn ToSql> = Vec::new();
        if !query.include_completed {
            clauses.push(WHERE_INCOMPLETE);
        }
        if let Some(category) = &query.category {
            clauses.push(WHERE_CATEGORY);
            args.push(category);
        }

        let mut sql = SELECT_TASKS.to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push(' ');
        sql.push_str(match query.sort {
            TaskSort::Id => ORDER_BY_ID,
            TaskSort::DueDate => ORDER_BY_DUE,
        });

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(&args[..], map_task)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = tasks.len(), ?query, "tasks listed");
        Ok(tasks)
    }

    /// Loads a single task by id.
    pub fn get_task(&self, task_id: i64) -> Result<Option<Task>, StoreError> {
        let conn = self.connect()?;
        let task = conn
            .query_row(&format!("{SELECT_TASKS} WHERE id = ?1"), params![task_id], map_task)
            .optional()?;
        Ok(task)
    }

    /// Category names linked to a task, in the order they were attached.
    ///
    /// Empty when the task has no categories or does not exist.
    pub fn get_task_categories(&self, task_id: i64) -> Result<Vec<String>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT c.name FROM categories c
             JOIN task_categories tc ON c.id = tc.category_id
             WHERE tc.task_id = ?1
             ORDER BY tc.rowid",
        )?;
        let names = stmt
            .query_map(params![task_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Appends a time record to a task.
    ///
    /// `minutes` is stored as given, except that the absolute values of all
    /// records must stay within `i64` so every per-task, per-day and
    /// per-category sum fits. Returns `false` and records nothing when the
    /// task does not exist.
    pub fn record_time(&self, task_id: i64, minutes: i64) -> Result<bool, StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let recorded: i64 = tx.query_row(
            "SELECT COALESCE(SUM(ABS(duration_minutes)), 0) FROM time_records",
            [],
            |row| row.get(0),
        )?;
        if minutes
            .checked_abs()
            .and_then(|m| recorded.checked_add(m))
            .is_none()
        {
            return Err(StoreError::TimeOverflow { minutes });
        }

        let inserted = tx.execute(
            "INSERT INTO time_records (task_id, duration_minutes)
             SELECT ?1, ?2 WHERE EXISTS (SELECT 1 FROM tasks WHERE id = ?1)",
            params![task_id, minutes],
        )?;
        tx.commit()?;
        debug!(task_id, minutes, inserted, "time recorded");
        Ok(inserted > 0)
    }

    /// Sum of all minutes recorded for a task; 0 when there are none.
    pub fn get_task_total_time(&self, task_id: i64) -> Result<i64, StoreError> {
        let conn = self.connect()?;
        let total = conn.query_row(
            "SELECT COALESCE(SUM(duration_minutes), 0) FROM time_records WHERE task_id = ?1",
            params![task_id],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Marks a task as completed. Returns `false` if no such task exists.
    pub fn complete_task(&self, task_id: i64) -> Result<bool, StoreError> {
        let conn = self.connect()?;
        let updated = conn.execute("UPDATE tasks SET completed = 1 WHERE id = ?1", params![task_id])?;
        debug!(task_id, updated, "task completed");
        Ok(updated > 0)
    }

    /// Deletes a task; its time records and category links go with it.
    ///
    /// Returns `false` if no such task exists.
    pub fn delete_task(&self, task_id: i64) -> Result<bool, StoreError> {
        let conn = self.connect()?;
        let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
        debug!(task_id, deleted, "task deleted");
        Ok(deleted > 0)
    }
}

fn map_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        name: row.get(1)?,
        description: non_empty(row.get(2)?),
        due_date: non_empty(row.get(3)?),
        completed: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Looks up a category by exact name, inserting it first if it is missing.
pub(crate) fn category_id(conn: &Connection, name: &str) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT OR IGNORE INTO categories (name) VALUES (?1)",
        params![name],
    )?;
    let id = conn.query_row(
        "SELECT id FROM categories WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Links a category to a task. Returns 0 if the link already existed.
pub(crate) fn link_category(
    conn: &Connection,
    task_id: i64,
    category_id: i64,
) -> Result<usize, StoreError> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO task_categories (task_id, category_id) VALUES (?1, ?2)",
        params![task_id, category_id],
    )?;
    Ok(inserted)
}
