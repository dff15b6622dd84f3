//! Tasks, queries and aggregate rows shared by the store and the shell.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Represents a single task in the tracker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Unique identifier assigned by the database.
    pub id: i64,
    /// The name of the task.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Optional due date, kept exactly as the user typed it.
    pub due_date: Option<String>,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
    /// Timestamp when the task was created (UTC).
    pub created_at: NaiveDateTime,
}

/// Input for creating a task.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    /// Category names; blank entries are ignored and the rest trimmed on insert.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl NewTask {
    /// Builds a task from raw text fields. Blank description and due date become `None`.
    pub fn new(
        name: impl Into<String>,
        description: &str,
        due_date: &str,
        categories: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: non_blank(description),
            due_date: non_blank(due_date),
            categories,
        }
    }
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Ordering used when listing tasks.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    /// Ascending id (creation order).
    #[default]
    Id,
    /// Ascending due date; tasks without a due date go last.
    DueDate,
}

/// Filter and ordering for [`Store::list_tasks`](crate::storage::Store::list_tasks).
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TaskQuery {
    pub include_completed: bool,
    /// Only tasks linked to a category with exactly this name.
    pub category: Option<String>,
    pub sort: TaskSort,
}

/// Minutes recorded on one calendar day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub minutes: i64,
}

/// Minutes recorded across all tasks of one category.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub name: String,
    pub minutes: i64,
}

/// Splits comma-separated category input, trimming entries and dropping blank ones.
pub fn parse_category_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}
