//! Error types for the persistence layer and the interactive shell.

use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`Store`](crate::storage::Store) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A task was submitted without a name.
    #[error("Task name must not be empty")]
    EmptyTaskName,

    /// The directory holding the database file could not be created.
    #[error("Could not create data directory {}: {source}", .path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An existing database file has a table missing required columns.
    #[error("Existing table '{table}' is missing column(s): {}", .missing.join(", "))]
    IncompatibleSchema { table: String, missing: Vec<String> },

    /// Recording this many minutes would push the stored totals past `i64`.
    #[error("Recording {minutes} min would overflow the stored time totals")]
    TimeOverflow { minutes: i64 },

    /// The database file was written by a newer schema version.
    #[error("Database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchemaVersion { found: i64, supported: i64 },

    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Errors raised while running a menu action.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The user typed something that is not a whole number.
    #[error("'{input}' is not a valid {what}")]
    InvalidNumber {
        what: &'static str,
        input: String,
        #[source]
        source: ParseIntError,
    },

    /// Standard input was closed.
    #[error("End of input")]
    EndOfInput,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Whether the error should end the session rather than just the current action.
    pub fn is_fatal(&self) -> bool {
        match self {
            ShellError::InvalidNumber { .. } => false,
            ShellError::Store(StoreError::EmptyTaskName | StoreError::TimeOverflow { .. }) => {
                false
            }
            ShellError::EndOfInput | ShellError::Store(_) | ShellError::Io(_) => true,
        }
    }
}
