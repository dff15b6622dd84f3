//! Personal task tracker backed by a single SQLite file.
//!
//! [`storage::Store`] owns the schema and all task, category and time-record
//! operations; [`shell`] drives them from a numbered text menu.

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod schema;
pub mod shell;
pub mod stats;
pub mod storage;

pub use error::{ShellError, StoreError};
pub use storage::Store;
