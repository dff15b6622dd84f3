use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive that overrides `-v`.
pub const LOG_ENV: &str = "TASKTALLY_LOG";

/// Runtime settings resolved from the command line and environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Location of the SQLite database file.
    pub db_path: PathBuf,
    /// Number of `-v` flags given.
    pub verbosity: u8,
}

impl Config {
    /// Uses `db_path` when given, otherwise [`default_db_path`].
    pub fn new(db_path: Option<PathBuf>, verbosity: u8) -> Self {
        Self {
            db_path: db_path.unwrap_or_else(default_db_path),
            verbosity,
        }
    }

    /// Log level implied by the verbosity count.
    pub fn log_level(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Filter for the tracing subscriber; `TASKTALLY_LOG` wins when set and valid.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(self.log_level()))
    }
}

/// Returns the default path of the task database.
///
/// 1. `~/.local/share/tasktally/tasks.db` (on Linux, per-platform data dir elsewhere).
/// 2. `./tasks.db` when no data directory is known.
pub fn default_db_path() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join("tasktally").join("tasks.db"),
        None => PathBuf::from("tasks.db"),
    }
}
