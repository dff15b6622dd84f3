//! # Tasktally
//!
//! A small terminal task tracker written in Rust. Create tasks, tag them with
//! categories, log the minutes you spend on them and look at where the time went.
//!
//! ## Features
//!
//! *   **Categories**: Any number of shared categories per task, created on first use.
//! *   **Time Tracking**: Append-only time records per task, summed in the task list.
//! *   **Statistics**: Minutes per day, completion rate and minutes per category.
//! *   **Data Persistence**: Everything lives in one SQLite file.
//!
//! ## Installation
//!
//! ```bash
//! cargo install --path .
//! ```
//!
//! ## Usage
//!
//! Run the command and pick an entry from the menu:
//!
//! ```text
//! === Task Tally ===
//! 1. Add task
//! 2. List tasks
//! 3. Record time
//! 4. Complete task
//! 5. Delete task
//! 6. Show statistics
//! 0. Exit
//! ```
//!
//! Categories are entered comma separated (`work, urgent`). Deleting a task
//! asks for confirmation and also removes its time records.
//!
//! ## Data Storage
//!
//! The database is saved in your local data directory:
//! *   Linux: `~/.local/share/tasktally/tasks.db`
//! *   macOS: `~/Library/Application Support/tasktally/tasks.db`
//! *   Windows: `%LOCALAPPDATA%\tasktally\tasks.db`
//!
//! You can override this with `--db <PATH>` or the `TASKS_DB` environment variable.
//!
//! ## Logging
//!
//! Diagnostics go to stderr. Use `-v`/`-vv` for more detail, or set
//! `TASKTALLY_LOG` (e.g. `TASKTALLY_LOG=tasktally=debug`).

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tasktally::config::Config;
use tasktally::shell::{self, Console};
use tasktally::storage::Store;

#[derive(Parser)]
#[command(name = "tasktally")]
#[command(about = "Interactive task and time tracker", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, env = "TASKS_DB", value_name = "PATH")]
    db: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::new(cli.db, cli.verbose);

    tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_writer(io::stderr)
        .init();

    let store = Store::open(&config.db_path).with_context(|| {
        format!("failed to open task database at {}", config.db_path.display())
    })?;
    tracing::info!(path = %store.path().display(), "task database ready");

    let mut console = Console::new(io::stdin().lock(), io::stdout());
    shell::run(&store, &mut console).context("task tracker stopped")?;
    Ok(())
}
