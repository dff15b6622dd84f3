//! Numbered-menu loop over a [`Console`].

use std::fmt::Display;
use std::io::{BufRead, Write};

use tracing::warn;

use crate::commands::*;
use crate::error::ShellError;
use crate::storage::Store;

/// Line-oriented input and output for the shell.
///
/// Generic over the streams so a session can be scripted in tests.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `label`, then reads one line and returns it trimmed.
    pub fn prompt(&mut self, label: &str) -> Result<String, ShellError> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ShellError::EndOfInput);
        }
        Ok(line.trim().to_string())
    }

    /// Prompts for a whole number; `what` names the value in the error message.
    pub fn prompt_number(&mut self, label: &str, what: &'static str) -> Result<i64, ShellError> {
        let input = self.prompt(label)?;
        input
            .parse::<i64>()
            .map_err(|source| ShellError::InvalidNumber { what, input, source })
    }

    /// Prompts for a yes/no answer; only `y` (any case) counts as yes.
    pub fn confirm(&mut self, label: &str) -> Result<bool, ShellError> {
        Ok(self.prompt(label)?.eq_ignore_ascii_case("y"))
    }

    pub fn say(&mut self, line: impl Display) -> Result<(), ShellError> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Gives back the output stream.
    pub fn into_output(self) -> W {
        self.output
    }
}

/// Entries of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddTask,
    ListTasks,
    RecordTime,
    CompleteTask,
    DeleteTask,
    ShowStats,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::AddTask),
            "2" => Some(MenuChoice::ListTasks),
            "3" => Some(MenuChoice::RecordTime),
            "4" => Some(MenuChoice::CompleteTask),
            "5" => Some(MenuChoice::DeleteTask),
            "6" => Some(MenuChoice::ShowStats),
            "0" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

fn show_menu<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<(), ShellError> {
    console.say("\n=== Task Tally ===")?;
    console.say("1. Add task")?;
    console.say("2. List tasks")?;
    console.say("3. Record time")?;
    console.say("4. Complete task")?;
    console.say("5. Delete task")?;
    console.say("6. Show statistics")?;
    console.say("0. Exit")
}

/// Runs the menu until the user exits or input ends.
///
/// Bad numeric input aborts only the current action; storage and terminal
/// failures end the loop with an error.
pub fn run<R: BufRead, W: Write>(
    store: &Store,
    console: &mut Console<R, W>,
) -> Result<(), ShellError> {
    loop {
        show_menu(console)?;
        let input = match console.prompt("\nSelect an option: ") {
            Ok(input) => input,
            Err(ShellError::EndOfInput) => return console.say("\nGoodbye."),
            Err(e) => return Err(e),
        };

        let outcome = match MenuChoice::parse(&input) {
            Some(MenuChoice::AddTask) => cmd_add_task(store, console),
            Some(MenuChoice::ListTasks) => cmd_list_tasks(store, console),
            Some(MenuChoice::RecordTime) => cmd_record_time(store, console),
            Some(MenuChoice::CompleteTask) => cmd_complete_task(store, console),
            Some(MenuChoice::DeleteTask) => cmd_delete_task(store, console),
            Some(MenuChoice::ShowStats) => cmd_show_stats(store, console),
            Some(MenuChoice::Exit) => return console.say("Goodbye."),
            None => console.say("Invalid choice."),
        };

        match outcome {
            Ok(()) => {}
            Err(ShellError::EndOfInput) => return console.say("\nGoodbye."),
            Err(e) if !e.is_fatal() => {
                warn!(error = %e, "menu action aborted");
                console.say(format!("Error: {e}"))?;
            }
            Err(e) => return Err(e),
        }
    }
}
