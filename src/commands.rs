use std::io::{BufRead, Write};

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use crate::error::ShellError;
use crate::models::{parse_category_list, NewTask, Task, TaskQuery, TaskSort};
use crate::shell::Console;
use crate::storage::Store;

/// Collects name, description, due date and categories, then adds the task.
pub fn cmd_add_task<R: BufRead, W: Write>(
    store: &Store,
    console: &mut Console<R, W>,
) -> Result<(), ShellError> {
    console.say("\n[Add task]")?;
    let name = console.prompt("Name: ")?;
    let description = console.prompt("Description (optional): ")?;
    let due = console.prompt("Due date (YYYY-MM-DD, optional): ")?;
    let categories = console.prompt("Categories (comma separated, optional): ")?;

    let task = NewTask::new(name, &description, &due, parse_category_list(&categories));
    let id = store.add_task(&task)?;
    console.say(format!("Task added (id = {id})"))
}

/// Asks for filters, then prints one summary line per task.
pub fn cmd_list_tasks<R: BufRead, W: Write>(
    store: &Store,
    console: &mut Console<R, W>,
) -> Result<(), ShellError> {
    console.say("\n[Task list]")?;
    let include_completed = console.confirm("Include completed tasks? (y/n): ")?;
    let category = console.prompt("Filter by category (blank for all): ")?;
    let sort = console.prompt("Sort by: 1) ID (default) 2) Due date: ")?;

    let query = TaskQuery {
        include_completed,
        category: Some(category).filter(|c| !c.is_empty()),
        sort: if sort == "2" { TaskSort::DueDate } else { TaskSort::Id },
    };
    let tasks = store.list_tasks(&query)?;
    if tasks.is_empty() {
        return console.say("No tasks found.");
    }

    for task in tasks {
        let total = store.get_task_total_time(task.id)?;
        let categories = store.get_task_categories(task.id)?;
        console.say(format_task_line(&task, &categories, total))?;
    }
    Ok(())
}

/// One-line summary used by the task list.
pub fn format_task_line(task: &Task, categories: &[String], total_minutes: i64) -> String {
    let due = task.due_date.as_deref().unwrap_or("none");
    let cats = if categories.is_empty() {
        "none".to_string()
    } else {
        categories.join(", ")
    };
    let status = if task.completed { "Done" } else { "Pending" };
    format!(
        "[{}] {} (due: {due}, categories: {cats}, total: {total_minutes} min) {status}",
        task.id, task.name
    )
}

/// Records minutes against a task.
pub fn cmd_record_time<R: BufRead, W: Write>(
    store: &Store,
    console: &mut Console<R, W>,
) -> Result<(), ShellError> {
    console.say("\n[Record time]")?;
    let id = console.prompt_number("Task ID: ", "task id")?;
    let minutes = console.prompt_number("Minutes spent: ", "number of minutes")?;

    if store.record_time(id, minutes)? {
        console.say(format!("Recorded {minutes} min on task {id}."))
    } else {
        console.say(format!("Task {id} not found."))
    }
}

/// Marks a task as complete by ID.
pub fn cmd_complete_task<R: BufRead, W: Write>(
    store: &Store,
    console: &mut Console<R, W>,
) -> Result<(), ShellError> {
    console.say("\n[Complete task]")?;
    let id = console.prompt_number("ID of the task to complete: ", "task id")?;

    if store.complete_task(id)? {
        console.say(format!("Task {id} marked as complete."))
    } else {
        console.say(format!("Task {id} not found."))
    }
}

/// Removes a task after an explicit confirmation.
pub fn cmd_delete_task<R: BufRead, W: Write>(
    store: &Store,
    console: &mut Console<R, W>,
) -> Result<(), ShellError> {
    console.say("\n[Delete task]")?;
    let id = console.prompt_number("ID of the task to delete: ", "task id")?;

    let label = match store.get_task(id)? {
        Some(task) => format!("task {id} '{}'", task.name),
        None => format!("task {id}"),
    };
    let question = format!("Delete {label}? This cannot be undone. [y/N] ");
    if !console.confirm(&question)? {
        return console.say("Aborted.");
    }

    if store.delete_task(id)? {
        console.say(format!("Task {id} removed."))
    } else {
        console.say(format!("Task {id} not found."))
    }
}

/// Prints daily totals, completion rate and per-category totals.
pub fn cmd_show_stats<R: BufRead, W: Write>(
    store: &Store,
    console: &mut Console<R, W>,
) -> Result<(), ShellError> {
    console.say("\n[Statistics]")?;

    console.say("\nTime per day:")?;
    let daily = store.get_daily_stats()?;
    if daily.is_empty() {
        console.say("  No time recorded.")?;
    } else {
        let rows = daily.iter().map(|d| (d.date.to_string(), d.minutes));
        console.say(minutes_table("Date", rows))?;
    }

    let rate = store.get_completion_rate()?;
    console.say(format!("\nCompletion rate: {rate:.1}%"))?;

    console.say("\nTime per category:")?;
    let by_category = store.get_category_stats()?;
    if by_category.is_empty() {
        console.say("  No time recorded.")
    } else {
        let rows = by_category.iter().map(|c| (c.name.clone(), c.minutes));
        console.say(minutes_table("Category", rows))
    }
}

fn minutes_table(label: &str, rows: impl Iterator<Item = (String, i64)>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new(label).add_attribute(Attribute::Bold),
            Cell::new("Minutes").add_attribute(Attribute::Bold),
        ]);
    for (key, minutes) in rows {
        table.add_row(vec![
            Cell::new(key),
            Cell::new(minutes).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
