use tasktally::models::{NewTask, TaskQuery};
use tasktally::shell::{self, Console, MenuChoice};
use tasktally::{ShellError, Store};
use tempfile::TempDir;

fn with_test_store<F>(f: F)
where
    F: FnOnce(&Store),
{
    let dir = TempDir::new().unwrap();
    let store = Store::open(dir.path().join("tasks.db")).unwrap();
    f(&store);
}

/// Feeds `script` to the menu loop and returns everything it printed.
fn run_session(store: &Store, script: &str) -> String {
    let mut console = Console::new(script.as_bytes(), Vec::new());
    shell::run(store, &mut console).unwrap();
    String::from_utf8(console.into_output()).unwrap()
}

#[test]
fn test_menu_choice_parse() {
    assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::AddTask));
    assert_eq!(MenuChoice::parse(" 6 "), Some(MenuChoice::ShowStats));
    assert_eq!(MenuChoice::parse("0"), Some(MenuChoice::Exit));
    assert_eq!(MenuChoice::parse("7"), None);
    assert_eq!(MenuChoice::parse("add"), None);
}

#[test]
fn test_add_then_list() {
    with_test_store(|store| {
        let out = run_session(
            store,
            "1\nWrite report\nQuarterly numbers\n2026-11-01\nwork, urgent,\n\
             3\n1\n30\n\
             3\n1\n15\n\
             2\nn\n\n1\n\
             0\n",
        );
        assert!(out.contains("Task added (id = 1)"));
        assert!(out.contains("Recorded 30 min on task 1."));
        assert!(out.contains(
            "[1] Write report (due: 2026-11-01, categories: work, urgent, total: 45 min) Pending"
        ));
        assert!(out.trim_end().ends_with("Goodbye."));
    });
}

#[test]
fn test_list_shows_none_placeholders() {
    with_test_store(|store| {
        store.add_task(&NewTask::new("Loose end", "", "", vec![])).unwrap();
        let out = run_session(store, "2\ny\n\n\n0\n");
        assert!(out.contains("[1] Loose end (due: none, categories: none, total: 0 min) Pending"));
    });
}

#[test]
fn test_list_filters_and_sorts() {
    with_test_store(|store| {
        let cats = |c: &[&str]| c.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        store.add_task(&NewTask::new("Later", "", "2026-12-01", cats(&["work"]))).unwrap();
        store.add_task(&NewTask::new("Sooner", "", "2026-11-01", cats(&["work"]))).unwrap();
        store.add_task(&NewTask::new("Chores", "", "", cats(&["home"]))).unwrap();

        let out = run_session(store, "2\nn\nwork\n2\n0\n");
        let sooner = out.find("Sooner").unwrap();
        let later = out.find("Later").unwrap();
        assert!(sooner < later);
        assert!(!out.contains("Chores"));
    });
}

#[test]
fn test_list_empty() {
    with_test_store(|store| {
        let out = run_session(store, "2\nn\n\n\n0\n");
        assert!(out.contains("No tasks found."));
    });
}

#[test]
fn test_complete_hides_task_from_default_list() {
    with_test_store(|store| {
        store.add_task(&NewTask::new("Finish me", "", "", vec![])).unwrap();
        let out = run_session(store, "4\n1\n2\nn\n\n\n2\ny\n\n\n0\n");
        assert!(out.contains("Task 1 marked as complete."));
        assert!(out.contains("No tasks found."));
        assert!(out.contains("[1] Finish me (due: none, categories: none, total: 0 min) Done"));
    });
}

#[test]
fn test_invalid_number_aborts_only_the_action() {
    with_test_store(|store| {
        store.add_task(&NewTask::new("Task", "", "", vec![])).unwrap();
        let out = run_session(store, "3\nabc\n3\n1\nten\n4\n1\n0\n");
        assert!(out.contains("Error: 'abc' is not a valid task id"));
        assert!(out.contains("Error: 'ten' is not a valid number of minutes"));
        assert!(out.contains("Task 1 marked as complete."));
        assert_eq!(store.get_task_total_time(1).unwrap(), 0);
    });
}

#[test]
fn test_missing_task_is_reported() {
    with_test_store(|store| {
        let out = run_session(store, "3\n42\n10\n4\n42\n5\n42\ny\n0\n");
        assert_eq!(out.matches("Task 42 not found.").count(), 3);
    });
}

#[test]
fn test_delete_requires_confirmation() {
    with_test_store(|store| {
        let id = store.add_task(&NewTask::new("Precious", "", "", vec![])).unwrap();
        store.record_time(id, 10).unwrap();

        let out = run_session(store, "5\n1\nn\n0\n");
        assert!(out.contains("Delete task 1 'Precious'? This cannot be undone. [y/N] "));
        assert!(out.contains("Aborted."));
        assert!(store.get_task(id).unwrap().is_some());

        let out = run_session(store, "5\n1\nY\n0\n");
        assert!(out.contains("Task 1 removed."));
        assert!(store.get_task(id).unwrap().is_none());
        assert_eq!(store.get_task_total_time(id).unwrap(), 0);
    });
}

#[test]
fn test_blank_name_is_rejected() {
    with_test_store(|store| {
        let out = run_session(store, "1\n   \n\n\nwork\n0\n");
        assert!(out.contains("Error: Task name must not be empty"));
        let all = TaskQuery {
            include_completed: true,
            ..TaskQuery::default()
        };
        assert!(store.list_tasks(&all).unwrap().is_empty());
    });
}

#[test]
fn test_stats_without_data() {
    with_test_store(|store| {
        let out = run_session(store, "6\n0\n");
        assert_eq!(out.matches("No time recorded.").count(), 2);
        assert!(out.contains("Completion rate: 0.0%"));
    });
}

#[test]
fn test_stats_with_data() {
    with_test_store(|store| {
        let cats = vec!["work".to_string()];
        let a = store.add_task(&NewTask::new("A", "", "", cats)).unwrap();
        let b = store.add_task(&NewTask::new("B", "", "", vec![])).unwrap();
        store.add_task(&NewTask::new("C", "", "", vec![])).unwrap();
        store.record_time(a, 40).unwrap();
        store.complete_task(b).unwrap();

        let out = run_session(store, "6\n0\n");
        assert!(out.contains("Completion rate: 33.3%"));
        assert!(out.contains("work"));
        assert!(out.contains("40"));
        assert!(!out.contains("No time recorded."));
    });
}

#[test]
fn test_invalid_choice_and_end_of_input() {
    with_test_store(|store| {
        let out = run_session(store, "9\n");
        assert!(out.contains("Invalid choice."));
        assert!(out.trim_end().ends_with("Goodbye."));
    });
}

#[test]
fn test_end_of_input_mid_action() {
    with_test_store(|store| {
        let out = run_session(store, "1\nHalf typed\n");
        assert!(out.trim_end().ends_with("Goodbye."));
        let all = TaskQuery {
            include_completed: true,
            ..TaskQuery::default()
        };
        assert!(store.list_tasks(&all).unwrap().is_empty());
    });
}

#[test]
fn test_storage_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.db");
    std::fs::write(&path, "this is plain text, not an sqlite database file\n".repeat(40)).unwrap();
    let store = Store::new(path);
    let mut console = Console::new("6\n0\n".as_bytes(), Vec::new());
    let err = shell::run(&store, &mut console).unwrap_err();
    assert!(matches!(err, ShellError::Store(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_overflowing_minutes_keep_session_alive() {
    with_test_store(|store| {
        store.add_task(&NewTask::new("Marathon", "", "", vec![])).unwrap();
        let script = format!("3\n1\n{}\n3\n1\n1\n2\ny\n\n1\n6\n0\n", i64::MAX);
        let out = run_session(store, &script);
        assert!(out.contains("Error: Recording 1 min would overflow the stored time totals"));
        assert!(out.contains(&format!("total: {} min", i64::MAX)));
        assert!(out.contains("Completion rate: 0.0%"));
        assert!(out.trim_end().ends_with("Goodbye."));
    });
}
