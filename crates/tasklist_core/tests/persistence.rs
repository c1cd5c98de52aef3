mod common;

use common::BrokenSlot;
use proptest::prelude::*;
use tasklist_core::{
    CoreConfig, FileSlot, KvSlot, LoadedSnapshot, MemorySlot, PersistenceAdapter, Reminder,
    SeedReason, SnapshotOrigin, SqliteSlot, Task, TaskList,
};

fn sample_lists() -> Vec<TaskList> {
    let mut important = TaskList::new(1, "Important");
    let mut milk = Task::new(1, "Buy milk");
    milk.is_completed = true;
    important.tasks.push(milk);
    important
        .tasks
        .push(Task::new(2, "Call mom").with_reminder(Reminder::new("2026-01-15", "10:00")));
    vec![important, TaskList::new(2, "Later")]
}

#[test]
fn missing_slot_seeds_default_list() {
    let adapter = PersistenceAdapter::new(MemorySlot::new());
    let loaded = adapter.load_snapshot();

    assert_eq!(loaded.origin, SnapshotOrigin::Seeded(SeedReason::Missing));
    assert_eq!(loaded.lists.len(), 1);
    assert_eq!(loaded.lists[0].name, "My Tasks");
    assert!(loaded.lists[0].tasks.is_empty());
}

#[test]
fn unreadable_slot_seeds_and_save_never_panics() {
    let mut adapter = PersistenceAdapter::new(BrokenSlot);
    let loaded = adapter.load_snapshot();
    assert_eq!(loaded.origin, SnapshotOrigin::Seeded(SeedReason::Unreadable));

    adapter.save(&sample_lists());
    assert!(adapter.try_save(&sample_lists()).is_err());
}

#[test]
fn save_replaces_whole_document() {
    let mut adapter = PersistenceAdapter::new(MemorySlot::new());
    adapter.save(&sample_lists());
    adapter.save(&[TaskList::new(9, "Only")]);

    let lists = adapter.load();
    assert_eq!(lists, vec![TaskList::new(9, "Only")]);
    assert_eq!(
        adapter.slot().get("taskLists"),
        Some(r#"[{"id":9,"name":"Only","tasks":[]}]"#)
    );
}

#[test]
fn configured_key_and_seed_name_are_used() {
    let config = CoreConfig {
        storage_key: "work_lists".to_string(),
        default_list_name: "Inbox".to_string(),
        ..CoreConfig::default()
    };
    let mut adapter = PersistenceAdapter::with_config(MemorySlot::new(), &config);
    assert_eq!(adapter.load()[0].name, "Inbox");

    adapter.save(&sample_lists());
    assert!(adapter.slot().get("work_lists").is_some());
    assert!(adapter.slot().get("taskLists").is_none());
}

#[test]
fn legacy_document_with_partial_fields_loads() {
    let slot = MemorySlot::new().with_entry(
        "taskLists",
        r#"[{"id":1700000000000,"name":"My Tasks","tasks":[{"id":1,"task":"Test"},
            {"id":2,"task":"Half","reminder":{"date":"2026-01-15"}}]}]"#,
    );
    let adapter = PersistenceAdapter::new(slot);
    let loaded = adapter.load_snapshot();

    assert_eq!(loaded.origin, SnapshotOrigin::Stored);
    let tasks = &loaded.lists[0].tasks;
    assert_eq!(loaded.lists[0].id, 1_700_000_000_000);
    assert!(!tasks[0].is_completed);
    assert!(tasks[1].reminder.is_none());
}

#[test]
fn sqlite_slot_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.sqlite3");

    let mut adapter = PersistenceAdapter::new(SqliteSlot::open(&path).unwrap());
    adapter.try_save(&sample_lists()).unwrap();
    adapter.try_save(&sample_lists()[..1]).unwrap();
    drop(adapter);

    let reopened = PersistenceAdapter::new(SqliteSlot::open(&path).unwrap());
    let loaded = reopened.load_snapshot();
    assert_eq!(loaded.origin, SnapshotOrigin::Stored);
    assert_eq!(loaded.lists, sample_lists()[..1].to_vec());

    let rows: i64 = reopened
        .slot()
        .connection()
        .query_row("SELECT COUNT(*) FROM kv_slots;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn file_slot_persists_and_leaves_no_staging_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut adapter = PersistenceAdapter::new(FileSlot::new(dir.path().join("state")));
    adapter.try_save(&sample_lists()).unwrap();

    let reopened = PersistenceAdapter::new(FileSlot::new(dir.path().join("state")));
    assert_eq!(reopened.load(), sample_lists());

    let names: Vec<String> = std::fs::read_dir(dir.path().join("state"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["taskLists.json".to_string()]);
}

#[test]
fn file_slot_rejects_path_like_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut slot = FileSlot::new(dir.path());
    assert!(slot.write("../outside", "[]").is_err());
    assert!(slot.read("a/b").is_err());
}

fn reminder_strategy() -> impl Strategy<Value = Option<Reminder>> {
    prop::option::of(
        (2000i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60).prop_map(
            |(year, month, day, hour, minute)| {
                Reminder::new(
                    format!("{year:04}-{month:02}-{day:02}"),
                    format!("{hour:02}:{minute:02}"),
                )
                .expect("generated reminder is complete")
            },
        ),
    )
}

fn task_strategy() -> impl Strategy<Value = Task> {
    (any::<u64>(), any::<String>(), any::<bool>(), reminder_strategy()).prop_map(
        |(id, text, is_completed, reminder)| {
            let mut task = Task::new(id, text).with_reminder(reminder);
            task.is_completed = is_completed;
            task
        },
    )
}

fn lists_strategy() -> impl Strategy<Value = Vec<TaskList>> {
    prop::collection::vec(
        (
            any::<u64>(),
            any::<String>(),
            prop::collection::vec(task_strategy(), 0..6),
        )
            .prop_map(|(id, name, tasks)| TaskList { id, name, tasks }),
        0..5,
    )
}

proptest! {
    #[test]
    fn save_then_load_returns_identical_lists(lists in lists_strategy()) {
        let mut adapter = PersistenceAdapter::new(MemorySlot::new());
        adapter.try_save(&lists).unwrap();
        prop_assert_eq!(
            adapter.load_snapshot(),
            LoadedSnapshot { lists, origin: SnapshotOrigin::Stored }
        );
    }
}
