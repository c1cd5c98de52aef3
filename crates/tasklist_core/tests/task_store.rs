use tasklist_core::{ReconcileSignal, Reminder, Task, TaskList, TaskStore, ValidationError};

#[test]
fn add_list_rejects_blank_name_without_state_change() {
    let mut store = TaskStore::new();
    let err = store.add_list("   ").unwrap_err();
    assert_eq!(err, ValidationError::BlankListName);
    assert!(store.lists().is_empty());
}

#[test]
fn add_list_trims_name_and_assigns_fresh_ids() {
    let mut store = TaskStore::new();
    let first = store.add_list("  Groceries ").unwrap().id;
    let second = store.add_list("Work").unwrap().id;

    assert_ne!(first, second);
    assert_eq!(store.list(first).unwrap().name, "Groceries");
    assert!(store.list(first).unwrap().tasks.is_empty());
}

#[test]
fn add_task_rejects_blank_text_and_unknown_list() {
    let mut store = TaskStore::new();
    let list_id = store.add_list("Inbox").unwrap().id;

    assert_eq!(
        store.add_task(list_id, " \n ", None).unwrap_err(),
        ValidationError::BlankTaskText
    );
    assert_eq!(
        store.add_task(999, "real text", None).unwrap_err(),
        ValidationError::ListNotFound(999)
    );
    assert!(store.list(list_id).unwrap().tasks.is_empty());
    assert!(!store.has_pending_signals());
}

#[test]
fn add_task_appends_incomplete_task_with_reminder() {
    let mut store = TaskStore::new();
    let list_id = store.add_list("Inbox").unwrap().id;
    store.add_task(list_id, "first", None).unwrap();
    let task = store
        .add_task(list_id, "Call mom", Reminder::new("2026-01-15", "10:00"))
        .unwrap()
        .clone();

    assert!(!task.is_completed);
    assert_eq!(task.text, "Call mom");
    assert_eq!(task.reminder, Reminder::new("2026-01-15", "10:00"));

    let texts: Vec<&str> = store
        .list(list_id)
        .unwrap()
        .tasks
        .iter()
        .map(|task| task.text.as_str())
        .collect();
    assert_eq!(texts, vec!["first", "Call mom"]);
}

#[test]
fn task_ids_never_repeat_after_list_recreation() {
    let mut store = TaskStore::new();
    let list_a = store.add_list("A").unwrap().id;
    let old_task = store.add_task(list_a, "a", None).unwrap().id;
    store.remove_list(list_a).unwrap();

    let list_b = store.add_list("A").unwrap().id;
    let new_task = store.add_task(list_b, "a", None).unwrap().id;

    assert_ne!(list_a, list_b);
    assert_ne!(old_task, new_task);
}

#[test]
fn remove_task_is_idempotent() {
    let mut store = TaskStore::new();
    let list_id = store.add_list("Inbox").unwrap().id;
    let keep = store.add_task(list_id, "keep", None).unwrap().id;
    let gone = store.add_task(list_id, "drop", None).unwrap().id;
    store.take_signals();

    assert!(store.remove_task(list_id, gone));
    let after_first = store.snapshot();
    let signals_after_first = store.take_signals();

    assert!(!store.remove_task(list_id, gone));
    assert_eq!(store.snapshot(), after_first);
    assert!(store.take_signals().is_empty());

    assert_eq!(
        signals_after_first,
        vec![ReconcileSignal::Task {
            list_id,
            task_id: gone
        }]
    );
    assert!(store.task(list_id, keep).is_some());
}

#[test]
fn toggle_completed_flips_and_reports_missing_tasks() {
    let mut store = TaskStore::new();
    let list_id = store.add_list("Inbox").unwrap().id;
    let task_id = store.add_task(list_id, "flip", None).unwrap().id;

    assert!(store.toggle_completed(list_id, task_id).unwrap());
    assert!(store.task(list_id, task_id).unwrap().is_completed);
    assert!(!store.toggle_completed(list_id, task_id).unwrap());

    assert_eq!(
        store.toggle_completed(list_id, 404).unwrap_err(),
        ValidationError::TaskNotFound {
            list_id,
            task_id: 404
        }
    );
}

#[test]
fn set_reminder_replaces_and_clears() {
    let mut store = TaskStore::new();
    let list_id = store.add_list("Inbox").unwrap().id;
    let task_id = store
        .add_task(list_id, "dentist", Reminder::new("2026-02-01", "08:00"))
        .unwrap()
        .id;

    store
        .set_reminder(list_id, task_id, Reminder::new("2026-02-02", "09:30"))
        .unwrap();
    assert_eq!(
        store.task(list_id, task_id).unwrap().reminder,
        Reminder::new("2026-02-02", "09:30")
    );

    store.set_reminder(list_id, task_id, None).unwrap();
    assert!(store.task(list_id, task_id).unwrap().reminder.is_none());
}

#[test]
fn edit_and_rename_validate_without_signals() {
    let mut store = TaskStore::new();
    let list_id = store.add_list("Inbox").unwrap().id;
    let task_id = store.add_task(list_id, "draft", None).unwrap().id;
    store.take_signals();

    store.edit_task_text(list_id, task_id, " final ").unwrap();
    store.rename_list(list_id, "Today").unwrap();
    assert_eq!(store.task(list_id, task_id).unwrap().text, "final");
    assert_eq!(store.list(list_id).unwrap().name, "Today");
    assert!(!store.has_pending_signals());

    assert_eq!(
        store.edit_task_text(list_id, task_id, "").unwrap_err(),
        ValidationError::BlankTaskText
    );
    assert_eq!(
        store.rename_list(list_id, "\t").unwrap_err(),
        ValidationError::BlankListName
    );
}

#[test]
fn find_task_searches_every_list() {
    let mut store = TaskStore::new();
    let first = store.add_list("A").unwrap().id;
    let second = store.add_list("B").unwrap().id;
    store.add_task(first, "a", None).unwrap();
    let target = store.add_task(second, "b", None).unwrap().id;

    let (list_id, task) = store.find_task(target).unwrap();
    assert_eq!(list_id, second);
    assert_eq!(task.text, "b");
    assert_eq!(store.all_tasks().count(), 2);
    assert!(store.find_task(12345).is_none());
}

#[test]
fn remove_missing_list_is_silent() {
    let mut store = TaskStore::new();
    assert!(store.remove_list(77).is_none());
    assert!(!store.has_pending_signals());
}

#[test]
fn loaded_max_ids_never_collide_with_new_ones() {
    let mut edge = TaskList::new(u64::MAX, "Edge");
    edge.tasks.push(Task::new(u64::MAX, "edge"));
    let mut store = TaskStore::from_lists(vec![edge]);
    let old_list = store.lists()[0].id;
    let old_task = store.lists()[0].tasks[0].id;

    let new_list = store.add_list("Work").unwrap().id;
    let new_task = store.add_task(new_list, "report", None).unwrap().id;

    assert_ne!(old_list, new_list);
    assert_ne!(old_task, new_task);
    assert_eq!(store.find_task(new_task).unwrap().0, new_list);
    assert_eq!(store.find_task(old_task).unwrap().1.text, "edge");
}

#[test]
fn exhausted_ids_reject_new_entries_without_change() {
    let mut store = TaskStore::from_lists(vec![TaskList::new(u64::MAX - 1, "Last")]);
    let last = store.add_list("Top").unwrap().id;
    assert_eq!(last, u64::MAX);

    assert_eq!(
        store.add_list("Overflow").unwrap_err(),
        ValidationError::IdsExhausted
    );
    assert_eq!(store.lists().len(), 2);
    assert!(!store.has_pending_signals());
}
