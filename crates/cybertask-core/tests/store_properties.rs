use chrono::{TimeZone, Utc};
use cybertask_core::storage::TASKS_STORAGE_KEY;
use cybertask_core::{JsonRepository, MemoryBackend, Task, TaskId, TaskStore};
use proptest::prelude::*;

type MemoryStore = TaskStore<JsonRepository<MemoryBackend, cybertask_core::TaskState>>;

fn open(backend: &MemoryBackend) -> MemoryStore {
    TaskStore::open(JsonRepository::new(backend.clone(), TASKS_STORAGE_KEY))
}

fn build(flags: &[(String, bool)]) -> (MemoryBackend, MemoryStore) {
    let backend = MemoryBackend::new();
    let mut store = open(&backend);
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for (idx, (name, completed)) in flags.iter().enumerate() {
        let mut task = Task::new(format!("task-{idx}"), name.clone(), "", created);
        task.completed = *completed;
        store.add_task(task).expect("unique ids");
    }
    (backend, store)
}

fn records() -> impl Strategy<Value = Vec<(String, bool)>> {
    prop::collection::vec(("[a-z]{1,12}", any::<bool>()), 0..24)
}

proptest! {
    #[test]
    fn completed_count_matches_added_records(flags in records()) {
        let (_, store) = build(&flags);
        let expected = flags.iter().filter(|(_, done)| *done).count();
        prop_assert_eq!(store.completed_tasks_count(), expected);
    }

    #[test]
    fn toggling_twice_is_identity(flags in records(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!flags.is_empty());
        let (_, mut store) = build(&flags);
        let id = store.tasks()[pick.index(flags.len())].id.clone();
        let before = store.state().clone();

        store.toggle_task_completion(&id);
        store.toggle_task_completion(&id);
        prop_assert_eq!(store.state(), &before);
    }

    #[test]
    fn delete_removes_exactly_one(flags in records(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!flags.is_empty());
        let (_, mut store) = build(&flags);
        let id = store.tasks()[pick.index(flags.len())].id.clone();
        let expected: Vec<Task> = store
            .tasks()
            .iter()
            .filter(|task| task.id != id)
            .cloned()
            .collect();

        let removed = store.delete_task(&id);
        prop_assert_eq!(removed.map(|t| t.id), Some(id));
        prop_assert_eq!(store.tasks(), expected.as_slice());
    }

    #[test]
    fn missing_ids_change_nothing(flags in records()) {
        let (backend, mut store) = build(&flags);
        let persisted = backend.raw(TASKS_STORAGE_KEY);
        let before = store.state().clone();
        let ghost = TaskId::from("not-a-task");

        prop_assert_eq!(store.toggle_task_completion(&ghost), None);
        prop_assert!(store.delete_task(&ghost).is_none());
        prop_assert_eq!(store.state(), &before);
        prop_assert_eq!(backend.raw(TASKS_STORAGE_KEY), persisted);
    }

    #[test]
    fn restart_restores_collection(flags in records()) {
        let (backend, store) = build(&flags);
        let reopened = open(&backend);
        prop_assert_eq!(reopened.state(), store.state());
    }
}
