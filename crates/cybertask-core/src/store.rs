//! The task store: sole owner of the task collection.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::audio::{CuePlayer, SoundCue, play_cue};
use crate::error::StoreError;
use crate::game::Progress;
use crate::storage::Repository;
use crate::subscription::{SubscriptionId, Subscribers};
use crate::task::{Task, TaskId, TaskState, demo_tasks};

pub struct TaskStore<R> {
    repo: R,
    state: TaskState,
    cues: Option<Box<dyn CuePlayer>>,
    subscribers: Subscribers<[Task]>,
}

impl<R> std::fmt::Debug for TaskStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("tasks", &self.state.tasks.len())
            .field("subscribers", &self.subscribers)
            .finish_non_exhaustive()
    }
}

impl<R: Repository<TaskState>> TaskStore<R> {
    #[tracing::instrument(skip(repo))]
    pub fn open(repo: R) -> Self {
        let state = load_valid(&repo).unwrap_or_default();
        info!(count = state.tasks.len(), "loaded task store");
        Self::with_state(repo, state)
    }

    /// Like [`TaskStore::open`], but a first run starts with example tasks.
    #[tracing::instrument(skip(repo, now))]
    pub fn open_with_seed(repo: R, now: DateTime<Utc>) -> Self {
        match load_valid(&repo) {
            Some(state) => {
                info!(count = state.tasks.len(), "loaded task store");
                Self::with_state(repo, state)
            }
            None => {
                let state = TaskState {
                    tasks: demo_tasks(now),
                };
                info!(count = state.tasks.len(), "seeded task store with demo tasks");
                let store = Self::with_state(repo, state);
                store.persist();
                store
            }
        }
    }

    fn with_state(repo: R, state: TaskState) -> Self {
        Self {
            repo,
            state,
            cues: None,
            subscribers: Subscribers::default(),
        }
    }

    pub fn with_cue_player(mut self, player: impl CuePlayer + 'static) -> Self {
        self.cues = Some(Box::new(player));
        self
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.state.tasks.iter().find(|task| &task.id == id)
    }

    pub fn len(&self) -> usize {
        self.state.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.tasks.is_empty()
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = &Task> {
        self.state.tasks.iter().filter(|task| !task.completed)
    }

    pub fn completed_tasks_count(&self) -> usize {
        self.state.tasks.iter().filter(|task| task.completed).count()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.completed_tasks_count(),
            total: self.len(),
        }
    }

    #[tracing::instrument(skip(self, task), fields(id = %task.id))]
    pub fn add_task(&mut self, task: Task) -> Result<(), StoreError> {
        if self.get(&task.id).is_some() {
            return Err(StoreError::DuplicateId(task.id));
        }

        self.state.tasks.insert(0, task);
        self.commit();
        self.cue(SoundCue::Add.as_str());
        Ok(())
    }

    /// Flips `completed` on the matching task and returns the new value.
    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn toggle_task_completion(&mut self, id: &TaskId) -> Option<bool> {
        let Some(task) = self.state.tasks.iter_mut().find(|task| &task.id == id) else {
            debug!("toggle target not found");
            return None;
        };
        task.completed = !task.completed;
        let completed = task.completed;

        self.commit();
        if completed {
            self.cue(SoundCue::Explosion.as_str());
        }
        Some(completed)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn delete_task(&mut self, id: &TaskId) -> Option<Task> {
        let Some(idx) = self.state.tasks.iter().position(|task| &task.id == id) else {
            debug!("delete target not found");
            return None;
        };
        let removed = self.state.tasks.remove(idx);

        self.commit();
        self.cue(SoundCue::Delete.as_str());
        Some(removed)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&[Task]) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn commit(&mut self) {
        self.persist();
        self.subscribers.notify(&self.state.tasks);
    }

    fn persist(&self) {
        if let Err(error) = self.repo.save(&self.state) {
            warn!(%error, "failed to persist tasks; in-memory state kept");
        }
    }

    fn cue(&self, cue: &str) {
        play_cue(self.cues.as_deref(), cue);
    }
}

/// Persisted state that repeats an id is unusable and counts as absent.
fn load_valid<R: Repository<TaskState>>(repo: &R) -> Option<TaskState> {
    let state = repo.load()?;
    let duplicate = {
        let mut seen = HashSet::with_capacity(state.tasks.len());
        state
            .tasks
            .iter()
            .find(|task| !seen.insert(&task.id))
            .map(|task| task.id.clone())
    };
    if let Some(id) = duplicate {
        warn!(%id, "ignoring persisted tasks with duplicate ids");
        return None;
    }
    Some(state)
}
