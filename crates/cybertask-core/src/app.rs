use chrono::{DateTime, Utc};

use crate::audio::CuePlayer;
use crate::storage::{JsonRepository, StorageBackend, TASKS_STORAGE_KEY, THEME_STORAGE_KEY};
use crate::store::TaskStore;
use crate::task::TaskState;
use crate::theme::{ThemeState, ThemeStore};

pub type TaskRepo<B> = JsonRepository<B, TaskState>;
pub type ThemeRepo<B> = JsonRepository<B, ThemeState>;

/// Both stores, handed to whatever front end is driving them.
#[derive(Debug)]
pub struct App<B> {
    pub tasks: TaskStore<TaskRepo<B>>,
    pub theme: ThemeStore<ThemeRepo<B>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    /// Seed example tasks when no task state has been persisted yet.
    pub seed_demo_at: Option<DateTime<Utc>>,
}

impl<B: StorageBackend + Clone> App<B> {
    #[tracing::instrument(skip(backend))]
    pub fn open(backend: B, options: OpenOptions) -> Self {
        let task_repo = JsonRepository::new(backend.clone(), TASKS_STORAGE_KEY);
        let theme_repo = JsonRepository::new(backend, THEME_STORAGE_KEY);

        let tasks = match options.seed_demo_at {
            Some(now) => TaskStore::open_with_seed(task_repo, now),
            None => TaskStore::open(task_repo),
        };

        Self {
            tasks,
            theme: ThemeStore::open(theme_repo),
        }
    }

    pub fn with_cue_player<P>(self, player: P) -> Self
    where
        P: CuePlayer + Clone + 'static,
    {
        Self {
            tasks: self.tasks.with_cue_player(player.clone()),
            theme: self.theme.with_cue_player(player),
        }
    }
}
