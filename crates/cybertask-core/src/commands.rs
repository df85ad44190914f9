use std::io::Write;

use anyhow::{Context, anyhow, bail};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::app::App;
use crate::cli::{Command, ListArgs};
use crate::render::Renderer;
use crate::storage::{Repository, StorageBackend};
use crate::store::TaskStore;
use crate::task::{Task, TaskDraft, TaskId, TaskState};
use crate::theme::find_theme;

#[tracing::instrument(skip(app, renderer, out, now))]
pub fn dispatch<B, W>(
    app: &mut App<B>,
    renderer: &Renderer,
    out: &mut W,
    command: Command,
    now: DateTime<Utc>,
) -> anyhow::Result<()>
where
    B: StorageBackend + Clone,
    W: Write,
{
    match command {
        Command::Add(args) => {
            let draft = TaskDraft::new(args.name.join(" "), args.description);
            let task = draft.into_task(now)?;
            let id = task.id.clone();
            app.tasks.add_task(task).context("failed to add task")?;
            info!(%id, "added task");
            writeln!(out, "Added task {id}.")?;
        }
        Command::List(args) => {
            let tasks = select_tasks(app.tasks.tasks(), &args);
            renderer.write_task_table(out, &tasks)?;
        }
        Command::Toggle { id } => match resolve_id(&app.tasks, &id)? {
            Some(id) => {
                let completed = app.tasks.toggle_task_completion(&id);
                match completed {
                    Some(true) => writeln!(out, "Completed task {id}. You've earned some XP!")?,
                    Some(false) => writeln!(out, "Reopened task {id}.")?,
                    None => writeln!(out, "No task matches {id}.")?,
                }
            }
            None => writeln!(out, "No task matches {id}.")?,
        },
        Command::Delete { id } => match resolve_id(&app.tasks, &id)? {
            Some(id) => match app.tasks.delete_task(&id) {
                Some(task) => writeln!(out, "Deleted task {id} '{}'.", task.name)?,
                None => writeln!(out, "No task matches {id}.")?,
            },
            None => writeln!(out, "No task matches {id}.")?,
        },
        Command::Count => {
            writeln!(out, "{}", app.tasks.completed_tasks_count())?;
        }
        Command::Theme { key: None } => {
            renderer.write_theme(out, app.theme.theme())?;
        }
        Command::Theme { key: Some(key) } => {
            if find_theme(&key).is_none() {
                bail!("unknown theme '{key}' (see `cybertask themes`)");
            }
            app.theme.set_theme(&key);
            writeln!(out, "Theme set to {}.", app.theme.theme().name)?;
        }
        Command::Themes => {
            renderer.write_themes(out, app.theme.current_key())?;
        }
        Command::Boss => {
            renderer.write_boss(out, app.tasks.progress())?;
        }
        Command::Trophies => {
            renderer.write_trophies(out, app.tasks.completed_tasks_count())?;
        }
    }

    Ok(())
}

fn select_tasks<'a>(tasks: &'a [Task], args: &ListArgs) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| {
            if args.pending {
                !task.completed
            } else if args.done {
                task.completed
            } else {
                true
            }
        })
        .collect()
}

/// Matches a full id or an unambiguous prefix of one.
fn resolve_id<R: Repository<TaskState>>(
    store: &TaskStore<R>,
    raw: &str,
) -> anyhow::Result<Option<TaskId>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(anyhow!("task id cannot be empty"));
    }

    let exact = TaskId::from(raw);
    if store.get(&exact).is_some() {
        return Ok(Some(exact));
    }

    let mut matches = store
        .tasks()
        .iter()
        .filter(|task| task.id.as_str().starts_with(raw));
    let Some(first) = matches.next() else {
        debug!(prefix = raw, "no task id matches");
        return Ok(None);
    };
    if matches.next().is_some() {
        bail!("task id prefix '{raw}' is ambiguous");
    }
    Ok(Some(first.id.clone()))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::dispatch;
    use crate::app::{App, OpenOptions};
    use crate::cli::{AddArgs, Command, ListArgs};
    use crate::render::Renderer;
    use crate::storage::MemoryBackend;
    use crate::task::Task;

    fn run(app: &mut App<MemoryBackend>, command: Command) -> anyhow::Result<String> {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut out = Vec::new();
        dispatch(app, &Renderer::plain(), &mut out, command, now)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn app_with(ids: &[&str]) -> App<MemoryBackend> {
        let mut app = App::open(MemoryBackend::new(), OpenOptions::default());
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for id in ids {
            app.tasks
                .add_task(Task::new(*id, format!("task {id}"), "", now))
                .unwrap();
        }
        app
    }

    #[test]
    fn add_rejects_blank_names() {
        let mut app = app_with(&[]);
        let err = run(
            &mut app,
            Command::Add(AddArgs {
                name: vec!["  ".to_string()],
                description: String::new(),
            }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("empty"));
        assert!(app.tasks.is_empty());
    }

    #[test]
    fn toggle_accepts_unique_prefix() {
        let mut app = app_with(&["abc123", "abd456"]);
        let text = run(
            &mut app,
            Command::Toggle {
                id: "abc".to_string(),
            },
        )
        .unwrap();
        assert!(text.contains("Completed task abc123"));
        assert_eq!(run(&mut app, Command::Count).unwrap().trim(), "1");

        let err = run(
            &mut app,
            Command::Delete {
                id: "ab".to_string(),
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn unknown_ids_are_not_errors() {
        let mut app = app_with(&["abc"]);
        let text = run(
            &mut app,
            Command::Delete {
                id: "zzz".to_string(),
            },
        )
        .unwrap();
        assert!(text.contains("No task matches"));
        assert_eq!(app.tasks.len(), 1);
    }

    #[test]
    fn list_filters_by_status() {
        let mut app = app_with(&["one", "two"]);
        run(
            &mut app,
            Command::Toggle {
                id: "one".to_string(),
            },
        )
        .unwrap();

        let pending = run(
            &mut app,
            Command::List(ListArgs {
                pending: true,
                done: false,
            }),
        )
        .unwrap();
        assert!(pending.contains("task two"));
        assert!(!pending.contains("task one"));

        let done = run(
            &mut app,
            Command::List(ListArgs {
                pending: false,
                done: true,
            }),
        )
        .unwrap();
        assert!(done.contains("task one"));
    }

    #[test]
    fn theme_command_validates_key() {
        let mut app = app_with(&[]);
        assert!(
            run(
                &mut app,
                Command::Theme {
                    key: Some("bogus".to_string())
                }
            )
            .is_err()
        );
        let text = run(
            &mut app,
            Command::Theme {
                key: Some("night".to_string()),
            },
        )
        .unwrap();
        assert_eq!(text.trim(), "Theme set to Night.");
        assert_eq!(app.theme.current_key(), "night");
    }
}
