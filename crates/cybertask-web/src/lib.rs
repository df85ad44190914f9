//! Browser bindings: the JavaScript views read state and call store
//! operations through [`CyberTask`].

mod audio;
mod deferred;
mod storage;

use chrono::Utc;
use cybertask_core::audio::{
  CuePlayer,
  SoundCue,
  play_cue
};
use cybertask_core::game::{
  BossStage,
  damage_per_task,
  next_trophy,
  trophies,
  unlocked_trophies
};
use cybertask_core::subscription::SubscriptionId;
use cybertask_core::theme::themes;
use cybertask_core::{
  App,
  MoodTheme,
  OpenOptions,
  Task,
  TaskDraft,
  TaskId
};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::deferred::Deferred;

pub use crate::audio::WebCuePlayer;
pub use crate::storage::LocalStorageBackend;

#[wasm_bindgen(start)]
pub fn start() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  tracing::info!(
    "starting CyberTask frontend"
  );
}

#[wasm_bindgen]
pub struct CyberTask {
  app:           App<LocalStorageBackend>,
  player:        WebCuePlayer,
  subscriptions: Vec<Option<Subscription>>
}

#[derive(Debug, Clone, Copy)]
enum Subscription {
  Tasks(SubscriptionId),
  Theme(SubscriptionId)
}

#[wasm_bindgen]
impl CyberTask {
  /// Opens both stores from
  /// `localStorage`. With `seed_demo`,
  /// a first visit starts with example
  /// tasks.
  #[wasm_bindgen(constructor)]
  pub fn new(
    seed_demo: bool
  ) -> CyberTask {
    let player = WebCuePlayer::default();
    let options = OpenOptions {
      seed_demo_at: seed_demo
        .then(Utc::now)
    };
    let app = App::open(
      LocalStorageBackend,
      options
    )
    .with_cue_player(player.clone());

    apply_theme_css(app.theme.theme());
    play_cue(
      Some(&player as &dyn CuePlayer),
      SoundCue::Welcome.as_str()
    );

    CyberTask {
      app,
      player,
      subscriptions: vec![]
    }
  }

  pub fn tasks(
    &self
  ) -> Result<JsValue, JsError> {
    to_js(self.app.tasks.tasks())
  }

  /// Validates and adds a task typed by
  /// the user, returning its new id.
  #[wasm_bindgen(js_name = addTask)]
  pub fn add_task(
    &mut self,
    name: String,
    description: String
  ) -> Result<String, JsError> {
    let task =
      TaskDraft::new(name, description)
        .into_task(Utc::now())?;
    let id = task.id.to_string();
    self.app.tasks.add_task(task)?;
    Ok(id)
  }

  /// Adds a fully formed record built by
  /// the caller.
  #[wasm_bindgen(js_name = addTaskRecord)]
  pub fn add_task_record(
    &mut self,
    record: JsValue
  ) -> Result<(), JsError> {
    let task: Task =
      serde_wasm_bindgen::from_value(
        record
      )?;
    task.validate()?;
    self.app.tasks.add_task(task)?;
    Ok(())
  }

  #[wasm_bindgen(js_name = toggleTaskCompletion)]
  pub fn toggle_task_completion(
    &mut self,
    id: String
  ) -> Option<bool> {
    self
      .app
      .tasks
      .toggle_task_completion(&TaskId::from(
        id
      ))
  }

  #[wasm_bindgen(js_name = deleteTask)]
  pub fn delete_task(
    &mut self,
    id: String
  ) -> bool {
    self
      .app
      .tasks
      .delete_task(&TaskId::from(id))
      .is_some()
  }

  #[wasm_bindgen(js_name = getCompletedTasksCount)]
  pub fn completed_tasks_count(
    &self
  ) -> usize {
    self.app.tasks.completed_tasks_count()
  }

  /// Calls `listener(tasks)` after every
  /// task mutation, once the mutating call
  /// has returned. Returns a handle for
  /// [`CyberTask::unsubscribe`].
  #[wasm_bindgen(js_name = subscribeTasks)]
  pub fn subscribe_tasks(
    &mut self,
    listener: js_sys::Function
  ) -> usize {
    let id = self
      .app
      .tasks
      .subscribe(deferred_listener::<[Task]>(
        listener
      ));
    self.push_subscription(
      Subscription::Tasks(id)
    )
  }

  /// Calls `listener(theme)` after each
  /// successful theme switch.
  #[wasm_bindgen(js_name = subscribeTheme)]
  pub fn subscribe_theme(
    &mut self,
    listener: js_sys::Function
  ) -> usize {
    let id = self
      .app
      .theme
      .subscribe(deferred_listener::<
        MoodTheme
      >(listener));
    self.push_subscription(
      Subscription::Theme(id)
    )
  }

  pub fn unsubscribe(
    &mut self,
    handle: usize
  ) -> bool {
    match self
      .subscriptions
      .get_mut(handle)
      .and_then(Option::take)
    {
      | Some(Subscription::Tasks(id)) => {
        self.app.tasks.unsubscribe(id)
      }
      | Some(Subscription::Theme(id)) => {
        self.app.theme.unsubscribe(id)
      }
      | None => false
    }
  }

  /// Switches the mood theme. Unknown
  /// keys are ignored and return false.
  #[wasm_bindgen(js_name = setTheme)]
  pub fn set_theme(
    &mut self,
    key: String
  ) -> bool {
    let changed =
      self.app.theme.set_theme(&key);
    if changed {
      apply_theme_css(
        self.app.theme.theme()
      );
    }
    changed
  }

  #[wasm_bindgen(js_name = getTheme)]
  pub fn theme(
    &self
  ) -> Result<JsValue, JsError> {
    to_js(self.app.theme.theme())
  }

  pub fn themes(
    &self
  ) -> Result<JsValue, JsError> {
    to_js(themes())
  }

  #[wasm_bindgen(js_name = bossStatus)]
  pub fn boss_status(
    &self
  ) -> Result<JsValue, JsError> {
    let progress =
      self.app.tasks.progress();
    let health = progress.boss_health();
    to_js(&BossStatus {
      health,
      stage: BossStage::from_health(
        health
      )
      .label(),
      damage_per_task: damage_per_task(
        progress.total
      ),
      completed: progress.completed,
      total: progress.total
    })
  }

  pub fn trophies(
    &self
  ) -> Result<JsValue, JsError> {
    let completed = self
      .app
      .tasks
      .completed_tasks_count();
    to_js(&TrophyRoom {
      completed,
      all: trophies(),
      unlocked: unlocked_trophies(
        completed
      )
      .map(|trophy| trophy.id)
      .collect(),
      next: next_trophy(completed)
        .map(|trophy| trophy.id)
    })
  }

  #[wasm_bindgen(js_name = playCue)]
  pub fn play_cue(&self, cue: String) {
    play_cue(
      Some(&self.player as &dyn CuePlayer),
      &cue
    );
  }

  #[wasm_bindgen(js_name = setVolume)]
  pub fn set_volume(&self, volume: f64) {
    self.player.set_volume(volume);
  }
}

impl CyberTask {
  fn push_subscription(
    &mut self,
    subscription: Subscription
  ) -> usize {
    self
      .subscriptions
      .push(Some(subscription));
    self.subscriptions.len() - 1
  }
}

/// Wraps a JS callback so it runs from a
/// microtask. A listener that reads back
/// through `CyberTask` would otherwise hit
/// the borrow still held by the mutating
/// export.
fn deferred_listener<T>(
  listener: js_sys::Function
) -> impl FnMut(&T) + 'static
where
  T: Serialize + ?Sized + 'static
{
  let pending: Deferred<JsValue> =
    Deferred::default();
  move |value: &T| {
    let snapshot = match to_js(value) {
      | Ok(snapshot) => snapshot,
      | Err(error) => {
        tracing::error!(
          ?error,
          "failed converting state for \
           listener"
        );
        return;
      }
    };
    if !pending.push(snapshot) {
      return;
    }

    let pending = pending.clone();
    let listener = listener.clone();
    wasm_bindgen_futures::spawn_local(
      async move {
        for snapshot in pending.drain() {
          if let Err(error) = listener
            .call1(&JsValue::NULL, &snapshot)
          {
            tracing::error!(
              ?error,
              "store listener threw"
            );
          }
        }
      }
    );
  }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BossStatus {
  health:          f64,
  stage:           &'static str,
  damage_per_task: f64,
  completed:       usize,
  total:           usize
}

#[derive(Serialize)]
struct TrophyRoom {
  completed: usize,
  all:       &'static [cybertask_core::game::Trophy],
  unlocked:  Vec<&'static str>,
  next:      Option<&'static str>
}

fn to_js<T: Serialize + ?Sized>(
  value: &T
) -> Result<JsValue, JsError> {
  value
    .serialize(
      &serde_wasm_bindgen::Serializer::json_compatible()
    )
    .map_err(|error| {
      JsError::new(&error.to_string())
    })
}

fn apply_theme_css(theme: &MoodTheme) {
  let Some(root) = web_sys::window()
    .and_then(|window| window.document())
    .and_then(|document| {
      document.document_element()
    })
    .and_then(|element| {
      element
        .dyn_into::<web_sys::HtmlElement>()
        .ok()
    })
  else {
    return;
  };

  let style = root.style();
  for (name, value) in [
    ("--primary", theme.primary),
    ("--secondary", theme.secondary),
    ("--background", theme.background),
    ("--accent", theme.accent)
  ] {
    if let Err(error) =
      style.set_property(name, value)
    {
      tracing::warn!(
        ?error,
        property = name,
        "failed applying theme color"
      );
    }
  }
}
