pub mod app;
pub mod audio;
pub mod error;
pub mod game;
pub mod storage;
pub mod store;
pub mod subscription;
pub mod task;
pub mod theme;

#[cfg(feature = "native")]
pub mod cli;
#[cfg(feature = "native")]
pub mod commands;
#[cfg(feature = "native")]
pub mod config;
#[cfg(feature = "native")]
pub mod render;

pub use app::{App, OpenOptions};
pub use error::{StorageError, StoreError};
pub use storage::{JsonRepository, MemoryBackend, Repository, StorageBackend};
pub use store::TaskStore;
pub use task::{Task, TaskDraft, TaskId, TaskState};
pub use theme::{MoodTheme, ThemeState, ThemeStore};

#[cfg(feature = "native")]
pub use native::run;

#[cfg(feature = "native")]
mod native {
  use std::ffi::OsString;
  use std::io::Write;

  use anyhow::Context;
  use chrono::Utc;
  use clap::Parser;
  use tracing::{
    debug,
    info
  };

  use crate::app::{
    App,
    OpenOptions
  };
  use crate::audio::LoggingCuePlayer;
  use crate::cli::{
    self,
    Command
  };
  use crate::storage::FileBackend;
  use crate::{
    commands,
    config,
    render
  };

  #[tracing::instrument(skip_all)]
  pub fn run(
    raw_args: Vec<OsString>
  ) -> anyhow::Result<()> {
    let cli =
      cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(
      cli.verbose,
      cli.quiet
    )?;

    info!(
      verbose = cli.verbose,
      quiet = cli.quiet,
      "starting cybertask CLI"
    );

    let mut cfg = config::Config::load(
      cli.rcfile.as_deref()
    )?;
    cfg.apply_overrides(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    );

    let data_dir =
      config::resolve_data_dir(
        &cfg,
        cli.data.as_deref()
      )
      .context(
        "failed to resolve data \
         directory"
      )?;

    let backend =
      FileBackend::open(&data_dir)
        .with_context(|| {
          format!(
            "failed to open storage at \
             {}",
            data_dir.display()
          )
        })?;

    let now = Utc::now();
    let options = OpenOptions {
      seed_demo_at: cfg
        .flag("demo.seed")
        .then_some(now)
    };
    let mut app =
      App::open(backend, options);
    if cfg.flag("sound") {
      app = app.with_cue_player(
        LoggingCuePlayer
      );
    }

    let command = cli
      .command
      .unwrap_or(Command::List(
        Default::default()
      ));
    debug!(?command, "dispatching");

    let renderer = render::Renderer::new(
      &cfg,
      app.theme.theme()
    );
    let mut out =
      std::io::stdout().lock();
    commands::dispatch(
      &mut app,
      &renderer,
      &mut out,
      command,
      now
    )?;
    out.flush()?;

    info!("done");
    Ok(())
  }
}
