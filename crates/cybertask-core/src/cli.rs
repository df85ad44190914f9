use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "cybertask",
    version,
    about = "CyberTask: a gamified to-do list",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "rcfile", global = true)]
    pub rcfile: Option<PathBuf>,

    #[arg(long = "data", global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a task to the top of the list
    Add(AddArgs),
    /// List tasks, newest first
    List(ListArgs),
    /// Flip a task between pending and completed
    #[command(alias = "done")]
    Toggle { id: String },
    /// Remove a task
    #[command(alias = "rm")]
    Delete { id: String },
    /// Print the number of completed tasks
    Count,
    /// Show the active theme, or switch to KEY
    Theme { key: Option<String> },
    /// List the available themes
    Themes,
    /// Show the boss battle status
    Boss,
    /// Show unlocked and locked trophies
    Trophies,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AddArgs {
    #[arg(required = true, num_args = 1..)]
    pub name: Vec<String>,

    #[arg(short = 'd', long = "description", default_value = "")]
    pub description: String,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    #[arg(long, conflicts_with = "done")]
    pub pending: bool,

    #[arg(long)]
    pub done: bool,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Command, GlobalCli};

    #[test]
    fn parses_globals_after_subcommand() {
        let cli = GlobalCli::try_parse_from([
            "cybertask", "add", "Buy", "milk", "-d", "2%", "--rc", "sound=off", "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.rc_overrides.len(), 1);
        assert_eq!(cli.rc_overrides[0].key, "sound");
        let Some(Command::Add(args)) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.name.join(" "), "Buy milk");
        assert_eq!(args.description, "2%");
    }

    #[test]
    fn done_is_an_alias_for_toggle() {
        let cli = GlobalCli::try_parse_from(["cybertask", "done", "abc"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Toggle {
                id: "abc".to_string()
            })
        );
    }

    #[test]
    fn rejects_bad_rc_override() {
        assert!(GlobalCli::try_parse_from(["cybertask", "--rc", "novalue", "count"]).is_err());
    }
}
