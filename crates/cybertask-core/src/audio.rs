//! Sound cues requested by the stores.
//!
//! Playback lives outside the core. Stores hand a cue identifier to a
//! [`CuePlayer`] and ignore whatever happens next.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Click,
    Add,
    Delete,
    Explosion,
    Welcome,
    Damage,
    Victory,
    Init,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueConfig<'a> {
    pub src: &'a str,
    pub volume: f64,
}

const THEME_CUE_VOLUME: f64 = 0.5;

impl SoundCue {
    pub const ALL: [SoundCue; 8] = [
        SoundCue::Click,
        SoundCue::Add,
        SoundCue::Delete,
        SoundCue::Explosion,
        SoundCue::Welcome,
        SoundCue::Damage,
        SoundCue::Victory,
        SoundCue::Init,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Explosion => "explosion",
            Self::Welcome => "welcome",
            Self::Damage => "damage",
            Self::Victory => "victory",
            Self::Init => "init",
        }
    }

    pub fn config(self) -> CueConfig<'static> {
        let (src, volume) = match self {
            Self::Click => ("/sounds/click.mp3", 0.5),
            Self::Add => ("/sounds/add.mp3", 0.6),
            Self::Delete => ("/sounds/delete.mp3", 0.6),
            Self::Explosion => ("/sounds/explosion.mp3", 0.7),
            Self::Welcome => ("/sounds/welcome.mp3", 0.5),
            Self::Damage => ("/sounds/damage.mp3", 0.6),
            Self::Victory => ("/sounds/victory.mp3", 0.8),
            Self::Init => ("/sounds/init.mp3", 0.1),
        };
        CueConfig { src, volume }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cue| cue.as_str() == key)
    }
}

/// Resolves a cue identifier to an asset. Theme sounds are already asset
/// paths and resolve to themselves.
pub fn cue_config(cue: &str) -> Option<CueConfig<'_>> {
    if let Some(named) = SoundCue::from_key(cue) {
        return Some(named.config());
    }
    if cue.starts_with('/') {
        return Some(CueConfig {
            src: cue,
            volume: THEME_CUE_VOLUME,
        });
    }
    None
}

pub trait CuePlayer {
    fn play(&self, cue: &str) -> anyhow::Result<()>;
}

/// Fire-and-forget playback: failures are cosmetic and only logged.
pub fn play_cue(player: Option<&dyn CuePlayer>, cue: &str) {
    let Some(player) = player else {
        return;
    };
    if let Err(error) = player.play(cue) {
        debug!(cue, error = %error, "sound cue failed");
    }
}

/// Native stand-in for audio output: records cues as trace events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingCuePlayer;

impl CuePlayer for LoggingCuePlayer {
    fn play(&self, cue: &str) -> anyhow::Result<()> {
        let config = cue_config(cue).ok_or_else(|| anyhow::anyhow!("unknown sound cue: {cue}"))?;
        debug!(cue, src = config.src, volume = config.volume, "sound cue");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::{CuePlayer, LoggingCuePlayer, SoundCue, cue_config, play_cue};

    struct Failing;

    impl CuePlayer for Failing {
        fn play(&self, _cue: &str) -> anyhow::Result<()> {
            anyhow::bail!("no audio device")
        }
    }

    struct Recording(RefCell<Vec<String>>);

    impl CuePlayer for Recording {
        fn play(&self, cue: &str) -> anyhow::Result<()> {
            self.0.borrow_mut().push(cue.to_string());
            Ok(())
        }
    }

    #[test]
    fn named_and_path_cues_resolve() {
        for cue in SoundCue::ALL {
            assert_eq!(SoundCue::from_key(cue.as_str()), Some(cue));
        }
        assert_eq!(cue_config("victory").map(|c| c.volume), Some(0.8));
        assert_eq!(cue_config("/sounds/calm.mp3").map(|c| c.src), Some("/sounds/calm.mp3"));
        assert!(cue_config("kazoo").is_none());
    }

    #[test]
    fn failures_are_swallowed() {
        play_cue(Some(&Failing), "add");
        play_cue(None, "add");
        assert!(LoggingCuePlayer.play("kazoo").is_err());

        let recording = Recording(RefCell::new(vec![]));
        play_cue(Some(&recording), "delete");
        assert_eq!(recording.0.borrow().as_slice(), ["delete".to_string()]);
    }
}
