//! Mood themes and the store that remembers which one is active.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::audio::{CuePlayer, play_cue};
use crate::storage::Repository;
use crate::subscription::{SubscriptionId, Subscribers};

pub const DEFAULT_THEME_KEY: &str = "cyber";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodTheme {
    pub key: &'static str,
    pub name: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub background: &'static str,
    pub accent: &'static str,
    pub sound: &'static str,
    pub particle_color: &'static str,
    pub description: &'static str,
}

static THEMES: [MoodTheme; 5] = [
    MoodTheme {
        key: "cyber",
        name: "Cyber",
        primary: "#00F5FF",
        secondary: "#FF00FF",
        background: "#0f0f13",
        accent: "#FFC107",
        sound: "/sounds/click.mp3",
        particle_color: "#00F5FF",
        description: "Default cyberpunk theme with neon colors",
    },
    MoodTheme {
        key: "calm",
        name: "Calm",
        primary: "#48B2AA",
        secondary: "#7C90DB",
        background: "#0a1328",
        accent: "#D6E5FA",
        sound: "/sounds/calm.mp3",
        particle_color: "#48B2AA",
        description: "Serene blue and teal tones for focused work",
    },
    MoodTheme {
        key: "energetic",
        name: "Energetic",
        primary: "#FF6B35",
        secondary: "#FFC914",
        background: "#121212",
        accent: "#FF9F68",
        sound: "/sounds/energetic.mp3",
        particle_color: "#FF6B35",
        description: "Vibrant orange and yellow for high energy",
    },
    MoodTheme {
        key: "nature",
        name: "Nature",
        primary: "#5CDB95",
        secondary: "#8EE4AF",
        background: "#0c1f0f",
        accent: "#EDF5E1",
        sound: "/sounds/nature.mp3",
        particle_color: "#5CDB95",
        description: "Peaceful green tones inspired by nature",
    },
    MoodTheme {
        key: "night",
        name: "Night",
        primary: "#5E72EB",
        secondary: "#B185DB",
        background: "#0D0D18",
        accent: "#A682FF",
        sound: "/sounds/night.mp3",
        particle_color: "#5E72EB",
        description: "Deep purple and blue for late night focus",
    },
];

pub fn themes() -> &'static [MoodTheme] {
    &THEMES
}

pub fn find_theme(key: &str) -> Option<&'static MoodTheme> {
    THEMES.iter().find(|theme| theme.key == key)
}

pub fn default_theme() -> &'static MoodTheme {
    &THEMES[0]
}

/// Persisted shape of the theme store: `{ "currentTheme": "<key>" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeState {
    pub current_theme: String,
}

impl Default for ThemeState {
    fn default() -> Self {
        Self {
            current_theme: DEFAULT_THEME_KEY.to_string(),
        }
    }
}

pub struct ThemeStore<R> {
    repo: R,
    state: ThemeState,
    cues: Option<Box<dyn CuePlayer>>,
    subscribers: Subscribers<MoodTheme>,
}

impl<R> std::fmt::Debug for ThemeStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers)
            .finish_non_exhaustive()
    }
}

impl<R: Repository<ThemeState>> ThemeStore<R> {
    #[tracing::instrument(skip(repo))]
    pub fn open(repo: R) -> Self {
        let state = match repo.load() {
            Some(state) if find_theme(&state.current_theme).is_some() => state,
            Some(state) => {
                warn!(key = %state.current_theme, "persisted theme no longer exists; using default");
                ThemeState::default()
            }
            None => ThemeState::default(),
        };
        info!(theme = %state.current_theme, "loaded theme store");

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

    pub fn current_key(&self) -> &str {
        &self.state.current_theme
    }

    pub fn theme(&self) -> &'static MoodTheme {
        find_theme(&self.state.current_theme).unwrap_or_else(default_theme)
    }

    /// Selects a registered theme. Unknown keys are ignored and `false` is
    /// returned.
    #[tracing::instrument(skip(self))]
    pub fn set_theme(&mut self, key: &str) -> bool {
        let Some(theme) = find_theme(key) else {
            debug!("ignoring unknown theme");
            return false;
        };

        self.state.current_theme = theme.key.to_string();
        if let Err(error) = self.repo.save(&self.state) {
            warn!(%error, "failed to persist theme; in-memory selection kept");
        }
        play_cue(self.cues.as_deref(), theme.sound);
        self.subscribers.notify(theme);
        true
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&MoodTheme) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}
