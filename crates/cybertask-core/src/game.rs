//! Numbers behind the boss battle and the trophy room.
//!
//! Everything here is derived from completion counts on demand and nothing is
//! stored.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent_complete(self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }

    pub fn boss_health(self) -> f64 {
        boss_health(self.completed, self.total)
    }
}

pub const FULL_HEALTH: f64 = 100.0;

/// Boss health as a percentage. An empty list leaves the boss untouched.
pub fn boss_health(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return FULL_HEALTH;
    }
    let percent = completed as f64 / total as f64 * 100.0;
    (FULL_HEALTH - percent).max(0.0)
}

/// Health removed by completing a single task.
pub fn damage_per_task(total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    FULL_HEALTH / total as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossStage {
    Strong,
    Wounded,
    Critical,
    Defeated,
}

impl BossStage {
    pub fn from_health(health: f64) -> Self {
        if health > 66.0 {
            Self::Strong
        } else if health > 33.0 {
            Self::Wounded
        } else if health > 0.0 {
            Self::Critical
        } else {
            Self::Defeated
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Wounded => "wounded",
            Self::Critical => "critical",
            Self::Defeated => "defeated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trophy {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub required: usize,
}

impl Trophy {
    pub fn is_unlocked(&self, completed: usize) -> bool {
        completed >= self.required
    }
}

static TROPHIES: [Trophy; 5] = [
    Trophy {
        id: "first-task",
        name: "First Steps",
        description: "Complete your first task",
        image: "/trophies/first-task.svg",
        required: 1,
    },
    Trophy {
        id: "five-tasks",
        name: "Getting Things Done",
        description: "Complete 5 tasks",
        image: "/trophies/five-tasks.svg",
        required: 5,
    },
    Trophy {
        id: "ten-tasks",
        name: "Productivity Master",
        description: "Complete 10 tasks",
        image: "/trophies/ten-tasks.svg",
        required: 10,
    },
    Trophy {
        id: "twenty-tasks",
        name: "Task Destroyer",
        description: "Complete 20 tasks",
        image: "/trophies/twenty-tasks.svg",
        required: 20,
    },
    Trophy {
        id: "fifty-tasks",
        name: "Legendary Achiever",
        description: "Complete 50 tasks",
        image: "/trophies/fifty-tasks.svg",
        required: 50,
    },
];

/// All trophies, ordered by threshold.
pub fn trophies() -> &'static [Trophy] {
    &TROPHIES
}

pub fn unlocked_trophies(completed: usize) -> impl Iterator<Item = &'static Trophy> {
    TROPHIES.iter().filter(move |t| t.is_unlocked(completed))
}

pub fn next_trophy(completed: usize) -> Option<&'static Trophy> {
    TROPHIES.iter().find(|t| !t.is_unlocked(completed))
}
