use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::{Country, Role};
use crate::screen::Screen;
use crate::stats::{Effects, Stats};

/// Role ids every fresh save starts with.
pub const DEFAULT_UNLOCKED_ROLES: [&str; 4] = ["DIPLOMAT", "OPERATIVE", "CONSULTANT", "CONTRACTOR"];

/// Career record carried across runs and written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Persistence {
    pub cholera_deaths: u32,
    pub total_oil_secured: u64,
    pub unlocked_roles: BTreeSet<String>,
    pub high_score: i32,
}

impl Default for Persistence {
    fn default() -> Self {
        Self {
            cholera_deaths: 0,
            total_oil_secured: 0,
            unlocked_roles: DEFAULT_UNLOCKED_ROLES
                .iter()
                .map(|id| (*id).to_string())
                .collect(),
            high_score: 0,
        }
    }
}

impl Persistence {
    #[must_use]
    pub fn is_unlocked(&self, role_id: &str) -> bool {
        self.unlocked_roles.contains(role_id)
    }

    /// Fold a finished run's oil into the career totals.
    pub fn record_victory(&mut self, oil: i32) {
        let secured = u64::try_from(oil.max(0)).unwrap_or_default();
        self.total_oil_secured = self.total_oil_secured.saturating_add(secured);
        self.high_score = self.high_score.max(oil);
    }

    pub fn record_death(&mut self) {
        self.cholera_deaths = self.cholera_deaths.saturating_add(1);
    }
}

/// Partial persistence payload merged in by `LOAD_PERSISTENCE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistencePatch {
    pub cholera_deaths: Option<u32>,
    pub total_oil_secured: Option<u64>,
    pub unlocked_roles: Option<BTreeSet<String>>,
    pub high_score: Option<i32>,
}

impl PersistencePatch {
    pub fn merge_into(self, persistence: &mut Persistence) {
        if let Some(deaths) = self.cholera_deaths {
            persistence.cholera_deaths = deaths;
        }
        if let Some(total) = self.total_oil_secured {
            persistence.total_oil_secured = total;
        }
        if let Some(roles) = self.unlocked_roles {
            persistence.unlocked_roles = roles;
        }
        if let Some(high_score) = self.high_score {
            persistence.high_score = high_score;
        }
    }
}

impl From<Persistence> for PersistencePatch {
    fn from(value: Persistence) -> Self {
        Self {
            cholera_deaths: Some(value.cholera_deaths),
            total_oil_secured: Some(value.total_oil_secured),
            unlocked_roles: Some(value.unlocked_roles),
            high_score: Some(value.high_score),
        }
    }
}

/// One resolved decision in the run log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub event: String,
    pub choice: String,
    #[serde(default)]
    pub effects: Effects,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(event: impl Into<String>, choice: impl Into<String>, effects: Effects) -> Self {
        Self {
            event: event.into(),
            choice: choice.into(),
            effects,
        }
    }
}

/// The single aggregate every screen reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    pub current_screen: Screen,
    pub player_role: Option<Role>,
    pub selected_country: Option<Country>,
    pub stats: Stats,
    pub persistence: Persistence,
    pub history: Vec<HistoryEntry>,
    pub sound_enabled: bool,
    pub show_status_bar: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            current_screen: Screen::default(),
            player_role: None,
            selected_country: None,
            stats: Stats::default(),
            persistence: Persistence::default(),
            history: Vec::new(),
            sound_enabled: true,
            show_status_bar: false,
        }
    }
}

impl GameState {
    /// Defaults for everything except the career record and the sound preference.
    #[must_use]
    pub fn fresh_run(persistence: Persistence, sound_enabled: bool) -> Self {
        Self {
            persistence,
            sound_enabled,
            ..Self::default()
        }
    }

    /// Whether the status bar should be drawn for the current screen.
    #[must_use]
    pub const fn status_bar_visible(&self) -> bool {
        self.show_status_bar && self.current_screen.shows_status_bar()
    }
}
