use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, EndingText};
use crate::state::Persistence;
use crate::stats::Stats;

const KISSINGER_WAR_CRIMES: i32 = 15;
const MISSION_OIL: i32 = 100;
const UNPOPULAR_APPROVAL: i32 = 20;

/// Victory screen verdict, picked from the final stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ending {
    Kissinger,
    MissionAccomplished,
    UnpopularLiberator,
    RegimeChange,
}

impl Ending {
    pub const ALL: [Self; 4] = [
        Self::Kissinger,
        Self::MissionAccomplished,
        Self::UnpopularLiberator,
        Self::RegimeChange,
    ];

    /// First matching rule wins.
    #[must_use]
    pub const fn select(stats: &Stats) -> Self {
        if stats.war_crimes > KISSINGER_WAR_CRIMES {
            Self::Kissinger
        } else if stats.oil >= MISSION_OIL {
            Self::MissionAccomplished
        } else if stats.approval < UNPOPULAR_APPROVAL {
            Self::UnpopularLiberator
        } else {
            Self::RegimeChange
        }
    }
}

/// Everything the victory screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictorySummary {
    pub ending: Ending,
    pub title: String,
    pub text: String,
    pub stats: Stats,
    pub persistence: Persistence,
}

impl VictorySummary {
    #[must_use]
    pub fn new(catalog: &Catalog, stats: Stats, persistence: Persistence) -> Self {
        let ending = Ending::select(&stats);
        let (title, text) = catalog.ending_text(ending).map_or_else(
            || (String::new(), String::new()),
            |EndingText { title, text, .. }| (title.clone(), text.clone()),
        );
        Self {
            ending,
            title,
            text,
            stats,
            persistence,
        }
    }

    /// War crimes past a dozen display as a redacted maximum.
    #[must_use]
    pub fn war_crimes_label(&self) -> String {
        if self.stats.war_crimes > 12 {
            "MAXIMUM".to_string()
        } else {
            self.stats.war_crimes.to_string()
        }
    }
}
