use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every screen the run can be on. The session always sits on exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Screen {
    #[default]
    Disclaimer,
    Title,
    RoleSelect,
    CountrySelect,
    IncomingTransmission,
    Event,
    Redaction,
    PressBriefing,
    DroneStrike,
    SuperPac,
    RandomEvent,
    Sanctions,
    Death,
    Victory,
}

/// Pool drawn from when a choice rolls into an unplanned mini-game.
pub const MINI_GAMES: [Screen; 5] = [
    Screen::Redaction,
    Screen::PressBriefing,
    Screen::DroneStrike,
    Screen::SuperPac,
    Screen::Sanctions,
];

impl Screen {
    pub const ALL: [Self; 14] = [
        Self::Disclaimer,
        Self::Title,
        Self::RoleSelect,
        Self::CountrySelect,
        Self::IncomingTransmission,
        Self::Event,
        Self::Redaction,
        Self::PressBriefing,
        Self::DroneStrike,
        Self::SuperPac,
        Self::RandomEvent,
        Self::Sanctions,
        Self::Death,
        Self::Victory,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disclaimer => "DISCLAIMER",
            Self::Title => "TITLE",
            Self::RoleSelect => "ROLE_SELECT",
            Self::CountrySelect => "COUNTRY_SELECT",
            Self::IncomingTransmission => "INCOMING_TRANSMISSION",
            Self::Event => "EVENT",
            Self::Redaction => "REDACTION",
            Self::PressBriefing => "PRESS_BRIEFING",
            Self::DroneStrike => "DRONE_STRIKE",
            Self::SuperPac => "SUPER_PAC",
            Self::RandomEvent => "RANDOM_EVENT",
            Self::Sanctions => "SANCTIONS",
            Self::Death => "DEATH",
            Self::Victory => "VICTORY",
        }
    }

    #[must_use]
    pub fn is_mini_game(self) -> bool {
        MINI_GAMES.contains(&self)
    }

    /// Death and victory end a run; any further input starts a new one.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Death | Self::Victory)
    }

    #[must_use]
    pub const fn shows_status_bar(self) -> bool {
        !matches!(
            self,
            Self::Disclaimer | Self::Title | Self::Death | Self::Victory
        )
    }

    /// Screens on which the war assistant may pop up.
    #[must_use]
    pub const fn allows_assistant(self) -> bool {
        !matches!(
            self,
            Self::Disclaimer | Self::Title | Self::Death | Self::Victory | Self::RoleSelect
        )
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Screen {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|screen| screen.as_str() == s)
            .ok_or(())
    }
}
