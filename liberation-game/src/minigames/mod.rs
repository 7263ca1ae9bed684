//! Timed reflex challenges that interrupt the event flow.
//!
//! Each game is a plain state machine: time moves through `tick`, player input
//! through game-specific methods, and every call reports a [`Progress`]. The
//! session turns that into store actions and hands the final result to
//! [`crate::selector::resolve_mini_game`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::catalog::MiniGameTables;
use crate::screen::Screen;
use crate::state::HistoryEntry;
use crate::stats::Effects;

pub mod drone_strike;
pub mod press_briefing;
pub mod redaction;
pub mod sanctions;
pub mod super_pac;

pub use crate::selector::MiniGameExit;
pub use drone_strike::DroneStrike;
pub use press_briefing::PressBriefing;
pub use redaction::Redaction;
pub use sanctions::Sanctions;
pub use super_pac::SuperPac;

/// Final payload of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniGameResult {
    pub effects: Effects,
    pub exit: MiniGameExit,
    pub history: Option<HistoryEntry>,
}

impl MiniGameResult {
    #[must_use]
    pub const fn survived(effects: Effects) -> Self {
        Self {
            effects,
            exit: MiniGameExit::Continue,
            history: None,
        }
    }

    #[must_use]
    pub const fn died(effects: Effects) -> Self {
        Self {
            effects,
            exit: MiniGameExit::Death,
            history: None,
        }
    }

    #[must_use]
    pub fn with_history(mut self, entry: HistoryEntry) -> Self {
        self.history = Some(entry);
        self
    }
}

/// What a tick or an input did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Pending,
    /// Apply this delta now; the game keeps running.
    Apply(Effects),
    Finished(MiniGameResult),
}

impl Progress {
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// Run a countdown down by `dt`. Returns `true` on the tick it reaches zero.
pub(crate) fn count_down(remaining: &mut Duration, dt: Duration) -> bool {
    if remaining.is_zero() {
        return false;
    }
    *remaining = remaining.saturating_sub(dt);
    remaining.is_zero()
}

/// Whichever game the current screen is running.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveMiniGame {
    Redaction(Redaction),
    PressBriefing(PressBriefing),
    DroneStrike(DroneStrike),
    SuperPac(SuperPac),
    Sanctions(Sanctions),
}

impl ActiveMiniGame {
    /// Set up the game for a mini-game screen; other screens yield `None`.
    pub fn start<R: Rng + ?Sized>(screen: Screen, tables: &MiniGameTables, rng: &mut R) -> Option<Self> {
        let game = match screen {
            Screen::Redaction => Self::Redaction(Redaction::new(&tables.redaction)),
            Screen::PressBriefing => Self::PressBriefing(PressBriefing::new(&tables.press_briefing)),
            Screen::DroneStrike => Self::DroneStrike(DroneStrike::new(&tables.drone_strike, rng)?),
            Screen::SuperPac => Self::SuperPac(SuperPac::new(&tables.super_pac)),
            Screen::Sanctions => Self::Sanctions(Sanctions::new()),
            _ => return None,
        };
        log::debug!("mini-game {screen} started");
        Some(game)
    }

    #[must_use]
    pub const fn screen(&self) -> Screen {
        match self {
            Self::Redaction(_) => Screen::Redaction,
            Self::PressBriefing(_) => Screen::PressBriefing,
            Self::DroneStrike(_) => Screen::DroneStrike,
            Self::SuperPac(_) => Screen::SuperPac,
            Self::Sanctions(_) => Screen::Sanctions,
        }
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, dt: Duration, rng: &mut R) -> Progress {
        match self {
            Self::Redaction(game) => game.tick(dt),
            Self::PressBriefing(game) => game.tick(dt),
            Self::DroneStrike(game) => game.tick(dt, rng),
            Self::SuperPac(_) => Progress::Pending,
            Self::Sanctions(game) => game.tick(dt, rng),
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        match self {
            Self::Redaction(game) => game.is_finished(),
            Self::PressBriefing(game) => game.is_finished(),
            Self::DroneStrike(game) => game.is_finished(),
            Self::SuperPac(game) => game.is_finished(),
            Self::Sanctions(game) => game.is_finished(),
        }
    }
}
