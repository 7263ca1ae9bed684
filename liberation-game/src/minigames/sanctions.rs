use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{MiniGameResult, Progress, count_down};
use crate::rng::chance;
use crate::state::HistoryEntry;
use crate::stats::Effects;

pub const SIEGE_TIME: Duration = Duration::from_secs(15);
pub const SPAWN_INTERVAL: Duration = Duration::from_millis(800);
pub const MOVE_INTERVAL: Duration = Duration::from_millis(50);
const MEDICAL_SHARE: f64 = 0.2;
/// Sea coordinates are percentages of the screen width; ships start just off-screen.
const LEFT_ENTRY: f64 = -10.0;
const RIGHT_ENTRY: f64 = 110.0;
const SEA_MIN: f64 = -20.0;
const SEA_MAX: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipKind {
    Trade,
    Medical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub id: u32,
    pub side: Side,
    pub kind: ShipKind,
    /// Vertical lane, 10..80.
    pub lane: f64,
    pub speed: f64,
    pub position: f64,
}

impl Ship {
    fn spawn<R: Rng + ?Sized>(id: u32, rng: &mut R) -> Self {
        let side = if rng.random_bool(0.5) {
            Side::Left
        } else {
            Side::Right
        };
        let lane = rng.random_range(10.0..80.0);
        let speed = rng.random_range(1.0..3.0);
        let kind = if chance(rng, MEDICAL_SHARE) {
            ShipKind::Medical
        } else {
            ShipKind::Trade
        };
        Self {
            id,
            side,
            kind,
            lane,
            speed,
            position: match side {
                Side::Left => LEFT_ENTRY,
                Side::Right => RIGHT_ENTRY,
            },
        }
    }

    fn step(&mut self) {
        match self.side {
            Side::Left => self.position += self.speed,
            Side::Right => self.position -= self.speed,
        }
    }

    fn at_sea(&self) -> bool {
        self.position > SEA_MIN && self.position < SEA_MAX
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Blockading,
    /// Clock ran out; waiting for the player to view the repercussions.
    Reporting,
    Done,
}

/// Blockade cargo ships for fifteen seconds. The Red Cross ones count too.
#[derive(Debug, Clone, PartialEq)]
pub struct Sanctions {
    phase: Phase,
    remaining: Duration,
    since_spawn: Duration,
    since_move: Duration,
    ships: Vec<Ship>,
    next_id: u32,
    blocked: u32,
    medical_blocked: u32,
}

impl Default for Sanctions {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanctions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Blockading,
            remaining: SIEGE_TIME,
            since_spawn: Duration::ZERO,
            since_move: Duration::ZERO,
            ships: Vec::new(),
            next_id: 0,
            blocked: 0,
            medical_blocked: 0,
        }
    }

    #[must_use]
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    #[must_use]
    pub const fn blocked(&self) -> u32 {
        self.blocked
    }

    #[must_use]
    pub const fn medical_blocked(&self) -> u32 {
        self.medical_blocked
    }

    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    #[must_use]
    pub fn awaiting_report(&self) -> bool {
        self.phase == Phase::Reporting
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, dt: Duration, rng: &mut R) -> Progress {
        if self.phase != Phase::Blockading {
            return Progress::Pending;
        }
        self.since_spawn += dt;
        while self.since_spawn >= SPAWN_INTERVAL {
            self.since_spawn -= SPAWN_INTERVAL;
            let ship = Ship::spawn(self.next_id, rng);
            self.next_id += 1;
            self.ships.push(ship);
        }
        self.since_move += dt;
        while self.since_move >= MOVE_INTERVAL {
            self.since_move -= MOVE_INTERVAL;
            for ship in &mut self.ships {
                ship.step();
            }
            self.ships.retain(Ship::at_sea);
        }
        if count_down(&mut self.remaining, dt) {
            self.phase = Phase::Reporting;
            self.ships.clear();
        }
        Progress::Pending
    }

    /// Block the ship with `id`. Returns its kind if it was still at sea.
    pub fn block(&mut self, id: u32) -> Option<ShipKind> {
        if self.phase != Phase::Blockading {
            return None;
        }
        let index = self.ships.iter().position(|ship| ship.id == id)?;
        let ship = self.ships.remove(index);
        self.blocked += 1;
        if ship.kind == ShipKind::Medical {
            self.medical_blocked += 1;
        }
        Some(ship.kind)
    }

    /// View the repercussions once the clock has run out.
    pub fn finish(&mut self) -> Progress {
        if self.phase != Phase::Reporting {
            return Progress::Pending;
        }
        self.phase = Phase::Done;
        let effects = siege_effects(self.blocked);
        let entry = HistoryEntry::new(
            "SANCTIONS SIEGE",
            format!("BLOCKED {} SHIPS", self.blocked),
            effects,
        );
        Progress::Finished(MiniGameResult::survived(effects).with_history(entry))
    }
}

/// Scoring for `blocked` ships.
#[must_use]
pub fn siege_effects(blocked: u32) -> Effects {
    let n = i32::try_from(blocked).unwrap_or(i32::MAX);
    Effects {
        oil: n.saturating_mul(3) / 2,
        cholera_risk: n.saturating_mul(2),
        chaos: n.saturating_mul(3),
        war_crimes: n / 5,
        ..Effects::default()
    }
}
