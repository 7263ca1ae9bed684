use rand::Rng;
use std::time::Duration;

use super::{MiniGameResult, Progress};
use crate::catalog::{DroneStrikeTable, DroneTarget};
use crate::rng::pick;
use crate::stats::Effects;

pub const JITTER_INTERVAL: Duration = Duration::from_secs(1);
const JITTER: i32 = 2;
/// Strikes above this confidence hit what intel said they would.
const CONFIDENCE_THRESHOLD: i32 = 40;
/// Beyond this many war crimes even a clean hit costs approval.
const ATROCITY_LINE: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeReport {
    Neutralized,
    CollateralDamage,
    Aborted,
}

/// Intel is shaky. Strike or stand down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroneStrike {
    target: DroneTarget,
    confidence: i32,
    since_jitter: Duration,
    report: Option<StrikeReport>,
}

impl DroneStrike {
    /// Draw a target from the table. `None` if the table is empty.
    pub fn new<R: Rng + ?Sized>(table: &DroneStrikeTable, rng: &mut R) -> Option<Self> {
        let target = pick(rng, &table.targets)?.clone();
        Some(Self::with_target(target))
    }

    #[must_use]
    pub fn with_target(target: DroneTarget) -> Self {
        Self {
            confidence: target.confidence,
            target,
            since_jitter: Duration::ZERO,
            report: None,
        }
    }

    #[must_use]
    pub const fn target(&self) -> &DroneTarget {
        &self.target
    }

    #[must_use]
    pub const fn confidence(&self) -> i32 {
        self.confidence
    }

    #[must_use]
    pub const fn report(&self) -> Option<StrikeReport> {
        self.report
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.report.is_some()
    }

    /// Confidence wanders around the intel baseline once a second.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: Duration, rng: &mut R) -> Progress {
        if self.is_finished() {
            return Progress::Pending;
        }
        self.since_jitter += dt;
        while self.since_jitter >= JITTER_INTERVAL {
            self.since_jitter -= JITTER_INTERVAL;
            let change = rng.random_range(-JITTER..=JITTER);
            self.confidence = (self.target.confidence + change).clamp(0, 100);
        }
        Progress::Pending
    }

    pub fn strike(&mut self) -> Progress {
        if self.is_finished() {
            return Progress::Pending;
        }
        let target = &self.target;
        let effects = if self.confidence > CONFIDENCE_THRESHOLD {
            self.report = Some(StrikeReport::Neutralized);
            Effects {
                oil: target.oil,
                war_crimes: target.war_crimes,
                approval: if target.war_crimes > ATROCITY_LINE { -10 } else { 5 },
                ..Effects::default()
            }
        } else {
            self.report = Some(StrikeReport::CollateralDamage);
            Effects {
                war_crimes: target.war_crimes + 3,
                approval: -15,
                ..Effects::default()
            }
        };
        log::debug!(
            "drone strike on {} at {}%: {:?}",
            target.name,
            self.confidence,
            self.report
        );
        Progress::Finished(MiniGameResult::survived(effects))
    }

    /// Standing down is its own kind of risk.
    pub fn abort(&mut self) -> Progress {
        if self.is_finished() {
            return Progress::Pending;
        }
        self.report = Some(StrikeReport::Aborted);
        Progress::Finished(MiniGameResult::survived(Effects {
            cholera_risk: 5,
            ..Effects::default()
        }))
    }
}
