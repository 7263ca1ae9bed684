//! Numeric stat bag and the partial delta map applied to it.
//!
//! Every mutation of [`Stats`] goes through [`Stats::apply`], which enforces the
//! per-key clamp policy and bumps the event counter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PERCENT_MIN: i32 = 0;
pub const PERCENT_MAX: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub oil: i32,
    pub approval: i32,
    pub treasury: i32,
    pub war_crimes: i32,
    pub democracy: i32,
    pub cholera_risk: i32,
    pub event_count: u32,
    pub chaos: i32,
    pub month: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            oil: 0,
            approval: 50,
            treasury: 10,
            war_crimes: 0,
            democracy: 0,
            cholera_risk: 0,
            event_count: 0,
            chaos: 0,
            month: 1,
        }
    }
}

impl Stats {
    #[must_use]
    pub const fn get(&self, key: StatKey) -> i32 {
        match key {
            StatKey::Oil => self.oil,
            StatKey::Approval => self.approval,
            StatKey::Treasury => self.treasury,
            StatKey::WarCrimes => self.war_crimes,
            StatKey::Democracy => self.democracy,
            StatKey::CholeraRisk => self.cholera_risk,
            StatKey::Chaos => self.chaos,
            StatKey::Month => self.month,
        }
    }

    fn slot(&mut self, key: StatKey) -> &mut i32 {
        match key {
            StatKey::Oil => &mut self.oil,
            StatKey::Approval => &mut self.approval,
            StatKey::Treasury => &mut self.treasury,
            StatKey::WarCrimes => &mut self.war_crimes,
            StatKey::Democracy => &mut self.democracy,
            StatKey::CholeraRisk => &mut self.cholera_risk,
            StatKey::Chaos => &mut self.chaos,
            StatKey::Month => &mut self.month,
        }
    }

    /// Add every non-zero delta, clamp per key, and count the mutation.
    ///
    /// The event counter advances even when `effects` is empty.
    pub fn apply(&mut self, effects: &Effects) {
        for (key, delta) in effects.iter() {
            let slot = self.slot(key);
            *slot = key.policy().apply(slot.saturating_add(delta));
        }
        self.event_count = self.event_count.saturating_add(1);
    }
}

/// How a stat is bounded after a delta lands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampPolicy {
    Percent,
    Forced(i32),
    Floor(i32),
}

impl ClampPolicy {
    #[must_use]
    pub fn apply(self, value: i32) -> i32 {
        match self {
            Self::Percent => value.clamp(PERCENT_MIN, PERCENT_MAX),
            Self::Forced(fixed) => fixed,
            Self::Floor(floor) => value.max(floor),
        }
    }
}

/// Stat names a delta map may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatKey {
    Oil,
    Approval,
    Treasury,
    WarCrimes,
    Democracy,
    CholeraRisk,
    Chaos,
    Month,
}

impl StatKey {
    pub const ALL: [Self; 8] = [
        Self::Oil,
        Self::Approval,
        Self::Treasury,
        Self::WarCrimes,
        Self::Democracy,
        Self::CholeraRisk,
        Self::Chaos,
        Self::Month,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Oil => "oil",
            Self::Approval => "approval",
            Self::Treasury => "treasury",
            Self::WarCrimes => "warCrimes",
            Self::Democracy => "democracy",
            Self::CholeraRisk => "choleraRisk",
            Self::Chaos => "chaos",
            Self::Month => "month",
        }
    }

    #[must_use]
    pub const fn policy(self) -> ClampPolicy {
        match self {
            Self::Oil | Self::Approval | Self::CholeraRisk | Self::Chaos => ClampPolicy::Percent,
            // Democracy never moves off zero.
            Self::Democracy => ClampPolicy::Forced(0),
            Self::Treasury | Self::WarCrimes | Self::Month => ClampPolicy::Floor(0),
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or(())
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i32) -> bool {
    *value == 0
}

/// Partial stat delta map. Absent keys read as zero; unknown keys are dropped on parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Effects {
    #[serde(skip_serializing_if = "is_zero")]
    pub oil: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub approval: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub treasury: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub war_crimes: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub democracy: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub cholera_risk: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub chaos: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub month: i32,
}

impl Effects {
    #[must_use]
    pub const fn get(&self, key: StatKey) -> i32 {
        match key {
            StatKey::Oil => self.oil,
            StatKey::Approval => self.approval,
            StatKey::Treasury => self.treasury,
            StatKey::WarCrimes => self.war_crimes,
            StatKey::Democracy => self.democracy,
            StatKey::CholeraRisk => self.cholera_risk,
            StatKey::Chaos => self.chaos,
            StatKey::Month => self.month,
        }
    }

    pub fn set(&mut self, key: StatKey, value: i32) {
        let slot = match key {
            StatKey::Oil => &mut self.oil,
            StatKey::Approval => &mut self.approval,
            StatKey::Treasury => &mut self.treasury,
            StatKey::WarCrimes => &mut self.war_crimes,
            StatKey::Democracy => &mut self.democracy,
            StatKey::CholeraRisk => &mut self.cholera_risk,
            StatKey::Chaos => &mut self.chaos,
            StatKey::Month => &mut self.month,
        };
        *slot = value;
    }

    #[must_use]
    pub fn with(mut self, key: StatKey, value: i32) -> Self {
        self.set(key, value);
        self
    }

    /// Build a delta map from loosely named pairs, skipping names that are not stats.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, i32)>,
    {
        let mut effects = Self::default();
        for (name, value) in pairs {
            match name.parse::<StatKey>() {
                Ok(key) => effects.set(key, effects.get(key).saturating_add(value)),
                Err(()) => log::debug!("ignoring unknown stat key {name}"),
            }
        }
        effects
    }

    /// Non-zero entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (StatKey, i32)> + '_ {
        StatKey::ALL
            .into_iter()
            .map(|key| (key, self.get(key)))
            .filter(|(_, value)| *value != 0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Whether the delta brings in oil or money.
    #[must_use]
    pub const fn is_profitable(&self) -> bool {
        self.oil > 0 || self.treasury > 0
    }
}
