//! Tunable timings and odds, bundled as JSON with code defaults behind it.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("failed to parse game config: {0}")]
    Parse(String),
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !(min..=max).contains(&value) {
        return Err(ConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

/// Delays, in milliseconds, for every deferred step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timings {
    pub navigation_delay_ms: u64,
    pub celebration_ms: u64,
    pub post_celebration_ms: u64,
    pub mini_game_resolve_ms: u64,
    pub restart_arm_ms: u64,
    pub disclaimer_arm_ms: u64,
    pub assistant_interval_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            navigation_delay_ms: 300,
            celebration_ms: 2_500,
            post_celebration_ms: 100,
            mini_game_resolve_ms: 1_500,
            restart_arm_ms: 2_000,
            disclaimer_arm_ms: 500,
            assistant_interval_ms: 5_000,
        }
    }
}

impl Timings {
    #[must_use]
    pub const fn navigation_delay(&self) -> Duration {
        Duration::from_millis(self.navigation_delay_ms)
    }

    #[must_use]
    pub const fn celebration(&self) -> Duration {
        Duration::from_millis(self.celebration_ms)
    }

    #[must_use]
    pub const fn post_celebration(&self) -> Duration {
        Duration::from_millis(self.post_celebration_ms)
    }

    #[must_use]
    pub const fn mini_game_resolve(&self) -> Duration {
        Duration::from_millis(self.mini_game_resolve_ms)
    }

    #[must_use]
    pub const fn restart_arm(&self) -> Duration {
        Duration::from_millis(self.restart_arm_ms)
    }

    #[must_use]
    pub const fn disclaimer_arm(&self) -> Duration {
        Duration::from_millis(self.disclaimer_arm_ms)
    }

    #[must_use]
    pub const fn assistant_interval(&self) -> Duration {
        Duration::from_millis(self.assistant_interval_ms)
    }
}

/// Constants behind the next-screen and victory rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectorOdds {
    /// Floor chance (percent) of a random interstitial.
    pub random_event_base: f64,
    /// Extra interstitial chance per point of chaos.
    pub chaos_factor: f64,
    /// Rolls below this (and above the interstitial band) start a mini-game.
    pub mini_game_ceiling: f64,
    pub victory_oil: i32,
    /// A month passes on every Nth stat mutation.
    pub month_cadence: u32,
}

impl Default for SelectorOdds {
    fn default() -> Self {
        Self {
            random_event_base: 10.0,
            chaos_factor: 0.5,
            mini_game_ceiling: 40.0,
            victory_oil: 100,
            month_cadence: 3,
        }
    }
}

impl SelectorOdds {
    /// Percent chance of a random interstitial at the given chaos.
    #[must_use]
    pub fn random_event_threshold(&self, chaos: i32) -> f64 {
        self.random_event_base + f64::from(chaos) * self.chaos_factor
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_range("odds.randomEventBase", self.random_event_base, 0.0, 100.0)?;
        check_range("odds.chaosFactor", self.chaos_factor, 0.0, 1.0)?;
        check_range("odds.miniGameCeiling", self.mini_game_ceiling, 0.0, 100.0)?;
        check_range("odds.victoryOil", f64::from(self.victory_oil), 1.0, 100.0)?;
        check_range("odds.monthCadence", f64::from(self.month_cadence), 1.0, 100.0)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssistantConfig {
    pub enabled: bool,
    /// Chance per check of evaluating intervention triggers.
    pub intervention_check: f64,
    /// Chance per check of a passive quote when no intervention fires.
    pub quote_chance: f64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            intervention_check: 0.3,
            quote_chance: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameConfig {
    pub timings: Timings,
    pub odds: SelectorOdds,
    pub assistant: AssistantConfig,
}

impl GameConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for malformed JSON, a top level that is not an
    /// object, or out-of-range values.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        // Serde would otherwise accept `[]` as an all-default struct.
        if !value.is_object() {
            return Err(ConfigError::Parse(
                "game config must be a JSON object".to_string(),
            ));
        }
        let cfg: Self =
            serde_json::from_value(value).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// The config shipped with the game.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the bundled asset is invalid.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_json(include_str!("../assets/data/config.json"))
    }

    /// # Errors
    ///
    /// Returns the first out-of-range field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.odds.validate()?;
        check_range(
            "assistant.interventionCheck",
            self.assistant.intervention_check,
            0.0,
            1.0,
        )?;
        check_range("assistant.quoteChance", self.assistant.quote_chance, 0.0, 1.0)?;
        Ok(())
    }
}
