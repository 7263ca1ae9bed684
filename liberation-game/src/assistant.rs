//! The War Assistant: a paperclip-era helper that pops up with advice nobody asked for.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{AssistantContent, AssistantTrigger, Intervention};
use crate::config::AssistantConfig;
use crate::rng::{chance, pick};
use crate::screen::Screen;
use crate::stats::{Effects, Stats};

const LOW_APPROVAL: i32 = 30;
const HIGH_WAR_CRIMES: i32 = 5;
const LOW_CHOLERA: i32 = 20;
/// Price of telling the assistant to go away.
const DISABLE_PENALTY: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum AssistantPopup {
    Quote(String),
    Intervention(Intervention),
}

/// Trigger checks in priority order. Each condition that holds gets its own draw.
pub fn roll_trigger<R: Rng + ?Sized>(stats: &Stats, rng: &mut R) -> Option<AssistantTrigger> {
    let ladder = [
        (stats.approval < LOW_APPROVAL, 0.5, AssistantTrigger::LowApproval),
        (stats.war_crimes > HIGH_WAR_CRIMES, 0.4, AssistantTrigger::HighWarCrimes),
        (stats.treasury <= 0, 0.4, AssistantTrigger::LowTreasury),
        (stats.cholera_risk < LOW_CHOLERA, 0.3, AssistantTrigger::Ethical),
        (true, 0.15, AssistantTrigger::Random),
    ];
    ladder
        .into_iter()
        .find(|(applies, probability, _)| *applies && chance(rng, *probability))
        .map(|(_, _, trigger)| trigger)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WarAssistant {
    disabled: bool,
    showing: Option<AssistantPopup>,
    shown: u32,
}

impl WarAssistant {
    #[must_use]
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            disabled: !config.enabled,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !self.disabled
    }

    #[must_use]
    pub const fn showing(&self) -> Option<&AssistantPopup> {
        self.showing.as_ref()
    }

    /// Pop-ups shown this session.
    #[must_use]
    pub const fn shown(&self) -> u32 {
        self.shown
    }

    /// Periodic check. Returns the popup if one was just shown.
    pub fn check<R: Rng + ?Sized>(
        &mut self,
        screen: Screen,
        stats: &Stats,
        content: &AssistantContent,
        config: &AssistantConfig,
        rng: &mut R,
    ) -> Option<&AssistantPopup> {
        if self.disabled || self.showing.is_some() || !screen.allows_assistant() {
            return None;
        }
        let intervention = if chance(rng, config.intervention_check) {
            roll_trigger(stats, rng).and_then(|trigger| {
                content
                    .interventions
                    .iter()
                    .find(|intervention| intervention.trigger == trigger)
            })
        } else {
            None
        };
        let popup = match intervention {
            Some(intervention) => AssistantPopup::Intervention(intervention.clone()),
            None if chance(rng, config.quote_chance) => {
                AssistantPopup::Quote(pick(rng, &content.quotes)?.clone())
            }
            None => return None,
        };
        log::debug!("war assistant pops up on {screen}");
        self.shown += 1;
        self.showing = Some(popup);
        self.showing.as_ref()
    }

    /// Accept option `index` of the open intervention. Returns its effects.
    pub fn pick(&mut self, index: usize) -> Option<Effects> {
        let Some(AssistantPopup::Intervention(intervention)) = &self.showing else {
            return None;
        };
        let effects = intervention.options.get(index)?.effects;
        self.showing = None;
        Some(effects)
    }

    /// Close whatever is showing without consequences.
    pub fn dismiss(&mut self) -> bool {
        self.showing.take().is_some()
    }

    /// Turn the assistant off for the rest of the session. Returns the penalty
    /// the first time only.
    pub fn disable(&mut self) -> Option<Effects> {
        if self.disabled {
            return None;
        }
        self.disabled = true;
        self.showing = None;
        Some(Effects {
            cholera_risk: DISABLE_PENALTY,
            ..Effects::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::catalog;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn always() -> AssistantConfig {
        AssistantConfig {
            enabled: true,
            intervention_check: 1.0,
            quote_chance: 1.0,
        }
    }

    #[test]
    fn stays_hidden_on_chromeless_screens() {
        let mut assistant = WarAssistant::new(&always());
        let mut rng = SmallRng::seed_from_u64(1);
        for screen in [Screen::Title, Screen::RoleSelect, Screen::Victory] {
            let shown = assistant.check(
                screen,
                &Stats::default(),
                &catalog().assistant,
                &always(),
                &mut rng,
            );
            assert!(shown.is_none(), "{screen}");
        }
    }

    #[test]
    fn low_approval_is_checked_first() {
        let stats = Stats {
            approval: 10,
            ..Stats::default()
        };
        let mut rng = SmallRng::seed_from_u64(2);
        let mut low_approval = 0;
        for _ in 0..1_000 {
            if roll_trigger(&stats, &mut rng) == Some(AssistantTrigger::LowApproval) {
                low_approval += 1;
            }
        }
        assert!((430..=570).contains(&low_approval), "{low_approval}");
    }

    #[test]
    fn empty_treasury_can_trigger() {
        let stats = Stats {
            treasury: 0,
            cholera_risk: 80,
            ..Stats::default()
        };
        let mut rng = SmallRng::seed_from_u64(3);
        let seen = (0..500)
            .filter_map(|_| roll_trigger(&stats, &mut rng))
            .any(|trigger| trigger == AssistantTrigger::LowTreasury);
        assert!(seen);
    }

    #[test]
    fn pick_applies_option_and_closes() {
        let mut assistant = WarAssistant::new(&always());
        let mut rng = SmallRng::seed_from_u64(4);
        let mut opened = false;
        for _ in 0..50 {
            if let Some(AssistantPopup::Intervention(_)) = assistant.check(
                Screen::Event,
                &Stats::default(),
                &catalog().assistant,
                &always(),
                &mut rng,
            ) {
                opened = true;
                break;
            }
            assistant.dismiss();
        }
        assert!(opened);
        assert!(assistant.pick(0).is_some());
        assert!(assistant.showing().is_none());
        assert!(assistant.pick(0).is_none());
    }

    #[test]
    fn disabling_costs_once_and_silences() {
        let mut assistant = WarAssistant::new(&always());
        assert_eq!(assistant.disable().map(|e| e.cholera_risk), Some(10));
        assert!(assistant.disable().is_none());
        let mut rng = SmallRng::seed_from_u64(5);
        assert!(
            assistant
                .check(
                    Screen::Event,
                    &Stats::default(),
                    &catalog().assistant,
                    &always(),
                    &mut rng
                )
                .is_none()
        );
    }
}
