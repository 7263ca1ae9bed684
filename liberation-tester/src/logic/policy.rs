use std::fmt;

use liberation_game::{Effects, GameState, OptionDefinition};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub choice_index: usize,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn new(choice_index: usize, rationale: Option<String>) -> Self {
        Self {
            choice_index,
            rationale,
        }
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Select an option on an event, interstitial, or press question.
    fn pick_choice(&mut self, state: &GameState, options: &[OptionDefinition]) -> PolicyDecision;

    /// Whether the policy takes the honest route inside mini-games.
    fn plays_fair(&self) -> bool {
        false
    }
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameplayStrategy {
    Profiteer,
    Ethical,
    Balanced,
    Cautious,
    MonteCarlo,
}

impl GameplayStrategy {
    pub const ALL: [Self; 5] = [
        Self::Profiteer,
        Self::Ethical,
        Self::Balanced,
        Self::Cautious,
        Self::MonteCarlo,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            GameplayStrategy::Profiteer => "Profiteer",
            GameplayStrategy::Ethical => "Ethical",
            GameplayStrategy::Balanced => "Balanced",
            GameplayStrategy::Cautious => "Cautious",
            GameplayStrategy::MonteCarlo => "Monte Carlo",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            GameplayStrategy::Profiteer => Box::new(ProfiteerPolicy),
            GameplayStrategy::Ethical => Box::new(EthicalPolicy),
            GameplayStrategy::Balanced => Box::new(BalancedPolicy),
            GameplayStrategy::Cautious => Box::new(CautiousPolicy),
            GameplayStrategy::MonteCarlo => Box::new(MonteCarloPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct ProfiteerPolicy;
struct EthicalPolicy;
struct BalancedPolicy;
struct CautiousPolicy;

struct MonteCarloPolicy {
    rng: ChaCha20Rng,
}

impl MonteCarloPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

fn best_by<F>(options: &[OptionDefinition], mut score: F) -> Option<(usize, i32)>
where
    F: FnMut(&OptionDefinition) -> Option<i32>,
{
    options
        .iter()
        .enumerate()
        .filter_map(|(idx, option)| score(option).map(|value| (idx, value)))
        .max_by_key(|(_, value)| *value)
}

fn profit(effects: &Effects) -> i32 {
    effects.oil + effects.treasury
}

impl PlayerPolicy for ProfiteerPolicy {
    fn name(&self) -> &'static str {
        "Profiteer"
    }

    fn pick_choice(&mut self, _state: &GameState, options: &[OptionDefinition]) -> PolicyDecision {
        let (idx, reward) = best_by(options, |option| {
            (!option.is_ethical).then(|| profit(&option.effects))
        })
        .unwrap_or((0, 0));
        PolicyDecision::new(idx, Some(format!("profit {reward}")))
    }
}

impl PlayerPolicy for EthicalPolicy {
    fn name(&self) -> &'static str {
        "Ethical"
    }

    fn pick_choice(&mut self, _state: &GameState, options: &[OptionDefinition]) -> PolicyDecision {
        match options.iter().position(|option| option.is_ethical) {
            Some(idx) => PolicyDecision::new(idx, Some("conscience".to_string())),
            None => {
                let (idx, harm) = best_by(options, |option| Some(-option.effects.war_crimes))
                    .unwrap_or((0, 0));
                PolicyDecision::new(idx, Some(format!("least harm {}", -harm)))
            }
        }
    }

    fn plays_fair(&self) -> bool {
        true
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn pick_choice(&mut self, state: &GameState, options: &[OptionDefinition]) -> PolicyDecision {
        let risk = state.stats.cholera_risk;
        let (idx, score) = best_by(options, |option| {
            let effects = &option.effects;
            // Honesty only when the outbreak odds are tolerable.
            if option.is_ethical && risk + effects.cholera_risk >= 20 {
                return None;
            }
            Some(
                profit(effects) + effects.approval / 2
                    - effects.war_crimes * 2
                    - effects.chaos / 4,
            )
        })
        .unwrap_or((0, 0));
        PolicyDecision::new(idx, Some(format!("score {score}")))
    }
}

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn pick_choice(&mut self, _state: &GameState, options: &[OptionDefinition]) -> PolicyDecision {
        let (idx, exposure) = best_by(options, |option| {
            let effects = &option.effects;
            (!option.is_ethical).then(|| -(effects.war_crimes * 3 + effects.chaos.max(0)))
        })
        .unwrap_or((0, 0));
        PolicyDecision::new(idx, Some(format!("exposure {}", -exposure)))
    }
}

impl PlayerPolicy for MonteCarloPolicy {
    fn name(&self) -> &'static str {
        "Monte Carlo"
    }

    fn pick_choice(&mut self, _state: &GameState, options: &[OptionDefinition]) -> PolicyDecision {
        if options.is_empty() {
            return PolicyDecision::new(0, None);
        }
        let idx = self.rng.random_range(0..options.len());
        PolicyDecision::new(idx, Some("sampled".to_string()))
    }
}
