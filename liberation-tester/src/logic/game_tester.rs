use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use liberation_game::storage::StorageError;
use liberation_game::{
    Action, Ending, FileStore, GameConfig, GameState, KeyValueStore, MemoryStore, Persistence,
    Screen, ScreenController, load_persistence, save_persistence,
};
use serde::Serialize;

use crate::logic::policy::GameplayStrategy;
use crate::logic::simulation::{DecisionRecord, SimulationConfig, SimulationSession, TurnOutcome};

/// How a run finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Victory,
    Death,
    /// Stopped by the choice cap or step guard before an ending.
    Halted,
}

impl RunOutcome {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Victory => "victory",
            Self::Death => "death",
            Self::Halted => "halted",
        }
    }
}

/// A plan for one kind of automated run.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    pub max_choices: Option<u32>,
    pub setup: Option<fn() -> Vec<Action>>,
    pub replay: bool,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            max_choices: None,
            setup: None,
            replay: false,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_max_choices(mut self, max_choices: u32) -> Self {
        self.max_choices = Some(max_choices);
        self
    }

    /// Actions dispatched after the session starts, before the policy takes over.
    #[must_use]
    pub fn with_setup(mut self, setup: fn() -> Vec<Action>) -> Self {
        self.setup = Some(setup);
        self
    }

    /// Run every seed twice and compare the final states.
    #[must_use]
    pub const fn with_replay(mut self) -> Self {
        self.replay = true;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub turns: Vec<TurnOutcome>,
    pub decisions: Vec<DecisionRecord>,
    /// Every state the run passed through after an accepted input.
    pub observed: Vec<GameState>,
    pub final_state: GameState,
    pub outcome: RunOutcome,
    pub ending: Option<Ending>,
    pub career_before: Persistence,
    pub career_after: Persistence,
    pub virtual_time: Duration,
    pub rng_draws: u64,
    pub save_failures: u32,
    /// Final state of the second run when the plan asks for a replay.
    pub replay_state: Option<GameState>,
    pub config: GameConfig,
}

/// Headless deterministic runner for the core game logic.
#[derive(Debug, Clone)]
pub struct GameTester {
    verbose: bool,
    config: GameConfig,
    save_dir: Option<PathBuf>,
}

impl GameTester {
    pub const fn new(config: GameConfig, verbose: bool) -> Self {
        Self {
            verbose,
            config,
            save_dir: None,
        }
    }

    /// Keep the career record in `dir` between runs instead of in memory.
    #[must_use]
    pub fn with_save_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.save_dir = dir;
        self
    }

    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        let mut summary = self.run_once(plan, seed);
        if plan.replay {
            // The replay starts from the same career the first run saw.
            let store = MemoryStore::new();
            if let Err(err) = save_persistence(&store, &summary.career_before) {
                log::warn!("could not seed replay career: {err}");
            }
            summary.replay_state = Some(self.run_with_store(plan, seed, store).final_state);
        }
        summary
    }

    fn run_once(&self, plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        if let Some(dir) = &self.save_dir {
            match FileStore::open(dir) {
                Ok(store) => return self.run_with_store(plan, seed, store),
                Err(err) => log::warn!("falling back to in-memory saves: {err}"),
            }
        }
        self.run_with_store(plan, seed, MemoryStore::new())
    }

    fn run_with_store<S>(&self, plan: &SimulationPlan, seed: u64, store: S) -> SimulationSummary
    where
        S: KeyValueStore,
        StorageError: From<S::Error>,
    {
        let career_before = load_persistence(&store);
        let mut config = SimulationConfig::new(plan.strategy, seed).with_game_config(self.config);
        if let Some(max_choices) = plan.max_choices {
            config = config.with_max_choices(max_choices);
        }
        let mut session = SimulationSession::new(config, store);
        if let Some(setup) = plan.setup {
            for action in setup() {
                session.session_mut().dispatch(action);
            }
        }

        if self.verbose {
            log_initial_state(seed, plan, session.state());
        }

        let mut policy = plan.strategy.create_policy(seed);
        let mut turns = Vec::new();
        let mut observed = Vec::new();
        while !session.should_stop() {
            let outcome = session.advance(policy.as_mut());
            if outcome.accepted {
                observed.push(session.state().clone());
            }
            if self.verbose {
                log_turn(&outcome, session.state());
            }
            if outcome.input.is_some() || outcome.game_ended {
                turns.push(outcome);
            }
        }

        let virtual_time = session.elapsed();
        let game = session.into_session();
        let final_state = game.state().clone();
        let outcome = match final_state.current_screen {
            Screen::Victory => RunOutcome::Victory,
            Screen::Death => RunOutcome::Death,
            _ => RunOutcome::Halted,
        };
        let ending = match game.controller() {
            ScreenController::Victory { summary, .. } => Some(summary.ending),
            _ => None,
        };
        let decisions = turns
            .iter()
            .filter_map(|turn| turn.decision.clone())
            .collect();

        SimulationSummary {
            seed,
            strategy: plan.strategy,
            turns,
            decisions,
            observed,
            career_after: load_persistence(game.store()),
            career_before,
            final_state,
            outcome,
            ending,
            virtual_time,
            rng_draws: game.snapshot().rng_draws,
            save_failures: game.save_failures(),
            replay_state: None,
            config: self.config,
        }
    }
}

fn log_initial_state(seed: u64, plan: &SimulationPlan, state: &GameState) {
    println!(
        "🎮 Starting simulation | seed:{seed} policy:{}",
        plan.strategy.label()
    );
    println!(
        "📊 Initial stats | Oil:{} Approval:{} Treasury:${}M Deaths:{}",
        state.stats.oil,
        state.stats.approval,
        state.stats.treasury,
        state.persistence.cholera_deaths
    );
}

fn log_turn(outcome: &TurnOutcome, state: &GameState) {
    if let Some(decision) = &outcome.decision {
        println!(
            "🎯 Month {}: {} -> {} ({})",
            decision.month, decision.title, decision.choice_id, decision.policy_name
        );
    }

    if outcome.game_ended {
        let stats = &state.stats;
        println!(
            "🏁 Simulation ended on {} | Oil:{} Approval:{} Treasury:${}M War crimes:{} Cholera:{}%",
            state.current_screen,
            stats.oil,
            stats.approval,
            stats.treasury,
            stats.war_crimes,
            stats.cholera_risk
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liberation_game::config::AssistantConfig;

    fn tester() -> GameTester {
        let mut config = GameConfig::default();
        config.assistant = AssistantConfig {
            enabled: false,
            ..AssistantConfig::default()
        };
        GameTester::new(config, false)
    }

    #[test]
    fn replay_runs_twice_with_identical_results() {
        let plan = SimulationPlan::new(GameplayStrategy::Balanced).with_replay();
        let summary = tester().run_plan(&plan, 1337);
        assert_eq!(summary.replay_state.as_ref(), Some(&summary.final_state));
    }

    #[test]
    fn setup_actions_run_before_the_policy() {
        fn rich() -> Vec<Action> {
            vec![
                Action::StartGame,
                Action::ModifyStats(liberation_game::Effects {
                    oil: 99,
                    ..liberation_game::Effects::default()
                }),
            ]
        }
        let plan = SimulationPlan::new(GameplayStrategy::Profiteer).with_setup(rich);
        let summary = tester().run_plan(&plan, 3);
        assert_ne!(summary.outcome, RunOutcome::Halted);
        assert!(!summary.observed.is_empty());
    }

    #[test]
    fn deaths_are_recorded_in_the_career() {
        let plan = SimulationPlan::new(GameplayStrategy::Ethical);
        let summary = tester().run_plan(&plan, 11);
        assert_eq!(summary.outcome, RunOutcome::Death);
        assert_eq!(
            summary.career_after.cholera_deaths,
            summary.career_before.cholera_deaths + 1
        );
    }
}
