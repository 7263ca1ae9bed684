use std::time::Duration;

use liberation_game::minigames::redaction::ChunkKind;
use liberation_game::minigames::sanctions::ShipKind;
use liberation_game::session::FRAME;
use liberation_game::storage::StorageError;
use liberation_game::{
    ActiveMiniGame, AssistantPopup, GameConfig, GameSession, GameState, Input, KeyValueStore,
    Screen, ScreenController,
};

use crate::logic::policy::{GameplayStrategy, PlayerPolicy, PolicyDecision};

/// Drone strikes are taken once intel is at least this confident.
const STRIKE_CONFIDENCE: i32 = 45;
/// Give up on a run that never reaches an ending.
const STEP_LIMIT: u32 = 50_000;

/// Configuration for a simulation session.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub max_choices: u32,
    pub game: GameConfig,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(strategy: GameplayStrategy, seed: u64) -> Self {
        Self {
            seed,
            strategy,
            max_choices: 200,
            game: GameConfig::default(),
        }
    }

    #[must_use]
    pub fn with_max_choices(mut self, max_choices: u32) -> Self {
        self.max_choices = max_choices;
        self
    }

    #[must_use]
    pub fn with_game_config(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }
}

/// Snapshot of a resolved choice.
#[derive(Debug, Clone)]
pub struct DecisionRecord {
    pub month: i32,
    pub screen: Screen,
    pub title: String,
    pub choice_index: usize,
    pub choice_id: String,
    pub policy_name: String,
    pub rationale: Option<String>,
}

/// Result of advancing the simulation by one step.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub screen: Screen,
    pub input: Option<Input>,
    pub accepted: bool,
    pub decision: Option<DecisionRecord>,
    pub game_ended: bool,
}

/// Core deterministic simulation harness used by the tester.
pub struct SimulationSession<S> {
    session: GameSession<S>,
    seed: u64,
    max_choices: u32,
    choices: u32,
    steps: u32,
}

impl<S> SimulationSession<S>
where
    S: KeyValueStore,
    StorageError: From<S::Error>,
{
    pub fn new(config: SimulationConfig, store: S) -> Self {
        Self {
            session: GameSession::new(config.seed, store, config.game),
            seed: config.seed,
            max_choices: config.max_choices,
            choices: 0,
            steps: 0,
        }
    }

    pub fn session_mut(&mut self) -> &mut GameSession<S> {
        &mut self.session
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        self.session.state()
    }

    #[must_use]
    pub const fn choices(&self) -> u32 {
        self.choices
    }

    #[must_use]
    pub fn into_session(self) -> GameSession<S> {
        self.session
    }

    /// Whether the run reached death or victory.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.state().current_screen.is_terminal()
    }

    /// Whether the harness should stop driving this run.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.is_over() || self.choices >= self.max_choices || self.steps >= STEP_LIMIT
    }

    pub fn advance(&mut self, policy: &mut dyn PlayerPolicy) -> TurnOutcome {
        self.steps += 1;
        let screen = self.state().current_screen;
        let mut decision = None;

        let input = if let Some(popup) = self.session.assistant().showing() {
            Some(assistant_input(popup, policy.plays_fair()))
        } else if self.session.celebration().is_some() {
            Some(Input::Confirm)
        } else {
            self.next_input(policy, &mut decision)
        };

        let accepted = match input {
            Some(input) => self.session.handle(input),
            None => false,
        };
        if !accepted {
            self.session.advance(FRAME);
        }
        if accepted && decision.is_some() {
            self.choices += 1;
        }

        TurnOutcome {
            screen,
            input,
            accepted,
            decision: decision.filter(|_| accepted),
            game_ended: self.is_over(),
        }
    }

    fn next_input(
        &self,
        policy: &mut dyn PlayerPolicy,
        decision: &mut Option<DecisionRecord>,
    ) -> Option<Input> {
        let state = self.session.state();
        let catalog = self.session.catalog();
        match self.session.controller() {
            ScreenController::Disclaimer { armed } => armed.then_some(Input::Confirm),
            ScreenController::Title => Some(Input::Confirm),
            ScreenController::RoleSelect { roles } => {
                Some(Input::Choose(self.spread(roles.len())))
            }
            ScreenController::CountrySelect => {
                Some(Input::Choose(self.spread(catalog.countries.len())))
            }
            ScreenController::Transmission { .. } => catalog
                .transmission
                .options
                .iter()
                .position(|option| option.target != Screen::Death)
                .map(Input::Choose),
            ScreenController::Event {
                event,
                locked: false,
            } => {
                let picked = policy.pick_choice(state, &event.options);
                *decision = Some(self.record(policy, &event.title, &event.options, picked));
                decision.as_ref().map(|d| Input::Choose(d.choice_index))
            }
            ScreenController::RandomEvent {
                event,
                locked: false,
            } => {
                let picked = policy.pick_choice(state, &event.options);
                *decision = Some(self.record(policy, &event.title, &event.options, picked));
                decision.as_ref().map(|d| Input::Choose(d.choice_index))
            }
            ScreenController::MiniGame {
                game,
                locked: false,
            } => play_mini_game(game, state, policy),
            _ => None,
        }
    }

    fn record(
        &self,
        policy: &dyn PlayerPolicy,
        title: &str,
        options: &[liberation_game::OptionDefinition],
        picked: PolicyDecision,
    ) -> DecisionRecord {
        let choice_id = options
            .get(picked.choice_index)
            .map(|option| option.id.clone())
            .unwrap_or_default();
        DecisionRecord {
            month: self.state().stats.month,
            screen: self.state().current_screen,
            title: title.to_string(),
            choice_index: picked.choice_index,
            choice_id,
            policy_name: policy.name().to_string(),
            rationale: picked.rationale,
        }
    }

    /// Seed-stable index into a list of `len` entries.
    fn spread(&self, len: usize) -> usize {
        let len = u64::try_from(len.max(1)).unwrap_or(1);
        usize::try_from(self.seed % len).unwrap_or(0)
    }

    /// Drive the run to an ending or a limit, returning every step taken.
    pub fn run(&mut self, policy: &mut dyn PlayerPolicy) -> Vec<TurnOutcome> {
        let mut turns = Vec::new();
        while !self.should_stop() {
            let turn = self.advance(policy);
            if turn.input.is_some() || turn.game_ended {
                turns.push(turn);
            }
        }
        turns
    }

    /// Total virtual time the run took.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.session.now()
    }
}

fn assistant_input(popup: &AssistantPopup, plays_fair: bool) -> Input {
    match popup {
        AssistantPopup::Intervention(_) if plays_fair => Input::AssistantDisable,
        AssistantPopup::Intervention(_) => Input::AssistantPick(0),
        AssistantPopup::Quote(_) => Input::AssistantDismiss,
    }
}

/// Pick the next mini-game input, or `None` to let time pass.
fn play_mini_game(
    game: &ActiveMiniGame,
    state: &GameState,
    policy: &mut dyn PlayerPolicy,
) -> Option<Input> {
    let fair = policy.plays_fair();
    match game {
        ActiveMiniGame::Redaction(redaction) => redaction
            .chunks()
            .iter()
            .find(|chunk| chunk.kind == ChunkKind::Sensitive && !chunk.redacted)
            .map_or(Some(Input::Declassify), |chunk| {
                Some(Input::Redact(chunk.id))
            }),
        ActiveMiniGame::PressBriefing(briefing) => {
            if !briefing.accepting_answers() {
                return None;
            }
            let question = briefing.current_question()?;
            let decision = policy.pick_choice(state, &question.answers);
            Some(Input::Choose(decision.choice_index))
        }
        ActiveMiniGame::DroneStrike(strike) => {
            if fair {
                Some(Input::Abort)
            } else if strike.confidence() >= STRIKE_CONFIDENCE
                || strike.target().confidence < STRIKE_CONFIDENCE
            {
                Some(Input::Strike)
            } else {
                None
            }
        }
        ActiveMiniGame::SuperPac(pac) => {
            let shells = pac.shells();
            let index = if fair {
                shells.iter().position(|shell| shell.is_ethical)
            } else {
                shells
                    .iter()
                    .enumerate()
                    .filter(|(_, shell)| !shell.is_ethical)
                    .min_by_key(|(_, shell)| shell.trace)
                    .map(|(idx, _)| idx)
            };
            index.map(Input::Route)
        }
        ActiveMiniGame::Sanctions(sanctions) => {
            if sanctions.awaiting_report() {
                return Some(Input::Confirm);
            }
            if fair {
                return None;
            }
            sanctions
                .ships()
                .iter()
                .find(|ship| ship.kind == ShipKind::Trade)
                .map(|ship| Input::Block(ship.id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liberation_game::MemoryStore;
    use liberation_game::config::AssistantConfig;

    fn quiet(strategy: GameplayStrategy, seed: u64) -> SimulationConfig {
        let mut game = GameConfig::default();
        game.assistant = AssistantConfig {
            enabled: false,
            ..AssistantConfig::default()
        };
        SimulationConfig::new(strategy, seed).with_game_config(game)
    }

    #[test]
    fn profiteer_reaches_an_ending() {
        let mut sim = SimulationSession::new(quiet(GameplayStrategy::Profiteer, 42), MemoryStore::new());
        let mut policy = GameplayStrategy::Profiteer.create_policy(42);
        let turns = sim.run(policy.as_mut());
        assert!(sim.is_over(), "stopped after {} choices", sim.choices());
        assert!(turns.iter().any(|turn| turn.decision.is_some()));
    }

    #[test]
    fn ethical_run_dies() {
        for seed in 0..10 {
            let mut sim =
                SimulationSession::new(quiet(GameplayStrategy::Ethical, seed), MemoryStore::new());
            let mut policy = GameplayStrategy::Ethical.create_policy(seed);
            sim.run(policy.as_mut());
            assert_eq!(sim.state().current_screen, Screen::Death, "seed {seed}");
        }
    }

    #[test]
    fn choice_cap_halts_the_run() {
        let config = quiet(GameplayStrategy::Cautious, 7).with_max_choices(2);
        let mut sim = SimulationSession::new(config, MemoryStore::new());
        let mut policy = GameplayStrategy::Cautious.create_policy(7);
        sim.run(policy.as_mut());
        assert!(sim.choices() <= 2);
    }
}
