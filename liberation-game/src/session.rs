//! The application-state handle owned by the run loop.
//!
//! A [`GameSession`] wraps the pure reducer with everything that is not pure:
//! seeded randomness, the virtual clock, per-screen controllers, the War
//! Assistant, persistence writes, and sound cues. Presentation layers read
//! [`GameSession::state`] and [`GameSession::controller`] and feed back
//! [`Input`]s.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::action::Action;
use crate::assistant::{AssistantPopup, WarAssistant};
use crate::catalog::{Catalog, DeathVariant, EventDefinition, RandomEvent, Role, catalog};
use crate::config::GameConfig;
use crate::ending::VictorySummary;
use crate::minigames::{ActiveMiniGame, MiniGameExit, MiniGameResult, Progress};
use crate::reducer::reduce;
use crate::rng::{RngBundle, pick};
use crate::scheduler::{Scheduler, TimerId};
use crate::screen::Screen;
use crate::selector::{
    ChoiceOrigin, ChoiceRequest, PendingCelebration, Resolution, complete_celebration,
    resolve_choice, resolve_mini_game,
};
use crate::state::{GameState, PersistencePatch};
use crate::stats::Effects;
use crate::storage::{KeyValueStore, StorageError, load_persistence, save_persistence};

/// Mini-game clocks advance in steps no longer than this.
pub const FRAME: Duration = Duration::from_millis(50);

/// Sound effects requested by the engine. Suppressed while sound is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    Type,
    Select,
    Success,
    Error,
    Bomb,
    Clippy,
}

/// Everything a player can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "input", content = "value", rename_all = "snake_case")]
pub enum Input {
    /// Any key: leave the disclaimer, start from the title, acknowledge a
    /// celebration, view sanctions results, restart after death or victory.
    Confirm,
    /// Pick option `n` on a role, country, transmission, event, interstitial,
    /// or press question.
    Choose(usize),
    Redact(usize),
    Declassify,
    Strike,
    Abort,
    Route(usize),
    Block(u32),
    AssistantPick(usize),
    AssistantDismiss,
    AssistantDisable,
    ToggleSound,
    /// Walk away from the run. Counts as a death.
    Abandon,
}

/// Per-screen controller state, rebuilt on every mount.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenController {
    Disclaimer { armed: bool },
    Title,
    RoleSelect { roles: Vec<Role> },
    CountrySelect,
    Transmission { briefing: String },
    Event { event: EventDefinition, locked: bool },
    RandomEvent { event: RandomEvent, locked: bool },
    MiniGame { game: ActiveMiniGame, locked: bool },
    Death { variant: Option<DeathVariant>, armed: bool },
    Victory { summary: Box<VictorySummary>, armed: bool },
}

impl ScreenController {
    /// Whether a choice is already being resolved on this screen.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        match self {
            Self::Event { locked, .. }
            | Self::RandomEvent { locked, .. }
            | Self::MiniGame { locked, .. } => *locked,
            _ => false,
        }
    }

    fn lock(&mut self) {
        if let Self::Event { locked, .. }
        | Self::RandomEvent { locked, .. }
        | Self::MiniGame { locked, .. } = self
        {
            *locked = true;
        }
    }
}

/// A profitable outcome on display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Celebration {
    pub pending: PendingCelebration,
    pub headline: String,
    #[serde(skip)]
    timer: Option<TimerId>,
}

#[derive(Debug, Clone, PartialEq)]
enum Task {
    Arm,
    Navigate(Screen),
    EndCelebration,
    ResolveCelebration(PendingCelebration),
    ResolveMiniGame { effects: Effects, exit: MiniGameExit },
    AssistantCheck,
}

/// Serializable view of a session for logs and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub seed: u64,
    pub elapsed_ms: u128,
    pub rng_draws: u64,
    pub state: GameState,
    pub celebration: Option<Celebration>,
    pub assistant: Option<AssistantPopup>,
}

pub struct GameSession<S> {
    state: GameState,
    catalog: &'static Catalog,
    config: GameConfig,
    rngs: RngBundle,
    scheduler: Scheduler<Task>,
    store: S,
    controller: ScreenController,
    celebration: Option<Celebration>,
    assistant: WarAssistant,
    cues: Vec<Cue>,
    save_failures: u32,
}

impl<S> GameSession<S>
where
    S: KeyValueStore,
    StorageError: From<S::Error>,
{
    /// Start a session on the disclaimer with the stored career record loaded.
    #[must_use]
    pub fn new(seed: u64, store: S, config: GameConfig) -> Self {
        let persistence = load_persistence(&store);
        let state = reduce(
            GameState::default(),
            Action::LoadPersistence(PersistencePatch::from(persistence)),
        );
        let mut session = Self {
            state,
            catalog: catalog(),
            config,
            rngs: RngBundle::from_user_seed(seed),
            scheduler: Scheduler::new(),
            store,
            controller: ScreenController::Title,
            celebration: None,
            assistant: WarAssistant::new(&config.assistant),
            cues: Vec::new(),
            save_failures: 0,
        };
        if session.assistant.is_enabled() {
            session
                .scheduler
                .schedule_detached(config.timings.assistant_interval(), Task::AssistantCheck);
        }
        session.mount();
        session
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub const fn controller(&self) -> &ScreenController {
        &self.controller
    }

    #[must_use]
    pub const fn celebration(&self) -> Option<&Celebration> {
        self.celebration.as_ref()
    }

    #[must_use]
    pub const fn assistant(&self) -> &WarAssistant {
        &self.assistant
    }

    #[must_use]
    pub const fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rngs.seed()
    }

    /// Virtual time since the session started.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Saves that failed and were skipped.
    #[must_use]
    pub const fn save_failures(&self) -> u32 {
        self.save_failures
    }

    /// Whether a timer is about to move the run along without input.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        self.controller.is_locked()
            || self.celebration.is_some()
            || self.scheduler.pending_on_mount() > 0
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            seed: self.rngs.seed(),
            elapsed_ms: self.scheduler.now().as_millis(),
            rng_draws: self.rngs.total_draws(),
            state: self.state.clone(),
            celebration: self.celebration.clone(),
            assistant: self.assistant.showing().cloned(),
        }
    }

    /// Take every cue emitted since the last drain.
    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    fn cue(&mut self, cue: Cue) {
        if self.state.sound_enabled {
            self.cues.push(cue);
        }
    }

    /// Reduce `action` into the state. Saves when the career record changes and
    /// remounts the screen controller when the run moves.
    pub fn dispatch(&mut self, action: Action) {
        let remount = matches!(
            action,
            Action::Navigate(_) | Action::StartGame | Action::ResetGame
        );
        let before_screen = self.state.current_screen;
        self.apply(action);
        if remount || self.state.current_screen != before_screen {
            self.mount();
        }
    }

    /// Dispatch a JSON-encoded action. Returns `false` if it was not understood.
    pub fn dispatch_json(&mut self, raw: &str) -> bool {
        match Action::parse(raw) {
            Some(action) => {
                self.dispatch(action);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, action: Action) {
        log::trace!("dispatch {}", action.name());
        let before = self.state.persistence.clone();
        self.state = reduce(std::mem::take(&mut self.state), action);
        if self.state.persistence != before {
            self.persist();
        }
    }

    fn persist(&mut self) {
        if let Err(err) = save_persistence(&self.store, &self.state.persistence) {
            self.save_failures += 1;
            log::warn!("failed to save career record: {err}");
        }
    }

    fn navigate(&mut self, screen: Screen) {
        self.dispatch(Action::Navigate(screen));
    }

    fn mount(&mut self) {
        self.scheduler.remount();
        self.celebration = None;
        let screen = self.state.current_screen;
        log::debug!("mount {screen}");
        let timings = self.config.timings;
        self.controller = match screen {
            Screen::Disclaimer => {
                self.scheduler.schedule(timings.disclaimer_arm(), Task::Arm);
                ScreenController::Disclaimer { armed: false }
            }
            Screen::Title => ScreenController::Title,
            Screen::RoleSelect => ScreenController::RoleSelect {
                roles: self
                    .catalog
                    .unlocked_roles(&self.state.persistence)
                    .into_iter()
                    .cloned()
                    .collect(),
            },
            Screen::CountrySelect => ScreenController::CountrySelect,
            Screen::IncomingTransmission => ScreenController::Transmission {
                briefing: self
                    .catalog
                    .transmission
                    .briefing(self.state.selected_country.as_ref()),
            },
            Screen::Event => match pick(self.rngs.events(), &self.catalog.events) {
                Some(event) => ScreenController::Event {
                    event: event.clone(),
                    locked: false,
                },
                None => ScreenController::Title,
            },
            Screen::RandomEvent => match pick(self.rngs.events(), &self.catalog.random_events) {
                Some(event) => ScreenController::RandomEvent {
                    event: event.clone(),
                    locked: false,
                },
                None => ScreenController::Title,
            },
            Screen::Redaction
            | Screen::PressBriefing
            | Screen::DroneStrike
            | Screen::SuperPac
            | Screen::Sanctions => {
                match ActiveMiniGame::start(screen, &self.catalog.minigames, self.rngs.minigames()) {
                    Some(game) => ScreenController::MiniGame {
                        game,
                        locked: false,
                    },
                    None => ScreenController::Title,
                }
            }
            Screen::Death => {
                self.apply(Action::RegisterDeath);
                self.cue(Cue::Error);
                self.scheduler.schedule(timings.restart_arm(), Task::Arm);
                log::info!(
                    "run ended in death; career deaths {}",
                    self.state.persistence.cholera_deaths
                );
                ScreenController::Death {
                    variant: pick(self.rngs.flavor(), &self.catalog.flavor.death_variants).cloned(),
                    armed: false,
                }
            }
            Screen::Victory => {
                self.apply(Action::RegisterVictory);
                self.cue(Cue::Success);
                self.scheduler.schedule(timings.restart_arm(), Task::Arm);
                let summary = VictorySummary::new(
                    self.catalog,
                    self.state.stats,
                    self.state.persistence.clone(),
                );
                log::info!(
                    "victory: {:?} with {} oil",
                    summary.ending,
                    self.state.stats.oil
                );
                ScreenController::Victory {
                    summary: Box::new(summary),
                    armed: false,
                }
            }
        };
    }

    /// Apply one player input. Returns `false` if the current screen ignored it.
    pub fn handle(&mut self, input: Input) -> bool {
        match input {
            Input::ToggleSound => {
                self.dispatch(Action::ToggleSound);
                self.cue(Cue::Select);
                return true;
            }
            Input::Abandon => {
                self.cue(Cue::Error);
                self.dispatch(Action::ResetGame);
                return true;
            }
            Input::AssistantPick(index) => return self.assistant_pick(index),
            Input::AssistantDismiss => return self.assistant.dismiss(),
            Input::AssistantDisable => return self.assistant_disable(),
            _ => {}
        }

        if self.celebration.is_some() {
            return input == Input::Confirm && self.acknowledge_celebration();
        }

        match (&self.controller, input) {
            (ScreenController::Disclaimer { armed: true }, Input::Confirm) => {
                self.cue(Cue::Type);
                self.navigate(Screen::Title);
                true
            }
            (ScreenController::Title, Input::Confirm) => {
                self.cue(Cue::Type);
                self.dispatch(Action::StartGame);
                true
            }
            (ScreenController::RoleSelect { roles }, Input::Choose(index)) => {
                let Some(role) = roles.get(index).cloned() else {
                    return false;
                };
                self.cue(Cue::Select);
                self.dispatch(Action::SelectRole(role));
                true
            }
            (ScreenController::CountrySelect, Input::Choose(index)) => {
                let Some(country) = self.catalog.countries.get(index).cloned() else {
                    return false;
                };
                self.cue(Cue::Select);
                self.dispatch(Action::SelectCountry(country));
                true
            }
            (ScreenController::Transmission { .. }, Input::Choose(index)) => {
                let Some(option) = self.catalog.transmission.options.get(index) else {
                    return false;
                };
                let target = option.target;
                self.cue(if target == Screen::Death {
                    Cue::Error
                } else {
                    Cue::Type
                });
                self.navigate(target);
                true
            }
            (ScreenController::Event { locked: false, .. }, Input::Choose(index)) => {
                self.choose(index, ChoiceOrigin::Event)
            }
            (ScreenController::RandomEvent { locked: false, .. }, Input::Choose(index)) => {
                self.choose(index, ChoiceOrigin::RandomEvent)
            }
            (ScreenController::MiniGame { locked: false, .. }, input) => self.play(input),
            (
                ScreenController::Death { armed: true, .. }
                | ScreenController::Victory { armed: true, .. },
                Input::Confirm,
            ) => {
                self.cue(Cue::Type);
                self.dispatch(Action::StartGame);
                true
            }
            _ => false,
        }
    }

    fn choose(&mut self, index: usize, origin: ChoiceOrigin) -> bool {
        let (title, option) = match &self.controller {
            ScreenController::Event { event, .. } => (&event.title, event.options.get(index)),
            ScreenController::RandomEvent { event, .. } => {
                (&event.title, event.options.get(index))
            }
            _ => return false,
        };
        let Some(option) = option else {
            return false;
        };
        let request = ChoiceRequest {
            state: &self.state,
            title,
            option,
            origin,
        };
        let outcome = resolve_choice(&request, &mut self.rngs, &self.config.odds);
        self.controller.lock();
        self.cue(Cue::Type);
        for action in outcome.actions {
            self.apply(action);
        }
        self.resolve(outcome.resolution);
        true
    }

    fn resolve(&mut self, resolution: Resolution) {
        let delay = self.config.timings.navigation_delay();
        match resolution {
            Resolution::Death => {
                self.navigate(Screen::Death);
            }
            Resolution::Victory => {
                self.cue(Cue::Success);
                self.scheduler.schedule(delay, Task::Navigate(Screen::Victory));
            }
            Resolution::Navigate(screen) => {
                self.cue(Cue::Success);
                self.scheduler.schedule(delay, Task::Navigate(screen));
            }
            Resolution::Celebrate(pending) => {
                self.cue(Cue::Success);
                let headline = pick(self.rngs.flavor(), &self.catalog.flavor.celebrations)
                    .cloned()
                    .unwrap_or_default();
                let timer = self
                    .scheduler
                    .schedule(self.config.timings.celebration(), Task::EndCelebration);
                self.celebration = Some(Celebration {
                    pending,
                    headline,
                    timer: Some(timer),
                });
            }
        }
    }

    fn acknowledge_celebration(&mut self) -> bool {
        let Some(celebration) = self.celebration.take() else {
            return false;
        };
        if let Some(timer) = celebration.timer {
            self.scheduler.cancel(timer);
        }
        self.scheduler.schedule(
            self.config.timings.post_celebration(),
            Task::ResolveCelebration(celebration.pending),
        );
        true
    }

    fn play(&mut self, input: Input) -> bool {
        let ScreenController::MiniGame { game, .. } = &mut self.controller else {
            return false;
        };
        let mut cue = Cue::Type;
        let progress = match (game, input) {
            (ActiveMiniGame::Redaction(game), Input::Redact(id)) => {
                if !game.redact(id) {
                    return false;
                }
                Progress::Pending
            }
            (ActiveMiniGame::Redaction(game), Input::Declassify) => game.declassify(),
            (ActiveMiniGame::PressBriefing(game), Input::Choose(index)) => {
                if !game.accepting_answers() {
                    return false;
                }
                game.answer(index, self.rngs.death())
            }
            (ActiveMiniGame::DroneStrike(game), Input::Strike) => {
                cue = Cue::Bomb;
                game.strike()
            }
            (ActiveMiniGame::DroneStrike(game), Input::Abort) => {
                cue = Cue::Select;
                game.abort()
            }
            (ActiveMiniGame::SuperPac(game), Input::Route(index)) => match game.route(index) {
                Some(progress) => progress,
                None => return false,
            },
            (ActiveMiniGame::Sanctions(game), Input::Block(id)) => match game.block(id) {
                Some(crate::minigames::sanctions::ShipKind::Medical) => {
                    cue = Cue::Error;
                    Progress::Pending
                }
                Some(_) => Progress::Pending,
                None => return false,
            },
            (ActiveMiniGame::Sanctions(game), Input::Confirm) => {
                if !game.awaiting_report() {
                    return false;
                }
                game.finish()
            }
            _ => return false,
        };
        self.cue(cue);
        self.on_progress(progress);
        true
    }

    fn on_progress(&mut self, progress: Progress) {
        match progress {
            Progress::Pending => {}
            Progress::Apply(effects) => self.apply(Action::ModifyStats(effects)),
            Progress::Finished(result) => self.finish_mini_game(result),
        }
    }

    fn finish_mini_game(&mut self, result: MiniGameResult) {
        let MiniGameResult {
            effects,
            exit,
            history,
        } = result;
        self.controller.lock();
        self.apply(Action::ModifyStats(effects));
        if let Some(entry) = history {
            self.apply(Action::AddHistory(entry));
        }
        self.cue(match exit {
            MiniGameExit::Death => Cue::Error,
            MiniGameExit::Continue => Cue::Success,
        });
        self.scheduler.schedule(
            self.config.timings.mini_game_resolve(),
            Task::ResolveMiniGame { effects, exit },
        );
    }

    fn assistant_pick(&mut self, index: usize) -> bool {
        let Some(effects) = self.assistant.pick(index) else {
            return false;
        };
        self.cue(Cue::Type);
        self.apply(Action::ModifyStats(effects));
        true
    }

    fn assistant_disable(&mut self) -> bool {
        let Some(penalty) = self.assistant.disable() else {
            return false;
        };
        self.cue(Cue::Error);
        self.apply(Action::ModifyStats(penalty));
        true
    }

    /// Advance virtual time, firing timers and ticking the active mini-game.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.scheduler.now() + dt;
        while self.scheduler.now() < target {
            let start = self.scheduler.now();
            let frame_end = (start + FRAME).min(target);
            while let Some(task) = self.scheduler.pop_due(frame_end) {
                self.run(task);
            }
            self.scheduler.advance_clock_to(frame_end);
            self.tick_mini_game(frame_end.saturating_sub(start));
        }
        // Timers due exactly at the target fire before returning.
        while let Some(task) = self.scheduler.pop_due(target) {
            self.run(task);
        }
    }

    fn tick_mini_game(&mut self, dt: Duration) {
        let ScreenController::MiniGame {
            game,
            locked: false,
        } = &mut self.controller
        else {
            return;
        };
        let progress = game.tick(dt, self.rngs.minigames());
        self.on_progress(progress);
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::Arm => match &mut self.controller {
                ScreenController::Disclaimer { armed }
                | ScreenController::Death { armed, .. }
                | ScreenController::Victory { armed, .. } => *armed = true,
                _ => {}
            },
            Task::Navigate(screen) => self.navigate(screen),
            Task::EndCelebration => {
                self.acknowledge_celebration();
            }
            Task::ResolveCelebration(pending) => {
                let screen = complete_celebration(&pending, &mut self.rngs, &self.config.odds);
                self.navigate(screen);
            }
            Task::ResolveMiniGame { effects, exit } => {
                let resolution = resolve_mini_game(&self.state, &effects, exit);
                match resolution {
                    Resolution::Navigate(screen) => self.navigate(screen),
                    other => self.resolve(other),
                }
            }
            Task::AssistantCheck => self.check_assistant(),
        }
    }

    fn check_assistant(&mut self) {
        if !self.assistant.is_enabled() {
            return;
        }
        let shown = self
            .assistant
            .check(
                self.state.current_screen,
                &self.state.stats,
                &self.catalog.assistant,
                &self.config.assistant,
                self.rngs.assistant(),
            )
            .is_some();
        if shown {
            self.cue(Cue::Clippy);
        }
        self.scheduler.schedule_detached(
            self.config.timings.assistant_interval(),
            Task::AssistantCheck,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssistantConfig;
    use crate::storage::{MemoryStore, PERSISTENCE_KEY};

    fn quiet_config() -> GameConfig {
        GameConfig {
            assistant: AssistantConfig {
                enabled: false,
                ..AssistantConfig::default()
            },
            ..GameConfig::default()
        }
    }

    fn session(seed: u64) -> GameSession<MemoryStore> {
        GameSession::new(seed, MemoryStore::new(), quiet_config())
    }

    fn to_event(session: &mut GameSession<MemoryStore>) {
        session.advance(Duration::from_millis(500));
        assert!(session.handle(Input::Confirm));
        assert!(session.handle(Input::Confirm));
        assert!(session.handle(Input::Choose(0)));
        assert!(session.handle(Input::Choose(0)));
        assert_eq!(
            session.state().current_screen,
            Screen::IncomingTransmission
        );
        assert!(session.handle(Input::Choose(1)));
        assert_eq!(session.state().current_screen, Screen::Event);
    }

    #[test]
    fn disclaimer_ignores_early_input() {
        let mut session = session(1);
        assert!(!session.handle(Input::Confirm));
        session.advance(Duration::from_millis(499));
        assert!(!session.handle(Input::Confirm));
        session.advance(Duration::from_millis(1));
        assert!(session.handle(Input::Confirm));
        assert_eq!(session.state().current_screen, Screen::Title);
    }

    #[test]
    fn walkthrough_reaches_an_event() {
        let mut session = session(2);
        to_event(&mut session);
        assert!(session.state().show_status_bar);
        assert!(matches!(
            session.controller(),
            ScreenController::Event { locked: false, .. }
        ));
    }

    #[test]
    fn choice_locks_event_until_navigation() {
        let mut session = session(3);
        to_event(&mut session);
        let ScreenController::Event { event, .. } = session.controller().clone() else {
            panic!("expected event");
        };
        let index = event
            .options
            .iter()
            .position(|o| !o.is_ethical && !o.effects.is_profitable())
            .unwrap_or(0);
        assert!(session.handle(Input::Choose(index)));
        assert!(!session.handle(Input::Choose(index)));
        assert_eq!(session.state().stats.event_count, 1);
        assert_eq!(session.state().history.len(), 1);
    }

    #[test]
    fn sustainable_response_dies_and_is_recorded() {
        let mut session = session(4);
        session.advance(Duration::from_millis(500));
        session.handle(Input::Confirm);
        session.handle(Input::Confirm);
        session.handle(Input::Choose(0));
        session.handle(Input::Choose(0));
        assert!(session.handle(Input::Choose(0)));
        assert_eq!(session.state().current_screen, Screen::Death);
        assert_eq!(session.state().persistence.cholera_deaths, 1);
        let saved = session.store().get(PERSISTENCE_KEY).unwrap().unwrap();
        assert!(saved.contains("\"choleraDeaths\":1"));

        assert!(!session.handle(Input::Confirm));
        session.advance(Duration::from_secs(2));
        assert!(session.handle(Input::Confirm));
        assert_eq!(session.state().current_screen, Screen::RoleSelect);
    }

    #[test]
    fn abandon_resets_to_disclaimer_and_counts_a_death() {
        let mut session = session(5);
        to_event(&mut session);
        assert!(session.handle(Input::Abandon));
        assert_eq!(session.state().current_screen, Screen::Disclaimer);
        assert_eq!(session.state().persistence.cholera_deaths, 1);
        assert!(matches!(
            session.controller(),
            ScreenController::Disclaimer { armed: false }
        ));
    }

    #[test]
    fn stale_navigation_timer_is_dropped_on_screen_change() {
        let mut session = session(6);
        to_event(&mut session);
        let ScreenController::Event { event, .. } = session.controller().clone() else {
            panic!("expected event");
        };
        let Some(index) = event
            .options
            .iter()
            .position(|o| !o.is_ethical && !o.effects.is_profitable())
        else {
            return;
        };
        session.handle(Input::Choose(index));
        // Leave before the navigation delay elapses.
        session.handle(Input::Abandon);
        session.advance(Duration::from_secs(1));
        assert_eq!(session.state().current_screen, Screen::Disclaimer);
    }

    #[test]
    fn cues_respect_sound_toggle() {
        let mut session = session(7);
        session.advance(Duration::from_millis(500));
        session.handle(Input::Confirm);
        assert_eq!(session.drain_cues(), vec![Cue::Type]);
        session.handle(Input::ToggleSound);
        assert!(session.drain_cues().is_empty());
        session.handle(Input::Confirm);
        assert!(session.drain_cues().is_empty());
    }

    #[test]
    fn dispatch_json_routes_through_the_reducer() {
        let mut session = session(8);
        assert!(session.dispatch_json(r#"{"type":"NAVIGATE","payload":"SUPER_PAC"}"#));
        assert!(matches!(
            session.controller(),
            ScreenController::MiniGame {
                game: ActiveMiniGame::SuperPac(_),
                ..
            }
        ));
        assert!(!session.dispatch_json(r#"{"type":"SELF_DESTRUCT"}"#));
        assert_eq!(session.state().current_screen, Screen::SuperPac);
    }

    #[test]
    fn routing_to_a_missing_shell_is_rejected() {
        let mut session = session(9);
        session.dispatch(Action::Navigate(Screen::SuperPac));
        session.drain_cues();
        let before = session.state().clone();
        assert!(!session.handle(Input::Route(99)));
        assert!(session.drain_cues().is_empty());
        assert_eq!(session.state(), &before);
        let ScreenController::MiniGame {
            game: ActiveMiniGame::SuperPac(game),
            ..
        } = session.controller()
        else {
            panic!("super PAC should still be running");
        };
        assert_eq!(game.routed(), 0);
        assert!(session.handle(Input::Route(0)));
    }

    #[test]
    fn super_pac_payout_celebrates_then_returns_to_events() {
        let mut session = session(9);
        session.dispatch(Action::Navigate(Screen::SuperPac));
        for _ in 0..5 {
            assert!(session.handle(Input::Route(0)));
        }
        assert_eq!(session.state().stats.treasury, 15);
        session.advance(Duration::from_millis(1_500));
        assert!(session.celebration().is_some());
        assert!(session.handle(Input::Confirm));
        session.advance(Duration::from_millis(100));
        assert_eq!(session.state().current_screen, Screen::Event);
    }

    #[test]
    fn assistant_disable_applies_penalty() {
        let config = GameConfig {
            assistant: AssistantConfig {
                enabled: true,
                intervention_check: 1.0,
                quote_chance: 1.0,
            },
            ..GameConfig::default()
        };
        let mut session = GameSession::new(10, MemoryStore::new(), config);
        to_event(&mut session);
        session.advance(Duration::from_secs(5));
        assert!(session.assistant().showing().is_some());
        let before = session.state().stats.cholera_risk;
        assert!(session.handle(Input::AssistantDisable));
        assert_eq!(session.state().stats.cholera_risk, before + 10);
        assert!(!session.handle(Input::AssistantDisable));
    }
}
