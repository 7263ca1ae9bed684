//! Choice resolution: stat deltas, the ethical death roll, celebrations, and
//! the next-screen roll.
//!
//! Nothing here touches [`GameState`] directly. Each call returns the actions to
//! dispatch plus a [`Resolution`] telling the session where the run goes next.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::catalog::OptionDefinition;
use crate::config::SelectorOdds;
use crate::rng::{RngBundle, pick, roll_percent};
use crate::screen::{MINI_GAMES, Screen};
use crate::state::{GameState, HistoryEntry};
use crate::stats::{Effects, PERCENT_MAX, PERCENT_MIN, StatKey};

/// Where a choice was made. Interstitials never roll straight into another roll
/// after a celebration; they return to the event flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceOrigin {
    Event,
    RandomEvent,
}

pub struct ChoiceRequest<'a> {
    pub state: &'a GameState,
    pub title: &'a str,
    pub option: &'a OptionDefinition,
    pub origin: ChoiceOrigin,
}

/// What happens once a celebration is acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowUp {
    Roll {
        mini_game: Option<Screen>,
        chaos: i32,
    },
    Fixed(Screen),
}

/// A profitable outcome waiting on its celebratory display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCelebration {
    pub gains: Effects,
    pub projected_oil: i32,
    pub follow_up: FollowUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Death,
    Victory,
    Celebrate(PendingCelebration),
    Navigate(Screen),
}

impl Resolution {
    /// Screen this resolution lands on without further input, if any.
    #[must_use]
    pub const fn target(&self) -> Option<Screen> {
        match self {
            Self::Death => Some(Screen::Death),
            Self::Victory => Some(Screen::Victory),
            Self::Navigate(screen) => Some(*screen),
            Self::Celebrate(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOutcome {
    /// Dispatch these in order before acting on the resolution.
    pub actions: Vec<Action>,
    pub resolution: Resolution,
}

/// Mini-game verdict handed to [`resolve_mini_game`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MiniGameExit {
    Continue,
    Death,
}

/// Resolve a player's pick on a narrative event or interstitial.
pub fn resolve_choice(
    request: &ChoiceRequest<'_>,
    rngs: &mut RngBundle,
    odds: &SelectorOdds,
) -> ChoiceOutcome {
    let ChoiceRequest {
        state,
        title,
        option,
        origin,
    } = *request;
    let stats = &state.stats;
    let effects = option.effects;

    let mut payload = effects;
    if month_ticks(stats.event_count, odds.month_cadence) {
        payload.set(StatKey::Month, payload.month.saturating_add(1));
    }
    let actions = vec![
        Action::ModifyStats(payload),
        Action::AddHistory(HistoryEntry::new(title, option.id.as_str(), effects)),
    ];

    let new_cholera = stats.cholera_risk.saturating_add(effects.cholera_risk);
    // Chaos past 100 keeps raising the interstitial odds toward the mini-game ceiling.
    let new_chaos = stats.chaos.saturating_add(effects.chaos).max(0);

    if option.is_ethical && ethical_death_roll(new_cholera, rngs) {
        log::info!("ethical choice {} killed the run at risk {new_cholera}", option.id);
        return ChoiceOutcome {
            actions,
            resolution: Resolution::Death,
        };
    }

    let projected_oil = stats.oil.saturating_add(effects.oil);
    if effects.is_profitable() && !option.is_ethical {
        let follow_up = match origin {
            ChoiceOrigin::Event => FollowUp::Roll {
                mini_game: option.mini_game,
                chaos: new_chaos,
            },
            ChoiceOrigin::RandomEvent => FollowUp::Fixed(Screen::Event),
        };
        return ChoiceOutcome {
            actions,
            resolution: Resolution::Celebrate(PendingCelebration {
                gains: effects,
                projected_oil,
                follow_up,
            }),
        };
    }

    if projected_oil >= odds.victory_oil {
        return ChoiceOutcome {
            actions,
            resolution: Resolution::Victory,
        };
    }

    ChoiceOutcome {
        actions,
        resolution: Resolution::Navigate(next_screen(option.mini_game, new_chaos, rngs, odds)),
    }
}

/// Whether the mutation after `event_count` prior ones advances the month.
#[must_use]
pub const fn month_ticks(event_count: u32, cadence: u32) -> bool {
    cadence != 0 && (event_count.saturating_add(1)) % cadence == 0
}

/// Cholera roll for an ethical choice. Draws only when the outcome is uncertain.
pub fn ethical_death_roll(risk: i32, rngs: &mut RngBundle) -> bool {
    if risk >= PERCENT_MAX {
        return true;
    }
    if risk <= PERCENT_MIN {
        return false;
    }
    let roll = roll_percent(rngs.death());
    log::debug!("death roll {roll:.2} against risk {risk}");
    roll < f64::from(risk)
}

/// Next screen after a non-terminal choice.
pub fn next_screen(
    mini_game: Option<Screen>,
    chaos: i32,
    rngs: &mut RngBundle,
    odds: &SelectorOdds,
) -> Screen {
    if let Some(screen) = mini_game {
        return screen;
    }
    let roll = roll_percent(rngs.selector());
    let screen = if roll < odds.random_event_threshold(chaos) {
        Screen::RandomEvent
    } else if roll < odds.mini_game_ceiling {
        pick(rngs.selector(), &MINI_GAMES)
            .copied()
            .unwrap_or(Screen::Event)
    } else {
        Screen::Event
    };
    log::debug!("next-screen roll {roll:.2} at chaos {chaos} -> {screen}");
    screen
}

/// Screen to show once a celebration has been acknowledged.
pub fn complete_celebration(
    pending: &PendingCelebration,
    rngs: &mut RngBundle,
    odds: &SelectorOdds,
) -> Screen {
    if pending.projected_oil >= odds.victory_oil {
        return Screen::Victory;
    }
    match pending.follow_up {
        FollowUp::Roll { mini_game, chaos } => next_screen(mini_game, chaos, rngs, odds),
        FollowUp::Fixed(screen) => screen,
    }
}

/// Shared tail of every mini-game. `state_after` already has `effects` applied.
#[must_use]
pub fn resolve_mini_game(state_after: &GameState, effects: &Effects, exit: MiniGameExit) -> Resolution {
    if exit == MiniGameExit::Death {
        return Resolution::Death;
    }
    if effects.is_profitable() {
        return Resolution::Celebrate(PendingCelebration {
            gains: *effects,
            projected_oil: state_after.stats.oil,
            follow_up: FollowUp::Fixed(Screen::Event),
        });
    }
    Resolution::Navigate(Screen::Event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::reduce;

    fn option(effects: Effects, is_ethical: bool, mini_game: Option<Screen>) -> OptionDefinition {
        OptionDefinition {
            id: "TEST".to_string(),
            label: "Test".to_string(),
            description: String::new(),
            effects,
            is_ethical,
            mini_game,
        }
    }

    fn run(state: &GameState, option: &OptionDefinition, seed: u64) -> ChoiceOutcome {
        let request = ChoiceRequest {
            state,
            title: "TEST EVENT",
            option,
            origin: ChoiceOrigin::Event,
        };
        resolve_choice(
            &request,
            &mut RngBundle::from_user_seed(seed),
            &SelectorOdds::default(),
        )
    }

    fn apply(state: GameState, actions: &[Action]) -> GameState {
        actions.iter().cloned().fold(state, reduce)
    }

    #[test]
    fn profitable_choice_defers_to_celebration() {
        let state = GameState::default();
        let pick = option(Effects::default().with(StatKey::Oil, 15), false, None);
        let outcome = run(&state, &pick, 1);
        match outcome.resolution {
            Resolution::Celebrate(pending) => {
                assert_eq!(pending.projected_oil, 15);
                assert_eq!(pending.gains.oil, 15);
            }
            other => panic!("expected celebration, got {other:?}"),
        }
        assert_eq!(outcome.actions.len(), 2);
    }

    #[test]
    fn near_victory_celebration_lands_on_victory() {
        let mut state = GameState::default();
        state.stats.oil = 95;
        let pick = option(Effects::default().with(StatKey::Oil, 10), false, None);
        let outcome = run(&state, &pick, 2);
        let Resolution::Celebrate(pending) = outcome.resolution else {
            panic!("expected celebration");
        };
        assert_eq!(pending.projected_oil, 105);
        let mut rngs = RngBundle::from_user_seed(2);
        assert_eq!(
            complete_celebration(&pending, &mut rngs, &SelectorOdds::default()),
            Screen::Victory
        );
        assert_eq!(rngs.total_draws(), 0);

        let after = apply(state, &outcome.actions);
        assert_eq!(after.stats.oil, 100);
    }

    #[test]
    fn unprofitable_victory_skips_celebration() {
        let mut state = GameState::default();
        state.stats.oil = 100;
        let pick = option(Effects::default().with(StatKey::Approval, -5), false, None);
        assert_eq!(run(&state, &pick, 3).resolution, Resolution::Victory);
    }

    #[test]
    fn ethical_choice_at_full_risk_always_dies() {
        let mut state = GameState::default();
        state.stats.cholera_risk = 90;
        let pick = option(
            Effects::default()
                .with(StatKey::CholeraRisk, 20)
                .with(StatKey::Oil, 30),
            true,
            None,
        );
        let outcome = run(&state, &pick, 4);
        assert_eq!(outcome.resolution, Resolution::Death);
        assert!(matches!(outcome.actions[1], Action::AddHistory(_)));
    }

    #[test]
    fn ethical_profit_is_never_celebrated() {
        let pick = option(Effects::default().with(StatKey::Treasury, 5), true, None);
        let outcome = run(&GameState::default(), &pick, 5);
        assert!(matches!(outcome.resolution, Resolution::Navigate(_)));
    }

    #[test]
    fn zero_risk_never_draws() {
        let mut rngs = RngBundle::from_user_seed(6);
        assert!(!ethical_death_roll(0, &mut rngs));
        assert!(!ethical_death_roll(-20, &mut rngs));
        assert!(ethical_death_roll(100, &mut rngs));
        assert_eq!(rngs.total_draws(), 0);
    }

    #[test]
    fn planned_mini_game_wins_without_rolling() {
        let mut rngs = RngBundle::from_user_seed(7);
        let odds = SelectorOdds::default();
        assert_eq!(
            next_screen(Some(Screen::DroneStrike), 100, &mut rngs, &odds),
            Screen::DroneStrike
        );
        assert_eq!(rngs.total_draws(), 0);
    }

    #[test]
    fn max_chaos_makes_interstitials_dominate_the_low_band() {
        let odds = SelectorOdds::default();
        let mut rngs = RngBundle::from_user_seed(8);
        for _ in 0..500 {
            let screen = next_screen(None, 100, &mut rngs, &odds);
            assert!(matches!(screen, Screen::RandomEvent | Screen::Event));
        }
    }

    #[test]
    fn month_tick_is_folded_into_the_choice() {
        let mut state = GameState::default();
        state.stats.event_count = 2;
        let pick = option(Effects::default().with(StatKey::Approval, 1), false, None);
        let outcome = run(&state, &pick, 9);
        match &outcome.actions[..] {
            [Action::ModifyStats(payload), Action::AddHistory(entry)] => {
                assert_eq!(payload.month, 1);
                assert_eq!(entry.effects.month, 0);
                assert_eq!(entry.event, "TEST EVENT");
            }
            other => panic!("unexpected actions {other:?}"),
        }
        assert!(!month_ticks(0, 3));
        assert!(month_ticks(5, 3));
    }

    #[test]
    fn interstitial_celebration_returns_to_events() {
        let state = GameState::default();
        let pick = option(Effects::default().with(StatKey::Treasury, 20), false, None);
        let request = ChoiceRequest {
            state: &state,
            title: "CONTRACTOR",
            option: &pick,
            origin: ChoiceOrigin::RandomEvent,
        };
        let mut rngs = RngBundle::from_user_seed(10);
        let outcome = resolve_choice(&request, &mut rngs, &SelectorOdds::default());
        let Resolution::Celebrate(pending) = outcome.resolution else {
            panic!("expected celebration");
        };
        assert_eq!(pending.follow_up, FollowUp::Fixed(Screen::Event));
    }

    #[test]
    fn mini_game_tail() {
        let mut state = GameState::default();
        state.stats.oil = 100;
        let gains = Effects::default().with(StatKey::Oil, 12);
        let Resolution::Celebrate(pending) = resolve_mini_game(&state, &gains, MiniGameExit::Continue)
        else {
            panic!("expected celebration");
        };
        assert_eq!(pending.projected_oil, 100);
        assert_eq!(
            resolve_mini_game(&state, &gains, MiniGameExit::Death),
            Resolution::Death
        );
        assert_eq!(
            resolve_mini_game(&state, &Effects::default(), MiniGameExit::Continue),
            Resolution::Navigate(Screen::Event)
        );
    }
}
