//! The pure state transition function.

use crate::action::Action;
use crate::screen::Screen;
use crate::state::GameState;

/// Apply one action and return the replacement state.
///
/// Total over every [`Action`]; nothing here reads randomness or the clock.
#[must_use]
pub fn reduce(state: GameState, action: Action) -> GameState {
    let mut next = state;
    match action {
        Action::StartGame => {
            let mut fresh = GameState::fresh_run(next.persistence, next.sound_enabled);
            fresh.current_screen = Screen::RoleSelect;
            return fresh;
        }
        Action::ResetGame => {
            let mut persistence = next.persistence;
            persistence.record_death();
            return GameState::fresh_run(persistence, next.sound_enabled);
        }
        Action::SelectRole(role) => {
            next.player_role = Some(role);
            next.current_screen = Screen::CountrySelect;
            next.show_status_bar = true;
        }
        Action::SelectCountry(country) => {
            next.selected_country = Some(country);
            next.current_screen = Screen::IncomingTransmission;
        }
        Action::Navigate(screen) => next.current_screen = screen,
        Action::ModifyStats(effects) => next.stats.apply(&effects),
        Action::AddHistory(entry) => next.history.push(entry),
        Action::RegisterDeath => next.persistence.record_death(),
        Action::RegisterVictory => {
            let oil = next.stats.oil;
            next.persistence.record_victory(oil);
        }
        Action::ToggleSound => next.sound_enabled = !next.sound_enabled,
        Action::LoadPersistence(patch) => patch.merge_into(&mut next.persistence),
        Action::ShowStatusBar(visible) => next.show_status_bar = visible,
    }
    next
}

/// Reduce a JSON-encoded action; anything unparseable leaves the state untouched.
#[must_use]
pub fn reduce_json(state: GameState, raw: &str) -> GameState {
    match Action::parse(raw) {
        Some(action) => reduce(state, action),
        None => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Role;
    use crate::state::{HistoryEntry, Persistence, PersistencePatch};
    use crate::stats::{Effects, StatKey};

    fn diplomat() -> Role {
        Role {
            id: "DIPLOMAT".to_string(),
            name: "CAREER DIPLOMAT".to_string(),
            description: String::new(),
        }
    }

    fn mid_run() -> GameState {
        let mut state = reduce(GameState::default(), Action::StartGame);
        state = reduce(state, Action::SelectRole(diplomat()));
        state = reduce(
            state,
            Action::ModifyStats(Effects::default().with(StatKey::Oil, 40)),
        );
        state = reduce(
            state,
            Action::AddHistory(HistoryEntry::new("T", "X", Effects::default())),
        );
        state.persistence.total_oil_secured = 300;
        state.persistence.high_score = 90;
        state.sound_enabled = false;
        state
    }

    #[test]
    fn start_then_select_role_reaches_country_select() {
        let state = reduce(GameState::default(), Action::StartGame);
        assert_eq!(state.current_screen, Screen::RoleSelect);
        let state = reduce(state, Action::SelectRole(diplomat()));
        assert_eq!(state.current_screen, Screen::CountrySelect);
        assert!(state.show_status_bar);
        assert_eq!(state.player_role.map(|r| r.id).as_deref(), Some("DIPLOMAT"));
    }

    #[test]
    fn start_game_keeps_persistence_and_sound_only() {
        let state = reduce(mid_run(), Action::StartGame);
        assert_eq!(state.stats.oil, 0);
        assert!(state.history.is_empty());
        assert!(state.player_role.is_none());
        assert!(!state.sound_enabled);
        assert_eq!(state.persistence.total_oil_secured, 300);
        assert_eq!(state.current_screen, Screen::RoleSelect);
    }

    #[test]
    fn reset_game_counts_a_death_and_clears_the_run() {
        let before = mid_run();
        let deaths = before.persistence.cholera_deaths;
        let state = reduce(before, Action::ResetGame);
        assert_eq!(state.persistence.cholera_deaths, deaths + 1);
        assert_eq!(state.persistence.total_oil_secured, 300);
        assert_eq!(state.persistence.high_score, 90);
        assert_eq!(state.stats.oil, 0);
        assert_eq!(state.current_screen, Screen::Disclaimer);
        assert!(!state.sound_enabled);
    }

    #[test]
    fn register_victory_twice_adds_oil_twice() {
        let mut state = GameState::default();
        state.stats.oil = 60;
        state.persistence.high_score = 75;
        let state = reduce(state, Action::RegisterVictory);
        let state = reduce(state, Action::RegisterVictory);
        assert_eq!(state.persistence.total_oil_secured, 120);
        assert_eq!(state.persistence.high_score, 75);
    }

    #[test]
    fn register_victory_raises_high_score() {
        let mut state = GameState::default();
        state.stats.oil = 100;
        let state = reduce(state, Action::RegisterVictory);
        assert_eq!(state.persistence.high_score, 100);
    }

    #[test]
    fn flag_actions() {
        let state = reduce(GameState::default(), Action::ToggleSound);
        assert!(!state.sound_enabled);
        let state = reduce(state, Action::ShowStatusBar(true));
        assert!(state.show_status_bar);
        let state = reduce(state, Action::Navigate(Screen::Sanctions));
        assert_eq!(state.current_screen, Screen::Sanctions);
    }

    #[test]
    fn load_persistence_merges() {
        let state = reduce(
            GameState::default(),
            Action::LoadPersistence(PersistencePatch {
                high_score: Some(64),
                ..PersistencePatch::default()
            }),
        );
        assert_eq!(state.persistence.high_score, 64);
        assert_eq!(
            state.persistence.unlocked_roles,
            Persistence::default().unlocked_roles
        );
    }

    #[test]
    fn unknown_json_action_is_a_no_op() {
        let state = mid_run();
        let after = reduce_json(state.clone(), r#"{"type":"DECLARE_WAR","payload":1}"#);
        assert_eq!(after, state);
        let after = reduce_json(after, r#"{"type":"REGISTER_DEATH"}"#);
        assert_eq!(
            after.persistence.cholera_deaths,
            state.persistence.cholera_deaths + 1
        );
    }
}
