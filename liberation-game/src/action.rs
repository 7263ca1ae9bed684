use serde::{Deserialize, Serialize};

use crate::catalog::{Country, Role};
use crate::screen::Screen;
use crate::state::{HistoryEntry, PersistencePatch};
use crate::stats::Effects;

/// Named state transitions understood by [`crate::reduce`].
///
/// The JSON form is `{"type": "MODIFY_STATS", "payload": {...}}`, matching what a
/// presentation layer posts into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    StartGame,
    SelectRole(Role),
    SelectCountry(Country),
    Navigate(Screen),
    ModifyStats(Effects),
    AddHistory(HistoryEntry),
    RegisterDeath,
    RegisterVictory,
    ResetGame,
    ToggleSound,
    LoadPersistence(PersistencePatch),
    ShowStatusBar(bool),
}

impl Action {
    /// Parse a tagged JSON action. Unknown or malformed actions yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(action) => Some(action),
            Err(err) => {
                log::debug!("dropping unrecognised action: {err}");
                None
            }
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StartGame => "START_GAME",
            Self::SelectRole(_) => "SELECT_ROLE",
            Self::SelectCountry(_) => "SELECT_COUNTRY",
            Self::Navigate(_) => "NAVIGATE",
            Self::ModifyStats(_) => "MODIFY_STATS",
            Self::AddHistory(_) => "ADD_HISTORY",
            Self::RegisterDeath => "REGISTER_DEATH",
            Self::RegisterVictory => "REGISTER_VICTORY",
            Self::ResetGame => "RESET_GAME",
            Self::ToggleSound => "TOGGLE_SOUND",
            Self::LoadPersistence(_) => "LOAD_PERSISTENCE",
            Self::ShowStatusBar(_) => "SHOW_STATUS_BAR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatKey;

    #[test]
    fn parses_tagged_payloads() {
        let action = Action::parse(r#"{"type":"MODIFY_STATS","payload":{"oil":5}}"#);
        assert_eq!(
            action,
            Some(Action::ModifyStats(Effects::default().with(StatKey::Oil, 5)))
        );

        let action = Action::parse(r#"{"type":"NAVIGATE","payload":"SUPER_PAC"}"#);
        assert_eq!(action, Some(Action::Navigate(Screen::SuperPac)));

        assert_eq!(
            Action::parse(r#"{"type":"REGISTER_DEATH"}"#),
            Some(Action::RegisterDeath)
        );
    }

    #[test]
    fn role_payload_needs_only_an_id() {
        let action = Action::parse(r#"{"type":"SELECT_ROLE","payload":{"id":"DIPLOMAT"}}"#);
        match action {
            Some(Action::SelectRole(role)) => assert_eq!(role.id, "DIPLOMAT"),
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn unknown_types_parse_to_none() {
        assert_eq!(Action::parse(r#"{"type":"LAUNCH_NUKES"}"#), None);
        assert_eq!(Action::parse("not json"), None);
    }

    #[test]
    fn name_matches_wire_tag() {
        let json = serde_json::to_value(Action::ShowStatusBar(true)).unwrap();
        assert_eq!(json["type"], Action::ShowStatusBar(true).name());
    }
}
