//! Read-only content tables: roles, countries, narrative events, mini-game
//! tables, and flavor text. Parsed once from the bundled JSON assets.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::OnceLock;
use thiserror::Error;

use crate::ending::Ending;
use crate::screen::Screen;
use crate::state::Persistence;
use crate::stats::Effects;

/// Options per prompt stay small enough to live inline.
pub type OptionList = SmallVec<[OptionDefinition; 4]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub reserves: String,
    #[serde(default)]
    pub democracy_score: String,
}

/// A selectable answer on an event, interstitial, or press question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDefinition {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub effects: Effects,
    #[serde(default)]
    pub is_ethical: bool,
    #[serde(default)]
    pub mini_game: Option<Screen>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: String,
    pub title: String,
    pub text: String,
    pub options: OptionList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RandomEventKind {
    News,
    Phone,
    Tweet,
}

/// Short interstitial that interrupts the event flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomEvent {
    pub kind: RandomEventKind,
    pub title: String,
    pub text: String,
    pub options: OptionList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmissionOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub target: Screen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transmission {
    pub title: String,
    pub text: String,
    pub options: Vec<TransmissionOption>,
}

impl Transmission {
    /// Intelligence report text with the target country filled in.
    #[must_use]
    pub fn briefing(&self, country: Option<&Country>) -> String {
        let name = country.map_or("UNKNOWN", |c| c.name.as_str());
        self.text.replace("{country}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionTable {
    pub template: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressQuestion {
    pub prompt: String,
    pub answers: OptionList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressBriefingTable {
    pub questions: Vec<PressQuestion>,
    /// Answer recorded when the clock runs out.
    pub panic: OptionDefinition,
    pub completion: Effects,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneTarget {
    pub name: String,
    pub confidence: i32,
    pub oil: i32,
    pub war_crimes: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroneStrikeTable {
    pub targets: Vec<DroneTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellCompany {
    pub id: String,
    pub name: String,
    pub trace: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_ethical: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperPacTable {
    pub shells: Vec<ShellCompany>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniGameTables {
    pub redaction: RedactionTable,
    pub press_briefing: PressBriefingTable,
    pub drone_strike: DroneStrikeTable,
    pub super_pac: SuperPacTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathVariant {
    pub message: String,
    pub cause: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndingText {
    pub ending: Ending,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flavor {
    pub death_variants: Vec<DeathVariant>,
    pub endings: Vec<EndingText>,
    pub celebrations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssistantTrigger {
    Ethical,
    LowApproval,
    HighWarCrimes,
    LowTreasury,
    Random,
}

impl AssistantTrigger {
    pub const ALL: [Self; 5] = [
        Self::Ethical,
        Self::LowApproval,
        Self::HighWarCrimes,
        Self::LowTreasury,
        Self::Random,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantOption {
    pub label: String,
    #[serde(default)]
    pub effects: Effects,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervention {
    pub trigger: AssistantTrigger,
    pub message: String,
    pub options: Vec<AssistantOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantContent {
    pub quotes: Vec<String>,
    pub interventions: Vec<Intervention>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse {table} table: {source}")]
    Parse {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{table} table is empty")]
    EmptyTable { table: &'static str },
    #[error("option {option} routes to {screen}, which is not a mini-game")]
    NotAMiniGame { option: String, screen: Screen },
    #[error("no assistant intervention for trigger {0:?}")]
    MissingIntervention(AssistantTrigger),
    #[error("no text for ending {0:?}")]
    MissingEnding(Ending),
}

/// Raw JSON for each table.
#[derive(Debug, Clone, Copy)]
pub struct CatalogSources<'a> {
    pub roles: &'a str,
    pub countries: &'a str,
    pub events: &'a str,
    pub random_events: &'a str,
    pub transmission: &'a str,
    pub minigames: &'a str,
    pub flavor: &'a str,
    pub assistant: &'a str,
}

impl CatalogSources<'static> {
    pub const BUNDLED: Self = Self {
        roles: include_str!("../assets/data/roles.json"),
        countries: include_str!("../assets/data/countries.json"),
        events: include_str!("../assets/data/events.json"),
        random_events: include_str!("../assets/data/random_events.json"),
        transmission: include_str!("../assets/data/transmission.json"),
        minigames: include_str!("../assets/data/minigames.json"),
        flavor: include_str!("../assets/data/flavor.json"),
        assistant: include_str!("../assets/data/assistant.json"),
    };
}

fn parse<T: serde::de::DeserializeOwned>(table: &'static str, raw: &str) -> Result<T, CatalogError> {
    serde_json::from_str(raw).map_err(|source| CatalogError::Parse { table, source })
}

fn require_rows<T>(table: &'static str, rows: &[T]) -> Result<(), CatalogError> {
    if rows.is_empty() {
        return Err(CatalogError::EmptyTable { table });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub roles: Vec<Role>,
    pub countries: Vec<Country>,
    pub events: Vec<EventDefinition>,
    pub random_events: Vec<RandomEvent>,
    pub transmission: Transmission,
    pub minigames: MiniGameTables,
    pub flavor: Flavor,
    pub assistant: AssistantContent,
}

impl Catalog {
    /// Parse and validate every table.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if any table fails to parse or validate.
    pub fn from_sources(sources: &CatalogSources<'_>) -> Result<Self, CatalogError> {
        let catalog = Self {
            roles: parse("roles", sources.roles)?,
            countries: parse("countries", sources.countries)?,
            events: parse("events", sources.events)?,
            random_events: parse("random events", sources.random_events)?,
            transmission: parse("transmission", sources.transmission)?,
            minigames: parse("mini-games", sources.minigames)?,
            flavor: parse("flavor", sources.flavor)?,
            assistant: parse("assistant", sources.assistant)?,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check structural rules the screens rely on.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), CatalogError> {
        require_rows("roles", &self.roles)?;
        require_rows("countries", &self.countries)?;
        require_rows("events", &self.events)?;
        require_rows("random events", &self.random_events)?;
        require_rows("transmission options", &self.transmission.options)?;
        require_rows("press questions", &self.minigames.press_briefing.questions)?;
        require_rows("drone targets", &self.minigames.drone_strike.targets)?;
        require_rows("shell companies", &self.minigames.super_pac.shells)?;
        require_rows("death variants", &self.flavor.death_variants)?;
        require_rows("celebrations", &self.flavor.celebrations)?;
        require_rows("assistant quotes", &self.assistant.quotes)?;

        for event in &self.events {
            require_rows("event options", &event.options)?;
            for option in &event.options {
                if let Some(screen) = option.mini_game
                    && !screen.is_mini_game()
                {
                    return Err(CatalogError::NotAMiniGame {
                        option: option.id.clone(),
                        screen,
                    });
                }
            }
        }
        for event in &self.random_events {
            require_rows("random event options", &event.options)?;
        }
        for question in &self.minigames.press_briefing.questions {
            require_rows("press answers", &question.answers)?;
        }
        for trigger in AssistantTrigger::ALL {
            if self.intervention(trigger).is_none() {
                return Err(CatalogError::MissingIntervention(trigger));
            }
        }
        for ending in Ending::ALL {
            if self.ending_text(ending).is_none() {
                return Err(CatalogError::MissingEnding(ending));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn role(&self, id: &str) -> Option<&Role> {
        self.roles.iter().find(|role| role.id == id)
    }

    #[must_use]
    pub fn country(&self, id: &str) -> Option<&Country> {
        self.countries.iter().find(|country| country.id == id)
    }

    /// Roles the career record allows, in catalog order.
    #[must_use]
    pub fn unlocked_roles(&self, persistence: &Persistence) -> Vec<&Role> {
        self.roles
            .iter()
            .filter(|role| persistence.is_unlocked(&role.id))
            .collect()
    }

    #[must_use]
    pub fn ending_text(&self, ending: Ending) -> Option<&EndingText> {
        self.flavor.endings.iter().find(|text| text.ending == ending)
    }

    #[must_use]
    pub fn intervention(&self, trigger: AssistantTrigger) -> Option<&Intervention> {
        self.assistant
            .interventions
            .iter()
            .find(|intervention| intervention.trigger == trigger)
    }
}

/// The bundled catalog, parsed on first use.
pub fn catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        Catalog::from_sources(&CatalogSources::BUNDLED).expect("valid bundled catalog")
    })
}
