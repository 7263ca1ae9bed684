//! Liberation Trail Game Engine
//!
//! Platform-agnostic core for the Liberation Trail satirical foreign-policy game.
//! The reducer, screen machine, mini-games and persistence live here; rendering
//! and input devices belong to whoever embeds the crate.

pub mod action;
pub mod assistant;
pub mod catalog;
pub mod config;
pub mod ending;
pub mod minigames;
pub mod reducer;
pub mod rng;
pub mod scheduler;
pub mod screen;
pub mod selector;
pub mod session;
pub mod state;
pub mod stats;
pub mod storage;

// Re-export commonly used types
pub use action::Action;
pub use assistant::{AssistantPopup, WarAssistant};
pub use catalog::{
    Catalog, CatalogError, Country, EventDefinition, OptionDefinition, RandomEvent, Role, catalog,
};
pub use config::{AssistantConfig, ConfigError, GameConfig, SelectorOdds, Timings};
pub use ending::{Ending, VictorySummary};
pub use minigames::{ActiveMiniGame, MiniGameExit, MiniGameResult, Progress};
pub use reducer::{reduce, reduce_json};
pub use rng::RngBundle;
pub use screen::{MINI_GAMES, Screen};
pub use selector::{ChoiceOrigin, ChoiceOutcome, ChoiceRequest, Resolution, resolve_choice};
pub use session::{Celebration, Cue, GameSession, Input, ScreenController, SessionSnapshot};
pub use state::{GameState, HistoryEntry, Persistence, PersistencePatch};
pub use stats::{Effects, StatKey, Stats};
pub use storage::{
    FileStore, KeyValueStore, MemoryStore, PERSISTENCE_KEY, StorageError, load_persistence,
    save_persistence,
};

/// Main game engine: one store, one tuning, any number of sessions.
pub struct GameEngine<S> {
    store: S,
    config: GameConfig,
}

impl<S> GameEngine<S>
where
    S: KeyValueStore + Clone,
    StorageError: From<S::Error>,
{
    /// Create an engine over `store` with the given tuning.
    pub const fn new(store: S, config: GameConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start a session that shares this engine's store.
    #[must_use]
    pub fn create_session(&self, seed: u64) -> GameSession<S> {
        GameSession::new(seed, self.store.clone(), self.config)
    }

    /// The career record as currently stored.
    #[must_use]
    pub fn career(&self) -> Persistence {
        load_persistence(&self.store)
    }

    /// Forget every death, victory and unlock.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn erase_career(&self) -> Result<(), StorageError> {
        self.store.remove(PERSISTENCE_KEY)?;
        log::info!("career record erased");
        Ok(())
    }
}
