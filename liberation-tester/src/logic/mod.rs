pub mod game_tester;
pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use game_tester::{GameTester, RunOutcome, SimulationPlan, SimulationSummary};
pub use policy::{GameplayStrategy, PlayerPolicy};
pub use seeds::resolve_seed_inputs;
pub use tester::*;
