use anyhow::Result;
use liberation_game::Screen;

use super::TestScenario;
use crate::logic::{GameplayStrategy, SimulationPlan, SimulationSummary};

fn plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Balanced)
        .with_max_choices(1)
        .with_expectation(smoke_expectation)
}

pub fn smoke_scenario() -> TestScenario {
    TestScenario::simulation("Smoke Test", plan())
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    let state = &summary.final_state;

    anyhow::ensure!(
        state.player_role.is_some(),
        "A role should have been chosen"
    );
    anyhow::ensure!(
        state.selected_country.is_some(),
        "A country should have been chosen"
    );
    anyhow::ensure!(
        state.current_screen != Screen::Disclaimer && state.current_screen != Screen::Title,
        "Run never got past the title, stuck on {}",
        state.current_screen
    );
    anyhow::ensure!(
        state.stats.month >= 1,
        "Month should be >= 1, got {}",
        state.stats.month
    );
    anyhow::ensure!(
        summary.save_failures == 0,
        "Saving the career failed {} times",
        summary.save_failures
    );

    Ok(())
}
