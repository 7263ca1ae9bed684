use anyhow::{Result, anyhow};
use liberation_game::stats::{PERCENT_MAX, PERCENT_MIN};
use liberation_game::{GameState, StatKey};

use super::TestScenario;
use crate::logic::{GameplayStrategy, RunOutcome, SimulationPlan, SimulationSummary};

pub fn catalog_scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::simulation(
            "Stat Boundaries",
            SimulationPlan::new(GameplayStrategy::MonteCarlo)
                .with_expectation(stat_bounds_expectation),
        ),
        TestScenario::simulation(
            "Deterministic Replay",
            SimulationPlan::new(GameplayStrategy::Balanced)
                .with_replay()
                .with_expectation(deterministic_replay_expectation),
        ),
        TestScenario::simulation(
            "Career Accounting",
            SimulationPlan::new(GameplayStrategy::Balanced)
                .with_expectation(career_accounting_expectation),
        ),
        TestScenario::simulation(
            "Ethics Are Fatal",
            SimulationPlan::new(GameplayStrategy::Ethical).with_expectation(ethics_expectation),
        ),
        TestScenario::simulation(
            "Profit Ends The War",
            SimulationPlan::new(GameplayStrategy::Profiteer).with_expectation(victory_expectation),
        ),
        TestScenario::simulation(
            "Month Cadence",
            SimulationPlan::new(GameplayStrategy::Cautious)
                .with_expectation(month_cadence_expectation),
        ),
        TestScenario::simulation(
            "History Log",
            SimulationPlan::new(GameplayStrategy::MonteCarlo)
                .with_expectation(history_expectation),
        ),
    ]
}

pub fn find_catalog_scenario(name: &str) -> Option<TestScenario> {
    catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.name == name)
}

/// Strategy runs either end or at least make progress before the cap.
pub fn ended_or_capped(summary: &SimulationSummary) -> Result<()> {
    if summary.outcome == RunOutcome::Halted {
        anyhow::ensure!(
            !summary.decisions.is_empty(),
            "{} made no decisions before halting",
            summary.strategy
        );
    }
    stat_bounds_expectation(summary)
}

fn check_bounds(state: &GameState) -> Result<()> {
    let stats = &state.stats;
    for key in [
        StatKey::Oil,
        StatKey::Approval,
        StatKey::CholeraRisk,
        StatKey::Chaos,
    ] {
        let value = stats.get(key);
        anyhow::ensure!(
            (PERCENT_MIN..=PERCENT_MAX).contains(&value),
            "{key} out of range: {value}"
        );
    }
    anyhow::ensure!(stats.treasury >= 0, "Treasury negative: {}", stats.treasury);
    anyhow::ensure!(stats.war_crimes >= 0, "War crimes negative: {}", stats.war_crimes);
    anyhow::ensure!(stats.democracy == 0, "Democracy moved: {}", stats.democracy);
    anyhow::ensure!(stats.month >= 1, "Month below 1: {}", stats.month);
    Ok(())
}

fn stat_bounds_expectation(summary: &SimulationSummary) -> Result<()> {
    for state in summary.observed.iter().chain(Some(&summary.final_state)) {
        check_bounds(state)?;
    }
    Ok(())
}

fn deterministic_replay_expectation(summary: &SimulationSummary) -> Result<()> {
    let replay = summary
        .replay_state
        .as_ref()
        .ok_or_else(|| anyhow!("Replay run missing"))?;
    anyhow::ensure!(
        replay == &summary.final_state,
        "Replay diverged: month {} vs {}, {} vs {} history entries",
        summary.final_state.stats.month,
        replay.stats.month,
        summary.final_state.history.len(),
        replay.history.len()
    );
    Ok(())
}

fn career_accounting_expectation(summary: &SimulationSummary) -> Result<()> {
    let before = &summary.career_before;
    let after = &summary.career_after;
    let expected_deaths = before.cholera_deaths + u32::from(summary.outcome == RunOutcome::Death);
    anyhow::ensure!(
        after.cholera_deaths == expected_deaths,
        "Expected {expected_deaths} deaths on record, found {}",
        after.cholera_deaths
    );

    if summary.outcome == RunOutcome::Victory {
        let oil = summary.final_state.stats.oil;
        let secured = u64::try_from(oil.max(0)).unwrap_or_default();
        anyhow::ensure!(
            after.total_oil_secured == before.total_oil_secured + secured,
            "Victory with {oil} oil should add to the {} barrels on record, found {}",
            before.total_oil_secured,
            after.total_oil_secured
        );
        anyhow::ensure!(
            after.high_score == before.high_score.max(oil),
            "High score {} should reflect the {oil} oil run",
            after.high_score
        );
    } else {
        anyhow::ensure!(
            after.total_oil_secured == before.total_oil_secured,
            "Oil secured changed without a victory"
        );
    }
    anyhow::ensure!(
        after.unlocked_roles.is_superset(&before.unlocked_roles),
        "Unlocked roles shrank"
    );
    Ok(())
}

fn ethics_expectation(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.outcome == RunOutcome::Death,
        "An ethical run should end in death, got {} after {} decisions",
        summary.outcome.label(),
        summary.decisions.len()
    );
    Ok(())
}

fn victory_expectation(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.outcome == RunOutcome::Victory,
        "Profiteering should end in victory, got {}",
        summary.outcome.label()
    );
    anyhow::ensure!(summary.ending.is_some(), "Victory without an ending");
    anyhow::ensure!(
        summary.final_state.stats.oil >= summary.config.odds.victory_oil,
        "Victory below the oil line: {}",
        summary.final_state.stats.oil
    );
    Ok(())
}

fn month_cadence_expectation(summary: &SimulationSummary) -> Result<()> {
    let cadence = summary.config.odds.month_cadence.max(1);
    let mut last_month = 1;
    for state in summary.observed.iter().chain(Some(&summary.final_state)) {
        let stats = &state.stats;
        anyhow::ensure!(
            stats.month >= last_month,
            "Month went backwards from {last_month} to {}",
            stats.month
        );
        let ceiling = 1 + i64::from(stats.event_count / cadence);
        anyhow::ensure!(
            i64::from(stats.month) <= ceiling,
            "Month {} ahead of {} mutations",
            stats.month,
            stats.event_count
        );
        last_month = stats.month;
    }
    Ok(())
}

fn history_expectation(summary: &SimulationSummary) -> Result<()> {
    let history = &summary.final_state.history;
    let mut entries = history.iter();
    for decision in &summary.decisions {
        anyhow::ensure!(
            entries.any(|entry| entry.event == decision.title && entry.choice == decision.choice_id),
            "Decision {} on {} missing from history",
            decision.choice_id,
            decision.title
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::GameTester;
    use liberation_game::GameConfig;

    fn run(name: &str, seed: u64) -> (TestScenario, SimulationSummary) {
        let scenario = find_catalog_scenario(name).expect("catalog scenario");
        let summary = GameTester::new(GameConfig::default(), false).run_plan(&scenario.plan, seed);
        (scenario, summary)
    }

    #[test]
    fn stat_bounds_hold_for_random_play() {
        let (scenario, summary) = run("Stat Boundaries", 21);
        for expectation in &scenario.plan.expectations {
            expectation.evaluate(&summary).expect("bounds hold");
        }
    }

    #[test]
    fn bounds_check_flags_negative_treasury() {
        let mut state = GameState::default();
        state.stats.treasury = -1;
        let err = check_bounds(&state).expect_err("negative treasury");
        assert!(err.to_string().contains("Treasury"));
    }

    #[test]
    fn replay_check_flags_divergence() {
        let (_, mut summary) = run("Deterministic Replay", 4);
        deterministic_replay_expectation(&summary).expect("replay matches");
        if let Some(replay) = summary.replay_state.as_mut() {
            replay.stats.month += 1;
        }
        assert!(deterministic_replay_expectation(&summary).is_err());
    }

    #[test]
    fn career_check_flags_a_missing_death() {
        let (_, mut summary) = run("Career Accounting", 8);
        career_accounting_expectation(&summary).expect("career adds up");
        summary.outcome = RunOutcome::Death;
        summary.career_after = summary.career_before.clone();
        assert!(career_accounting_expectation(&summary).is_err());
    }

    #[test]
    fn history_check_flags_missing_entries() {
        let (_, mut summary) = run("History Log", 13);
        history_expectation(&summary).expect("history complete");
        if !summary.decisions.is_empty() {
            summary.final_state.history.clear();
            assert!(history_expectation(&summary).is_err());
        }
    }
}
