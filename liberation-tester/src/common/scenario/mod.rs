pub mod catalog;
pub mod smoke;

use crate::logic::{GameplayStrategy, SimulationPlan};
use catalog::find_catalog_scenario;

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

fn strategy_scenario(name: &str, strategy: GameplayStrategy) -> TestScenario {
    TestScenario::simulation(
        name,
        SimulationPlan::new(strategy).with_expectation(catalog::ended_or_capped),
    )
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "smoke" => Some(smoke::smoke_scenario()),
        "profiteer" => Some(strategy_scenario("Profiteer Strategy", GameplayStrategy::Profiteer)),
        "balanced" => Some(strategy_scenario("Balanced Strategy", GameplayStrategy::Balanced)),
        "cautious" => Some(strategy_scenario("Cautious Strategy", GameplayStrategy::Cautious)),
        "monte-carlo" | "random" => Some(strategy_scenario(
            "Monte Carlo Strategy",
            GameplayStrategy::MonteCarlo,
        )),

        "stat-bounds" | "stats" => find_catalog_scenario("Stat Boundaries"),
        "deterministic" | "replay" => find_catalog_scenario("Deterministic Replay"),
        "career-accounting" | "career" => find_catalog_scenario("Career Accounting"),
        "ethics-are-fatal" | "ethical" => find_catalog_scenario("Ethics Are Fatal"),
        "profit-ends-the-war" | "victory" => find_catalog_scenario("Profit Ends The War"),
        "month-cadence" | "months" => find_catalog_scenario("Month Cadence"),
        "history-log" | "history" => find_catalog_scenario("History Log"),
        _ => None,
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Test"),
        ("profiteer", "Profiteer Strategy"),
        ("balanced", "Balanced Strategy"),
        ("cautious", "Cautious Strategy"),
        ("monte-carlo", "Monte Carlo Strategy"),
        ("stat-bounds", "Stat Boundaries"),
        ("deterministic", "Deterministic Replay"),
        ("career-accounting", "Career Accounting"),
        ("ethics-are-fatal", "Ethics Are Fatal"),
        ("profit-ends-the-war", "Profit Ends The War"),
        ("month-cadence", "Month Cadence"),
        ("history-log", "History Log"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, description) in list_scenarios() {
            let scenario = get_scenario(key).unwrap_or_else(|| panic!("{key} missing"));
            assert_eq!(scenario.name, description);
            assert!(!scenario.plan.expectations.is_empty(), "{key}");
        }
    }

    #[test]
    fn aliases_are_case_insensitive() {
        assert!(get_scenario("STATS").is_some());
        assert!(get_scenario("Replay").is_some());
        assert!(get_scenario("nope").is_none());
    }
}
