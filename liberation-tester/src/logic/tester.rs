use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::common::scenario::TestScenario;
use crate::common::{artifacts_dir, write_failure_artifacts};
use crate::logic::game_tester::{GameTester, SimulationPlan, SimulationSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(default)]
    pub outcomes: OutcomeTally,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

/// How the iterations of one scenario ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTally {
    pub victories: usize,
    pub deaths: usize,
    pub halted: usize,
}

impl OutcomeTally {
    fn record(&mut self, summary: &SimulationSummary) {
        use crate::logic::game_tester::RunOutcome;
        match summary.outcome {
            RunOutcome::Victory => self.victories += 1,
            RunOutcome::Death => self.deaths += 1,
            RunOutcome::Halted => self.halted += 1,
        }
    }
}

pub struct LogicTester {
    tester: GameTester,
    artifacts: Option<PathBuf>,
}

impl LogicTester {
    pub const fn new(tester: GameTester) -> Self {
        Self {
            tester,
            artifacts: None,
        }
    }

    /// Write state dumps for failing iterations under `dir`.
    #[must_use]
    pub fn with_artifacts(mut self, dir: Option<PathBuf>) -> Self {
        self.artifacts = dir;
        self
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.tester.verbose() {
                println!(
                    "🧪 Testing scenario: {} (strategy: {} seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.strategy,
                    seed
                );
            }

            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut outcomes = OutcomeTally::default();
        let (successes, failures, performance_data) =
            self.run_simulation_iterations(scenario, seed, iterations, &mut outcomes);

        let avg_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            outcomes,
            average_duration: avg_duration,
            performance_data,
        }
    }

    fn run_simulation_iterations(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
        outcomes: &mut OutcomeTally,
    ) -> (usize, Vec<String>, Vec<Duration>) {
        let plan = &scenario.plan;
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let summary = self.tester.run_plan(plan, iteration_seed);
            outcomes.record(&summary);
            let stats = &summary.final_state.stats;

            if let Some(err) = evaluate_expectations(plan, &summary) {
                let context = summarize_decision_path(&summary);
                if let Some(base) = &self.artifacts {
                    let dir = artifacts_dir(base, &scenario.name, summary.seed);
                    if let Err(write_err) = write_failure_artifacts(&dir, &summary, &err) {
                        log::warn!("could not save artifacts for {}: {write_err:#}", scenario.name);
                    }
                }
                failures.push(format!(
                    "Iteration {} (strategy {}, seed {}, choices {}, outcome {}): {} | {} | final oil {} approval {} treasury {} war crimes {} cholera {}",
                    i + 1,
                    summary.strategy.label(),
                    summary.seed,
                    summary.decisions.len(),
                    summary.outcome.label(),
                    err,
                    context,
                    stats.oil,
                    stats.approval,
                    stats.treasury,
                    stats.war_crimes,
                    stats.cholera_risk
                ));

                if self.tester.verbose() {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.clone().red()
                    );
                    println!("     ↳ Seed {} | Decisions: {}", summary.seed, context);
                }
            } else {
                successes += 1;
                let duration = start_time.elapsed();
                performance_data.push(duration);

                if self.tester.verbose() {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) month:{} outcome:{} strategy:{}",
                        i + 1,
                        iterations,
                        stats.month,
                        summary.outcome.label(),
                        summary.strategy.label()
                    );
                }
            }
        }

        (successes, failures, performance_data)
    }
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    plan.expectations
        .iter()
        .find_map(|expectation| expectation.evaluate(summary).err())
        .map(|err| err.to_string())
}

fn summarize_decision_path(summary: &SimulationSummary) -> String {
    if summary.decisions.is_empty() {
        return "no decisions recorded".to_string();
    }

    summary
        .decisions
        .iter()
        .rev()
        .take(3)
        .map(|entry| {
            let rationale = entry
                .rationale
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or("-");
            format!(
                "month {} ({}): {} -> {} [{}] idx {} reason {}",
                entry.month,
                entry.screen,
                entry.title,
                entry.choice_id,
                entry.policy_name,
                entry.choice_index,
                rationale
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
