use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logic::SimulationSummary;

pub fn artifacts_dir(base: &Path, scenario: &str, seed: u64) -> PathBuf {
    let slug: String = scenario
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    base.join(slug).join(format!("seed-{seed}"))
}

/// Dump the final state and failure reason of a run for later inspection.
pub fn write_failure_artifacts(dir: &Path, summary: &SimulationSummary, error: &str) -> Result<()> {
    fs::create_dir_all(dir).context("creating artifacts dir")?;

    let state = serde_json::to_vec_pretty(&summary.final_state).unwrap_or_default();
    let _ = fs::write(dir.join("state.json"), state);

    let career = serde_json::to_vec_pretty(&summary.career_after).unwrap_or_default();
    let _ = fs::write(dir.join("career.json"), career);

    let decisions = summary
        .decisions
        .iter()
        .map(|d| format!("month {} {} -> {} ({})", d.month, d.title, d.choice_id, d.policy_name))
        .collect::<Vec<_>>()
        .join("\n");
    let _ = fs::write(dir.join("decisions.txt"), decisions);

    let _ = fs::write(dir.join("error.txt"), error);

    Ok(())
}

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}
