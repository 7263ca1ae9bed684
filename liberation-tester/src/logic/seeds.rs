use anyhow::{Context, Result, bail};
use std::collections::HashSet;

/// Seed used when no tokens are given.
pub const DEFAULT_SEED: u64 = 1337;
/// Upper bound on how many seeds a single range token may expand to.
const MAX_RANGE: u64 = 10_000;

/// Resolve a list of CLI seed arguments into distinct numeric seeds.
///
/// Supports literal integers (negative values use their magnitude),
/// `0x`-prefixed hex, and inclusive ranges written `start..end`.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        for seed in parse_token(token)? {
            if seen.insert(seed) {
                seeds.push(seed);
            }
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }
    Ok(seeds)
}

fn parse_token(token: &str) -> Result<Vec<u64>> {
    if let Some((start, end)) = token.split_once("..") {
        let start = parse_single(start)?;
        let end = parse_single(end)?;
        if end < start {
            bail!("Seed range {token} runs backwards");
        }
        if end - start >= MAX_RANGE {
            bail!("Seed range {token} expands to more than {MAX_RANGE} seeds");
        }
        return Ok((start..=end).collect());
    }
    Ok(vec![parse_single(token)?])
}

fn parse_single(token: &str) -> Result<u64> {
    let token = token.trim();
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .with_context(|| format!("Unrecognized seed token: {token}"));
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }
    if let Ok(value) = token.parse::<u64>() {
        return Ok(value);
    }
    bail!("Unrecognized seed token: {token}")
}
