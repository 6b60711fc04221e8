// crates/nrsim-harness/src/compare.rs

//! Side-by-side runs of candidate transition tables.

use nrsim_core::{ComparisonEntry, ComparisonReport, SimError, SimResult, SimulationResult};
use tracing::info;

use crate::config::{HarnessConfig, TableCandidate};
use crate::harness::{runtime_seed, SimulationHarness};
use crate::stats;

const PERFORMANCE_WEIGHT: f64 = 0.4;
const MEMORY_WEIGHT: f64 = 0.3;
const RELIABILITY_WEIGHT: f64 = 0.3;

impl SimulationHarness {
    /// Run every candidate with the same seed and iteration count and rank
    /// them.
    ///
    /// The harness's own table is not involved; only the candidates run.
    pub fn compare_tables(
        &self,
        candidates: &[TableCandidate],
        config: &HarnessConfig,
    ) -> SimResult<ComparisonReport> {
        config.validate()?;
        if candidates.is_empty() {
            return Err(SimError::config("comparison needs at least one candidate"));
        }
        let seed = config.seed.unwrap_or_else(runtime_seed);

        let mut runs = Vec::with_capacity(candidates.len());
        for c in candidates {
            runs.push((c, self.run_seeded(config, seed, &c.table)?));
        }

        let results: Vec<&SimulationResult> = runs.iter().map(|(_, r)| r).collect();
        let scores = weighted_scores(&results);

        let best_performance = argmax(&results, |r| r.generation_rate_per_second);
        let best_memory_efficiency =
            argmax(&results, |r| -r.performance_snapshot.memory_footprint_estimate);
        let best_distribution = argmax(&results, |r| {
            -stats::uniformity_deviation(&r.distribution_percentages)
        });
        let recommended = argmax_index(&scores);

        let name = |i: usize| candidates[i].name.clone();
        let report = ComparisonReport {
            best_performance: name(best_performance),
            best_memory_efficiency: name(best_memory_efficiency),
            best_distribution: name(best_distribution),
            recommended: name(recommended),
            entries: runs
                .into_iter()
                .zip(scores)
                .map(|((c, result), score)| ComparisonEntry {
                    name: c.name.clone(),
                    rows: c.table.into(),
                    result,
                    score,
                })
                .collect(),
        };
        info!(
            candidates = report.entries.len(),
            seed,
            recommended = %report.recommended,
            "table comparison complete"
        );
        Ok(report)
    }
}

/// `0.4 × relative speed + 0.3 × relative memory + 0.3 × reliability`.
fn weighted_scores(results: &[&SimulationResult]) -> Vec<f64> {
    let max_rate = results
        .iter()
        .map(|r| r.generation_rate_per_second)
        .fold(0.0f64, f64::max);
    let min_mem = results
        .iter()
        .map(|r| r.performance_snapshot.memory_footprint_estimate)
        .fold(f64::INFINITY, f64::min);
    let min_violations = results
        .iter()
        .map(|r| r.consecutive_violations)
        .min()
        .unwrap_or(0);

    results
        .iter()
        .map(|r| {
            let perf = ratio(r.generation_rate_per_second, max_rate);
            let mem = ratio(min_mem, r.performance_snapshot.memory_footprint_estimate);
            let reliability = if r.consecutive_violations == min_violations {
                1.0
            } else {
                0.5
            };
            PERFORMANCE_WEIGHT * perf + MEMORY_WEIGHT * mem + RELIABILITY_WEIGHT * reliability
        })
        .collect()
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        1.0
    }
}

/// First index with the largest key.
fn argmax<F>(results: &[&SimulationResult], key: F) -> usize
where
    F: Fn(&SimulationResult) -> f64,
{
    let keys: Vec<f64> = results.iter().map(|&r| key(r)).collect();
    argmax_index(&keys)
}

fn argmax_index(keys: &[f64]) -> usize {
    let mut best = 0;
    for (i, &k) in keys.iter().enumerate().skip(1) {
        if k > keys[best] {
            best = i;
        }
    }
    best
}
