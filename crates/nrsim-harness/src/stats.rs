// crates/nrsim-harness/src/stats.rs

//! Sequence tabulation and cross-run aggregation.
//!
//! Everything here is a pure function of already-generated data; the
//! harness re-scans the emitted sequence instead of trusting the generator's
//! own bookkeeping.

use std::collections::BTreeMap;
use std::time::Duration;

use nrsim_core::{
    BatchAggregate, GenerationTiming, SimulationResult, TransitionTable, Value, ValueStats,
    ALPHABET,
};

/// Running sum/min/max of per-call durations.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimingAccumulator {
    calls: u64,
    total: Duration,
    min: Option<Duration>,
    max: Duration,
}

impl TimingAccumulator {
    /// Add one call.
    pub fn record(&mut self, d: Duration) {
        self.calls += 1;
        self.total = self.total.saturating_add(d);
        self.min = Some(self.min.map_or(d, |m| m.min(d)));
        self.max = self.max.max(d);
    }

    /// Summary in microseconds (all zero when nothing was recorded).
    #[must_use]
    pub fn finish(&self) -> GenerationTiming {
        if self.calls == 0 {
            return GenerationTiming::default();
        }
        let micros = |d: Duration| d.as_secs_f64() * 1e6;
        GenerationTiming {
            avg_micros: micros(self.total) / self.calls as f64,
            min_micros: self.min.map_or(0.0, micros),
            max_micros: micros(self.max),
        }
    }
}

/// Occurrences of every alphabet value (zero counts included).
#[must_use]
pub fn tabulate(seq: &[Value]) -> BTreeMap<Value, u64> {
    let mut counts: BTreeMap<Value, u64> = ALPHABET.iter().map(|&v| (v, 0)).collect();
    for &v in seq {
        *counts.entry(v).or_default() += 1;
    }
    counts
}

/// Counts as percentages of `total` (all zero when `total == 0`).
#[must_use]
pub fn percentages(counts: &BTreeMap<Value, u64>, total: u64) -> BTreeMap<Value, f64> {
    counts
        .iter()
        .map(|(&v, &c)| {
            let pct = if total == 0 {
                0.0
            } else {
                c as f64 * 100.0 / total as f64
            };
            (v, pct)
        })
        .collect()
}

/// Adjacent positions holding the same value.
#[must_use]
pub fn count_violations(seq: &[Value]) -> u64 {
    seq.windows(2).filter(|w| w[0] == w[1]).count() as u64
}

/// Observed `"a->b"` transitions.
#[must_use]
pub fn transitions(seq: &[Value]) -> BTreeMap<String, u64> {
    let mut out = BTreeMap::new();
    for w in seq.windows(2) {
        *out.entry(format!("{}->{}", w[0], w[1])).or_default() += 1;
    }
    out
}

/// Hex blake3 digest of the raw value bytes.
#[must_use]
pub fn sequence_digest(seq: &[Value]) -> String {
    hex::encode(blake3::hash(seq).as_bytes())
}

/// Stationary distribution of `table`, in percent.
#[must_use]
pub fn expected_percentages(table: &TransitionTable) -> BTreeMap<Value, f64> {
    ALPHABET
        .iter()
        .zip(table.stationary_distribution())
        .map(|(&v, p)| (v, p * 100.0))
        .collect()
}

/// Sum of absolute deviations from the uniform share; 0 is perfectly flat.
#[must_use]
pub fn uniformity_deviation(percentages: &BTreeMap<Value, f64>) -> f64 {
    let uniform = 1.0 / ALPHABET.len() as f64;
    ALPHABET
        .iter()
        .map(|v| (percentages.get(v).copied().unwrap_or(0.0) / 100.0 - uniform).abs())
        .sum()
}

fn value_stats(samples: &[f64]) -> ValueStats {
    if samples.is_empty() {
        return ValueStats::default();
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    ValueStats {
        mean,
        min,
        max,
        variance,
    }
}

/// Combine per-run results into batch statistics.
#[must_use]
pub fn aggregate(results: &[SimulationResult], wall_clock_seconds: f64) -> BatchAggregate {
    let total_iterations: u64 = results.iter().map(|r| r.total_iterations).sum();
    let total_elapsed_seconds: f64 = results.iter().map(|r| r.elapsed_time_seconds).sum();
    let aggregate_throughput = if total_elapsed_seconds > 0.0 {
        total_iterations as f64 / total_elapsed_seconds
    } else {
        0.0
    };

    let per_value = ALPHABET
        .iter()
        .map(|v| {
            let samples: Vec<f64> = results
                .iter()
                .map(|r| r.distribution_percentages.get(v).copied().unwrap_or(0.0))
                .collect();
            (*v, value_stats(&samples))
        })
        .collect();

    let mut combined_counts: BTreeMap<Value, u64> = ALPHABET.iter().map(|&v| (v, 0)).collect();
    let mut combined_transitions: BTreeMap<String, u64> = BTreeMap::new();
    for r in results {
        for (&v, &c) in &r.distribution_counts {
            *combined_counts.entry(v).or_default() += c;
        }
        for (k, &c) in &r.transitions {
            *combined_transitions.entry(k.clone()).or_default() += c;
        }
    }
    let runs = results.len().max(1) as f64;
    let mean_of = |f: fn(&GenerationTiming) -> f64| {
        results.iter().map(|r| f(&r.generation_timing)).sum::<f64>() / runs
    };
    let average_generation_timing = GenerationTiming {
        avg_micros: mean_of(|t| t.avg_micros),
        min_micros: mean_of(|t| t.min_micros),
        max_micros: mean_of(|t| t.max_micros),
    };

    let combined_total: u64 = combined_counts.values().sum();
    let combined_percentages = percentages(&combined_counts, combined_total);

    BatchAggregate {
        total_runs: results.len(),
        total_iterations,
        total_elapsed_seconds,
        aggregate_throughput,
        wall_clock_seconds,
        per_value,
        combined_counts,
        combined_percentages,
        total_violations: results.iter().map(|r| r.consecutive_violations).sum(),
        all_constraints_satisfied: results.iter().all(|r| r.constraint_satisfied),
        combined_transitions,
        average_generation_timing,
    }
}
