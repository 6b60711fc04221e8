//! Result records handed to external reporting and visualization.
//!
//! These types are the **stable boundary** of the simulator. Field names are
//! serialized in camelCase (`seedUsed`, `totalIterations`, ...) and renaming
//! any of them is a breaking change for consumers.
//!
//! ## Backward/forward compatibility
//! - Do **not** add `#[serde(deny_unknown_fields)]`; newer producers with
//!   extra fields must stay readable by older consumers.
//! - Prefer adding new fields with `#[serde(default)]` over changing the type
//!   of an existing field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Value;

/// Device performance counters captured at the end of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    /// Primitive calls issued (one per call).
    pub instruction_count: u64,
    /// Invocation count per primitive name.
    pub function_call_counts: BTreeMap<String, u64>,
    /// Estimated working-memory use, percent of SRAM capacity.
    pub memory_footprint_estimate: f64,
    /// Weighted clock-cycle estimate of the same calls.
    #[serde(default)]
    pub cycle_estimate: u64,
    /// Bytes explicitly allocated through the SRAM bookkeeping API.
    #[serde(default)]
    pub sram_usage_bytes: u64,
}

/// Wall-clock cost of single `generate_next` calls, in microseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationTiming {
    /// Mean over all calls.
    pub avg_micros: f64,
    /// Fastest call.
    pub min_micros: f64,
    /// Slowest call.
    pub max_micros: f64,
}

/// Outcome of one harness run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    /// Seed the run's device was initialized with.
    pub seed_used: u64,
    /// Number of values generated (equals the requested iterations).
    pub total_iterations: u64,
    /// Wall-clock time spent generating.
    pub elapsed_time_seconds: f64,
    /// `total_iterations / elapsed_time_seconds`.
    pub generation_rate_per_second: f64,
    /// Occurrences of each alphabet value.
    #[serde(default)]
    pub distribution_counts: BTreeMap<Value, u64>,
    /// Share of each alphabet value, in percent (sums to 100).
    pub distribution_percentages: BTreeMap<Value, f64>,
    /// Long-run share predicted by the transition table, in percent.
    #[serde(default)]
    pub expected_percentages: BTreeMap<Value, f64>,
    /// Adjacent equal pairs found by re-scanning the sequence.
    pub consecutive_violations: u64,
    /// `consecutive_violations` relative to `total_iterations`, in percent.
    #[serde(default)]
    pub violation_rate_percent: f64,
    /// `consecutive_violations == 0`.
    pub constraint_satisfied: bool,
    /// Counts of observed `"a->b"` transitions.
    #[serde(default)]
    pub transitions: BTreeMap<String, u64>,
    /// Number of distinct transitions observed (6 for a healthy run).
    #[serde(default)]
    pub unique_transitions: usize,
    /// Leading values of the emitted sequence.
    #[serde(default)]
    pub sample_sequence: Vec<Value>,
    /// Hex blake3 digest of the full emitted sequence.
    #[serde(default)]
    pub sequence_digest: String,
    /// Device counters at run end.
    pub performance_snapshot: PerformanceSnapshot,
    /// Per-call generation time.
    #[serde(default)]
    pub generation_timing: GenerationTiming,
}

impl SimulationResult {
    /// Copy with wall-clock fields zeroed, for comparing runs that must be
    /// identical apart from timing.
    #[must_use]
    pub fn without_timing(&self) -> Self {
        Self {
            elapsed_time_seconds: 0.0,
            generation_rate_per_second: 0.0,
            generation_timing: GenerationTiming::default(),
            ..self.clone()
        }
    }
}

/// Spread of one value's percentage across the runs of a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueStats {
    /// Arithmetic mean.
    pub mean: f64,
    /// Smallest observed percentage.
    pub min: f64,
    /// Largest observed percentage.
    pub max: f64,
    /// Population variance.
    pub variance: f64,
}

/// Statistics derived from all runs of a batch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAggregate {
    /// Number of runs (one per seed).
    pub total_runs: usize,
    /// Sum of iterations over all runs.
    pub total_iterations: u64,
    /// Sum of per-run elapsed time.
    pub total_elapsed_seconds: f64,
    /// `total_iterations / total_elapsed_seconds`.
    pub aggregate_throughput: f64,
    /// Wall-clock time of the whole batch (smaller than the sum when parallel).
    pub wall_clock_seconds: f64,
    /// Per-value percentage spread across runs.
    pub per_value: BTreeMap<Value, ValueStats>,
    /// Occurrences of each value over all runs.
    pub combined_counts: BTreeMap<Value, u64>,
    /// Share of each value over all runs, in percent.
    pub combined_percentages: BTreeMap<Value, f64>,
    /// Sum of violations over all runs.
    pub total_violations: u64,
    /// Whether every run satisfied the constraint.
    pub all_constraints_satisfied: bool,
    /// Transition counts over all runs.
    pub combined_transitions: BTreeMap<String, u64>,
    /// Mean across runs of each run's per-call timing.
    #[serde(default)]
    pub average_generation_timing: GenerationTiming,
}

/// Per-seed results (in seed order) plus their aggregate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// One result per input seed, in input order.
    pub results: Vec<SimulationResult>,
    /// Derived cross-run statistics.
    pub aggregate: BatchAggregate,
}

/// One candidate of a table comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonEntry {
    /// Candidate name.
    pub name: String,
    /// Table rows the candidate ran with.
    pub rows: Vec<Vec<Value>>,
    /// Its run.
    pub result: SimulationResult,
    /// Weighted recommendation score in `[0, 1]`.
    pub score: f64,
}

/// Ranking of candidate transition tables run under identical conditions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    /// Per-candidate runs, in input order.
    pub entries: Vec<ComparisonEntry>,
    /// Highest generation rate.
    pub best_performance: String,
    /// Lowest memory footprint.
    pub best_memory_efficiency: String,
    /// Closest to a uniform distribution.
    pub best_distribution: String,
    /// Highest weighted score.
    pub recommended: String,
}
