// crates/nrsim-harness/src/harness.rs

//! Single and batch runs.
//!
//! Every run builds its own `(DeviceMock, ConstraintSequenceGenerator)` pair
//! from its seed, so batch entries share nothing mutable and may run on the
//! rayon pool. Output order always follows input seed order.

use std::sync::Arc;
use std::time::Instant;

use nrsim_core::{BatchResult, SimError, SimResult, SimulationResult, TransitionTable, Value};
use nrsim_device::DeviceMock;
use nrsim_generator::ConstraintSequenceGenerator;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::HarnessConfig;
use crate::progress::{Progress, ProgressObserver, TracingObserver};
use crate::stats;

/// Floor for measured run time, so rates stay finite.
const MIN_ELAPSED_SECS: f64 = 1e-9;

/// Drives generators and turns their output into result records.
#[derive(Clone)]
pub struct SimulationHarness {
    table: TransitionTable,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl std::fmt::Debug for SimulationHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationHarness")
            .field("table", &self.table)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Default for SimulationHarness {
    fn default() -> Self {
        Self::new(TransitionTable::DEFAULT)
    }
}

impl SimulationHarness {
    /// Harness running `table`.
    #[must_use]
    pub const fn new(table: TransitionTable) -> Self {
        Self {
            table,
            observer: None,
        }
    }

    /// Attach a progress observer. Without one, enabled progress is logged
    /// through [`TracingObserver`].
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Table every run uses.
    #[must_use]
    pub const fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// One run of `config.iterations` values.
    ///
    /// Without a configured seed one is chosen at run time and recorded in
    /// `seed_used`.
    pub fn run_single(&self, config: &HarnessConfig) -> SimResult<SimulationResult> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(runtime_seed);
        self.run_seeded(config, seed, &self.table)
    }

    /// One run per seed, in seed order, plus aggregate statistics.
    ///
    /// `config.seed` is ignored; everything else applies to every run.
    pub fn run_batch(&self, config: &HarnessConfig, seeds: &[u64]) -> SimResult<BatchResult> {
        config.validate()?;
        if seeds.is_empty() {
            return Err(SimError::config("batch needs at least one seed"));
        }
        debug!(
            runs = seeds.len(),
            iterations = config.iterations,
            parallel = config.parallel,
            "batch start"
        );

        let start = Instant::now();
        let results: Vec<SimulationResult> = if config.parallel {
            seeds
                .par_iter()
                .map(|&seed| self.run_seeded(config, seed, &self.table))
                .collect::<SimResult<_>>()?
        } else {
            seeds
                .iter()
                .map(|&seed| self.run_seeded(config, seed, &self.table))
                .collect::<SimResult<_>>()?
        };
        let wall = start.elapsed().as_secs_f64();

        let aggregate = stats::aggregate(&results, wall);
        info!(
            runs = aggregate.total_runs,
            total_iterations = aggregate.total_iterations,
            throughput = format_args!("{:.0}/s", aggregate.aggregate_throughput),
            wall_s = format_args!("{wall:.3}"),
            violations = aggregate.total_violations,
            "batch complete"
        );
        Ok(BatchResult { results, aggregate })
    }

    /// Run `table` from `seed`; `config` must already be validated.
    pub(crate) fn run_seeded(
        &self,
        config: &HarnessConfig,
        seed: u64,
        table: &TransitionTable,
    ) -> SimResult<SimulationResult> {
        let total = config.iterations;
        let len = usize::try_from(total)
            .map_err(|_| SimError::config(format!("iterations {total} exceed addressable memory")))?;
        let every = config.progress_every();

        let mut seq: Vec<Value> = Vec::new();
        seq.try_reserve_exact(len).map_err(|e| {
            SimError::config(format!("cannot buffer {total} iterations: {e}"))
        })?;

        debug!(seed, iterations = total, "run start");
        let mut generator = ConstraintSequenceGenerator::with_device(DeviceMock::new(seed), *table);
        let mut timing = stats::TimingAccumulator::default();

        let start = Instant::now();
        for done in 1..=total {
            let call = Instant::now();
            let value = generator.generate_next()?;
            timing.record(call.elapsed());
            seq.push(value);
            if config.collect_progress && (done % every == 0 || done == total) {
                self.notify(&Progress::new(seed, done, total, start.elapsed()));
            }
        }
        let elapsed = start.elapsed().as_secs_f64().max(MIN_ELAPSED_SECS);

        let distribution_counts = stats::tabulate(&seq);
        let distribution_percentages = stats::percentages(&distribution_counts, total);
        let consecutive_violations = stats::count_violations(&seq);
        let transitions = stats::transitions(&seq);

        let result = SimulationResult {
            seed_used: seed,
            total_iterations: total,
            elapsed_time_seconds: elapsed,
            generation_rate_per_second: total as f64 / elapsed,
            distribution_counts,
            distribution_percentages,
            expected_percentages: stats::expected_percentages(table),
            consecutive_violations,
            violation_rate_percent: consecutive_violations as f64 * 100.0 / total as f64,
            constraint_satisfied: consecutive_violations == 0,
            unique_transitions: transitions.len(),
            transitions,
            sample_sequence: seq[..config.effective_sample_len()].to_vec(),
            sequence_digest: stats::sequence_digest(&seq),
            performance_snapshot: generator.device().snapshot_stats(),
            generation_timing: timing.finish(),
        };

        if result.constraint_satisfied {
            info!(
                seed,
                iterations = total,
                rate = format_args!("{:.0}/s", result.generation_rate_per_second),
                "run complete"
            );
        } else {
            warn!(
                seed,
                violations = consecutive_violations,
                "run produced consecutive identical values"
            );
        }
        Ok(result)
    }

    fn notify(&self, progress: &Progress) {
        match &self.observer {
            Some(obs) => obs.on_progress(progress),
            None => TracingObserver.on_progress(progress),
        }
    }
}

/// Seed for runs that did not configure one.
pub(crate) fn runtime_seed() -> u64 {
    rand::random::<u64>()
}
