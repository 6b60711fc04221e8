// crates/nrsim-harness/src/progress.rs

//! Progress notifications for long runs.
//!
//! The harness builds a [`Progress`] every `progress_interval` emissions and
//! hands it to whatever [`ProgressObserver`] is attached. Closures work as
//! observers directly:
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use nrsim_harness::{HarnessConfig, Progress, SimulationHarness};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let harness = SimulationHarness::default()
//!     .with_observer(Arc::new(move |p: &Progress| sink.lock().unwrap().push(p.completed)));
//!
//! let cfg = HarnessConfig::seeded(100, 1).with_progress(Some(25));
//! harness.run_single(&cfg)?;
//! assert_eq!(*seen.lock().unwrap(), vec![25, 50, 75, 100]);
//! # Ok::<(), nrsim_core::SimError>(())
//! ```

use std::time::Duration;

use serde::Serialize;
use tracing::info;

/// Point-in-time view of one run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Seed of the run being reported.
    pub seed: u64,
    /// Values emitted so far.
    pub completed: u64,
    /// Values the run will emit.
    pub total: u64,
    /// `completed / total`, in percent.
    pub percentage: f64,
    /// Time since generation started.
    pub elapsed_seconds: f64,
    /// Emissions per second so far.
    pub rate_per_second: f64,
    /// Remaining emissions at the current rate.
    pub estimated_remaining_seconds: f64,
}

impl Progress {
    /// Derive rates from raw counters.
    #[must_use]
    pub fn new(seed: u64, completed: u64, total: u64, elapsed: Duration) -> Self {
        let elapsed_seconds = elapsed.as_secs_f64();
        let rate_per_second = if elapsed_seconds > 0.0 {
            completed as f64 / elapsed_seconds
        } else {
            0.0
        };
        let remaining = total.saturating_sub(completed) as f64;
        let estimated_remaining_seconds = if rate_per_second > 0.0 {
            remaining / rate_per_second
        } else {
            0.0
        };
        let percentage = if total == 0 {
            100.0
        } else {
            completed as f64 * 100.0 / total as f64
        };
        Self {
            seed,
            completed,
            total,
            percentage,
            elapsed_seconds,
            rate_per_second,
            estimated_remaining_seconds,
        }
    }

    /// Whether this is the final notification of its run.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

/// Receives progress notifications. Shared across batch workers.
pub trait ProgressObserver: Send + Sync {
    /// Called from the generating thread; keep it cheap.
    fn on_progress(&self, progress: &Progress);
}

impl<F> ProgressObserver for F
where
    F: Fn(&Progress) + Send + Sync,
{
    fn on_progress(&self, progress: &Progress) {
        self(progress);
    }
}

/// Reports progress as `info!` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_progress(&self, p: &Progress) {
        info!(
            seed = p.seed,
            completed = p.completed,
            total = p.total,
            rate = format_args!("{:.0}/s", p.rate_per_second),
            eta_s = format_args!("{:.2}", p.estimated_remaining_seconds),
            "progress {:.1}%",
            p.percentage
        );
    }
}
