//! nrsim-harness — runs the no-repeat generator and reports on it.
//!
//! - [`SimulationHarness::run_single`]: one seeded run → [`SimulationResult`]
//! - [`SimulationHarness::run_batch`]: one run per seed (optionally on the
//!   rayon pool) → [`BatchResult`] with cross-run statistics
//! - [`SimulationHarness::compare_tables`]: candidate tables under identical
//!   conditions → [`ComparisonReport`]
//!
//! ```
//! use nrsim_harness::{HarnessConfig, SimulationHarness};
//!
//! let harness = SimulationHarness::default();
//! let batch = harness.run_batch(&HarnessConfig::default().with_iterations(2_000), &[1, 2, 3])?;
//! assert_eq!(batch.results.len(), 3);
//! assert!(batch.aggregate.all_constraints_satisfied);
//! # Ok::<(), nrsim_core::SimError>(())
//! ```
//!
//! [`SimulationResult`]: nrsim_core::SimulationResult
//! [`BatchResult`]: nrsim_core::BatchResult
//! [`ComparisonReport`]: nrsim_core::ComparisonReport

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

mod compare;
/// Harness options and TOML profiles.
pub mod config;
mod harness;
/// Progress notifications.
pub mod progress;
/// Tabulation and aggregation helpers.
pub mod stats;

pub use config::{load_profile, HarnessConfig, Profile, TableCandidate};
pub use harness::SimulationHarness;
pub use progress::{Progress, ProgressObserver, TracingObserver};
