// crates/nrsim-harness/src/config.rs

//! Harness configuration and TOML profiles.
//!
//! A bare [`HarnessConfig`] describes one run. A [`Profile`] wraps it with the
//! seed list a batch driver iterates and optional candidate tables for
//! comparisons:
//!
//! ```toml
//! seeds = [11111, 22222, 33333]
//!
//! [harness]
//! iterations = 10000
//! parallel = true
//!
//! [[candidates]]
//! name = "default"
//! rows = [[1, 1, 2], [0, 0, 2], [0, 1, 0]]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use nrsim_core::{SimError, SimResult, TransitionTable};
use serde::{Deserialize, Serialize};

/// Iterations per run when not configured.
pub const DEFAULT_ITERATIONS: u64 = 10_000;

/// Leading values kept in each result when not configured.
pub const DEFAULT_SAMPLE_LEN: usize = 50;

/// Options recognized by the harness.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Values to generate per run (must be > 0).
    pub iterations: u64,
    /// Seed for single runs; `None` picks one at run time (recorded in the
    /// result). Batch runs take their seeds from the batch instead.
    pub seed: Option<u64>,
    /// Emit progress notifications while generating.
    pub collect_progress: bool,
    /// Emissions between notifications; `None` means every 10%.
    pub progress_interval: Option<u64>,
    /// Run batch entries on the rayon pool.
    pub parallel: bool,
    /// Leading values copied into each result (clamped to `iterations`).
    pub sample_len: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            seed: None,
            collect_progress: false,
            progress_interval: None,
            parallel: false,
            sample_len: DEFAULT_SAMPLE_LEN,
        }
    }
}

impl HarnessConfig {
    /// Config for `iterations` values with a fixed seed.
    #[must_use]
    pub fn seeded(iterations: u64, seed: u64) -> Self {
        Self {
            iterations,
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Builder: set the iteration count.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    /// Builder: set (or clear) the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Builder: enable progress notifications.
    #[must_use]
    pub const fn with_progress(mut self, interval: Option<u64>) -> Self {
        self.collect_progress = true;
        self.progress_interval = interval;
        self
    }

    /// Builder: toggle parallel batch execution.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Reject configurations no run could honor.
    pub fn validate(&self) -> SimResult<()> {
        if self.iterations == 0 {
            return Err(SimError::config("iterations must be a positive integer"));
        }
        if usize::try_from(self.iterations).is_err() {
            return Err(SimError::config(format!(
                "iterations {} exceed addressable memory",
                self.iterations
            )));
        }
        if self.progress_interval == Some(0) {
            return Err(SimError::config("progress_interval must be positive"));
        }
        Ok(())
    }

    /// Emissions between progress notifications.
    #[must_use]
    pub fn progress_every(&self) -> u64 {
        self.progress_interval
            .unwrap_or_else(|| (self.iterations / 10).max(1))
    }

    /// Sample length actually kept.
    #[must_use]
    pub fn effective_sample_len(&self) -> usize {
        let cap = usize::try_from(self.iterations).unwrap_or(usize::MAX);
        self.sample_len.min(cap)
    }

    /// Parse a flat TOML document of harness options.
    pub fn from_toml_str(src: &str) -> Result<Self> {
        toml::from_str(src).context("parse harness config toml")
    }
}

/// Named transition table to compare.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCandidate {
    /// Display name.
    pub name: String,
    /// Validated table (deserialized from its rows).
    #[serde(rename = "rows")]
    pub table: TransitionTable,
}

impl TableCandidate {
    /// Name a table.
    #[must_use]
    pub fn new(name: impl Into<String>, table: TransitionTable) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }
}

/// Harness options plus batch seeds and comparison candidates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Per-run options.
    pub harness: HarnessConfig,
    /// Seeds a batch runs over, in order.
    pub seeds: Vec<u64>,
    /// Tables to compare.
    pub candidates: Vec<TableCandidate>,
}

impl Profile {
    /// Parse a profile from TOML text.
    pub fn from_toml_str(src: &str) -> Result<Self> {
        toml::from_str(src).context("parse profile toml")
    }
}

/// Read and parse a profile file.
pub fn load_profile<P: AsRef<Path>>(path: P) -> Result<Profile> {
    let path = path.as_ref();
    let src =
        fs::read_to_string(path).with_context(|| format!("read profile {}", path.display()))?;
    Profile::from_toml_str(&src).with_context(|| format!("load profile {}", path.display()))
}
