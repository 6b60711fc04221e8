//! nrsim-core — shared types for the no-repeat generator simulator.
//!
//! This crate defines the **stable boundary** used across the workspace:
//! - the alphabet and the validated [`TransitionTable`],
//! - the declared board identity ([`HardwareSpecs`]),
//! - result records consumed by external reporting ([`SimulationResult`], …),
//! - the [`SimError`] taxonomy every component reports through.
//!
//! ```
//! use nrsim_core::TransitionTable;
//!
//! let table = TransitionTable::default();
//! assert_eq!(table.next(0, 2)?, 2);
//! # Ok::<(), nrsim_core::SimError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

/// Error taxonomy and result alias.
pub mod error;
/// Board identity constants.
pub mod hardware;
/// Result records (single run, batch, comparison).
pub mod record;
/// Validated transition table.
pub mod table;

/// One generated value; always `< ALPHABET_SIZE`.
pub type Value = u8;

/// Number of distinct values the generator emits (`{0, 1, 2}`).
pub const ALPHABET_SIZE: usize = 3;

/// All alphabet values in order.
pub const ALPHABET: [Value; ALPHABET_SIZE] = [0, 1, 2];

// ---- Re-exports for workspace compatibility ----
pub use error::*;
pub use hardware::*;
pub use record::*;
pub use table::*;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use nrsim_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        error::{SimError, SimResult},
        hardware::HardwareSpecs,
        record::{BatchResult, GenerationTiming, PerformanceSnapshot, SimulationResult},
        table::TransitionTable,
        Value, ALPHABET, ALPHABET_SIZE,
    };
}
