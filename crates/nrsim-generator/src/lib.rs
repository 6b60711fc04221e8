//! No-repeat sequence generator.
//!
//! Composes a [`DeviceMock`](nrsim_device::DeviceMock) (for randomness) with a
//! [`TransitionTable`](nrsim_core::TransitionTable) (for the no-repeat
//! guarantee). Also emulates the sketch's `setup()`/`loop()` pair so serial
//! traffic can be exercised the way the board would produce it.

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
    clippy::cast_possible_wrap
)]

/// The generator and sketch emulation.
pub mod generator;

pub use generator::{ConstraintSequenceGenerator, SKETCH_BANNER, SKETCH_BAUD};
