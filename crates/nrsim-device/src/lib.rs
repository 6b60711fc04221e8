//! Countable, reproducible mock of the board's primitives.
//!
//! - `device`: the [`DeviceMock`] aggregate (clock, digital/analog I/O, PWM,
//!   serial log, SRAM bookkeeping, and per-call metering).
//! - `stream`: the [`RandomStream`] abstraction with a seeded ChaCha stream
//!   for production runs and a scripted stream for tests.
//!
//! Every primitive charges one instruction; `snapshot_stats()` is the
//! metering hook resource-bound tests rely on.

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
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

/// Board mock with metering.
pub mod device;
/// Swappable draw sources.
pub mod stream;

pub use device::{DeviceMock, PinMode, COUNTER_ENTRY_BYTES, STATIC_FOOTPRINT_BYTES};
pub use stream::{ChaChaStream, RandomStream, ScriptedStream};
