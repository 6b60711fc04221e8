//! Error taxonomy shared by every simulator crate.
//!
//! All variants are local precondition violations: the component that detects
//! one fails immediately and synchronously, and nothing is retried. Variants
//! carry the offending values so callers can render useful diagnostics
//! without re-deriving them.

use thiserror::Error;

/// Convenience alias used throughout the workspace.
pub type SimResult<T> = Result<T, SimError>;

/// Every failure the device, table, generator, and harness can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Harness configuration rejected before any iteration ran.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// `draw_uniform(min, max)` with `min >= max`.
    #[error("invalid draw range [{min}, {max}): lower bound must be below upper bound")]
    InvalidRange {
        /// Inclusive lower bound requested.
        min: i64,
        /// Exclusive upper bound requested.
        max: i64,
    },

    /// Table lookup with a previous value or draw outside the alphabet.
    #[error("{what} index {index} out of range (must be < {bound})")]
    IndexOutOfRange {
        /// Which index was bad (`"previous"` or `"draw"`).
        what: &'static str,
        /// The offending index.
        index: usize,
        /// Exclusive bound it had to respect.
        bound: usize,
    },

    /// Pin index outside the board's declared pin counts (or not PWM-capable).
    #[error("invalid {kind} pin {pin}")]
    InvalidPin {
        /// Pin class that was addressed (`"digital"`, `"analog"`, `"pwm"`).
        kind: &'static str,
        /// The offending pin index.
        pin: u8,
    },

    /// PWM duty value outside `[0, 255]`.
    #[error("invalid PWM duty cycle {0} (must be within 0..=255)")]
    InvalidDutyCycle(i32),

    /// Serial output attempted before `begin_serial`.
    #[error("serial port used before begin_serial")]
    SerialNotBegun,

    /// `initialize` called on a device that is already initialized.
    #[error("device already initialized")]
    AlreadyInitialized,

    /// Transition table failed validation.
    #[error("invalid transition table: {0}")]
    InvalidTable(String),
}

impl SimError {
    /// Shorthand for [`SimError::InvalidConfig`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Shorthand for [`SimError::InvalidTable`].
    pub fn table(msg: impl Into<String>) -> Self {
        Self::InvalidTable(msg.into())
    }
}
