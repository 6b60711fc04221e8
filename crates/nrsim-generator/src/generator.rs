// crates/nrsim-generator/src/generator.rs

//! The constrained sequence generator.
//!
//! Each call draws once from the device over the full alphabet. The first
//! emission is the raw draw (there is no previous value to avoid yet); every
//! later emission is `table.next(previous, draw)`, which by the table
//! invariant always differs from `previous`.
//!
//! Generation is strictly sequential: the previous-value state and the
//! device's stream cursor advance together, so one generator must be driven
//! from one thread of control.

use nrsim_core::{SimError, SimResult, TransitionTable, Value, ALPHABET_SIZE};
use nrsim_device::{ChaChaStream, DeviceMock, RandomStream};
use tracing::debug;

/// Baud rate the sketch opens the serial port with.
pub const SKETCH_BAUD: u32 = 9600;

/// Banner the sketch prints from `setup()`, rule line included.
pub const SKETCH_BANNER: [&str; 4] = [
    "Random Number Generator - Arduino Uno R4 WiFi",
    "Numbers: 0, 1, 2",
    "Constraint: No consecutive identical numbers",
    "==================================================",
];

/// Generator owning its device and table.
#[derive(Debug)]
pub struct ConstraintSequenceGenerator<R: RandomStream = ChaChaStream> {
    device: DeviceMock<R>,
    table: TransitionTable,
    previous: Option<Value>,
    emitted: u64,
}

impl ConstraintSequenceGenerator<ChaChaStream> {
    /// Default table over a freshly seeded device.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_device(DeviceMock::new(seed), TransitionTable::DEFAULT)
    }
}

impl<R: RandomStream> ConstraintSequenceGenerator<R> {
    /// Compose an existing device with a (validated) table.
    #[must_use]
    pub const fn with_device(device: DeviceMock<R>, table: TransitionTable) -> Self {
        Self {
            device,
            table,
            previous: None,
            emitted: 0,
        }
    }

    /// Emit the next value.
    ///
    /// Errors only propagate from the device or the table.
    pub fn generate_next(&mut self) -> SimResult<Value> {
        let draw = self.device.draw_uniform(0, ALPHABET_SIZE as i64)?;
        let draw = usize::try_from(draw).unwrap_or(usize::MAX);

        let value = match self.previous {
            None if draw < ALPHABET_SIZE => draw as Value,
            None => {
                return Err(SimError::IndexOutOfRange {
                    what: "draw",
                    index: draw,
                    bound: ALPHABET_SIZE,
                })
            }
            Some(prev) => self.table.next(usize::from(prev), draw)?,
        };

        self.previous = Some(value);
        self.emitted += 1;
        Ok(value)
    }

    /// Emit `n` values in order.
    pub fn generate_many(&mut self, n: usize) -> SimResult<Vec<Value>> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.generate_next()?);
        }
        Ok(out)
    }

    /// Sketch `setup()`: open serial and print the banner.
    pub fn setup(&mut self) -> SimResult<()> {
        self.device.begin_serial(SKETCH_BAUD);
        for line in SKETCH_BANNER {
            self.device.write_serial_line(line)?;
        }
        debug!(seed = self.device.seed(), "sketch setup complete");
        Ok(())
    }

    /// Sketch `loop()` body: generate one value and echo it over serial.
    ///
    /// Requires [`Self::setup`] (or an explicit `begin_serial`) first.
    pub fn loop_once(&mut self) -> SimResult<Value> {
        let prev = self.previous;
        let value = self.generate_next()?;
        let line = match prev {
            Some(p) => format!("Generated: {value} (Previous: {p})"),
            None => format!("Generated: {value} (Previous: none)"),
        };
        self.device.write_serial_line(&line)?;
        Ok(value)
    }

    /// Forget the previous value and the emission count; the device keeps
    /// its stream position and counters.
    pub fn reset(&mut self) {
        self.previous = None;
        self.emitted = 0;
    }

    /// Last emitted value.
    #[must_use]
    pub const fn previous(&self) -> Option<Value> {
        self.previous
    }

    /// Values emitted since construction or the last reset.
    #[must_use]
    pub const fn emitted_count(&self) -> u64 {
        self.emitted
    }

    /// Table in use.
    #[must_use]
    pub const fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Borrow the device (e.g. for `snapshot_stats`).
    #[must_use]
    pub const fn device(&self) -> &DeviceMock<R> {
        &self.device
    }

    /// Mutably borrow the device.
    pub fn device_mut(&mut self) -> &mut DeviceMock<R> {
        &mut self.device
    }

    /// Give the device back.
    #[must_use]
    pub fn into_device(self) -> DeviceMock<R> {
        self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nrsim_device::ScriptedStream;

    fn scripted(script: Vec<i64>) -> ConstraintSequenceGenerator<ScriptedStream> {
        let dev = DeviceMock::seeded(ScriptedStream::new(script), 0);
        ConstraintSequenceGenerator::with_device(dev, TransitionTable::DEFAULT)
    }

    #[test]
    fn scripted_draws_follow_the_table() {
        let mut g = scripted(vec![0, 1, 2]);
        let seq = g.generate_many(5).unwrap();
        // bootstrap 0, then [0][1]=1, [1][2]=2, [2][0]=0, [0][1]=1
        assert_eq!(seq, vec![0, 1, 2, 0, 1]);
        assert_eq!(g.emitted_count(), 5);
        assert_eq!(g.previous(), Some(1));
    }

    #[test]
    fn bootstrap_emits_raw_draw() {
        for first in 0..3 {
            let mut g = scripted(vec![first]);
            assert_eq!(i64::from(g.generate_next().unwrap()), first);
        }
    }

    #[test]
    fn every_call_draws_exactly_once() {
        let mut g = ConstraintSequenceGenerator::new(12345);
        g.generate_many(100).unwrap();
        let stats = g.device().snapshot_stats();
        assert_eq!(stats.instruction_count, 100);
        assert_eq!(stats.function_call_counts["random"], 100);
    }

    #[test]
    fn reset_restarts_bootstrap() {
        let mut g = scripted(vec![2, 2, 2]);
        assert_eq!(g.generate_next().unwrap(), 2);
        assert_eq!(g.generate_next().unwrap(), 0); // [2][2]
        g.reset();
        assert_eq!(g.previous(), None);
        assert_eq!(g.generate_next().unwrap(), 2);
    }

    #[test]
    fn sketch_setup_and_loop_echo_over_serial() {
        let mut g = scripted(vec![0, 1, 2]);
        assert_eq!(g.loop_once(), Err(SimError::SerialNotBegun));

        let mut g = scripted(vec![0, 1, 2]);
        g.setup().unwrap();
        g.loop_once().unwrap();
        g.loop_once().unwrap();

        let log = g.device().serial_log();
        assert_eq!(log.len(), 6);
        assert_eq!(log[..4], SKETCH_BANNER);
        assert_eq!(log[3], "=".repeat(50));
        assert_eq!(log[4], "Generated: 0 (Previous: none)");
        assert_eq!(log[5], "Generated: 1 (Previous: 0)");
        assert_eq!(g.device().serial_baud_rate(), Some(SKETCH_BAUD));
    }
}
