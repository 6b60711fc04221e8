// crates/nrsim-device/src/device.rs

//! Emulated board primitives with per-call metering.
//!
//! [`DeviceMock`] is a single owned aggregate: clock, pins, serial log, draw
//! stream, and counters all live in one struct and change only through its
//! methods. Every primitive charges exactly one instruction plus a weighted
//! cycle estimate *before* validating its arguments, so rejected calls are
//! metered like accepted ones.
//!
//! Timing is wall-clock: `elapsed_millis`/`elapsed_micros` report real time
//! since the epoch set at initialization, wrapped to 32 bits like the board's
//! counters.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use nrsim_core::{HardwareSpecs, PerformanceSnapshot, SimError, SimResult};
use rand::{Rng as _, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::stream::{ChaChaStream, RandomStream};

/// Fixed state the sketch occupies regardless of activity (pin tables,
/// serial and timer bookkeeping).
pub const STATIC_FOOTPRINT_BYTES: u64 = 256;

/// Bytes charged per distinct function-call counter.
pub const COUNTER_ENTRY_BYTES: u64 = 16;

/// Salt separating the analog-noise stream from the draw stream.
const NOISE_SALT: u64 = 0xA5A5_5A5A_C3C3_3C3C;

/// Cycle weights per primitive.
mod cycles {
    pub const MILLIS: u64 = 4;
    pub const MICROS: u64 = 6;
    pub const RANDOM: u64 = 20;
    pub const RANDOM_SEED: u64 = 10;
    pub const PIN_MODE: u64 = 5;
    pub const DIGITAL_WRITE: u64 = 8;
    pub const DIGITAL_READ: u64 = 6;
    pub const ANALOG_READ: u64 = 100;
    pub const ANALOG_WRITE: u64 = 12;
    pub const SERIAL_BEGIN: u64 = 50;
}

/// Board counters are 32 bits wide.
const fn wrap_u32(ticks: u128) -> u32 {
    (ticks % (1u128 << 32)) as u32
}

/// Digital pin configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PinMode {
    /// High-impedance input.
    #[default]
    Input,
    /// Push-pull output.
    Output,
    /// Input with the internal pull-up enabled (reads HIGH).
    InputPullup,
}

/// Mock of the board, generic over its draw stream.
#[derive(Debug)]
pub struct DeviceMock<R: RandomStream = ChaChaStream> {
    specs: HardwareSpecs,
    stream: R,
    noise: ChaCha8Rng,
    seed: u64,
    initialized: bool,
    epoch: Instant,

    pin_modes: Vec<PinMode>,
    pin_values: Vec<u8>,
    analog_inputs: Vec<u16>,
    pwm_values: BTreeMap<u8, u8>,

    serial_baud: Option<u32>,
    serial_log: Vec<String>,
    serial_bytes: u64,

    sram_used: u64,

    instruction_count: u64,
    cycle_estimate: u64,
    call_counts: HashMap<&'static str, u64>,
}

impl DeviceMock<ChaChaStream> {
    /// Initialized device drawing from a ChaCha stream seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::seeded(ChaChaStream::new(seed), seed)
    }
}

impl<R: RandomStream> DeviceMock<R> {
    /// Uninitialized device around `stream`.
    ///
    /// Primitives already work; [`Self::initialize`] seeds the streams and
    /// clears every counter and log accumulated so far.
    #[must_use]
    pub fn with_stream(stream: R) -> Self {
        let specs = HardwareSpecs::UNO_R4_WIFI;
        Self {
            specs,
            stream,
            noise: ChaCha8Rng::seed_from_u64(NOISE_SALT),
            seed: 0,
            initialized: false,
            epoch: Instant::now(),
            pin_modes: vec![PinMode::Input; usize::from(specs.digital_pins)],
            pin_values: vec![0; usize::from(specs.digital_pins)],
            analog_inputs: vec![0; usize::from(specs.analog_pins)],
            pwm_values: specs.pwm_pins.iter().map(|&p| (p, 0)).collect(),
            serial_baud: None,
            serial_log: Vec::new(),
            serial_bytes: 0,
            sram_used: 0,
            instruction_count: 0,
            cycle_estimate: 0,
            call_counts: HashMap::new(),
        }
    }

    /// Initialized device around `stream`.
    #[must_use]
    pub fn seeded(stream: R, seed: u64) -> Self {
        let mut dev = Self::with_stream(stream);
        dev.init_state(seed);
        dev
    }

    /// Seed the draw stream, reset counters and logs, and start the clock.
    ///
    /// Fails with [`SimError::AlreadyInitialized`] on a second call.
    pub fn initialize(&mut self, seed: u64) -> SimResult<()> {
        if self.initialized {
            return Err(SimError::AlreadyInitialized);
        }
        self.init_state(seed);
        Ok(())
    }

    fn init_state(&mut self, seed: u64) {
        self.stream.reseed(seed);
        self.noise = ChaCha8Rng::seed_from_u64(seed ^ NOISE_SALT);
        self.seed = seed;
        self.serial_baud = None;
        self.serial_log.clear();
        self.serial_bytes = 0;
        self.sram_used = 0;
        self.instruction_count = 0;
        self.cycle_estimate = 0;
        self.call_counts.clear();
        self.epoch = Instant::now();
        self.initialized = true;
        debug!(seed, board = self.specs.board_name, "device initialized");
    }

    #[inline]
    fn charge(&mut self, name: &'static str, cycles: u64) {
        self.instruction_count += 1;
        self.cycle_estimate = self.cycle_estimate.saturating_add(cycles);
        *self.call_counts.entry(name).or_insert(0) += 1;
    }

    fn digital_index(&self, pin: u8) -> SimResult<usize> {
        if pin < self.specs.digital_pins {
            Ok(usize::from(pin))
        } else {
            Err(SimError::InvalidPin { kind: "digital", pin })
        }
    }

    fn analog_index(&self, pin: u8) -> SimResult<usize> {
        if pin < self.specs.analog_pins {
            Ok(usize::from(pin))
        } else {
            Err(SimError::InvalidPin { kind: "analog", pin })
        }
    }

    /* ------------------------------- timing ------------------------------- */

    /// Milliseconds since initialization.
    ///
    /// Wraps at 2^32 like the board's `millis()` (about 49.7 days), so
    /// readings are non-decreasing only until the first wrap; compare
    /// readings with `wrapping_sub`.
    pub fn elapsed_millis(&mut self) -> u32 {
        self.charge("timing", cycles::MILLIS);
        wrap_u32(self.epoch.elapsed().as_millis())
    }

    /// Microseconds since initialization.
    ///
    /// Wraps at 2^32 like the board's `micros()`, which happens after about
    /// 71.6 minutes of wall-clock time. Runs longer than that see the value
    /// drop back toward zero; compare readings with `wrapping_sub`.
    pub fn elapsed_micros(&mut self) -> u32 {
        self.charge("timing", cycles::MICROS);
        wrap_u32(self.epoch.elapsed().as_micros())
    }

    /// Block for `ms` milliseconds of real time.
    pub fn delay_millis(&mut self, ms: u32) {
        let cost = u64::from(ms) * (self.specs.clock_hz() / 1_000);
        self.charge("delay", cost);
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }

    /// Block for `us` microseconds of real time.
    pub fn delay_micros(&mut self, us: u32) {
        let cost = u64::from(us) * (self.specs.clock_hz() / 1_000_000);
        self.charge("delayMicroseconds", cost);
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }

    /* ------------------------------- random ------------------------------- */

    /// Next draw from the seeded stream, restricted to `[min, max)`.
    pub fn draw_uniform(&mut self, min: i64, max: i64) -> SimResult<i64> {
        self.charge("random", cycles::RANDOM);
        if min >= max {
            return Err(SimError::InvalidRange { min, max });
        }
        Ok(self.stream.next_in_range(min, max))
    }

    /// Restart the draw stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.charge("randomSeed", cycles::RANDOM_SEED);
        self.stream.reseed(seed);
        self.seed = seed;
    }

    /* ----------------------------- digital I/O ---------------------------- */

    /// Configure a digital pin.
    pub fn set_pin_mode(&mut self, pin: u8, mode: PinMode) -> SimResult<()> {
        self.charge("pinMode", cycles::PIN_MODE);
        let i = self.digital_index(pin)?;
        self.pin_modes[i] = mode;
        trace!(pin, ?mode, "pinMode");
        Ok(())
    }

    /// Drive a digital pin; non-zero is HIGH.
    ///
    /// Only pins configured as [`PinMode::Output`] latch the value; writes to
    /// input pins are metered and otherwise ignored.
    pub fn write_digital(&mut self, pin: u8, value: u8) -> SimResult<()> {
        self.charge("digitalWrite", cycles::DIGITAL_WRITE);
        let i = self.digital_index(pin)?;
        if self.pin_modes[i] == PinMode::Output {
            self.pin_values[i] = u8::from(value != 0);
        }
        trace!(pin, value, "digitalWrite");
        Ok(())
    }

    /// Read a digital pin (pull-up inputs read HIGH).
    pub fn read_digital(&mut self, pin: u8) -> SimResult<u8> {
        self.charge("digitalRead", cycles::DIGITAL_READ);
        let i = self.digital_index(pin)?;
        Ok(match self.pin_modes[i] {
            PinMode::InputPullup => 1,
            PinMode::Input | PinMode::Output => self.pin_values[i],
        })
    }

    /* ----------------------------- analog I/O ----------------------------- */

    /// Set the base level an analog pin sees (clamped to the ADC range).
    ///
    /// This is stimulus from outside the board, so it is not metered.
    pub fn set_analog_input(&mut self, pin: u8, value: u16) -> SimResult<()> {
        let i = self.analog_index(pin)?;
        self.analog_inputs[i] = value.min(self.specs.adc_max());
        Ok(())
    }

    /// Sample an analog pin: base level plus bounded noise, clamped to
    /// `[0, 4095]`.
    ///
    /// Noise is the sum of four uniform draws in `[-2, 2]` from a stream
    /// derived from the seed but independent of the draw stream, so sampling
    /// never shifts the generator's sequence.
    pub fn read_analog(&mut self, pin: u8) -> SimResult<u16> {
        self.charge("analogRead", cycles::ANALOG_READ);
        let i = self.analog_index(pin)?;
        let noise: i32 = (0..4).map(|_| self.noise.random_range(-2i32..=2)).sum();
        let raw = i32::from(self.analog_inputs[i]) + noise;
        Ok(raw.clamp(0, i32::from(self.specs.adc_max())) as u16)
    }

    /// PWM output on a PWM-capable pin; `duty` must lie in `[0, 255]`.
    pub fn write_pwm(&mut self, pin: u8, duty: i32) -> SimResult<()> {
        self.charge("analogWrite", cycles::ANALOG_WRITE);
        if !self.specs.is_pwm_pin(pin) {
            return Err(SimError::InvalidPin { kind: "pwm", pin });
        }
        let duty = u8::try_from(duty).map_err(|_| SimError::InvalidDutyCycle(duty))?;
        self.pwm_values.insert(pin, duty);
        trace!(pin, duty, "analogWrite");
        Ok(())
    }

    /* ------------------------------- serial ------------------------------- */

    /// Open the serial port; calling again only updates the rate.
    pub fn begin_serial(&mut self, baud: u32) {
        self.charge("Serial.begin", cycles::SERIAL_BEGIN);
        self.serial_baud = Some(baud);
        debug!(baud, "serial begun");
    }

    /// Append one line to the serial log.
    ///
    /// Fails with [`SimError::SerialNotBegun`] before [`Self::begin_serial`].
    pub fn write_serial_line(&mut self, text: &str) -> SimResult<()> {
        let Some(baud) = self.serial_baud else {
            self.charge("Serial.println", 0);
            return Err(SimError::SerialNotBegun);
        };
        // Ten bit-times per character (start + 8 data + stop) at `baud`.
        let chars = text.len() as u64 + 1;
        let per_char = self.specs.clock_hz() / u64::from(baud.max(1));
        self.charge("Serial.println", chars * per_char * 10);

        self.serial_bytes += chars;
        self.serial_log.push(text.to_owned());
        Ok(())
    }

    /// Lines written so far, oldest first.
    #[must_use]
    pub fn serial_log(&self) -> &[String] {
        &self.serial_log
    }

    /// Configured baud rate, if the port was begun.
    #[must_use]
    pub const fn serial_baud_rate(&self) -> Option<u32> {
        self.serial_baud
    }

    /* -------------------------------- SRAM -------------------------------- */

    /// Reserve `bytes` of working memory; `false` (and no change) if that
    /// would exceed capacity.
    pub fn allocate_sram(&mut self, bytes: u64) -> bool {
        match self.sram_used.checked_add(bytes) {
            Some(total) if total <= self.specs.sram_bytes() => {
                self.sram_used = total;
                true
            }
            _ => false,
        }
    }

    /// Release `bytes` of working memory (saturating at zero).
    pub fn free_sram(&mut self, bytes: u64) {
        self.sram_used = self.sram_used.saturating_sub(bytes);
    }

    /// Unreserved working memory in bytes.
    #[must_use]
    pub fn free_memory(&self) -> u64 {
        self.specs.sram_bytes().saturating_sub(self.sram_used)
    }

    /* ---------------------------- metering -------------------------------- */

    /// Estimated share of SRAM in use, in percent (capped at 100).
    #[must_use]
    pub fn memory_footprint_estimate(&self) -> f64 {
        let bytes = STATIC_FOOTPRINT_BYTES
            + COUNTER_ENTRY_BYTES * self.call_counts.len() as u64
            + self.serial_bytes
            + self.sram_used;
        (bytes as f64 * 100.0 / self.specs.sram_bytes() as f64).min(100.0)
    }

    /// Side-effect-free copy of the counters.
    #[must_use]
    pub fn snapshot_stats(&self) -> PerformanceSnapshot {
        PerformanceSnapshot {
            instruction_count: self.instruction_count,
            function_call_counts: self
                .call_counts
                .iter()
                .map(|(k, v)| ((*k).to_owned(), *v))
                .collect(),
            memory_footprint_estimate: self.memory_footprint_estimate(),
            cycle_estimate: self.cycle_estimate,
            sram_usage_bytes: self.sram_used,
        }
    }

    /// Zero the counters and restart the clock; the draw stream, pins and
    /// serial log are untouched.
    pub fn reset_performance_counters(&mut self) {
        self.instruction_count = 0;
        self.cycle_estimate = 0;
        self.call_counts.clear();
        self.epoch = Instant::now();
    }

    /* ----------------------------- accessors ------------------------------ */

    /// Declared board identity.
    #[must_use]
    pub const fn hardware_info(&self) -> &HardwareSpecs {
        &self.specs
    }

    /// Seed the draw stream was last (re)seeded with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether [`Self::initialize`] (or a seeded constructor) ran.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Total primitive calls.
    #[must_use]
    pub const fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    /// Calls recorded under `name`.
    #[must_use]
    pub fn call_count(&self, name: &str) -> u64 {
        self.call_counts.get(name).copied().unwrap_or(0)
    }

    /// Mode of a digital pin.
    #[must_use]
    pub fn pin_mode(&self, pin: u8) -> Option<PinMode> {
        self.pin_modes.get(usize::from(pin)).copied()
    }

    /// Latched value of a digital pin.
    #[must_use]
    pub fn pin_value(&self, pin: u8) -> Option<u8> {
        self.pin_values.get(usize::from(pin)).copied()
    }

    /// Current duty of a PWM pin.
    #[must_use]
    pub fn pwm_value(&self, pin: u8) -> Option<u8> {
        self.pwm_values.get(&pin).copied()
    }
}
