//! Declared hardware identity of the emulated board.
//!
//! These are fixed configuration constants consumed by external diagnostics;
//! nothing in the simulator computes or mutates them.

use serde::Serialize;

/// Static description of the board the device mock stands in for.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareSpecs {
    /// Marketing name of the board.
    pub board_name: &'static str,
    /// Microcontroller part.
    pub mcu: &'static str,
    /// CPU core architecture.
    pub architecture: &'static str,
    /// Core clock in MHz.
    pub clock_speed_mhz: f64,
    /// Working memory in KiB.
    pub sram_kb: u32,
    /// Program memory in KiB.
    pub flash_kb: u32,
    /// Emulated EEPROM in KiB.
    pub eeprom_kb: u32,
    /// Number of digital I/O pins.
    pub digital_pins: u8,
    /// Number of analog input pins.
    pub analog_pins: u8,
    /// Digital pins that support PWM output.
    pub pwm_pins: &'static [u8],
    /// ADC resolution in bits.
    pub adc_resolution_bits: u8,
    /// Operating voltage in volts.
    pub operating_voltage: f64,
}

impl HardwareSpecs {
    /// Arduino Uno R4 WiFi (Renesas RA4M1).
    pub const UNO_R4_WIFI: Self = Self {
        board_name: "Arduino Uno R4 WiFi",
        mcu: "Renesas RA4M1",
        architecture: "ARM Cortex-M4",
        clock_speed_mhz: 48.0,
        sram_kb: 32,
        flash_kb: 256,
        eeprom_kb: 8,
        digital_pins: 14,
        analog_pins: 6,
        pwm_pins: &[3, 5, 6, 9, 10, 11],
        adc_resolution_bits: 12,
        operating_voltage: 5.0,
    };

    /// Clock rate in Hz.
    #[inline]
    #[must_use]
    pub fn clock_hz(&self) -> u64 {
        // Exact for every whole-kHz clock.
        (self.clock_speed_mhz * 1_000_000.0).round() as u64
    }

    /// SRAM capacity in bytes.
    #[inline]
    #[must_use]
    pub const fn sram_bytes(&self) -> u64 {
        self.sram_kb as u64 * 1024
    }

    /// Largest value the ADC can report (`2^bits - 1`).
    #[inline]
    #[must_use]
    pub const fn adc_max(&self) -> u16 {
        ((1u32 << self.adc_resolution_bits) - 1) as u16
    }

    /// Whether `pin` can drive PWM output.
    #[inline]
    #[must_use]
    pub fn is_pwm_pin(&self, pin: u8) -> bool {
        self.pwm_pins.contains(&pin)
    }
}

impl Default for HardwareSpecs {
    fn default() -> Self {
        Self::UNO_R4_WIFI
    }
}
