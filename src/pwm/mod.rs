//! # PWM Module
//!
//! Drives the servo channels through a PCA9685 16-channel PWM controller
//! on the I2C bus.
//!
//! This module handles:
//! - The [`PwmSink`] trait the mapping engine writes through
//! - The PCA9685 driver (oscillator prescale setup, per-channel phase writes)
//!
//! The engine always passes a phase start equal to the channel index and the
//! clamped angle as the phase value, staggering channel switch-on points
//! across the PWM cycle.

use tracing::debug;

use crate::error::{HandBridgeError, Result};

/// Default I2C address of the PCA9685.
pub const DEFAULT_PWM_ADDRESS: u16 = 0x40;

/// Default PWM frequency for analog servos, in Hz.
pub const DEFAULT_PWM_FREQUENCY_HZ: u8 = 60;

/// PCA9685 internal oscillator frequency, in Hz.
const OSCILLATOR_HZ: f64 = 25_000_000.0;

/// PWM resolution (12-bit counter).
const RESOLUTION: f64 = 4096.0;

// PCA9685 registers
const REG_MODE1: u8 = 0x00;
const REG_PRESCALE: u8 = 0xFE;
const REG_LED0_ON_L: u8 = 0x06;

// MODE1 bits
const MODE1_SLEEP: u8 = 0x10;
const MODE1_RESTART: u8 = 0x80;

/// Sink for servo channel writes.
///
/// The mapping engine treats this as a pure side-effecting sink: writes are
/// issued unconditionally for every mapped value.
pub trait PwmSink: Send {
    /// Sets one channel's phase window: switch on at `on`, off at `off`,
    /// both in 0-4095 counts.
    fn set_channel(&mut self, channel: u8, on: u16, off: u16) -> Result<()>;
}

/// PCA9685 PWM controller on the I2C bus.
pub struct Pca9685 {
    i2c: rppal::i2c::I2c,
    address: u16,
}

impl std::fmt::Debug for Pca9685 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pca9685")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Pca9685 {
    /// Opens the controller at `address` and programs the output frequency.
    ///
    /// # Errors
    ///
    /// Returns error if the I2C bus cannot be addressed or the prescale
    /// setup writes fail.
    pub fn open(mut i2c: rppal::i2c::I2c, address: u16, frequency_hz: u8) -> Result<Self> {
        i2c.set_slave_address(address)?;

        let mut pwm = Self { i2c, address };
        pwm.set_frequency(frequency_hz)?;

        debug!("PCA9685 ready at 0x{:02X}, {} Hz", address, frequency_hz);
        Ok(pwm)
    }

    /// Programs the PWM output frequency.
    ///
    /// The prescaler can only be written while the oscillator sleeps, so the
    /// chip is put to sleep, reprogrammed, woken, and restarted.
    fn set_frequency(&mut self, frequency_hz: u8) -> Result<()> {
        let prescale =
            (OSCILLATOR_HZ / (RESOLUTION * f64::from(frequency_hz)) - 1.0).round() as u8;

        let old_mode = self.i2c.smbus_read_byte(REG_MODE1)?;
        let sleep_mode = (old_mode & !MODE1_RESTART) | MODE1_SLEEP;

        self.i2c.smbus_write_byte(REG_MODE1, sleep_mode)?;
        self.i2c.smbus_write_byte(REG_PRESCALE, prescale)?;
        self.i2c.smbus_write_byte(REG_MODE1, old_mode)?;

        std::thread::sleep(std::time::Duration::from_millis(5));
        self.i2c.smbus_write_byte(REG_MODE1, old_mode | MODE1_RESTART)?;

        Ok(())
    }
}

impl PwmSink for Pca9685 {
    fn set_channel(&mut self, channel: u8, on: u16, off: u16) -> Result<()> {
        if channel > 15 {
            return Err(HandBridgeError::Pwm(format!(
                "channel {} out of range (0-15)",
                channel
            )));
        }

        let register = REG_LED0_ON_L + 4 * channel;
        self.i2c.block_write(
            register,
            &[
                (on & 0xFF) as u8,
                (on >> 8) as u8,
                (off & 0xFF) as u8,
                (off >> 8) as u8,
            ],
        )?;

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::MockPwmSink;
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_PWM_ADDRESS, 0x40);
        assert_eq!(DEFAULT_PWM_FREQUENCY_HZ, 60);
        assert_eq!(REG_LED0_ON_L, 0x06);
    }

    #[test]
    fn test_prescale_for_60hz() {
        // 25MHz / (4096 * 60) - 1 = 100.7 -> 101
        let prescale = (OSCILLATOR_HZ / (RESOLUTION * 60.0) - 1.0).round() as u8;
        assert_eq!(prescale, 101);
    }

    #[test]
    fn test_channel_register_layout() {
        // Each channel occupies four consecutive registers from LED0_ON_L
        assert_eq!(REG_LED0_ON_L + 4 * 0, 0x06);
        assert_eq!(REG_LED0_ON_L + 4 * 3, 0x12);
        assert_eq!(REG_LED0_ON_L + 4 * 15, 0x42);
    }

    #[test]
    fn test_mock_records_writes() {
        let mut sink = MockPwmSink::new();
        sink.set_channel(0, 0, 320).unwrap();
        sink.set_channel(1, 1, 410).unwrap();

        assert_eq!(sink.written(), vec![(0, 0, 320), (1, 1, 410)]);
    }

    #[test]
    fn test_mock_error_injection() {
        let mut sink = MockPwmSink::new();
        sink.set_fail(true);
        assert!(sink.set_channel(0, 0, 320).is_err());
        assert!(sink.written().is_empty());
    }
}
