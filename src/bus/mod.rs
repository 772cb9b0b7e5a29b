//! # Bus Module
//!
//! Delivers the packed digit frame byte to the downstream digit controller
//! over I2C, recovering from a single transient write failure.
//!
//! This module handles:
//! - The [`ByteBus`] and [`ResetLine`] trait seams
//! - The write-retry state machine around the bus write
//! - The rppal-backed I2C bus and GPIO reset-line implementations
//!
//! ## Recovery Policy
//!
//! Per frame: `Idle -> Writing -> { Success | Fault -> Resetting ->
//! Writing(retry) -> { Success | Fatal } }`. A failed write triggers one
//! hardware reset pulse of the downstream controller followed by exactly one
//! retry; a second failure propagates as fatal for that message. No state
//! persists across messages, and the caller owns any higher-level
//! resilience.

use tracing::{debug, warn};

use crate::error::Result;
use crate::mapping::frame::Frame;

/// Default I2C address of the downstream digit controller.
pub const DEFAULT_BUS_ADDRESS: u16 = 0x47;

/// How long the reset line is held low, in milliseconds.
pub const RESET_HOLD_MS: u64 = 250;

/// How long the downstream controller gets to settle after release,
/// in milliseconds.
pub const RESET_SETTLE_MS: u64 = 250;

/// Single-byte write access to the downstream controller.
pub trait ByteBus: Send {
    /// Writes one byte to the controller's fixed bus address.
    fn write_byte(&mut self, value: u8) -> Result<()>;
}

/// Hardware reset control for the downstream controller.
pub trait ResetLine: Send {
    /// Produces one full reset pulse: drive the line low, hold, release,
    /// and wait for the controller to settle. Blocks for the pulse duration.
    fn pulse(&mut self) -> Result<()>;
}

/// I2C byte bus bound to a fixed slave address.
pub struct I2cBus {
    i2c: rppal::i2c::I2c,
    address: u16,
}

impl std::fmt::Debug for I2cBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I2cBus")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl I2cBus {
    /// Binds the bus to the digit controller's address.
    ///
    /// # Errors
    ///
    /// Returns error if the slave address cannot be set.
    pub fn open(mut i2c: rppal::i2c::I2c, address: u16) -> Result<Self> {
        i2c.set_slave_address(address)?;
        Ok(Self { i2c, address })
    }
}

impl ByteBus for I2cBus {
    fn write_byte(&mut self, value: u8) -> Result<()> {
        self.i2c.smbus_send_byte(value)?;
        Ok(())
    }
}

/// GPIO reset line for the downstream controller.
///
/// The pin is normally left as a high-impedance input. A pulse drives it low
/// as an output for [`RESET_HOLD_MS`], then returns it to an input (instead
/// of driving it high) so the controller's own pull-up ends the pulse
/// without bus contention, and finally waits [`RESET_SETTLE_MS`].
pub struct GpioResetLine {
    gpio: rppal::gpio::Gpio,
    pin: u8,
}

impl std::fmt::Debug for GpioResetLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpioResetLine")
            .field("pin", &self.pin)
            .finish_non_exhaustive()
    }
}

impl GpioResetLine {
    /// Creates a reset line on the given BCM pin.
    #[must_use]
    pub fn new(gpio: rppal::gpio::Gpio, pin: u8) -> Self {
        Self { gpio, pin }
    }
}

impl ResetLine for GpioResetLine {
    fn pulse(&mut self) -> Result<()> {
        // Dropping the OutputPin reverts the pin to its previous input role.
        {
            let _low = self.gpio.get(self.pin)?.into_output_low();
            std::thread::sleep(std::time::Duration::from_millis(RESET_HOLD_MS));
        }
        std::thread::sleep(std::time::Duration::from_millis(RESET_SETTLE_MS));
        Ok(())
    }
}

/// Writes frame bytes to the digit controller with one guarded retry.
///
/// # Examples
///
/// ```no_run
/// use hand_bridge::bus::{BusTransmitter, GpioResetLine, I2cBus, DEFAULT_BUS_ADDRESS};
/// use hand_bridge::mapping::frame::Frame;
///
/// # fn main() -> anyhow::Result<()> {
/// let gpio = rppal::gpio::Gpio::new()?;
/// let bus = I2cBus::open(rppal::i2c::I2c::new()?, DEFAULT_BUS_ADDRESS)?;
/// let reset = GpioResetLine::new(gpio, 15);
///
/// let mut tx = BusTransmitter::new(bus, reset);
/// tx.transmit(Frame::Transmit(0x53))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BusTransmitter<B: ByteBus, R: ResetLine> {
    bus: B,
    reset: R,
}

impl<B: ByteBus, R: ResetLine> BusTransmitter<B, R> {
    /// Creates a transmitter over the given bus and reset line.
    #[must_use]
    pub fn new(bus: B, reset: R) -> Self {
        Self { bus, reset }
    }

    /// Transmits a frame, or does nothing for [`Frame::Skip`].
    ///
    /// On a write failure the downstream controller is reset and the write
    /// retried exactly once. Blocks the calling thread for the reset pulse
    /// duration in the failure path.
    ///
    /// # Errors
    ///
    /// Returns the retry's error if both write attempts fail, or the reset
    /// line's error if the pulse itself fails.
    pub fn transmit(&mut self, frame: Frame) -> Result<()> {
        let Some(byte) = frame.byte() else {
            debug!("Frame skipped, no bus write");
            return Ok(());
        };

        match self.bus.write_byte(byte) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Bus write failed ({}), resetting digit controller", e);
                self.reset.pulse()?;
                self.bus.write_byte(byte)
            }
        }
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::error::HandBridgeError;
    use std::sync::{Arc, Mutex};

    /// Mock byte bus for testing
    #[derive(Clone, Default)]
    pub struct MockByteBus {
        pub written: Arc<Mutex<Vec<u8>>>,
        pub failures_remaining: Arc<Mutex<usize>>,
    }

    impl MockByteBus {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes the next `count` writes fail before writes succeed again.
        pub fn fail_next(&self, count: usize) {
            *self.failures_remaining.lock().unwrap() = count;
        }

        pub fn written(&self) -> Vec<u8> {
            self.written.lock().unwrap().clone()
        }
    }

    impl ByteBus for MockByteBus {
        fn write_byte(&mut self, value: u8) -> Result<()> {
            let mut failures = self.failures_remaining.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(HandBridgeError::Bus("mock write failure".to_string()));
            }
            self.written.lock().unwrap().push(value);
            Ok(())
        }
    }

    /// Mock reset line that counts pulses without sleeping
    #[derive(Clone, Default)]
    pub struct MockResetLine {
        pub pulses: Arc<Mutex<usize>>,
    }

    impl MockResetLine {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn pulse_count(&self) -> usize {
            *self.pulses.lock().unwrap()
        }
    }

    impl ResetLine for MockResetLine {
        fn pulse(&mut self) -> Result<()> {
            *self.pulses.lock().unwrap() += 1;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::{MockByteBus, MockResetLine};
    use super::*;

    fn transmitter() -> (BusTransmitter<MockByteBus, MockResetLine>, MockByteBus, MockResetLine) {
        let bus = MockByteBus::new();
        let reset = MockResetLine::new();
        (BusTransmitter::new(bus.clone(), reset.clone()), bus, reset)
    }

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_BUS_ADDRESS, 0x47);
        assert_eq!(RESET_HOLD_MS, 250);
        assert_eq!(RESET_SETTLE_MS, 250);
    }

    #[test]
    fn test_clean_write_needs_no_reset() {
        let (mut tx, bus, reset) = transmitter();

        tx.transmit(Frame::Transmit(0x53)).unwrap();

        assert_eq!(bus.written(), vec![0x53]);
        assert_eq!(reset.pulse_count(), 0);
    }

    #[test]
    fn test_skip_frame_writes_nothing() {
        let (mut tx, bus, reset) = transmitter();

        tx.transmit(Frame::Skip).unwrap();

        assert!(bus.written().is_empty());
        assert_eq!(reset.pulse_count(), 0);
    }

    #[test]
    fn test_single_failure_recovers_with_one_pulse() {
        let (mut tx, bus, reset) = transmitter();
        bus.fail_next(1);

        tx.transmit(Frame::Transmit(0x35)).unwrap();

        // Exactly one reset pulse and one successful final write
        assert_eq!(reset.pulse_count(), 1);
        assert_eq!(bus.written(), vec![0x35]);
    }

    #[test]
    fn test_two_failures_are_fatal_after_one_pulse() {
        let (mut tx, bus, reset) = transmitter();
        bus.fail_next(2);

        let result = tx.transmit(Frame::Transmit(0x35));

        assert!(result.is_err());
        assert_eq!(reset.pulse_count(), 1);
        assert!(bus.written().is_empty());
    }

    #[test]
    fn test_state_resets_between_messages() {
        let (mut tx, bus, reset) = transmitter();

        bus.fail_next(1);
        tx.transmit(Frame::Transmit(0x11)).unwrap();

        // The retry budget is per message, so a later fault recovers again
        bus.fail_next(1);
        tx.transmit(Frame::Transmit(0x22)).unwrap();

        assert_eq!(bus.written(), vec![0x11, 0x22]);
        assert_eq!(reset.pulse_count(), 2);
    }
}
