//! # Mode Switches Module
//!
//! Polls the two physical mode switches and publishes the operating mode.
//!
//! Both switches are active-low inputs. Switch 1 selects Clone, switch 2
//! selects Mirror, neither selects Disabled; if both are low, switch 1 wins
//! by evaluation order. The poller samples about once per second and writes
//! the decoded mode into the shared [`ModeCell`], so the mapping engine may
//! observe a mode change up to one poll interval late.

use tokio::time::{interval, Duration};
use tracing::{info, warn};

use crate::error::Result;
use crate::mapping::mode::{ModeCell, OperatingMode};

/// Default poll interval for the mode switches, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// The pair of physical mode switch inputs.
pub trait ModeSwitches: Send {
    /// Samples both switches. Returns `(switch1_low, switch2_low)`.
    fn read(&mut self) -> Result<(bool, bool)>;
}

/// Mode switches on two GPIO input pins with internal pull-ups.
pub struct GpioModeSwitches {
    switch1: rppal::gpio::InputPin,
    switch2: rppal::gpio::InputPin,
}

impl std::fmt::Debug for GpioModeSwitches {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpioModeSwitches").finish_non_exhaustive()
    }
}

impl GpioModeSwitches {
    /// Claims the two switch pins (BCM numbering) as pulled-up inputs.
    ///
    /// # Errors
    ///
    /// Returns error if either pin cannot be claimed.
    pub fn new(gpio: &rppal::gpio::Gpio, switch1_pin: u8, switch2_pin: u8) -> Result<Self> {
        Ok(Self {
            switch1: gpio.get(switch1_pin)?.into_input_pullup(),
            switch2: gpio.get(switch2_pin)?.into_input_pullup(),
        })
    }
}

impl ModeSwitches for GpioModeSwitches {
    fn read(&mut self) -> Result<(bool, bool)> {
        Ok((self.switch1.is_low(), self.switch2.is_low()))
    }
}

/// Decodes switch levels into an operating mode.
///
/// Switch 1 takes priority when both are low.
#[must_use]
pub fn decode_mode(switch1_low: bool, switch2_low: bool) -> OperatingMode {
    if switch1_low {
        OperatingMode::Clone
    } else if switch2_low {
        OperatingMode::Mirror
    } else {
        OperatingMode::Disabled
    }
}

/// Samples the switches once and publishes the decoded mode.
///
/// Returns the mode that was published.
///
/// # Errors
///
/// Returns error if the switches cannot be read.
pub fn poll_once<S: ModeSwitches>(switches: &mut S, cell: &ModeCell) -> Result<OperatingMode> {
    let (switch1_low, switch2_low) = switches.read()?;
    let mode = decode_mode(switch1_low, switch2_low);

    if mode != cell.load() {
        info!("Operating mode changed to {:?}", mode);
    }
    cell.store(mode);

    Ok(mode)
}

/// Runs the switch-poll loop until the task is dropped.
///
/// Read failures are logged and the previous mode stays in effect until the
/// next successful sample.
pub async fn run_mode_poller<S: ModeSwitches>(
    mut switches: S,
    cell: ModeCell,
    poll_interval_ms: u64,
) {
    let mut ticker = interval(Duration::from_millis(poll_interval_ms));

    loop {
        ticker.tick().await;
        if let Err(e) = poll_once(&mut switches, &cell) {
            warn!("Mode switch read failed: {}", e);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::MockSwitches;
    use super::*;

    #[test]
    fn test_decode_neither_low_is_disabled() {
        assert_eq!(decode_mode(false, false), OperatingMode::Disabled);
    }

    #[test]
    fn test_decode_switch1_selects_clone() {
        assert_eq!(decode_mode(true, false), OperatingMode::Clone);
    }

    #[test]
    fn test_decode_switch2_selects_mirror() {
        assert_eq!(decode_mode(false, true), OperatingMode::Mirror);
    }

    #[test]
    fn test_decode_switch1_wins_on_simultaneous_low() {
        assert_eq!(decode_mode(true, true), OperatingMode::Clone);
    }

    #[test]
    fn test_poll_once_publishes_mode() {
        let mut switches = MockSwitches::new();
        let cell = ModeCell::default();

        switches.set(false, true);
        assert_eq!(poll_once(&mut switches, &cell).unwrap(), OperatingMode::Mirror);
        assert_eq!(cell.load(), OperatingMode::Mirror);

        switches.set(false, false);
        poll_once(&mut switches, &cell).unwrap();
        assert_eq!(cell.load(), OperatingMode::Disabled);
    }
}
