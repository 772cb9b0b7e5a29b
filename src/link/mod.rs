//! # Link Module
//!
//! The binary "connected" indicator line.
//!
//! A digital output is driven high on successful subscription or
//! reconnection and low on disconnection or any reported transport error.
//! It is a pure side-effect signal with no feedback into the mapping logic:
//! `Disconnected(low) --connect/reconnect--> Connected(high)
//! --disconnect/error--> Disconnected(low)`.

use tracing::info;

use crate::error::Result;

/// A single digital output line.
pub trait DigitalOutput: Send {
    /// Drives the line high.
    fn set_high(&mut self) -> Result<()>;

    /// Drives the line low.
    fn set_low(&mut self) -> Result<()>;
}

impl DigitalOutput for rppal::gpio::OutputPin {
    fn set_high(&mut self) -> Result<()> {
        rppal::gpio::OutputPin::set_high(self);
        Ok(())
    }

    fn set_low(&mut self) -> Result<()> {
        rppal::gpio::OutputPin::set_low(self);
        Ok(())
    }
}

/// Drives the connectivity indicator per the transport's lifecycle.
#[derive(Debug)]
pub struct ConnectivitySignal<O: DigitalOutput> {
    line: O,
}

impl<O: DigitalOutput> ConnectivitySignal<O> {
    /// Creates the signal and drives it low (disconnected) initially.
    ///
    /// # Errors
    ///
    /// Returns error if the line cannot be driven.
    pub fn new(mut line: O) -> Result<Self> {
        line.set_low()?;
        Ok(Self { line })
    }

    /// Signals an established or re-established subscription.
    ///
    /// # Errors
    ///
    /// Returns error if the line cannot be driven.
    pub fn connected(&mut self) -> Result<()> {
        info!("Transport connected");
        self.line.set_high()
    }

    /// Signals a disconnection or a reported transport error.
    ///
    /// # Errors
    ///
    /// Returns error if the line cannot be driven.
    pub fn disconnected(&mut self) -> Result<()> {
        info!("Transport disconnected");
        self.line.set_low()
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock output line recording every level transition
    #[derive(Clone, Default)]
    pub struct MockOutput {
        pub levels: Arc<Mutex<Vec<bool>>>,
    }

    impl MockOutput {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn levels(&self) -> Vec<bool> {
            self.levels.lock().unwrap().clone()
        }
    }

    impl DigitalOutput for MockOutput {
        fn set_high(&mut self) -> Result<()> {
            self.levels.lock().unwrap().push(true);
            Ok(())
        }

        fn set_low(&mut self) -> Result<()> {
            self.levels.lock().unwrap().push(false);
            Ok(())
        }
    }
}
