//! # Operating Mode Module
//!
//! The process-wide operating mode and the shared cell it lives in.
//!
//! The mode is written by the switch-poll loop (about once per second) and
//! read by the mapping engine on every telemetry message. The two sides are
//! deliberately not synchronized beyond atomic access: a mode change may be
//! observed one message late, which only affects routing and transform
//! selection for that single message. [`ModeCell`] documents this contract.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Operating mode of the mapping engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatingMode {
    /// No servo writes, no bus transmission.
    #[default]
    Disabled = 0,
    /// Same-side duplication: left telemetry drives the stage-right pair
    /// with geometrically inverted angles.
    Clone = 1,
    /// Bilateral symmetry: left telemetry drives the stage-left pair with
    /// identity (clamped) angles.
    Mirror = 2,
}

impl OperatingMode {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => OperatingMode::Clone,
            2 => OperatingMode::Mirror,
            _ => OperatingMode::Disabled,
        }
    }
}

/// Shared cell holding the current [`OperatingMode`].
///
/// Cheap to clone; all clones observe the same mode. Reads and writes use
/// relaxed atomic ordering: the mode only selects routing and transforms,
/// never guards shared mutable data, so the accepted worst case is one
/// stale-mode message per mode change (bounded by the ~1s poll interval).
///
/// # Examples
///
/// ```
/// use hand_bridge::mapping::mode::{ModeCell, OperatingMode};
///
/// let cell = ModeCell::new(OperatingMode::Disabled);
/// cell.store(OperatingMode::Mirror);
/// assert_eq!(cell.load(), OperatingMode::Mirror);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModeCell {
    inner: Arc<AtomicU8>,
}

impl ModeCell {
    /// Creates a cell initialized to the given mode.
    #[must_use]
    pub fn new(mode: OperatingMode) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(mode as u8)),
        }
    }

    /// Reads the current mode. Latest write wins.
    #[must_use]
    pub fn load(&self) -> OperatingMode {
        OperatingMode::from_u8(self.inner.load(Ordering::Relaxed))
    }

    /// Publishes a new mode.
    pub fn store(&self, mode: OperatingMode) {
        self.inner.store(mode as u8, Ordering::Relaxed);
    }
}
