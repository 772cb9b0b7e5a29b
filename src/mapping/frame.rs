//! # Frame Packer Module
//!
//! Merges the two digit nibbles into the single byte sent to the downstream
//! digit controller, and decides whether transmission happens at all.
//!
//! ## Nibble Layout
//!
//! | Mode | Byte layout | Transmit? |
//! |----------|----------------------|-----------|
//! | Mirror | `left \| right << 4` | yes |
//! | Clone | `left << 4 \| right` | yes |
//! | Disabled | n/a | no |
//!
//! The downstream controller's digit-channel wiring is fixed to the physical
//! actuator pairs. Clone and Mirror swap which hand drives which pair, so
//! the nibble order swaps with them to keep each hand's digit bits aligned
//! with the same physical channel group as its yaw/pitch writes.

use crate::mapping::mode::OperatingMode;
use crate::telemetry::DigitMask;

/// Outcome of packing a frame: a byte to transmit, or nothing.
///
/// An explicit sum type rather than a sentinel byte value, so "skip" cannot
/// be confused with payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Transmit this byte to the digit controller.
    Transmit(u8),
    /// Suppress transmission for this message.
    Skip,
}

impl Frame {
    /// Returns the payload byte, or `None` for [`Frame::Skip`].
    #[must_use]
    pub fn byte(self) -> Option<u8> {
        match self {
            Frame::Transmit(byte) => Some(byte),
            Frame::Skip => None,
        }
    }
}

/// Packs both hands' digit nibbles per the mode's bit layout.
///
/// # Examples
///
/// ```
/// use hand_bridge::mapping::frame::{pack, Frame};
/// use hand_bridge::mapping::mode::OperatingMode;
/// use hand_bridge::telemetry::DigitMask;
///
/// let left = DigitMask::from_low_nibble(0x3);
/// let right = DigitMask::from_high_nibble(0x50);
///
/// assert_eq!(pack(OperatingMode::Mirror, left, right), Frame::Transmit(0x53));
/// assert_eq!(pack(OperatingMode::Clone, left, right), Frame::Transmit(0x35));
/// assert_eq!(pack(OperatingMode::Disabled, left, right), Frame::Skip);
/// ```
#[must_use]
pub fn pack(mode: OperatingMode, left: DigitMask, right: DigitMask) -> Frame {
    match mode {
        OperatingMode::Mirror => Frame::Transmit(left.value() | (right.value() << 4)),
        OperatingMode::Clone => Frame::Transmit((left.value() << 4) | right.value()),
        OperatingMode::Disabled => Frame::Skip,
    }
}
