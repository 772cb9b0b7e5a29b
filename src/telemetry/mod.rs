//! # Telemetry Module
//!
//! Inbound hand-tracking telemetry schema and decoding.
//!
//! This module handles:
//! - Decoding JSON telemetry messages from the transport
//! - Per-hand yaw/pitch angle records
//! - Digit-mask nibble normalization
//!
//! ## Wire Schema
//!
//! Each message carries zero, one, or two optional hand records:
//!
//! ```json
//! {
//!   "left_hand":  { "left_yaw": 320,  "left_pitch": 410,  "left_byte": 5 },
//!   "right_hand": { "right_yaw": 280, "right_pitch": 390, "right_byte": 80 }
//! }
//! ```
//!
//! An absent hand record means "no update for that hand this tick": the
//! corresponding servo channels are left untouched and its digit
//! contribution is zero for framing.
//!
//! ## Digit Nibble Normalization
//!
//! The upstream tracker packs the left hand's digit mask in the low nibble
//! of its byte and the right hand's digit mask in the high nibble. That
//! positioning is a transport encoding detail, so it is undone here at the
//! decode boundary: [`DigitMask::from_low_nibble`] and
//! [`DigitMask::from_high_nibble`] both yield a plain nibble value (0-15),
//! and everything downstream works with normalized nibbles only.

use serde::Deserialize;

use crate::error::Result;

/// Hand identity for a telemetry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

/// A normalized 4-bit digit (finger open/closed) mask.
///
/// Always holds a value in 0-15, regardless of where the upstream encoder
/// positioned the bits in its digit byte.
///
/// # Examples
///
/// ```
/// use hand_bridge::telemetry::DigitMask;
///
/// // Left-hand digit bytes arrive in the low nibble.
/// assert_eq!(DigitMask::from_low_nibble(0x0B).value(), 0x0B);
///
/// // Right-hand digit bytes arrive pre-positioned in the high nibble.
/// assert_eq!(DigitMask::from_high_nibble(0x50).value(), 0x05);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DigitMask(u8);

impl DigitMask {
    /// Empty mask (all digits closed).
    pub const EMPTY: DigitMask = DigitMask(0);

    /// Builds a mask from the low nibble of a digit byte (left hand).
    #[must_use]
    pub fn from_low_nibble(byte: u8) -> Self {
        Self(byte & 0x0F)
    }

    /// Builds a mask from the high nibble of a digit byte (right hand).
    ///
    /// The upstream tracker shifts the right hand's mask into the high
    /// nibble before transmission; this constructor shifts it back down.
    #[must_use]
    pub fn from_high_nibble(byte: u8) -> Self {
        Self((byte >> 4) & 0x0F)
    }

    /// Returns the nibble value (0-15).
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

/// One hand's telemetry for a single tick.
///
/// Yaw and pitch are raw pulse-length values from the tracker; they are
/// clamped into the servo range by the mapping engine before emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandTelemetry {
    /// Yaw angle as a raw pulse-length value.
    pub yaw: i32,
    /// Pitch angle as a raw pulse-length value.
    pub pitch: i32,
    /// Normalized digit mask.
    pub digits: DigitMask,
}

/// A decoded telemetry message: up to one record per hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TelemetryMessage {
    /// Left-hand record, if the tracker reported one this tick.
    pub left: Option<HandTelemetry>,
    /// Right-hand record, if the tracker reported one this tick.
    pub right: Option<HandTelemetry>,
}

/// Raw wire form of a left-hand record.
#[derive(Debug, Deserialize)]
struct LeftHandRecord {
    left_yaw: i32,
    left_pitch: i32,
    left_byte: u8,
}

/// Raw wire form of a right-hand record.
#[derive(Debug, Deserialize)]
struct RightHandRecord {
    right_yaw: i32,
    right_pitch: i32,
    right_byte: u8,
}

/// Raw wire form of a telemetry message.
#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    left_hand: Option<LeftHandRecord>,
    #[serde(default)]
    right_hand: Option<RightHandRecord>,
}

impl TelemetryMessage {
    /// Decodes a telemetry message from its JSON wire form.
    ///
    /// Digit bytes are normalized to nibble values here (see module docs).
    ///
    /// # Errors
    ///
    /// Returns [`HandBridgeError::Telemetry`](crate::error::HandBridgeError)
    /// if the payload is not valid JSON or a present hand record is missing
    /// one of its fields.
    pub fn from_json(payload: &str) -> Result<Self> {
        let raw: RawMessage = serde_json::from_str(payload)?;

        let left = raw.left_hand.map(|h| HandTelemetry {
            yaw: h.left_yaw,
            pitch: h.left_pitch,
            digits: DigitMask::from_low_nibble(h.left_byte),
        });

        let right = raw.right_hand.map(|h| HandTelemetry {
            yaw: h.right_yaw,
            pitch: h.right_pitch,
            digits: DigitMask::from_high_nibble(h.right_byte),
        });

        Ok(Self { left, right })
    }

    /// Returns the record for the given hand, if present.
    #[must_use]
    pub fn hand(&self, hand: Hand) -> Option<&HandTelemetry> {
        match hand {
            Hand::Left => self.left.as_ref(),
            Hand::Right => self.right.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== DigitMask Tests ====================

    #[test]
    fn test_low_nibble_used_as_is() {
        assert_eq!(DigitMask::from_low_nibble(0x03).value(), 0x03);
        assert_eq!(DigitMask::from_low_nibble(0x0F).value(), 0x0F);
    }

    #[test]
    fn test_low_nibble_masks_high_bits() {
        // Stray high bits in a left-hand byte must not leak into the mask
        assert_eq!(DigitMask::from_low_nibble(0xF3).value(), 0x03);
    }

    #[test]
    fn test_high_nibble_normalized() {
        assert_eq!(DigitMask::from_high_nibble(0x50).value(), 0x05);
        assert_eq!(DigitMask::from_high_nibble(0xF0).value(), 0x0F);
    }

    #[test]
    fn test_high_nibble_ignores_low_bits() {
        assert_eq!(DigitMask::from_high_nibble(0x5A).value(), 0x05);
    }

    #[test]
    fn test_mask_value_is_always_a_nibble() {
        for byte in 0..=255u8 {
            assert!(DigitMask::from_low_nibble(byte).value() <= 0x0F);
            assert!(DigitMask::from_high_nibble(byte).value() <= 0x0F);
        }
    }

    #[test]
    fn test_empty_mask() {
        assert_eq!(DigitMask::EMPTY.value(), 0);
        assert_eq!(DigitMask::default().value(), 0);
    }

    // ==================== Decoding Tests ====================

    #[test]
    fn test_decode_both_hands() {
        let payload = r#"{
            "left_hand":  { "left_yaw": 320,  "left_pitch": 410,  "left_byte": 5 },
            "right_hand": { "right_yaw": 280, "right_pitch": 390, "right_byte": 80 }
        }"#;

        let msg = TelemetryMessage::from_json(payload).unwrap();

        let left = msg.left.unwrap();
        assert_eq!(left.yaw, 320);
        assert_eq!(left.pitch, 410);
        assert_eq!(left.digits.value(), 5);

        let right = msg.right.unwrap();
        assert_eq!(right.yaw, 280);
        assert_eq!(right.pitch, 390);
        // 80 = 0x50, right-hand byte arrives high-nibble positioned
        assert_eq!(right.digits.value(), 5);
    }

    #[test]
    fn test_decode_left_hand_only() {
        let payload = r#"{ "left_hand": { "left_yaw": 100, "left_pitch": 200, "left_byte": 3 } }"#;
        let msg = TelemetryMessage::from_json(payload).unwrap();

        assert!(msg.left.is_some());
        assert!(msg.right.is_none());
    }

    #[test]
    fn test_decode_empty_message() {
        let msg = TelemetryMessage::from_json("{}").unwrap();
        assert!(msg.left.is_none());
        assert!(msg.right.is_none());
    }

    #[test]
    fn test_decode_invalid_json_fails() {
        assert!(TelemetryMessage::from_json("not json").is_err());
    }

    #[test]
    fn test_decode_missing_field_fails() {
        // A present record must be complete
        let payload = r#"{ "left_hand": { "left_yaw": 100 } }"#;
        assert!(TelemetryMessage::from_json(payload).is_err());
    }

    #[test]
    fn test_decode_negative_angles() {
        // Out-of-range angles are decoded as-is; clamping happens in mapping
        let payload = r#"{ "left_hand": { "left_yaw": -40, "left_pitch": 9000, "left_byte": 0 } }"#;
        let msg = TelemetryMessage::from_json(payload).unwrap();

        let left = msg.left.unwrap();
        assert_eq!(left.yaw, -40);
        assert_eq!(left.pitch, 9000);
    }

    #[test]
    fn test_hand_accessor() {
        let payload = r#"{ "right_hand": { "right_yaw": 1, "right_pitch": 2, "right_byte": 0 } }"#;
        let msg = TelemetryMessage::from_json(payload).unwrap();

        assert!(msg.hand(Hand::Left).is_none());
        assert_eq!(msg.hand(Hand::Right).unwrap().yaw, 1);
    }
}
