//! # Hand Mapper Module
//!
//! Converts decoded per-hand telemetry into servo channel writes and the two
//! digit nibbles used for downstream framing.
//!
//! ## Channel Pairs
//!
//! The four PWM channels form two physical pairs fixed to actuator hardware:
//!
//! | Pair | Channels | Meaning |
//! |------|----------|-------------------|
//! | A | 0 (yaw), 1 (pitch) | stage-left pair |
//! | B | 2 (yaw), 3 (pitch) | stage-right pair |
//!
//! Which hand drives which pair depends on the operating mode:
//!
//! | Mode | Left hand → | Right hand → | Transform |
//! |----------|--------|--------|--------------------|
//! | Mirror | pair A | pair B | clamp (identity) |
//! | Clone | pair B | pair A | clamp, then invert |
//! | Disabled | none | none | n/a |
//!
//! Mirror reproduces bilateral symmetry (left input drives the physically
//! left actuator pair). Clone reproduces same-side duplication, which needs
//! geometric inversion because the destination pair is physically mirrored
//! relative to the source hand.

use crate::mapping::mode::OperatingMode;
use crate::mapping::transform::ServoRange;
use crate::telemetry::{DigitMask, Hand, HandTelemetry, TelemetryMessage};

/// A servo channel pair: one yaw channel and one pitch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelPair {
    /// PWM channel carrying the yaw axis.
    pub yaw: u8,
    /// PWM channel carrying the pitch axis.
    pub pitch: u8,
}

/// Stage-left channel pair (channels 0 and 1).
pub const PAIR_A: ChannelPair = ChannelPair { yaw: 0, pitch: 1 };

/// Stage-right channel pair (channels 2 and 3).
pub const PAIR_B: ChannelPair = ChannelPair { yaw: 2, pitch: 3 };

/// Returns the destination channel pair for a hand in a mode, or `None`
/// when the mode suppresses servo output.
#[must_use]
pub fn channel_pair(mode: OperatingMode, hand: Hand) -> Option<ChannelPair> {
    match (mode, hand) {
        (OperatingMode::Mirror, Hand::Left) => Some(PAIR_A),
        (OperatingMode::Mirror, Hand::Right) => Some(PAIR_B),
        (OperatingMode::Clone, Hand::Left) => Some(PAIR_B),
        (OperatingMode::Clone, Hand::Right) => Some(PAIR_A),
        (OperatingMode::Disabled, _) => None,
    }
}

/// One pending PWM write: a channel index and a clamped pulse value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoWrite {
    /// PWM channel index (0-15).
    pub channel: u8,
    /// Clamped pulse value, always within the configured servo range.
    pub value: u16,
}

/// Result of mapping one telemetry message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MappingOutput {
    /// Servo writes to issue, at most four (two axes per present hand).
    pub writes: Vec<ServoWrite>,
    /// Left hand's digit nibble for framing (0 if absent or disabled).
    pub left_digits: DigitMask,
    /// Right hand's digit nibble for framing (0 if absent or disabled).
    pub right_digits: DigitMask,
}

/// Maps hand telemetry to servo writes and framing nibbles.
///
/// Pure and infallible: angles are clamped rather than rejected, and absent
/// hands simply contribute nothing.
///
/// # Examples
///
/// ```
/// use hand_bridge::mapping::mapper::HandMapper;
/// use hand_bridge::mapping::mode::OperatingMode;
/// use hand_bridge::telemetry::TelemetryMessage;
///
/// let mapper = HandMapper::default();
/// let msg = TelemetryMessage::from_json(
///     r#"{ "left_hand": { "left_yaw": 320, "left_pitch": 410, "left_byte": 3 } }"#,
/// ).unwrap();
///
/// let out = mapper.map(OperatingMode::Mirror, &msg);
/// assert_eq!(out.writes.len(), 2); // yaw + pitch on channels 0 and 1
/// assert_eq!(out.left_digits.value(), 3);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HandMapper {
    range: ServoRange,
}

impl HandMapper {
    /// Creates a mapper with the given servo pulse range.
    #[must_use]
    pub fn new(range: ServoRange) -> Self {
        Self { range }
    }

    /// Maps one telemetry message under the given operating mode.
    ///
    /// In `Disabled` mode no writes are produced and both nibbles are forced
    /// to zero regardless of telemetry content, which makes the frame packer
    /// skip transmission entirely.
    #[must_use]
    pub fn map(&self, mode: OperatingMode, message: &TelemetryMessage) -> MappingOutput {
        if mode == OperatingMode::Disabled {
            return MappingOutput::default();
        }

        let mut out = MappingOutput::default();

        if let Some(left) = message.hand(Hand::Left) {
            self.map_hand(mode, Hand::Left, left, &mut out.writes);
            out.left_digits = left.digits;
        }

        if let Some(right) = message.hand(Hand::Right) {
            self.map_hand(mode, Hand::Right, right, &mut out.writes);
            out.right_digits = right.digits;
        }

        out
    }

    /// Maps one present hand onto its destination channel pair.
    fn map_hand(
        &self,
        mode: OperatingMode,
        hand: Hand,
        telemetry: &HandTelemetry,
        writes: &mut Vec<ServoWrite>,
    ) {
        let Some(pair) = channel_pair(mode, hand) else {
            return;
        };

        writes.push(ServoWrite {
            channel: pair.yaw,
            value: self.transform(mode, telemetry.yaw),
        });
        writes.push(ServoWrite {
            channel: pair.pitch,
            value: self.transform(mode, telemetry.pitch),
        });
    }

    /// Applies the mode's per-axis transform.
    fn transform(&self, mode: OperatingMode, value: i32) -> u16 {
        match mode {
            OperatingMode::Mirror => self.range.clamp(value),
            OperatingMode::Clone => self.range.invert(value),
            OperatingMode::Disabled => self.range.clamp(value),
        }
    }
}
