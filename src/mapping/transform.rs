//! # Angle Transform Module
//!
//! Pure numeric transforms over a single angle value.
//!
//! Angles arrive as raw pulse-length values from the tracker and must end up
//! inside the servo's valid pulse range before emission. Mirror mode uses the
//! clamped value directly; Clone mode additionally inverts it, because the
//! destination actuator pair is physically mirrored relative to the source
//! hand.

/// Default minimum servo pulse length.
pub const DEFAULT_SERVO_MIN: u16 = 200;

/// Default maximum servo pulse length (out of 4096 counts).
pub const DEFAULT_SERVO_MAX: u16 = 600;

/// Valid servo pulse-length range with clamp and invert transforms.
///
/// # Examples
///
/// ```
/// use hand_bridge::mapping::transform::ServoRange;
///
/// let range = ServoRange::new(200, 600);
/// assert_eq!(range.clamp(700), 600);
/// assert_eq!(range.invert(200), 600);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoRange {
    min: u16,
    max: u16,
}

impl Default for ServoRange {
    fn default() -> Self {
        Self::new(DEFAULT_SERVO_MIN, DEFAULT_SERVO_MAX)
    }
}

impl ServoRange {
    /// Creates a range. `min` must not exceed `max`; the pair is swapped if
    /// it does, so the range is always well formed.
    #[must_use]
    pub fn new(min: u16, max: u16) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Minimum pulse length.
    #[must_use]
    pub fn min(&self) -> u16 {
        self.min
    }

    /// Maximum pulse length.
    #[must_use]
    pub fn max(&self) -> u16 {
        self.max
    }

    /// Clamps a raw angle value into the valid pulse range.
    ///
    /// Idempotent: `clamp(clamp(v)) == clamp(v)`. Out-of-range input is
    /// never an error.
    #[must_use]
    pub fn clamp(&self, value: i32) -> u16 {
        value.clamp(i32::from(self.min), i32::from(self.max)) as u16
    }

    /// Clamps a raw angle value, then reflects it about the range midpoint:
    /// `max - clamped + min`.
    ///
    /// An involution over the valid range: `invert(invert(v)) == clamp(v)`.
    #[must_use]
    pub fn invert(&self, value: i32) -> u16 {
        self.max - self.clamp(value) + self.min
    }
}
