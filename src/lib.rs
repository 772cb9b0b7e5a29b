//! # Hand Bridge Library
//!
//! Bridge remote hand-tracking telemetry to a servo-driven mechanical hand.
//!
//! This library provides the core functionality for translating per-hand
//! yaw/pitch angles and digit-state bitmasks into PWM servo commands and a
//! packed digit byte for the downstream digit controller, honoring the
//! operating mode selected by two physical switches.

pub mod bridge;
pub mod bus;
pub mod config;
pub mod error;
pub mod link;
pub mod mapping;
pub mod pwm;
pub mod switches;
pub mod telemetry;
pub mod transport;
