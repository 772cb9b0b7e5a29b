//! # Mapping Module
//!
//! The hand-to-actuator mapping engine.
//!
//! This module handles:
//! - Operating-mode state shared between the switch poller and the engine
//! - Clamping and geometric inversion of angle values
//! - Routing each hand's telemetry to a servo channel pair per mode
//! - Packing both hands' digit nibbles into the downstream frame byte

pub mod frame;
pub mod mapper;
pub mod mode;
pub mod transform;
