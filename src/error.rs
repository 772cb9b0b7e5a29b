//! # Error Types
//!
//! Custom error types for Hand Bridge using `thiserror`.

use thiserror::Error;

/// Main error type for Hand Bridge
#[derive(Debug, Error)]
pub enum HandBridgeError {
    /// Telemetry message decoding errors
    #[error("Telemetry decode error: {0}")]
    Telemetry(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Downstream bus errors (write to the digit controller failed)
    #[error("Bus error: {0}")]
    Bus(String),

    /// PWM driver errors
    #[error("PWM error: {0}")]
    Pwm(String),

    /// GPIO errors
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    /// I2C errors
    #[error("I2C error: {0}")]
    I2c(#[from] rppal::i2c::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Hand Bridge
pub type Result<T> = std::result::Result<T, HandBridgeError>;
