//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub servo: ServoConfig,
    #[serde(default)]
    pub pwm: PwmConfig,
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub gpio: GpioConfig,
    #[serde(default)]
    pub switches: SwitchConfig,
}

/// Servo pulse range configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServoConfig {
    #[serde(default = "default_servo_min")]
    pub min: u16,

    #[serde(default = "default_servo_max")]
    pub max: u16,
}

/// PWM controller configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PwmConfig {
    #[serde(default = "default_pwm_address")]
    pub address: u16,

    #[serde(default = "default_pwm_frequency_hz")]
    pub frequency_hz: u8,
}

/// Downstream digit controller bus configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BusConfig {
    #[serde(default = "default_bus_address")]
    pub address: u16,
}

/// GPIO pin assignments (BCM numbering)
#[derive(Debug, Deserialize, Clone)]
pub struct GpioConfig {
    #[serde(default = "default_connectivity_pin")]
    pub connectivity_pin: u8,

    #[serde(default = "default_reset_pin")]
    pub reset_pin: u8,
}

/// Mode switch configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SwitchConfig {
    #[serde(default = "default_switch1_pin")]
    pub switch1_pin: u8,

    #[serde(default = "default_switch2_pin")]
    pub switch2_pin: u8,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

// Default value functions
fn default_servo_min() -> u16 { 200 }
fn default_servo_max() -> u16 { 600 }

fn default_pwm_address() -> u16 { 0x40 }
fn default_pwm_frequency_hz() -> u8 { 60 }

fn default_bus_address() -> u16 { 0x47 }

fn default_connectivity_pin() -> u8 { 4 }
fn default_reset_pin() -> u8 { 15 }

fn default_switch1_pin() -> u8 { 17 }
fn default_switch2_pin() -> u8 { 27 }
fn default_poll_interval_ms() -> u64 { 1000 }

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            min: default_servo_min(),
            max: default_servo_max(),
        }
    }
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            address: default_pwm_address(),
            frequency_hz: default_pwm_frequency_hz(),
        }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            address: default_bus_address(),
        }
    }
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            connectivity_pin: default_connectivity_pin(),
            reset_pin: default_reset_pin(),
        }
    }
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            switch1_pin: default_switch1_pin(),
            switch2_pin: default_switch2_pin(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servo: ServoConfig::default(),
            pwm: PwmConfig::default(),
            bus: BusConfig::default(),
            gpio: GpioConfig::default(),
            switches: SwitchConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use hand_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Validate servo pulse range (12-bit PWM counter)
        if self.servo.min >= self.servo.max {
            return Err(crate::error::HandBridgeError::Config(
                toml::de::Error::custom("servo min must be less than servo max"),
            ));
        }

        if self.servo.max > 4095 {
            return Err(crate::error::HandBridgeError::Config(
                toml::de::Error::custom("servo max must be at most 4095 (12-bit counter)"),
            ));
        }

        // Validate I2C addresses (7-bit)
        for (name, address) in [("pwm address", self.pwm.address), ("bus address", self.bus.address)] {
            if address > 0x7F {
                return Err(crate::error::HandBridgeError::Config(
                    toml::de::Error::custom(format!("{} must be a 7-bit I2C address (0-0x7F)", name)),
                ));
            }
        }

        if self.pwm.address == self.bus.address {
            return Err(crate::error::HandBridgeError::Config(
                toml::de::Error::custom("pwm and bus addresses must differ"),
            ));
        }

        // Validate PWM frequency (PCA9685 supports ~24Hz and up)
        if self.pwm.frequency_hz < 24 {
            return Err(crate::error::HandBridgeError::Config(
                toml::de::Error::custom("pwm frequency_hz must be at least 24"),
            ));
        }

        // Validate GPIO pins (BCM header range) and distinctness
        let pins = [
            ("connectivity_pin", self.gpio.connectivity_pin),
            ("reset_pin", self.gpio.reset_pin),
            ("switch1_pin", self.switches.switch1_pin),
            ("switch2_pin", self.switches.switch2_pin),
        ];

        for (name, pin) in pins {
            if pin > 27 {
                return Err(crate::error::HandBridgeError::Config(
                    toml::de::Error::custom(format!("{} must be a BCM pin number (0-27)", name)),
                ));
            }
        }

        for i in 0..pins.len() {
            for j in (i + 1)..pins.len() {
                if pins[i].1 == pins[j].1 {
                    return Err(crate::error::HandBridgeError::Config(
                        toml::de::Error::custom(format!(
                            "{} and {} must use different pins",
                            pins[i].0, pins[j].0
                        )),
                    ));
                }
            }
        }

        // Validate poll interval
        if self.switches.poll_interval_ms == 0 || self.switches.poll_interval_ms > 60000 {
            return Err(crate::error::HandBridgeError::Config(
                toml::de::Error::custom("poll_interval_ms must be between 1 and 60000"),
            ));
        }

        Ok(())
    }
}
