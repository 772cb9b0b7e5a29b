//! # Hand Bridge
//!
//! Bridge remote hand-tracking telemetry to a servo-driven mechanical hand
//! on a Raspberry Pi.
//!
//! Telemetry messages (per-hand yaw/pitch angles and digit bitmasks) arrive
//! over the transport, are mapped to PWM servo writes per the active
//! operating mode, and the combined digit byte is written over I2C to the
//! downstream digit controller.

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber;

use hand_bridge::bridge::Bridge;
use hand_bridge::bus::{BusTransmitter, GpioResetLine, I2cBus};
use hand_bridge::config::Config;
use hand_bridge::link::ConnectivitySignal;
use hand_bridge::mapping::mapper::HandMapper;
use hand_bridge::mapping::mode::ModeCell;
use hand_bridge::mapping::transform::ServoRange;
use hand_bridge::pwm::Pca9685;
use hand_bridge::switches::{run_mode_poller, GpioModeSwitches};
use hand_bridge::transport::stdin_transport;

/// Default configuration file path
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of handled messages between status log lines
const LOG_INTERVAL_MESSAGES: u64 = 200;

/// Main entry point for the Hand Bridge application
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (or fall back to defaults)
///    - Open the PWM controller, digit bus, and GPIO lines
///    - Spawn the 1Hz mode-switch poller
///
/// 2. **Main Loop**
///    - Handle transport events one at a time: lifecycle events drive the
///      connectivity line, telemetry messages run through the mapping
///      engine to the servo and digit sinks
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if the hardware cannot be opened or a GPIO line fails;
/// per-message faults are contained inside the event loop.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Hand Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = if std::path::Path::new(&config_path).exists() {
        info!("Loading configuration from {}", config_path);
        Config::load(&config_path)?
    } else {
        warn!("No configuration file at {}, using defaults", config_path);
        Config::default()
    };

    // Open hardware
    let gpio = rppal::gpio::Gpio::new()?;

    let pwm = Pca9685::open(rppal::i2c::I2c::new()?, config.pwm.address, config.pwm.frequency_hz)?;
    info!("PWM controller ready at 0x{:02X}", config.pwm.address);

    let bus = I2cBus::open(rppal::i2c::I2c::new()?, config.bus.address)?;
    let reset = GpioResetLine::new(gpio.clone(), config.gpio.reset_pin);
    let transmitter = BusTransmitter::new(bus, reset);
    info!("Digit bus ready at 0x{:02X}", config.bus.address);

    let connectivity =
        ConnectivitySignal::new(gpio.get(config.gpio.connectivity_pin)?.into_output_low())?;

    // Reset the digit controller once on startup, before any traffic
    {
        use hand_bridge::bus::ResetLine;
        let mut startup_reset = GpioResetLine::new(gpio.clone(), config.gpio.reset_pin);
        startup_reset.pulse()?;
    }

    // Spawn the mode-switch poller
    let mode = ModeCell::default();
    let switches =
        GpioModeSwitches::new(&gpio, config.switches.switch1_pin, config.switches.switch2_pin)?;
    tokio::spawn(run_mode_poller(
        switches,
        mode.clone(),
        config.switches.poll_interval_ms,
    ));

    // Assemble the bridge
    let mapper = HandMapper::new(ServoRange::new(config.servo.min, config.servo.max));
    let mut bridge = Bridge::new(mode, mapper, pwm, transmitter, connectivity);

    info!("Waiting for telemetry on stdin (one JSON message per line)");
    info!("Press Ctrl+C to exit");

    let mut events = stdin_transport();
    let mut message_count: u64 = 0;

    // Main event loop: one event handled to completion at a time
    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    info!("Transport channel closed, shutting down...");
                    break;
                };

                if matches!(event, hand_bridge::transport::TransportEvent::Message(_)) {
                    message_count += 1;
                    if message_count % LOG_INTERVAL_MESSAGES == 0 {
                        info!("Handled {} telemetry messages", message_count);
                    }
                }

                bridge.handle_event(event)?;
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    info!("Total messages handled: {}", message_count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "config/default.toml");
    }

    #[test]
    fn test_log_interval_constant() {
        // At a ~20Hz tracker scan rate, 200 messages is about 10 seconds
        assert_eq!(LOG_INTERVAL_MESSAGES, 200);
    }
}
