//! # Bridge Module
//!
//! Wires the mapping engine to the hardware sinks and the transport.
//!
//! One transport event is processed to completion before the next: a
//! telemetry message runs decode, mapping, PWM writes, frame packing, and
//! the bus write as one synchronous sequence. Lifecycle events drive the
//! connectivity signal. A message whose bus write fails fatally (both
//! attempts) is logged and drives the connectivity signal low, exactly like
//! a transport error report; the process keeps running and the next message
//! is handled normally.

use tracing::{debug, error, warn};

use crate::bus::{BusTransmitter, ByteBus, ResetLine};
use crate::error::Result;
use crate::link::{ConnectivitySignal, DigitalOutput};
use crate::mapping::frame::pack;
use crate::mapping::mapper::HandMapper;
use crate::mapping::mode::ModeCell;
use crate::pwm::PwmSink;
use crate::telemetry::TelemetryMessage;
use crate::transport::TransportEvent;

/// The hand-to-actuator bridge engine.
pub struct Bridge<P, B, R, O>
where
    P: PwmSink,
    B: ByteBus,
    R: ResetLine,
    O: DigitalOutput,
{
    mode: ModeCell,
    mapper: HandMapper,
    pwm: P,
    transmitter: BusTransmitter<B, R>,
    connectivity: ConnectivitySignal<O>,
}

impl<P, B, R, O> Bridge<P, B, R, O>
where
    P: PwmSink,
    B: ByteBus,
    R: ResetLine,
    O: DigitalOutput,
{
    /// Assembles the bridge over its hardware sinks.
    pub fn new(
        mode: ModeCell,
        mapper: HandMapper,
        pwm: P,
        transmitter: BusTransmitter<B, R>,
        connectivity: ConnectivitySignal<O>,
    ) -> Self {
        Self {
            mode,
            mapper,
            pwm,
            transmitter,
            connectivity,
        }
    }

    /// Handles one transport event to completion.
    ///
    /// Message-level faults (bad payloads, fatal bus failures) are contained
    /// here: they are logged and drive the connectivity signal low, but do
    /// not propagate.
    ///
    /// # Errors
    ///
    /// Returns error only if the connectivity line itself cannot be driven.
    pub fn handle_event(&mut self, event: TransportEvent) -> Result<()> {
        match event {
            TransportEvent::Connected | TransportEvent::Reconnected => {
                self.connectivity.connected()
            }
            TransportEvent::Disconnected => self.connectivity.disconnected(),
            TransportEvent::Error(e) => {
                warn!("Transport error: {}", e);
                self.connectivity.disconnected()
            }
            TransportEvent::Message(payload) => {
                if let Err(e) = self.handle_message(&payload) {
                    error!("Failed to handle telemetry message: {}", e);
                    self.connectivity.disconnected()?;
                }
                Ok(())
            }
        }
    }

    /// Runs one telemetry message through mapping, PWM writes, framing, and
    /// the bus write.
    fn handle_message(&mut self, payload: &str) -> Result<()> {
        let message = TelemetryMessage::from_json(payload)?;
        let mode = self.mode.load();
        let output = self.mapper.map(mode, &message);

        for write in &output.writes {
            // Phase start equals the channel index, value is the clamped angle
            self.pwm
                .set_channel(write.channel, u16::from(write.channel), write.value)?;
        }

        let frame = pack(mode, output.left_digits, output.right_digits);
        debug!(?mode, ?frame, writes = output.writes.len(), "Mapped message");

        self.transmitter.transmit(frame)
    }
}
