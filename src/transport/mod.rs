//! # Transport Module
//!
//! The adapter seam between the telemetry transport and the mapping engine.
//!
//! The engine consumes a stream of [`TransportEvent`]s from a channel; how
//! those events are produced is the transport's concern. Lifecycle events
//! (connect, reconnect, disconnect, error) drive the connectivity signal,
//! and message events carry the raw telemetry payload.
//!
//! A line-delimited JSON transport over any async reader is provided so the
//! bridge runs end to end from stdin or a pipe; a networked pub/sub adapter
//! plugs in by producing the same events on the same channel.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

/// Capacity of the transport event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// One event from the telemetry transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Subscription established.
    Connected,
    /// Subscription re-established after a drop.
    Reconnected,
    /// Subscription lost or closed.
    Disconnected,
    /// Transport-level error report.
    Error(String),
    /// One raw telemetry payload.
    Message(String),
}

/// Spawns a transport that reads newline-delimited telemetry payloads from
/// `reader`.
///
/// Emits `Connected` once, one `Message` per non-empty line, then
/// `Disconnected` at end of input (or `Error` followed by `Disconnected` if
/// the reader fails).
pub fn spawn_line_transport<R>(reader: R) -> mpsc::Receiver<TransportEvent>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();

        if tx.send(TransportEvent::Connected).await.is_err() {
            return;
        }

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    debug!("Received telemetry payload ({} bytes)", line.len());
                    if tx.send(TransportEvent::Message(line)).await.is_err() {
                        return;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let _ = tx.send(TransportEvent::Error(e.to_string())).await;
                    break;
                }
            }
        }

        let _ = tx.send(TransportEvent::Disconnected).await;
    });

    rx
}

/// Spawns the line transport over standard input.
pub fn stdin_transport() -> mpsc::Receiver<TransportEvent> {
    spawn_line_transport(tokio::io::stdin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lifecycle_and_messages() {
        let input = b"{\"left_hand\":{}}\n{}\n" as &[u8];
        let mut rx = spawn_line_transport(input);

        assert_eq!(rx.recv().await, Some(TransportEvent::Connected));
        assert_eq!(
            rx.recv().await,
            Some(TransportEvent::Message("{\"left_hand\":{}}".to_string()))
        );
        assert_eq!(rx.recv().await, Some(TransportEvent::Message("{}".to_string())));
        assert_eq!(rx.recv().await, Some(TransportEvent::Disconnected));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_blank_lines_are_skipped() {
        let input = b"\n   \n{}\n" as &[u8];
        let mut rx = spawn_line_transport(input);

        assert_eq!(rx.recv().await, Some(TransportEvent::Connected));
        assert_eq!(rx.recv().await, Some(TransportEvent::Message("{}".to_string())));
        assert_eq!(rx.recv().await, Some(TransportEvent::Disconnected));
    }

    #[tokio::test]
    async fn test_empty_input_connects_then_disconnects() {
        let mut rx = spawn_line_transport(b"" as &[u8]);

        assert_eq!(rx.recv().await, Some(TransportEvent::Connected));
        assert_eq!(rx.recv().await, Some(TransportEvent::Disconnected));
    }
}
