use std::fmt::Display;
use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message};
use futures::{Sink, SinkExt, Stream, StreamExt};
use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::config::GatewayConfig;
use crate::metrics::GateMetrics;

use super::counts::{ConnectionCounts, ConnectionPermit};

/// Close code sent when the per-address cap is reached
pub const CLOSE_POLICY_VIOLATION: u16 = 1008;
/// Close code sent when an inbound message exceeds the payload limit
pub const CLOSE_MESSAGE_TOO_BIG: u16 = 1009;
/// Close code sent after an unexpected failure
pub const CLOSE_INTERNAL_ERROR: u16 = 1011;

pub const TOO_MANY_CONNECTIONS_REASON: &str = "Too many connections from this IP";
pub const MESSAGE_TOO_BIG_REASON: &str = "Max payload size exceeded";
pub const INTERNAL_ERROR_REASON: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum GateError {
    #[error("Too many connections from {address} ({count} open)")]
    TooManyConnections { address: String, count: usize },

    #[error("Message exceeds payload limit: {0}")]
    MessageTooBig(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Receive-side error of a WebSocket transport.
pub trait ReceiveError: Display {
    /// The peer sent a message or frame over the configured size limit.
    fn is_message_too_big(&self) -> bool;
}

impl ReceiveError for axum::Error {
    fn is_message_too_big(&self) -> bool {
        std::error::Error::source(self)
            .and_then(|inner| inner.downcast_ref::<tungstenite::Error>())
            .is_some_and(|e| matches!(e, tungstenite::Error::Capacity(_)))
    }
}

/// How a connection handed to [`ConnectionGate::on_connect`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// Refused at the cap and closed with 1008
    Rejected,
    /// Admitted, greeted and later closed by the peer
    Closed,
    /// Admitted, then closed with 1009 after an oversized message
    TooBig,
    /// Admitted, then ended by a transport failure (closed with 1011)
    Failed,
}

/// Caps concurrent WebSocket connections per source address.
pub struct ConnectionGate {
    config: GatewayConfig,
    counts: Arc<ConnectionCounts>,
}

impl ConnectionGate {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            counts: Arc::new(ConnectionCounts::new()),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Active connections from `address`
    pub fn count(&self, address: &str) -> usize {
        self.counts.get(address)
    }

    pub fn tracked_addresses(&self) -> usize {
        self.counts.tracked_addresses()
    }

    pub fn active_connections(&self) -> usize {
        self.counts.total()
    }

    /// Reserve a slot for `address`, or refuse when it is at the cap.
    pub fn admit(&self, address: &str) -> Result<ConnectionPermit, GateError> {
        self.counts
            .try_acquire(address, self.config.max_connections_per_address)
            .map_err(|count| GateError::TooManyConnections {
                address: address.to_string(),
                count,
            })
    }

    /// Run one freshly accepted connection to completion.
    ///
    /// Rejected connections get a 1008 close frame and leave the count as it
    /// was. Admitted connections get the greeting, are drained until the
    /// peer goes away, and release their slot when this returns (or unwinds).
    /// An oversized inbound message ends the connection with 1009, any other
    /// receive error with 1011.
    pub async fn on_connect<Tx, Rx, E>(&self, mut tx: Tx, mut rx: Rx, address: &str) -> ConnectionOutcome
    where
        Tx: Sink<Message> + Unpin,
        Tx::Error: Display,
        Rx: Stream<Item = Result<Message, E>> + Unpin,
        E: ReceiveError,
    {
        let permit = match self.admit(address) {
            Ok(permit) => permit,
            Err(e) => {
                GateMetrics::record_rejected();
                tracing::warn!(address = %address, error = %e, "WebSocket connection rejected");
                let _ = tx
                    .send(close_frame(CLOSE_POLICY_VIOLATION, TOO_MANY_CONNECTIONS_REASON))
                    .await;
                return ConnectionOutcome::Rejected;
            }
        };

        tracing::info!(
            address = %address,
            open = self.count(address),
            "WebSocket connection established"
        );

        let outcome = match self.greet_and_drain(&mut tx, &mut rx, address).await {
            Ok(()) => ConnectionOutcome::Closed,
            Err(e @ GateError::MessageTooBig(_)) => {
                GateMetrics::record_message_too_big();
                tracing::warn!(address = %address, error = %e, "WebSocket message rejected");
                let _ = tx
                    .send(close_frame(CLOSE_MESSAGE_TOO_BIG, MESSAGE_TOO_BIG_REASON))
                    .await;
                ConnectionOutcome::TooBig
            }
            Err(e) => {
                GateMetrics::record_transport_error();
                tracing::error!(address = %address, error = %e, "WebSocket connection error");
                let _ = tx
                    .send(close_frame(CLOSE_INTERNAL_ERROR, INTERNAL_ERROR_REASON))
                    .await;
                ConnectionOutcome::Failed
            }
        };

        drop(permit);
        tracing::info!(address = %address, open = self.count(address), "WebSocket connection closed");

        outcome
    }

    async fn greet_and_drain<Tx, Rx, E>(&self, tx: &mut Tx, rx: &mut Rx, address: &str) -> Result<(), GateError>
    where
        Tx: Sink<Message> + Unpin,
        Tx::Error: Display,
        Rx: Stream<Item = Result<Message, E>> + Unpin,
        E: ReceiveError,
    {
        tx.send(Message::Text(self.config.greeting.clone().into()))
            .await
            .map_err(|e| GateError::Transport(e.to_string()))?;

        while let Some(result) = rx.next().await {
            match result {
                Ok(Message::Close(frame)) => {
                    tracing::debug!(
                        address = %address,
                        code = frame.as_ref().map(|f| f.code),
                        "Peer closed connection"
                    );
                    break;
                }
                Ok(Message::Text(text)) => {
                    tracing::debug!(address = %address, len = text.as_str().len(), "Ignoring text message");
                }
                Ok(Message::Binary(data)) => {
                    tracing::debug!(address = %address, len = data.len(), "Ignoring binary message");
                }
                // Pings are answered by the transport
                Ok(_) => {}
                Err(e) if e.is_message_too_big() => return Err(GateError::MessageTooBig(e.to_string())),
                Err(e) => return Err(GateError::Transport(e.to_string())),
            }
        }

        Ok(())
    }
}

fn close_frame(code: u16, reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame {
        code,
        reason: reason.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;

    const ADDR: &str = "1.2.3.4";

    #[derive(Debug)]
    enum PeerError {
        Reset,
        TooBig,
    }

    impl Display for PeerError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                PeerError::Reset => write!(f, "connection reset"),
                PeerError::TooBig => write!(f, "message too long"),
            }
        }
    }

    impl ReceiveError for PeerError {
        fn is_message_too_big(&self) -> bool {
            matches!(self, PeerError::TooBig)
        }
    }

    type Incoming = mpsc::UnboundedSender<Result<Message, PeerError>>;
    type Outgoing = mpsc::UnboundedReceiver<Message>;

    fn gate(max: usize) -> Arc<ConnectionGate> {
        Arc::new(ConnectionGate::new(GatewayConfig {
            max_connections_per_address: max,
            ..Default::default()
        }))
    }

    /// Start a connection on its own task; returns the peer's halves.
    fn connect(
        gate: &Arc<ConnectionGate>,
        address: &str,
    ) -> (Incoming, Outgoing, tokio::task::JoinHandle<ConnectionOutcome>) {
        let (out_tx, out_rx) = mpsc::unbounded::<Message>();
        let (in_tx, in_rx) = mpsc::unbounded::<Result<Message, PeerError>>();
        let gate = gate.clone();
        let address = address.to_string();
        let handle = tokio::spawn(async move { gate.on_connect(out_tx, in_rx, &address).await });
        (in_tx, out_rx, handle)
    }

    fn close_of(message: Message) -> (u16, String) {
        match message {
            Message::Close(Some(frame)) => (frame.code, frame.reason.as_str().to_string()),
            other => panic!("expected close frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_admitted_connection_is_greeted() {
        let gate = gate(10);
        let (incoming, mut outgoing, handle) = connect(&gate, ADDR);

        let greeting = outgoing.next().await.unwrap();
        assert_eq!(
            greeting,
            Message::Text("Hi there, you are connected to the server".into())
        );
        assert_eq!(gate.count(ADDR), 1);

        drop(incoming);
        assert_eq!(handle.await.unwrap(), ConnectionOutcome::Closed);
        assert_eq!(gate.count(ADDR), 0);
        assert_eq!(gate.tracked_addresses(), 0);
    }

    #[tokio::test]
    async fn test_eleventh_connection_rejected() {
        let gate = gate(10);

        let mut peers = Vec::new();
        for _ in 0..10 {
            let (incoming, mut outgoing, handle) = connect(&gate, ADDR);
            assert!(matches!(outgoing.next().await, Some(Message::Text(_))));
            peers.push((incoming, outgoing, handle));
        }
        assert_eq!(gate.count(ADDR), 10);

        let (_incoming, mut outgoing, handle) = connect(&gate, ADDR);
        let (code, reason) = close_of(outgoing.next().await.unwrap());
        assert_eq!(code, 1008);
        assert_eq!(reason, "Too many connections from this IP");
        assert_eq!(handle.await.unwrap(), ConnectionOutcome::Rejected);
        assert_eq!(gate.count(ADDR), 10);

        // Three peers close, a new connection fits again
        for (incoming, _outgoing, handle) in peers.drain(..3) {
            incoming
                .unbounded_send(Ok(Message::Close(None)))
                .unwrap();
            assert_eq!(handle.await.unwrap(), ConnectionOutcome::Closed);
        }
        assert_eq!(gate.count(ADDR), 7);

        let (_incoming, mut outgoing, _handle) = connect(&gate, ADDR);
        assert!(matches!(outgoing.next().await, Some(Message::Text(_))));
        assert_eq!(gate.count(ADDR), 8);
    }

    #[tokio::test]
    async fn test_receive_error_closes_with_internal_error() {
        let gate = gate(10);
        let (incoming, mut outgoing, handle) = connect(&gate, ADDR);
        outgoing.next().await.unwrap();

        incoming
            .unbounded_send(Err(PeerError::Reset))
            .unwrap();

        let (code, reason) = close_of(outgoing.next().await.unwrap());
        assert_eq!(code, 1011);
        assert_eq!(reason, "Internal server error");
        assert_eq!(handle.await.unwrap(), ConnectionOutcome::Failed);
        assert_eq!(gate.count(ADDR), 0);
    }

    #[tokio::test]
    async fn test_oversized_message_closes_with_1009() {
        let gate = gate(10);
        let (incoming, mut outgoing, handle) = connect(&gate, ADDR);
        outgoing.next().await.unwrap();

        incoming.unbounded_send(Err(PeerError::TooBig)).unwrap();

        let (code, reason) = close_of(outgoing.next().await.unwrap());
        assert_eq!(code, 1009);
        assert_eq!(reason, "Max payload size exceeded");
        assert_eq!(handle.await.unwrap(), ConnectionOutcome::TooBig);
        assert_eq!(gate.count(ADDR), 0);
    }

    #[test]
    fn test_capacity_error_is_message_too_big() {
        let too_big = axum::Error::new(tungstenite::Error::Capacity(
            tungstenite::error::CapacityError::MessageTooLong {
                size: 4096,
                max_size: 1024,
            },
        ));
        assert!(too_big.is_message_too_big());

        let closed = axum::Error::new(tungstenite::Error::ConnectionClosed);
        assert!(!closed.is_message_too_big());
    }

    #[tokio::test]
    async fn test_greeting_send_failure_releases_slot() {
        let gate = gate(10);
        let (out_tx, out_rx) = mpsc::unbounded::<Message>();
        let (_in_tx, in_rx) = mpsc::unbounded::<Result<Message, PeerError>>();
        drop(out_rx);

        let outcome = gate.on_connect(out_tx, in_rx, ADDR).await;
        assert_eq!(outcome, ConnectionOutcome::Failed);
        assert_eq!(gate.count(ADDR), 0);
    }

    #[tokio::test]
    async fn test_messages_are_ignored() {
        let gate = gate(10);
        let (incoming, mut outgoing, handle) = connect(&gate, ADDR);
        outgoing.next().await.unwrap();

        incoming.unbounded_send(Ok(Message::Text("hello".into()))).unwrap();
        incoming
            .unbounded_send(Ok(Message::Binary(vec![1, 2, 3].into())))
            .unwrap();
        incoming.unbounded_send(Ok(Message::Close(None))).unwrap();

        assert_eq!(handle.await.unwrap(), ConnectionOutcome::Closed);
        // Only the greeting was ever sent
        assert!(outgoing.next().await.is_none());
    }

    #[tokio::test]
    async fn test_admit_error_reports_count() {
        let gate = gate(1);
        let _permit = gate.admit(ADDR).unwrap();

        match gate.admit(ADDR) {
            Err(GateError::TooManyConnections { address, count }) => {
                assert_eq!(address, ADDR);
                assert_eq!(count, 1);
            }
            other => panic!("expected rejection, got {:?}", other.map(|p| p.address().to_string())),
        }
    }
}
