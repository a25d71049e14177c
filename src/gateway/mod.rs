//! WebSocket connection gate.
//!
//! Admits connections while a source address has fewer than
//! `max_connections_per_address` open, greets admitted peers and releases
//! the address slot exactly once when the connection ends.

mod counts;
mod gate;
mod handler;

pub use counts::{ConnectionCounts, ConnectionPermit};
pub use gate::{
    ConnectionGate, ConnectionOutcome, GateError, ReceiveError, CLOSE_INTERNAL_ERROR,
    CLOSE_MESSAGE_TOO_BIG, CLOSE_POLICY_VIOLATION, INTERNAL_ERROR_REASON, MESSAGE_TOO_BIG_REASON,
    TOO_MANY_CONNECTIONS_REASON,
};
pub use handler::ws_handler;
