use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use futures::StreamExt;

use crate::server::{GatewayState, SourceAddress};

/// WebSocket upgrade handler
#[tracing::instrument(name = "ws.upgrade", skip_all)]
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
    SourceAddress(address): SourceAddress,
) -> Response {
    let max_payload = state.gate.config().max_payload_bytes;
    let gate = state.gate.clone();

    ws.max_message_size(max_payload)
        .max_frame_size(max_payload)
        .on_failed_upgrade(|e| {
            tracing::warn!(error = %e, "WebSocket upgrade failed");
        })
        .on_upgrade(move |socket| async move {
            let (sender, receiver) = socket.split();
            gate.on_connect(sender, receiver, &address).await;
        })
}
