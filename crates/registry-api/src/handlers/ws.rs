//! WebSocket upgrade handler.

use std::net::SocketAddr;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};

use registry_entity::user::ClientMetadata;

use crate::state::AppState;

/// Header set by the fronting proxy with the real client address.
const X_REAL_IP: &str = "x-real-ip";

/// Transport frame limit as a multiple of `realtime.max_message_bytes`.
///
/// Frames between the two limits reach the engine, which drops them and
/// keeps the socket open. Only frames past the transport limit close it.
const TRANSPORT_LIMIT_FACTOR: usize = 16;

/// GET /ws: WebSocket upgrade
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let metadata = client_metadata(&headers, peer);
    let limit = transport_limit(state.realtime.max_message_bytes());

    ws.max_message_size(limit)
        .max_frame_size(limit)
        .on_upgrade(move |socket| handle_ws_connection(state, metadata, socket))
}

/// Largest message the socket layer accepts before closing the connection.
pub fn transport_limit(max_message_bytes: usize) -> usize {
    max_message_bytes.saturating_mul(TRANSPORT_LIMIT_FACTOR)
}

/// Client metadata from the upgrade request.
pub fn client_metadata(headers: &HeaderMap, peer: SocketAddr) -> ClientMetadata {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    ClientMetadata {
        user_agent: header(USER_AGENT.as_str()),
        ip: header(X_REAL_IP).or_else(|| Some(peer.ip().to_string())),
    }
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, metadata: ClientMetadata, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let engine = state.realtime.clone();
    let mut shutdown = engine.shutdown_receiver();

    let (handle, mut outbound_rx) = engine.connect(metadata);
    let conn_id = handle.id;

    info!(conn_id = %conn_id, "WebSocket connection established");

    // Single writer per socket.
    let outbound_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    engine.handle_inbound(&conn_id, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = shutdown.recv() => break,
        }
    }

    outbound_task.abort();
    engine.handle_close(&conn_id);

    info!(conn_id = %conn_id, "WebSocket connection closed");
}
