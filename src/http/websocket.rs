//! WebSocket handling.
//!
//! # Responsibilities
//! - Detect WebSocket upgrade requests
//! - Serve the built-in echo target over an upgraded connection
//!
//! # Data Flow
//! ```text
//! Client ──── Upgrade request ────→ Gateway (classified, no response decoration)
//!     → selected handler takes the connection
//! Client ←──── WebSocket frames ────→ Handler
//! ```
//!
//! # Design Decisions
//! - Classification is exact: `Connection: upgrade` and `Upgrade: websocket`
//! - Upgraded connections belong to the handler; the gateway stops at dispatch
//! - Close frames end the echo loop

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::header::{CONNECTION, UPGRADE};
use axum::http::HeaderMap;
use axum::response::Response;

/// Returns true if the request asks to switch to the WebSocket protocol.
pub fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    header_is(headers, CONNECTION, "upgrade") && header_is(headers, UPGRADE, "websocket")
}

fn header_is(headers: &HeaderMap, name: axum::http::HeaderName, expected: &str) -> bool {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

/// Echo target: accepts the upgrade and sends every data frame back.
pub async fn echo_socket(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(echo_loop)
}

async fn echo_loop(mut socket: WebSocket) {
    while let Some(frame) = socket.recv().await {
        let message = match frame {
            Ok(Message::Close(_)) => break,
            Ok(message @ (Message::Text(_) | Message::Binary(_))) => message,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "WebSocket receive failed");
                break;
            }
        };
        if socket.send(message).await.is_err() {
            break;
        }
    }
    tracing::debug!("WebSocket echo closed");
}
