//! WebSocket endpoint.
//!
//! `GET /ws?playerId=…&roomId=…` — both parameters are required and
//! checked before any state is persisted. Each socket gets a connection
//! lease, a registered frame channel, and a writer task; inbound frames
//! are processed to completion in arrival order for that socket, while
//! different sockets run fully in parallel.

use axum::Json;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::get};
use fivebomber_core::transport::Transport;
use futures::{FutureExt, SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use fivebomber_core::model::Connection;

use crate::protocol::OutboundMessage;
use crate::router::handle_text;
use crate::state::AppState;

/// Connection-open query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectParams {
    /// The joining player.
    pub player_id: Option<String>,
    /// The room to subscribe to.
    pub room_id: Option<String>,
}

/// GET /ws
async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let (Some(player_id), Some(room_id)) = (params.player_id, params.room_id) else {
        warn!("websocket open rejected: missing playerId or roomId");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing required parameters: playerId and roomId"})),
        )
            .into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(state, socket, player_id, room_id))
}

async fn handle_socket(state: AppState, socket: WebSocket, player_id: String, room_id: String) {
    let connection_id = Uuid::new_v4().to_string();
    let connection = Connection::new(&connection_id, &player_id, &room_id, state.clock.now());

    if let Err(err) = state.connections.put(&connection).await {
        error!(connection_id, %err, "failed to persist connection");
        return;
    }
    info!(connection_id, player_id, room_id, "websocket connected");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (frame_tx, mut frame_rx) = tokio::sync::mpsc::unbounded_channel::<Vec<u8>>();
    state.transport.register(&connection_id, frame_tx).await;

    // Writer task: forwards queued frames to the socket until either side
    // closes.
    let writer = tokio::spawn(async move {
        while let Some(payload) = frame_rx.recv().await {
            let Ok(text) = String::from_utf8(payload) else {
                continue;
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Reader loop: one frame at a time, each handled to completion
    // (storage round-trips included) before the next is read.
    while let Some(Ok(message)) = ws_rx.next().await {
        match message {
            Message::Text(text) => {
                // A handler panic must not escape the protocol boundary;
                // the sender gets a generic internal-error envelope.
                let handled =
                    std::panic::AssertUnwindSafe(handle_text(&state, &connection, text.as_str()))
                        .catch_unwind()
                        .await;
                let reply = handled.unwrap_or_else(|_| {
                    error!(connection_id, "message handler panicked");
                    OutboundMessage::internal_error()
                });
                let payload = serde_json::to_vec(&reply)
                    .expect("outbound envelope serialization is infallible");
                if let Err(err) = state.transport.send(&connection_id, &payload).await {
                    warn!(connection_id, %err, "direct reply failed");
                }
            }
            Message::Close(_) => break,
            // Pings are answered by the socket layer; binary frames are not
            // part of the protocol.
            _ => debug!(connection_id, "ignoring non-text frame"),
        }
    }

    state.transport.unregister(&connection_id).await;
    if let Err(err) = state.connections.remove(&connection_id).await {
        warn!(connection_id, %err, "failed to remove connection record");
    }
    writer.abort();
    info!(connection_id, "websocket disconnected");
}

/// Returns the WebSocket router.
pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}
