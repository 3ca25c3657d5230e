use axum::{
    extract::{Query, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    response::Response,
};
use bson::oid::ObjectId;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: String,
}

pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    // Verify the token before accepting the WebSocket
    let claims = state.auth.verify_access_token(&params.token)?;
    let user_id = claims
        .user_id()
        .map_err(|_| ApiError::BadRequest("Invalid user ID".to_string()))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: ObjectId) {
    let connection_id = Uuid::new_v4().to_string();
    let group_key = user_id.to_hex();
    info!(?user_id, %connection_id, "WebSocket connected");

    let (mut sink, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(state.settings.realtime.channel_buffer_size);

    // Writer: drains queued frames into the socket
    let writer_conn = connection_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if let Err(e) = sink.send(Message::text(text)).await {
                warn!(connection_id = %writer_conn, %e, "Failed to write WS frame");
                break;
            }
        }
        let _ = sink.close().await;
    });

    state
        .registry
        .add_connection_to_group(&connection_id, &group_key, tx.clone());

    let connected = serde_json::json!({
        "type": "connected",
        "data": {
            "user_id": group_key,
            "connection_id": connection_id,
        }
    });
    let _ = tx.send(connected.to_string()).await;

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_client_message(&tx, &user_id, &connection_id, text.as_str()).await;
            }
            Ok(Message::Close(_)) => {
                break;
            }
            Err(e) => {
                warn!(?user_id, %connection_id, %e, "WebSocket error");
                break;
            }
            // Protocol pings are answered by axum
            _ => {}
        }
    }

    state
        .registry
        .remove_connection_from_group(&connection_id, &group_key);

    // The writer stops once every sender clone is gone.
    drop(tx);
    let _ = writer.await;

    info!(?user_id, %connection_id, "WebSocket disconnected");
}

async fn handle_client_message(
    tx: &mpsc::Sender<String>,
    user_id: &ObjectId,
    connection_id: &str,
    text: &str,
) {
    let parsed: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => return,
    };

    let msg_type = parsed.get("type").and_then(|t| t.as_str()).unwrap_or("");
    debug!(?user_id, %connection_id, msg_type, "WS message received");

    match msg_type {
        "ping" => {
            let pong = serde_json::json!({ "type": "pong" });
            let _ = tx.send(pong.to_string()).await;
        }
        _ => {
            debug!(?user_id, msg_type, "Unknown WS message type");
        }
    }
}
