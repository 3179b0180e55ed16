//! WebSocket live-analysis route
//!
//! One `LiveSession` (board) per connection; the engine and model are the
//! process-wide `SharedAnalyst`. Command errors are answered on the socket,
//! only transport failures end the connection.

use anyhow::Result;
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    Extension,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use commentator::live::{LiveSession, ServerEvent};

use crate::SharedAnalyst;

// ---- WebSocket handler ----

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(analyst): Extension<SharedAnalyst>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, analyst))
}

async fn handle_socket(socket: WebSocket, analyst: SharedAnalyst) {
    let (mut sender, mut receiver) = socket.split();
    let mut session = LiveSession::new();
    info!("Live session opened");

    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(t)) => t.to_string(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "WebSocket receive failed");
                break;
            }
        };

        debug!(message = %text, "Live command");
        let Some(event) = session.handle_text(&text, &analyst).await else {
            continue;
        };

        if let Err(e) = send_event(&mut sender, &event).await {
            warn!(error = %e, "WebSocket send failed");
            break;
        }
    }

    let _ = sender.close().await;
    info!("Live session closed");
}

// ---- Helper: send event ----

async fn send_event(sender: &mut SplitSink<WebSocket, Message>, event: &ServerEvent) -> Result<()> {
    let json = serde_json::to_string(event)?;
    sender.send(Message::Text(json.into())).await?;
    Ok(())
}
