//! UI event stream over WebSocket
//!
//! Each connection gets its own broadcast subscription; events are sent as
//! JSON text frames until either side goes away.

use super::state::AppState;
use crate::sink::UiEvent;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

/// GET /session/events
/// Stream UI events to a visualizer
pub async fn session_events(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    // Subscribe before the upgrade so no event is missed after the handshake
    let events = state.events.subscribe();

    ws.on_upgrade(move |socket| forward_events(socket, events))
}

async fn forward_events(socket: WebSocket, mut events: broadcast::Receiver<UiEvent>) {
    info!("UI event subscriber connected");

    let (mut ws_sender, mut ws_receiver) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(RecvError::Lagged(n)) => {
                        warn!("UI event subscriber lagged by {} events", n);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                let json = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to serialize UI event: {}", e);
                        continue;
                    }
                };

                if ws_sender.send(Message::Text(json)).await.is_err() {
                    debug!("UI event subscriber went away mid-send");
                    break;
                }
            }
            incoming = ws_receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Subscribers have nothing to say
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    info!("UI event subscriber disconnected");
}
