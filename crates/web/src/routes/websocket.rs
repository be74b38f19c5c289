//! WebSocket event channel
//!
//! A connection follows one session at a time. The session is chosen with
//! `?session_id=` on the upgrade request or later with a `subscribe`
//! message; every generation event of that session is forwarded as a JSON
//! text frame.

use axum::{
    extract::{
        Query, State,
        rejection::QueryRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt, stream::SplitSink};
use netmotif_events::{EventSubscription, GenerationEvent, SessionId};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// WebSocket message types sent from client to server
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Follow a session, replacing the current one
    Subscribe { session_id: String },
    /// Ping to keep connection alive
    Ping,
}

/// Control messages sent from server to client; generation events are
/// sent as-is.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Subscribed { session_id: String },
    Pong,
    Error { message: String },
}

/// GET /ws - WebSocket upgrade endpoint
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    query: std::result::Result<Query<ConnectQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query?;
    let initial = query.session_id.map(SessionId::parse).transpose()?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, initial)))
}

/// Connection lifecycle: client messages and session events are
/// handled concurrently until either side goes away.
async fn handle_socket(socket: WebSocket, state: AppState, initial: Option<SessionId>) {
    info!(session_id = ?initial.as_ref().map(SessionId::as_str), "WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let mut subscription = match initial {
        Some(session_id) => Some(state.notifier.subscribe(&session_id).await),
        None => None,
    };

    loop {
        tokio::select! {
            msg_result = receiver.next() => {
                let Some(msg) = msg_result else {
                    debug!("Client disconnected");
                    break;
                };
                match process_message(msg, &state, &mut subscription).await {
                    Ok(Reply::Send(response)) => {
                        if let Err(e) = send_json(&mut sender, &response).await {
                            error!("Failed to send message: {}", e);
                            break;
                        }
                    }
                    Ok(Reply::Nothing) => {}
                    Ok(Reply::Close) => {
                        debug!("Connection closing gracefully");
                        break;
                    }
                    Err(e) => {
                        warn!("Error processing message: {}", e);
                        let error_msg = ServerMessage::Error { message: e.to_string() };
                        if send_json(&mut sender, &error_msg).await.is_err() {
                            break;
                        }
                    }
                }
            }
            event_result = next_event(&mut subscription) => {
                match event_result {
                    Ok(event) => {
                        if let Err(e) = send_json(&mut sender, &event).await {
                            error!("Failed to forward event: {}", e);
                            break;
                        }
                    }
                    Err(e) => {
                        // Session swept; keep the socket for a new subscription
                        debug!("Session channel closed: {}", e);
                        subscription = None;
                    }
                }
            }
        }
    }

    info!("WebSocket connection closed");
}

/// Wait for the next event, or forever when nothing is followed.
async fn next_event(
    subscription: &mut Option<EventSubscription>,
) -> netmotif_events::Result<GenerationEvent> {
    match subscription {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}

/// What the connection does after a client frame.
#[derive(Debug)]
enum Reply {
    Send(ServerMessage),
    Nothing,
    Close,
}

async fn process_message(
    msg_result: std::result::Result<Message, axum::Error>,
    state: &AppState,
    subscription: &mut Option<EventSubscription>,
) -> Result<Reply> {
    let msg = msg_result.map_err(|e| AppError::Internal(format!("WebSocket error: {e}")))?;

    match msg {
        Message::Text(text) => handle_text_message(text.as_str(), state, subscription).await,
        Message::Binary(_) => Err(AppError::Validation(
            "Binary messages not supported".to_string(),
        )),
        Message::Ping(_) | Message::Pong(_) => Ok(Reply::Nothing),
        Message::Close(_) => Ok(Reply::Close),
    }
}

async fn handle_text_message(
    text: &str,
    state: &AppState,
    subscription: &mut Option<EventSubscription>,
) -> Result<Reply> {
    let client_msg: ClientMessage = serde_json::from_str(text)
        .map_err(|e| AppError::Validation(format!("Invalid JSON: {e}")))?;

    match client_msg {
        ClientMessage::Subscribe { session_id } => {
            let session_id = SessionId::parse(session_id)?;
            info!(session_id = %session_id, "Subscribed to session");
            *subscription = Some(state.notifier.subscribe(&session_id).await);
            Ok(Reply::Send(ServerMessage::Subscribed {
                session_id: session_id.to_string(),
            }))
        }
        ClientMessage::Ping => Ok(Reply::Send(ServerMessage::Pong)),
    }
}

async fn send_json<T: Serialize>(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &T,
) -> Result<()> {
    let json = serde_json::to_string(msg)
        .map_err(|e| AppError::Internal(format!("Failed to serialize message: {e}")))?;

    sender
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| AppError::Internal(format!("Failed to send message: {e}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    #![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

    use super::*;

    #[test]
    fn test_client_message_parsing() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"subscribe","session_id":"abc-1"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Subscribe { session_id } if session_id == "abc-1"));

        let ping: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(ping, ClientMessage::Ping));

        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"unsubscribe"}"#).is_err());
    }

    #[test]
    fn test_server_message_serialization() {
        let json = serde_json::to_value(ServerMessage::Subscribed {
            session_id: "abc".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "subscribed");
        assert_eq!(json["session_id"], "abc");

        let pong = serde_json::to_value(ServerMessage::Pong).unwrap();
        assert_eq!(pong["type"], "pong");
    }

    #[tokio::test]
    async fn test_subscribe_message_switches_session() {
        let state = AppState::default();
        let mut subscription = None;

        let reply = handle_text_message(
            r#"{"type":"subscribe","session_id":"s1"}"#,
            &state,
            &mut subscription,
        )
        .await
        .unwrap();

        assert!(matches!(reply, Reply::Send(ServerMessage::Subscribed { .. })));
        assert_eq!(subscription.unwrap().session_id().as_str(), "s1");
    }

    #[tokio::test]
    async fn test_invalid_session_is_rejected() {
        let state = AppState::default();
        let mut subscription = None;

        let result = handle_text_message(
            r#"{"type":"subscribe","session_id":"not valid!"}"#,
            &state,
            &mut subscription,
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(subscription.is_none());
    }

    #[tokio::test]
    async fn test_close_ends_connection() {
        let state = AppState::default();
        let mut subscription = None;
        let result = process_message(Ok(Message::Close(None)), &state, &mut subscription).await;
        assert!(matches!(result, Ok(Reply::Close)));
    }
}
