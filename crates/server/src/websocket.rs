//! WebSocket streaming binding
//!
//! Full-duplex binding for browser clients: each caller utterance gets
//! an immediate processing acknowledgment, then the assistant reply as
//! an audio payload followed by its text transcript. A structured
//! summary block, when extracted, is pushed as its own message.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use receptionist_agent::{extract_json_block, messages, DialogueTurnProcessor};

use crate::state::AppState;

/// WebSocket message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Caller utterance
    Text { content: String },
    /// Assistant reply transcript
    Response { text: String },
    /// Assistant reply audio (base64 MP3)
    ResponseAudio { data: String },
    /// Lightweight acknowledgment before the slow model call
    Status { state: String },
    /// Extracted structured summary
    Summary { data: serde_json::Value },
    Error { message: String },
    SessionInfo { session_id: String },
    Ping,
    Pong,
    EndSession,
}

fn encode(msg: &WsMessage) -> String {
    serde_json::to_string(msg).unwrap_or_default()
}

/// Strip an optional role marker some clients prefix to utterances
fn strip_role_marker(text: &str) -> &str {
    for marker in ["User:", "user:", "Caller:"] {
        if let Some(rest) = text.strip_prefix(marker) {
            return rest.trim_start();
        }
    }
    text
}

/// GET /ws/ai - WebSocket upgrade
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    // An unconfigured dialogue collaborator is fatal to the session
    let processor = match state.processor() {
        Some(processor) => processor,
        None => {
            tracing::error!("No dialogue model bound, refusing WebSocket session");
            let err = WsMessage::Error {
                message: messages::SERVICE_UNAVAILABLE.to_string(),
            };
            let _ = socket.send(Message::Text(encode(&err))).await;
            return;
        }
    };

    let session_id = Uuid::new_v4().to_string();
    let roster = state.roster_snapshot().await;
    let session = state.sessions.create(session_id.clone(), roster);

    let info = WsMessage::SessionInfo {
        session_id: session_id.clone(),
    };
    let _ = socket.send(Message::Text(encode(&info))).await;

    // Open with the greeting so the caller hears something right away
    speak(&mut socket, &state, messages::GREETING).await;

    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Text(text)) => {
                // JSON envelope from the web client; bare text from
                // thinner clients is taken as the utterance itself
                let utterance = match serde_json::from_str::<WsMessage>(&text) {
                    Ok(WsMessage::Text { content }) => content,
                    Ok(WsMessage::Ping) => {
                        let _ = socket.send(Message::Text(encode(&WsMessage::Pong))).await;
                        continue;
                    }
                    Ok(WsMessage::EndSession) => break,
                    Ok(_) => continue,
                    Err(_) => text,
                };

                let utterance = strip_role_marker(&utterance);

                let keep_going =
                    process_utterance(&mut socket, &state, &processor, &session, utterance).await;
                if !keep_going {
                    speak(&mut socket, &state, messages::GOODBYE).await;
                    break;
                }
            }
            Ok(Message::Ping(data)) => {
                let _ = socket.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "WebSocket receive error");
                break;
            }
            _ => {}
        }
    }

    state.sessions.remove(&session_id).await;
    tracing::info!(session_id = %session_id, "WebSocket session closed");
}

/// Run one turn and deliver its outputs; returns `should_continue`
async fn process_utterance(
    socket: &mut WebSocket,
    state: &AppState,
    processor: &DialogueTurnProcessor,
    session: &std::sync::Arc<tokio::sync::Mutex<receptionist_agent::ConversationSession>>,
    utterance: &str,
) -> bool {
    let ack = WsMessage::Status {
        state: "processing".to_string(),
    };
    let _ = socket.send(Message::Text(encode(&ack))).await;

    let mut session = session.lock().await;
    let result = processor.process(&mut session, utterance).await;
    state.evaluate_commit(&mut session, &result).await;
    drop(session);

    speak(socket, state, &result.spoken_text).await;

    if let Some(value) = extract_json_block(&result.raw_text) {
        let summary = WsMessage::Summary { data: value };
        let _ = socket.send(Message::Text(encode(&summary))).await;
    }

    result.should_continue
}

/// Deliver one assistant utterance: audio first, then the transcript.
/// Synthesis failure degrades to text-only delivery.
async fn speak(socket: &mut WebSocket, state: &AppState, text: &str) {
    match state
        .speech
        .synthesize(text, &state.settings.speech.language)
        .await
    {
        Ok(audio) => {
            let msg = WsMessage::ResponseAudio {
                data: BASE64.encode(&audio),
            };
            let _ = socket.send(Message::Text(encode(&msg))).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Speech synthesis failed, sending text only");
        }
    }

    let msg = WsMessage::Response {
        text: text.to_string(),
    };
    let _ = socket.send(Message::Text(encode(&msg))).await;
}
