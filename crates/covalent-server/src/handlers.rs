//! HTTP/WebSocket Handlers

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::Response,
    Json,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;

use covalent_core::{CallRecord, CapabilityLifecycleEvent, CapabilitySchema, EngineError};
use covalent_runtime::catalog;

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub ollama_connected: bool,
    pub capabilities: usize,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub default: String,
    pub models: Vec<ModelView>,
}

#[derive(Debug, Serialize)]
pub struct ModelView {
    pub name: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct CapabilitiesResponse {
    pub tools: Vec<CapabilitySchema>,
}

fn error_code(e: &EngineError) -> &'static str {
    match e {
        EngineError::TurnInProgress => "TURN_IN_PROGRESS",
        _ => "ENGINE_ERROR",
    }
}

fn error_status(e: &EngineError) -> StatusCode {
    match e {
        EngineError::TurnInProgress => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ollama_connected = state.gateway.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        ollama_connected,
        capabilities: state.registry.len(),
    })
}

/// Main chat endpoint (non-streaming): runs a full turn and returns the
/// collected answer.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let answer = state
        .engine
        .run_collected(&payload.message)
        .await
        .map_err(|e| {
            tracing::error!("Turn error: {}", e);
            (
                error_status(&e),
                Json(ErrorResponse {
                    error: e.user_message(),
                    code: error_code(&e).into(),
                }),
            )
        })?;

    Ok(Json(ChatResponse {
        message: answer,
        model: state.model.clone(),
    }))
}

/// WebSocket streaming chat
pub async fn chat_stream_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_stream(socket, state))
}

/// One socket, many turns: each text frame is a prompt. Capability lifecycle
/// frames go out live while the tool rounds run, then tokens, then `done`.
async fn handle_stream(socket: WebSocket, state: AppState) {
    let connection = uuid::Uuid::new_v4();
    tracing::info!(%connection, "WebSocket chat connected");

    let (mut sender, mut receiver) = socket.split();

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::error!(%connection, "WebSocket error: {}", e);
                break;
            }
            _ => continue,
        };

        let request: ChatRequest = match serde_json::from_str(&msg) {
            Ok(r) => r,
            Err(e) => {
                let _ = send_frame(&mut sender, &error_frame(&e.to_string())).await;
                continue;
            }
        };

        // Subscribe before the turn starts so no lifecycle event is missed.
        let mut events = state.engine.subscribe();
        let engine = state.engine.clone();
        let mut pending_turn =
            tokio::spawn(async move { engine.run(&request.message).await });

        // Tool rounds: forward lifecycle frames as they happen.
        let joined = loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Ok(event) => {
                            if send_frame(&mut sender, &tool_frame(&event)).await.is_err() {
                                pending_turn.abort();
                                return;
                            }
                        }
                        Err(RecvError::Closed) => break pending_turn.await,
                        Err(RecvError::Lagged(missed)) => {
                            tracing::warn!(%connection, missed, "Lifecycle frames dropped");
                        }
                    }
                }
                joined = &mut pending_turn => break joined,
            }
        };

        // Lifecycle frames that landed between the last poll and the join
        while let Ok(event) = events.try_recv() {
            if send_frame(&mut sender, &tool_frame(&event)).await.is_err() {
                return;
            }
        }

        let mut stream = match joined {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                tracing::error!(%connection, "Turn error: {}", e);
                let _ = send_frame(&mut sender, &error_frame(&e.user_message())).await;
                continue;
            }
            Err(e) => {
                tracing::error!(%connection, "Turn task failed: {}", e);
                let _ = send_frame(&mut sender, &error_frame("The turn was interrupted")).await;
                continue;
            }
        };

        // Synthesis: forward token deltas until the stream ends.
        let mut failed = false;
        while let Some(delta) = stream.next().await {
            match delta {
                Ok(delta) => {
                    let frame = serde_json::json!({
                        "type": "token",
                        "content": delta.content,
                        "done": delta.done,
                    });
                    if send_frame(&mut sender, &frame).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    // Tokens already sent stand; the turn just ends early.
                    tracing::error!(%connection, "Stream error: {}", e);
                    let _ = send_frame(&mut sender, &error_frame(&e.user_message())).await;
                    failed = true;
                    break;
                }
            }
        }

        if !failed {
            let _ = send_frame(&mut sender, &serde_json::json!({"type": "done"})).await;
        }
    }

    tracing::info!(%connection, "WebSocket chat disconnected");
}

async fn send_frame(
    sender: &mut SplitSink<WebSocket, Message>,
    frame: &serde_json::Value,
) -> Result<(), axum::Error> {
    sender.send(Message::Text(frame.to_string().into())).await
}

/// Lifecycle event as a wire frame: event fields flat beside `type: "tool"`
fn tool_frame(event: &CapabilityLifecycleEvent) -> serde_json::Value {
    let mut frame = serde_json::json!(event);
    if let Some(fields) = frame.as_object_mut() {
        fields.insert("type".into(), "tool".into());
    }
    frame
}

fn error_frame(message: &str) -> serde_json::Value {
    serde_json::json!({"type": "error", "error": message})
}

/// List models available on the inference service
pub async fn list_models(
    State(state): State<AppState>,
) -> Result<Json<ModelsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let models = state.gateway.list_models().await.map_err(|e| {
        tracing::error!("Model listing error: {}", e);
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: e.user_message(),
                code: "MODELS_UNAVAILABLE".into(),
            }),
        )
    })?;

    Ok(Json(ModelsResponse {
        default: state.model.clone(),
        models: models
            .into_iter()
            .map(|m| ModelView {
                label: catalog::label_for(&m.name).to_string(),
                name: m.name,
                size: m.size,
            })
            .collect(),
    }))
}

/// List the capabilities advertised to the model
pub async fn list_capabilities(State(state): State<AppState>) -> Json<CapabilitiesResponse> {
    Json(CapabilitiesResponse {
        tools: state.registry.schemas(),
    })
}

/// Call log for this session, oldest first
pub async fn list_calls(State(state): State<AppState>) -> Json<Vec<CallRecord>> {
    Json(state.engine.call_records())
}
