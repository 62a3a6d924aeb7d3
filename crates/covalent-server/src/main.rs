//! covalent HTTP Server
//!
//! Axum-based server exposing the orchestration engine over REST and
//! WebSocket: non-streaming chat, streamed turns with live capability
//! lifecycle frames, model listing, and the session call log.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use covalent_core::{InferenceGateway, Orchestrator, StaticSession};
use covalent_runtime::{catalog, OllamaGateway};
use covalent_toolkit::{assistant_directive, concise_directive, standard_kit, Workbench};

use crate::handlers::{
    chat_handler, chat_stream_handler, health_check, list_calls, list_capabilities, list_models,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Initialize inference gateway
    let gateway: Arc<dyn InferenceGateway> = Arc::new(OllamaGateway::from_env());

    // Verify Ollama connection
    match gateway.health_check().await {
        Ok(true) => {
            tracing::info!("✓ Connected to Ollama");
            if let Ok(models) = gateway.list_models().await {
                for model in models {
                    tracing::info!("  Model: {}", model.name);
                }
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Ollama not available - turns will fail");
            tracing::warn!("  Make sure Ollama is running: ollama serve");
        }
    }

    // Prepare the workbench for file capabilities
    let workbench = Workbench::from_env();
    workbench.ensure_exists().await?;
    tracing::info!("Workbench: {}", workbench.root().display());

    // Register the built-in capability kit
    let registry = Arc::new(standard_kit(workbench)?);

    tracing::info!("Registered {} capabilities:", registry.len());
    for name in registry.names() {
        tracing::info!("  • {}", name);
    }

    // Session configuration: model and directive are pinned at startup
    let model = catalog::default_model();
    let directive = match std::env::var("COVALENT_DIRECTIVE").as_deref() {
        Ok("concise") => concise_directive(),
        Ok("plain") => covalent_toolkit::PLAIN_DIRECTIVE.to_string(),
        _ => assistant_directive(),
    };
    tracing::info!("Model: {}", model);

    let session = Arc::new(StaticSession::new(
        registry.clone(),
        model.clone(),
        directive,
    ));
    let engine = Arc::new(Orchestrator::new(gateway.clone(), session));

    // Build application state
    let state = AppState {
        engine,
        gateway,
        registry,
        model,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/models", get(list_models))
        // Turn API
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/stream", get(chat_stream_handler))
        // Introspection
        .route("/api/tools", get(list_capabilities))
        .route("/api/calls", get(list_calls))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 covalent server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health          - Health check");
    tracing::info!("  GET  /api/models      - List available models");
    tracing::info!("  POST /api/chat        - Run a turn, collected");
    tracing::info!("  GET  /api/chat/stream - WebSocket streaming turns");
    tracing::info!("  GET  /api/tools       - Advertised capabilities");
    tracing::info!("  GET  /api/calls       - Session call log");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
