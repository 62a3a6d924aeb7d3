//! Application State

use std::sync::Arc;

use covalent_core::{CapabilityRegistry, InferenceGateway, Orchestrator};

/// Shared application state.
///
/// One orchestrator serves the whole server: this surface is a single chat
/// seat, and overlapping prompts are rejected rather than queued.
#[derive(Clone)]
pub struct AppState {
    /// The turn engine
    pub engine: Arc<Orchestrator>,

    /// Inference gateway (Ollama)
    pub gateway: Arc<dyn InferenceGateway>,

    /// Registry with all active capabilities
    pub registry: Arc<CapabilityRegistry>,

    /// Model tag the engine is pinned to
    pub model: String,
}
