//! # covalent-runtime
//!
//! Inference gateways for the covalent engine.
//!
//! ## Gateways
//!
//! - **Ollama**: local inference over the Ollama HTTP API, with native
//!   capability calling and NDJSON token streaming
//!
//! ## Usage
//!
//! ```rust,ignore
//! use covalent_runtime::OllamaGateway;
//!
//! let gateway = Arc::new(OllamaGateway::from_env());
//! let engine = Orchestrator::new(gateway, session);
//! let mut stream = engine.run("what's the weather in Paris?").await?;
//! ```

pub mod catalog;
pub mod ollama;

pub use ollama::{OllamaConfig, OllamaGateway};

// Re-export core types for convenience
pub use covalent_core::{
    EngineError, GenerationOptions, InferenceGateway, Message, Orchestrator, Result, Role,
};
