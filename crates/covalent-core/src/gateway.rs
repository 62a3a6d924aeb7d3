//! Inference Gateway
//!
//! Transport seam between the engine and the inference service. The engine
//! works exclusively through this trait; the concrete adapter lives in the
//! runtime crate.

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::capability::CapabilitySchema;
use crate::error::Result;
use crate::message::Message;

/// Configuration for a generation request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "qwen3:14b")
    pub model: String,

    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Top-p nucleus sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

impl GenerationOptions {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            top_p: None,
            num_predict: None,
        }
    }

    /// Whether any sampling option is set (and should ride on the request)
    pub fn has_sampling(&self) -> bool {
        self.temperature.is_some() || self.top_p.is_some() || self.num_predict.is_some()
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::for_model("qwen3:14b")
    }
}

/// One incremental fragment of a streamed answer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenDelta {
    /// The text delta
    pub content: String,

    /// Whether this is the service's end signal
    pub done: bool,
}

/// Lazy, single-pass sequence of token deltas.
///
/// Consumed once; not restartable mid-stream. Dropping it releases the
/// underlying transport subscription.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<TokenDelta>> + Send>>;

/// A model known to the inference service
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Model tag (e.g., "qwen3:4b")
    pub name: String,

    /// On-disk size in bytes, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Transport adapter for the inference service.
///
/// `complete` advertises the given capability schemas; `stream` never does,
/// so the model cannot re-request tools while producing the final answer.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Single round trip. Fails with `Transport` on network/service failure,
    /// `Model` if the service reports an error payload.
    async fn complete(
        &self,
        transcript: &[Message],
        schemas: &[CapabilitySchema],
        options: &GenerationOptions,
    ) -> Result<Message>;

    /// Streaming request, no capability schemas attached.
    async fn stream(
        &self,
        transcript: &[Message],
        options: &GenerationOptions,
    ) -> Result<TokenStream>;

    /// Check if the service is reachable and responsive
    async fn health_check(&self) -> Result<bool>;

    /// List models available on the service
    async fn list_models(&self) -> Result<Vec<ModelEntry>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.model, "qwen3:14b");
        assert!(!opts.has_sampling());

        let mut opts = GenerationOptions::for_model("cogito:3b");
        opts.temperature = Some(0.7);
        assert!(opts.has_sampling());
    }
}
