//! Ollama Inference Gateway
//!
//! `InferenceGateway` implementation speaking the Ollama HTTP API directly:
//! `POST /api/chat` for capability-calling completions and token streaming,
//! `GET /api/tags` for health checks and model discovery. The wire types
//! below mirror the Ollama chat schema, including the
//! `{"type": "function", "function": {...}}` capability envelope.

use std::time::Duration;

use async_trait::async_trait;
use covalent_core::{
    capability::CapabilitySchema,
    error::{EngineError, Result},
    gateway::{GenerationOptions, InferenceGateway, ModelEntry, TokenDelta, TokenStream},
    message::{CapabilityCall, Message},
};
use futures::{StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

/// Gateway configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Service host URL
    pub host: String,

    /// Service port
    pub port: u16,

    /// Timeout for non-streaming requests, in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            timeout_secs: 120,
        }
    }
}

impl OllamaConfig {
    pub fn from_env() -> Self {
        let host = std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost".into());
        let port = std::env::var("OLLAMA_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(11434);

        Self {
            host,
            port,
            ..Default::default()
        }
    }

    fn base_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Ollama-backed inference gateway
pub struct OllamaGateway {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaGateway {
    /// Create a new gateway with custom host/port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::from_config(OllamaConfig {
            host: host.into(),
            port,
            ..Default::default()
        })
    }

    /// Create from configuration
    pub fn from_config(config: OllamaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_config(OllamaConfig::from_env())
    }

    /// Create with default localhost settings
    pub fn localhost() -> Self {
        Self::from_config(OllamaConfig::default())
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.config.base_url())
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.config.base_url())
    }

    /// Convert engine messages to the Ollama chat format
    fn convert_messages(messages: &[Message]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
                tool_calls: if m.calls.is_empty() {
                    None
                } else {
                    Some(m.calls.iter().map(WireToolCall::from_call).collect())
                },
            })
            .collect()
    }

    /// Convert capability schemas to the Ollama tool envelope
    fn convert_schemas(schemas: &[CapabilitySchema]) -> Vec<WireTool> {
        schemas
            .iter()
            .map(|s| WireTool {
                kind: "function",
                function: WireToolSchema {
                    name: s.name.clone(),
                    description: s.description.clone(),
                    parameters: s.parameters_json(),
                },
            })
            .collect()
    }

    /// POST to `/api/chat`, surfacing non-2xx responses as model errors.
    ///
    /// The overall timeout applies to non-streaming requests only; a live
    /// token stream must be allowed to outlast it.
    async fn post_chat(&self, body: &ChatRequest, streaming: bool) -> Result<reqwest::Response> {
        let mut request = self.client.post(self.chat_url()).json(body);
        if !streaming {
            request = request.timeout(Duration::from_secs(self.config.timeout_secs));
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EngineError::Model(format!(
                "Model service returned {status}: {detail}"
            )));
        }

        Ok(response)
    }
}

fn transport_error(e: reqwest::Error) -> EngineError {
    EngineError::Transport(format!("Request to model service failed: {e}"))
}

/// Parse one NDJSON line of a streaming chat response
fn parse_stream_line(line: &str) -> Result<TokenDelta> {
    let chunk: ChatChunk = serde_json::from_str(line)
        .map_err(|e| EngineError::Model(format!("Malformed streaming chunk: {e}")))?;

    if let Some(error) = chunk.error {
        return Err(EngineError::Model(error));
    }

    Ok(TokenDelta {
        content: chunk.message.map(|m| m.content).unwrap_or_default(),
        done: chunk.done,
    })
}

/// Drain complete newline-terminated lines from the byte buffer.
///
/// Splitting happens on bytes so a multi-byte character broken across two
/// network chunks reassembles before UTF-8 decoding.
fn drain_lines(buffer: &mut Vec<u8>) -> Vec<Result<TokenDelta>> {
    let mut out = Vec::new();
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&line);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        out.push(parse_stream_line(trimmed));
    }
    out
}

#[async_trait]
impl InferenceGateway for OllamaGateway {
    async fn complete(
        &self,
        transcript: &[Message],
        schemas: &[CapabilitySchema],
        options: &GenerationOptions,
    ) -> Result<Message> {
        let request = ChatRequest {
            model: options.model.clone(),
            messages: Self::convert_messages(transcript),
            tools: Some(Self::convert_schemas(schemas)),
            stream: false,
            options: WireOptions::from_generation(options),
        };

        let response = self.post_chat(&request, false).await?;
        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Model(format!("Malformed completion response: {e}")))?;

        Ok(chat.message.into_message())
    }

    async fn stream(
        &self,
        transcript: &[Message],
        options: &GenerationOptions,
    ) -> Result<TokenStream> {
        let request = ChatRequest {
            model: options.model.clone(),
            messages: Self::convert_messages(transcript),
            tools: None,
            stream: true,
            options: WireOptions::from_generation(options),
        };

        let response = self.post_chat(&request, true).await?;

        let deltas = response
            .bytes_stream()
            .map_err(transport_error)
            .scan(Vec::new(), |buffer: &mut Vec<u8>, chunk| {
                let out = match chunk {
                    Ok(bytes) => {
                        buffer.extend_from_slice(&bytes);
                        drain_lines(buffer)
                    }
                    Err(e) => vec![Err(e)],
                };
                futures::future::ready(Some(futures::stream::iter(out)))
            })
            .flatten();

        Ok(Box::pin(deltas))
    }

    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelEntry>> {
        let response = self
            .client
            .get(self.tags_url())
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Model(format!(
                "Model service returned {status}"
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Model(format!("Malformed model listing: {e}")))?;

        Ok(tags
            .models
            .into_iter()
            .map(|m| ModelEntry {
                name: m.name,
                size: m.size,
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Wire types (Ollama chat schema)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<WireOptions>,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    function: WireFunctionCall,
}

impl WireToolCall {
    fn from_call(call: &CapabilityCall) -> Self {
        Self {
            function: WireFunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            },
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

#[derive(Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireToolSchema,
}

#[derive(Serialize)]
struct WireToolSchema {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Serialize)]
struct WireOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

impl WireOptions {
    fn from_generation(options: &GenerationOptions) -> Option<Self> {
        options.has_sampling().then(|| Self {
            temperature: options.temperature,
            top_p: options.top_p,
            num_predict: options.num_predict,
        })
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    message: WireResponseMessage,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

impl WireResponseMessage {
    fn into_message(self) -> Message {
        let calls = self
            .tool_calls
            .into_iter()
            .map(|c| CapabilityCall::new(c.function.name, c.function.arguments))
            .collect();
        Message::assistant_with_calls(self.content, calls)
    }
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
    #[serde(default)]
    size: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use covalent_core::capability::ParameterSpec;

    #[test]
    fn test_config_defaults() {
        let config = OllamaConfig::default();
        assert_eq!(config.host, "http://localhost");
        assert_eq!(config.port, 11434);
        assert_eq!(config.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_message_conversion() {
        let messages = vec![Message::system("You are helpful."), Message::user("Hello")];

        let converted = OllamaGateway::convert_messages(&messages);
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].role, "system");
        assert_eq!(converted[1].role, "user");

        // Without calls the tool_calls key stays off the wire entirely.
        let json = serde_json::to_string(&converted).unwrap();
        assert!(!json.contains("tool_calls"));
    }

    #[test]
    fn test_assistant_calls_ride_back_on_the_wire() {
        let message = Message::assistant_with_calls(
            "",
            vec![CapabilityCall::new(
                "get_weather",
                serde_json::json!({"city": "Paris"}),
            )],
        );

        let converted = OllamaGateway::convert_messages(&[message]);
        let json = serde_json::to_value(&converted[0]).unwrap();
        assert_eq!(json["tool_calls"][0]["function"]["name"], "get_weather");
        assert_eq!(
            json["tool_calls"][0]["function"]["arguments"]["city"],
            "Paris"
        );
    }

    #[test]
    fn test_schema_conversion_shape() {
        let schema = CapabilitySchema {
            name: "get_weather".into(),
            description: "Get the weather".into(),
            parameters: vec![ParameterSpec::string("city", "City name")],
        };

        let tools = OllamaGateway::convert_schemas(&[schema]);
        let json = serde_json::to_value(&tools[0]).unwrap();

        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "get_weather");
        assert_eq!(json["function"]["parameters"]["type"], "object");
        assert_eq!(json["function"]["parameters"]["required"][0], "city");
        assert_eq!(
            json["function"]["parameters"]["properties"]["city"]["type"],
            "string"
        );
    }

    #[test]
    fn test_completion_response_parsing() {
        let raw = r#"{
            "model": "qwen3:14b",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    {"function": {"name": "get_weather", "arguments": {"city": "Paris", "country": "France"}}}
                ]
            },
            "done": true
        }"#;

        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        let message = response.message.into_message();

        assert!(message.requests_calls());
        assert_eq!(message.calls[0].name, "get_weather");
        assert_eq!(message.calls[0].arguments["country"], "France");
    }

    #[test]
    fn test_parse_stream_line() {
        let delta =
            parse_stream_line(r#"{"message": {"content": "Hel"}, "done": false}"#).unwrap();
        assert_eq!(delta.content, "Hel");
        assert!(!delta.done);

        let last = parse_stream_line(r#"{"message": {"content": ""}, "done": true}"#).unwrap();
        assert!(last.done);

        let err = parse_stream_line(r#"{"error": "model not loaded"}"#).err().unwrap();
        assert!(matches!(err, EngineError::Model(_)));

        let garbled = parse_stream_line("not json").err().unwrap();
        assert!(matches!(garbled, EngineError::Model(_)));
    }

    #[test]
    fn test_drain_lines_reassembles_split_chunks() {
        let mut buffer = Vec::new();

        buffer.extend_from_slice(br#"{"message": {"content": "Hi"}, "done": false}"#);
        assert!(drain_lines(&mut buffer).is_empty());

        buffer.extend_from_slice(b"\n");
        buffer.extend_from_slice(br#"{"message": {"content": ""}, "done": true}"#);
        buffer.extend_from_slice(b"\n");

        let deltas = drain_lines(&mut buffer);
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].as_ref().unwrap().content, "Hi");
        assert!(deltas[1].as_ref().unwrap().done);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_request_always_advertises_tools_when_completing() {
        let request = ChatRequest {
            model: "qwen3:14b".into(),
            messages: Vec::new(),
            tools: Some(Vec::new()),
            stream: false,
            options: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tools"], serde_json::json!([]));
        assert!(json.get("options").is_none());
    }

    #[test]
    fn test_streaming_request_carries_no_tools() {
        let request = ChatRequest {
            model: "qwen3:14b".into(),
            messages: Vec::new(),
            tools: None,
            stream: true,
            options: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("tools").is_none());
        assert_eq!(json["stream"], true);
    }

    #[test]
    fn test_sampling_options_only_when_set() {
        let plain = GenerationOptions::for_model("qwen3:4b");
        assert!(WireOptions::from_generation(&plain).is_none());

        let mut tuned = GenerationOptions::for_model("qwen3:4b");
        tuned.temperature = Some(0.25);
        let wire = WireOptions::from_generation(&tuned).unwrap();
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["temperature"], 0.25);
        assert!(json.get("top_p").is_none());
    }
}
