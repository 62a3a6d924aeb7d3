//! Capability System
//!
//! Capabilities ("tools") are named, schema-described functions the model may
//! request during a turn. They are registered once at startup and the
//! registry is read-only while a turn runs, so concurrent reads are safe.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{EngineError, Result};

/// Parameter definition for a capability schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description (shown to the model)
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
}

impl ParameterSpec {
    /// A required string parameter, the most common case
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: "string".into(),
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Capability definition advertised to the model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapabilitySchema {
    /// Unique capability identifier
    pub name: String,

    /// Human-readable description (shown to the model)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSpec>,
}

impl CapabilitySchema {
    /// Names of required parameters, in declaration order
    pub fn required_names(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Render the parameter list as a JSON Schema object:
    /// `{"type": "object", "required": [...], "properties": {...}}`.
    ///
    /// This is the shape the inference service expects in its tool list.
    pub fn parameters_json(&self) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    serde_json::json!({
                        "type": p.param_type,
                        "description": p.description,
                    }),
                )
            })
            .collect();

        serde_json::json!({
            "type": "object",
            "required": self.required_names(),
            "properties": properties,
        })
    }
}

/// Value produced by a capability before normalization.
///
/// Capabilities return whatever shape is natural for them; the invoker
/// flattens every variant to text before it enters the transcript.
#[derive(Clone, Debug)]
pub enum CapabilityPayload {
    Text(String),
    Json(serde_json::Value),
}

impl CapabilityPayload {
    /// Flatten to the text representation fed back to the model
    pub fn into_text(self) -> String {
        match self {
            CapabilityPayload::Text(s) => s,
            CapabilityPayload::Json(v) => match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            },
        }
    }
}

impl From<String> for CapabilityPayload {
    fn from(s: String) -> Self {
        CapabilityPayload::Text(s)
    }
}

impl From<&str> for CapabilityPayload {
    fn from(s: &str) -> Self {
        CapabilityPayload::Text(s.to_string())
    }
}

impl From<serde_json::Value> for CapabilityPayload {
    fn from(v: serde_json::Value) -> Self {
        CapabilityPayload::Json(v)
    }
}

/// Capability trait - implement to add new tools
#[async_trait]
pub trait Capability: Send + Sync {
    /// Get the capability's schema for model function calling
    fn schema(&self) -> CapabilitySchema;

    /// Execute with decoded arguments
    async fn invoke(
        &self,
        args: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<CapabilityPayload>;

    /// Validate arguments before execution (optional)
    fn validate(&self, args: &serde_json::Map<String, serde_json::Value>) -> Result<()> {
        let schema = self.schema();

        for param in &schema.parameters {
            if param.required && !args.contains_key(&param.name) {
                return Err(EngineError::ArgumentDecode(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            }
        }

        Ok(())
    }
}

/// Registry of available capabilities, in registration order.
///
/// Registration order is structural: `schemas()` advertises capabilities in
/// the order they were registered, which is the order the embedder declared
/// them.
pub struct CapabilityRegistry {
    entries: Vec<Arc<dyn Capability>>,
    index: HashMap<String, usize>,
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a new capability; fails if the name is taken
    pub fn register<C: Capability + 'static>(&mut self, capability: C) -> Result<()> {
        self.register_arc(Arc::new(capability))
    }

    /// Register a shared capability; fails if the name is taken
    pub fn register_arc(&mut self, capability: Arc<dyn Capability>) -> Result<()> {
        let name = capability.schema().name;
        if self.index.contains_key(&name) {
            return Err(EngineError::DuplicateCapability(name));
        }
        self.index.insert(name, self.entries.len());
        self.entries.push(capability);
        Ok(())
    }

    /// Resolve a capability by name
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.index.get(name).map(|&i| self.entries[i].clone())
    }

    /// All schemas, in registration order
    pub fn schemas(&self) -> Vec<CapabilitySchema> {
        self.entries.iter().map(|c| c.schema()).collect()
    }

    /// Capability names, in registration order
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|c| c.schema().name).collect()
    }

    /// Number of registered capabilities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoCapability {
        name: &'static str,
    }

    #[async_trait]
    impl Capability for EchoCapability {
        fn schema(&self) -> CapabilitySchema {
            CapabilitySchema {
                name: self.name.into(),
                description: "Echoes its input".into(),
                parameters: vec![ParameterSpec::string("text", "Text to echo")],
            }
        }

        async fn invoke(
            &self,
            args: &serde_json::Map<String, serde_json::Value>,
        ) -> Result<CapabilityPayload> {
            let text = args.get("text").and_then(|v| v.as_str()).unwrap_or("");
            Ok(text.into())
        }
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let mut registry = CapabilityRegistry::new();
        registry.register(EchoCapability { name: "zulu" }).unwrap();
        registry.register(EchoCapability { name: "alpha" }).unwrap();
        registry.register(EchoCapability { name: "mike" }).unwrap();

        assert_eq!(registry.names(), vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = CapabilityRegistry::new();
        registry.register(EchoCapability { name: "echo" }).unwrap();

        let err = registry
            .register(EchoCapability { name: "echo" })
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateCapability(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let mut registry = CapabilityRegistry::new();
        registry.register(EchoCapability { name: "echo" }).unwrap();

        for _ in 0..3 {
            assert!(registry.resolve("echo").is_some());
            assert!(registry.resolve("missing").is_none());
        }
    }

    #[test]
    fn test_parameters_json_shape() {
        let schema = CapabilitySchema {
            name: "get_weather".into(),
            description: "Weather lookup".into(),
            parameters: vec![
                ParameterSpec::string("city", "The city name"),
                ParameterSpec::string("country", "The country name"),
                ParameterSpec::string("units", "Unit system").optional(),
            ],
        };

        let json = schema.parameters_json();
        assert_eq!(json["type"], "object");
        assert_eq!(json["required"], serde_json::json!(["city", "country"]));
        assert_eq!(json["properties"]["city"]["type"], "string");
        assert!(json["properties"]["units"].is_object());
    }

    #[test]
    fn test_payload_normalization() {
        assert_eq!(CapabilityPayload::from("plain").into_text(), "plain");
        assert_eq!(
            CapabilityPayload::from(serde_json::json!({"temperature": 21})).into_text(),
            r#"{"temperature":21}"#
        );
        assert_eq!(
            CapabilityPayload::from(serde_json::json!("already text")).into_text(),
            "already text"
        );
    }
}
