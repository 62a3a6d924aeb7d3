//! Capability Invoker
//!
//! Resolves and executes one capability call, folding every failure into a
//! textual payload. A bad call never aborts the turn: the text goes back to
//! the model as the tool result and the loop continues.

use std::sync::Arc;

use crate::capability::CapabilityRegistry;
use crate::error::{EngineError, Result};
use crate::message::CapabilityCall;

/// Fallback result when a capability produces nothing
const EMPTY_OUTPUT: &str = "Execution completed with no output";

/// Executes capability calls against a read-only registry.
///
/// Calls are invoked one at a time; the engine awaits each invocation before
/// dispatching the next, so results stay in request order.
pub struct CapabilityInvoker {
    registry: Arc<CapabilityRegistry>,
}

impl CapabilityInvoker {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this invoker resolves against
    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Execute one call and return the text fed back to the model.
    ///
    /// Unknown names, undecodable arguments, and execution failures all come
    /// back as text; this method never errors.
    pub async fn invoke(&self, call: &CapabilityCall) -> String {
        let Some(capability) = self.registry.resolve(&call.name) else {
            tracing::warn!(capability = %call.name, "Requested capability is not registered");
            return format!("Tool \"{}\" not found", call.name);
        };

        let args = match decode_arguments(&call.arguments) {
            Ok(args) => args,
            Err(e) => {
                tracing::warn!(capability = %call.name, error = %e, "Argument decode failed");
                return format!("Error executing tool: {}", e);
            }
        };

        if let Err(e) = capability.validate(&args) {
            return format!("Error executing tool: {}", e);
        }

        tracing::debug!(capability = %call.name, "Invoking capability");

        match capability.invoke(&args).await {
            Ok(payload) => {
                let text = payload.into_text();
                if text.is_empty() {
                    EMPTY_OUTPUT.to_string()
                } else {
                    text
                }
            }
            Err(e) => {
                tracing::warn!(capability = %call.name, error = %e, "Capability execution failed");
                format!("Error executing tool: {}", e)
            }
        }
    }
}

/// Decode a raw argument payload into the structured object capabilities
/// expect. String payloads are parsed as JSON, which some models emit.
fn decode_arguments(raw: &serde_json::Value) -> Result<serde_json::Map<String, serde_json::Value>> {
    match raw {
        serde_json::Value::Object(map) => Ok(map.clone()),
        serde_json::Value::Null => Ok(serde_json::Map::new()),
        serde_json::Value::String(encoded) => {
            let parsed: serde_json::Value = serde_json::from_str(encoded)
                .map_err(|e| EngineError::ArgumentDecode(e.to_string()))?;
            match parsed {
                serde_json::Value::Object(map) => Ok(map),
                other => Err(EngineError::ArgumentDecode(format!(
                    "expected a JSON object, got {}",
                    value_kind(&other)
                ))),
            }
        }
        other => Err(EngineError::ArgumentDecode(format!(
            "expected a JSON object, got {}",
            value_kind(other)
        ))),
    }
}

fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Capability, CapabilityPayload, CapabilitySchema, ParameterSpec};
    use async_trait::async_trait;

    struct WeatherStub;

    #[async_trait]
    impl Capability for WeatherStub {
        fn schema(&self) -> CapabilitySchema {
            CapabilitySchema {
                name: "get_weather".into(),
                description: "Stub weather".into(),
                parameters: vec![
                    ParameterSpec::string("city", "City"),
                    ParameterSpec::string("country", "Country"),
                ],
            }
        }

        async fn invoke(
            &self,
            args: &serde_json::Map<String, serde_json::Value>,
        ) -> Result<CapabilityPayload> {
            let city = args.get("city").and_then(|v| v.as_str()).unwrap_or("?");
            Ok(format!("Sunny in {}", city).into())
        }
    }

    struct FailingStub;

    #[async_trait]
    impl Capability for FailingStub {
        fn schema(&self) -> CapabilitySchema {
            CapabilitySchema {
                name: "explode".into(),
                description: "Always fails".into(),
                parameters: vec![],
            }
        }

        async fn invoke(
            &self,
            _args: &serde_json::Map<String, serde_json::Value>,
        ) -> Result<CapabilityPayload> {
            Err(EngineError::CapabilityExecution("disk on fire".into()))
        }
    }

    struct SilentStub;

    #[async_trait]
    impl Capability for SilentStub {
        fn schema(&self) -> CapabilitySchema {
            CapabilitySchema {
                name: "silent".into(),
                description: "Returns nothing".into(),
                parameters: vec![],
            }
        }

        async fn invoke(
            &self,
            _args: &serde_json::Map<String, serde_json::Value>,
        ) -> Result<CapabilityPayload> {
            Ok("".into())
        }
    }

    fn invoker() -> CapabilityInvoker {
        let mut registry = CapabilityRegistry::new();
        registry.register(WeatherStub).unwrap();
        registry.register(FailingStub).unwrap();
        registry.register(SilentStub).unwrap();
        CapabilityInvoker::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_unknown_capability_yields_not_found_text() {
        let call = CapabilityCall::new("doesNotExist", serde_json::Value::Null);
        let output = invoker().invoke(&call).await;
        assert_eq!(output, "Tool \"doesNotExist\" not found");
    }

    #[tokio::test]
    async fn test_structured_arguments() {
        let call = CapabilityCall::new(
            "get_weather",
            serde_json::json!({"city": "Paris", "country": "France"}),
        );
        assert_eq!(invoker().invoke(&call).await, "Sunny in Paris");
    }

    #[tokio::test]
    async fn test_string_encoded_arguments() {
        let call = CapabilityCall::new(
            "get_weather",
            serde_json::json!(r#"{"city": "Oslo", "country": "Norway"}"#),
        );
        assert_eq!(invoker().invoke(&call).await, "Sunny in Oslo");
    }

    #[tokio::test]
    async fn test_undecodable_arguments_yield_error_text() {
        let call = CapabilityCall::new("get_weather", serde_json::json!("{not json"));
        let output = invoker().invoke(&call).await;
        assert!(output.starts_with("Error executing tool:"));
    }

    #[tokio::test]
    async fn test_missing_required_argument_yields_error_text() {
        let call = CapabilityCall::new("get_weather", serde_json::json!({"city": "Paris"}));
        let output = invoker().invoke(&call).await;
        assert!(output.contains("Missing required parameter: country"));
    }

    #[tokio::test]
    async fn test_execution_failure_is_folded_into_text() {
        let call = CapabilityCall::new("explode", serde_json::Value::Null);
        let output = invoker().invoke(&call).await;
        assert_eq!(
            output,
            "Error executing tool: Capability execution error: disk on fire"
        );
    }

    #[tokio::test]
    async fn test_empty_output_is_normalized() {
        let call = CapabilityCall::new("silent", serde_json::Value::Null);
        assert_eq!(invoker().invoke(&call).await, EMPTY_OUTPUT);
    }
}
