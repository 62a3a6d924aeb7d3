//! Transcript Messages
//!
//! Message format shared by the engine, the gateway, and the server.
//! A [`Transcript`] is the ordered, append-only message log for one turn.

use serde::{Deserialize, Serialize};

/// Role of a message sender
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System directive
    System,
    /// User prompt
    User,
    /// Assistant (model) response
    Assistant,
    /// Capability result fed back to the model
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A capability invocation requested by the model.
///
/// `arguments` is the raw payload as it arrived: usually a JSON object, but
/// some models deliver a string-encoded object. Decoding happens at the
/// invoker boundary, not here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapabilityCall {
    /// Capability name as requested (may not be registered)
    pub name: String,

    /// Raw argument payload
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl CapabilityCall {
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// A single message in a transcript
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Text content
    pub content: String,

    /// Capability calls requested by an assistant message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<CapabilityCall>,
}

impl Message {
    /// Create a new message
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            calls: Vec::new(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create an assistant message carrying capability-call requests
    pub fn assistant_with_calls(content: impl Into<String>, calls: Vec<CapabilityCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            calls,
        }
    }

    /// Create a tool result message
    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(Role::Tool, content)
    }

    /// Whether this message requests any capability calls
    pub fn requests_calls(&self) -> bool {
        !self.calls.is_empty()
    }
}

/// Ordered message log for one orchestration turn.
///
/// Append-only: the first message is always the system directive, and a tool
/// result is always preceded by the assistant message that declared the
/// matching call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Seed a fresh transcript with the system directive and the user prompt.
    pub fn seeded(directive: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(directive), Message::user(prompt)],
        }
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages, in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// A transcript is never empty once seeded
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Roles in message order, handy for structural assertions
    pub fn roles(&self) -> Vec<Role> {
        self.messages.iter().map(|m| m.role.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
        assert!(!msg.requests_calls());
    }

    #[test]
    fn test_assistant_with_calls() {
        let call = CapabilityCall::new("get_weather", serde_json::json!({"city": "Paris"}));
        let msg = Message::assistant_with_calls("", vec![call]);
        assert!(msg.requests_calls());
        assert_eq!(msg.calls[0].name, "get_weather");
    }

    #[test]
    fn test_seeded_transcript() {
        let transcript = Transcript::seeded("You are helpful.", "Hi");
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].role, Role::System);
        assert_eq!(transcript.messages()[1].role, Role::User);
    }

    #[test]
    fn test_transcript_is_ordered() {
        let mut transcript = Transcript::seeded("sys", "prompt");
        transcript.push(Message::assistant("thinking"));
        transcript.push(Message::tool("result"));
        assert_eq!(
            transcript.roles(),
            vec![Role::System, Role::User, Role::Assistant, Role::Tool]
        );
    }
}
