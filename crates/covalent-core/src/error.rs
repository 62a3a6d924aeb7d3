//! Error Types

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    /// Network or HTTP failure reaching the inference service
    #[error("Transport error: {0}")]
    Transport(String),

    /// The inference service reported an error payload
    #[error("Model error: {0}")]
    Model(String),

    /// Capability not found in the registry
    #[error("Capability not found: {0}")]
    CapabilityNotFound(String),

    /// Capability arguments could not be decoded
    #[error("Argument decode error: {0}")]
    ArgumentDecode(String),

    /// Capability body failed during execution
    #[error("Capability execution error: {0}")]
    CapabilityExecution(String),

    /// A capability with this name is already registered
    #[error("Duplicate capability: {0}")]
    DuplicateCapability(String),

    /// A turn is already running; prompts are not interleaved
    #[error("A turn is already in progress")]
    TurnInProgress,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl EngineError {
    /// Whether this error terminates the turn.
    ///
    /// Capability-level failures are folded into textual tool results and
    /// never surface here; transport and model failures end the turn.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EngineError::Transport(_) | EngineError::Model(_))
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            EngineError::Transport(_) => {
                "The inference service could not be reached. Is it running?".into()
            }
            EngineError::Model(msg) => format!("The model service reported an error: {}", msg),
            EngineError::CapabilityNotFound(name) => {
                format!("The tool '{}' is not available.", name)
            }
            EngineError::ArgumentDecode(msg) => format!("Invalid tool arguments: {}", msg),
            EngineError::CapabilityExecution(msg) => format!("Tool error: {}", msg),
            EngineError::DuplicateCapability(name) => {
                format!("A tool named '{}' already exists.", name)
            }
            EngineError::TurnInProgress => {
                "A response is still being generated. Please wait for it to finish.".into()
            }
            EngineError::Config(msg) => format!("Configuration problem: {}", msg),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        EngineError::Other(err.to_string())
    }
}
