//! # covalent-core
//!
//! Turn orchestration between a user prompt and a local inference service,
//! with an extensible capability (tool) system.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Orchestrator                           │
//! │  ┌──────────────┐  ┌──────────────┐  ┌───────────────────┐  │
//! │  │ Request Loop │  │  Capability  │  │ InferenceGateway  │  │
//! │  │  + Synthesis │──│   Registry   │──│    (Strategy)     │  │
//! │  └──────────────┘  └──────────────┘  └───────────────────┘  │
//! │         │                                                    │
//! │         └── lifecycle events (broadcast) ── observers        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A turn runs in two phases: a bounded loop of non-streaming requests in
//! which the model may ask for capability invocations, then a single
//! streaming request that produces the user-visible answer token by token.
//! The `InferenceGateway` trait keeps the engine independent of any one
//! model service.

pub mod capability;
pub mod engine;
pub mod error;
pub mod event;
pub mod gateway;
pub mod invoker;
pub mod message;
pub mod session;

pub use capability::{
    Capability, CapabilityPayload, CapabilityRegistry, CapabilitySchema, ParameterSpec,
};
pub use engine::{EngineConfig, Orchestrator, TurnStream, DEFAULT_MAX_TOOL_ROUNDS};
pub use error::{EngineError, Result};
pub use event::{CallRecord, CapabilityLifecycleEvent};
pub use gateway::{GenerationOptions, InferenceGateway, ModelEntry, TokenDelta, TokenStream};
pub use invoker::CapabilityInvoker;
pub use message::{CapabilityCall, Message, Role, Transcript};
pub use session::{SessionConfig, StaticSession};
