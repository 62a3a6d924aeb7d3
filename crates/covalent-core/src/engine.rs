//! Orchestration Engine
//!
//! Drives one turn: seed the transcript, loop non-streaming requests while
//! the model keeps asking for capabilities, execute those calls in order,
//! then stream the synthesized answer. Capability failures are folded into
//! tool results and never end the turn; transport and model failures do.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::{broadcast, Mutex, OwnedMutexGuard};

use crate::error::{EngineError, Result};
use crate::event::{CallRecord, CapabilityLifecycleEvent};
use crate::gateway::{InferenceGateway, TokenDelta, TokenStream};
use crate::invoker::CapabilityInvoker;
use crate::message::{CapabilityCall, Message, Transcript};
use crate::session::SessionConfig;

/// Default cap on tool rounds within one turn
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Closing directive appended before the streaming synthesis request.
///
/// Spoken in the assistant's voice: answer from the gathered tool results,
/// admit failures instead of inventing data, and address the user directly.
pub const SYNTHESIS_DIRECTIVE: &str = "I have finished gathering information with the tools above. \
I will now answer the user's original question directly, using only what those tool results show. \
If a tool failed, I will tell the user so rather than making up information or silently retrying. \
Everything I write from here on is shown to the user, so I will respond accordingly: ";

/// Engine configuration
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Maximum tool rounds before synthesis is forced
    pub max_tool_rounds: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

/// The streamed final answer of one turn.
///
/// Holds the turn permit: a new prompt is rejected until this stream is
/// dropped or exhausted. Dropping it early also releases the gateway's
/// transport subscription.
pub struct TurnStream {
    inner: TokenStream,
    _permit: OwnedMutexGuard<()>,
}

impl Stream for TurnStream {
    type Item = Result<TokenDelta>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().inner.as_mut().poll_next(cx)
    }
}

/// The turn state machine.
///
/// One orchestrator serves one chat surface: turns run strictly one at a
/// time, each over a fresh transcript seeded from the session collaborator.
pub struct Orchestrator {
    gateway: Arc<dyn InferenceGateway>,
    session: Arc<dyn SessionConfig>,
    config: EngineConfig,
    events: broadcast::Sender<CapabilityLifecycleEvent>,
    records: std::sync::Mutex<Vec<CallRecord>>,
    turn_gate: Arc<Mutex<()>>,
}

impl Orchestrator {
    /// Create an orchestrator with the default configuration
    pub fn new(gateway: Arc<dyn InferenceGateway>, session: Arc<dyn SessionConfig>) -> Self {
        Self::with_config(gateway, session, EngineConfig::default())
    }

    /// Create an orchestrator with an explicit configuration
    pub fn with_config(
        gateway: Arc<dyn InferenceGateway>,
        session: Arc<dyn SessionConfig>,
        config: EngineConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            gateway,
            session,
            config,
            events,
            records: std::sync::Mutex::new(Vec::new()),
            turn_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Subscribe to capability lifecycle events.
    ///
    /// Every invocation produces a `Dispatched` followed by a `Completed`,
    /// in call order, before the loop advances.
    pub fn subscribe(&self) -> broadcast::Receiver<CapabilityLifecycleEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the append-only call log for this session
    pub fn call_records(&self) -> Vec<CallRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Run one turn and stream the synthesized answer.
    ///
    /// Fails with `TurnInProgress` if a previous turn's stream is still
    /// live, and with `Transport`/`Model` if the inference service fails
    /// during the request loop or when opening the synthesis stream.
    pub async fn run(&self, prompt: &str) -> Result<TurnStream> {
        let permit = self
            .turn_gate
            .clone()
            .try_lock_owned()
            .map_err(|_| EngineError::TurnInProgress)?;

        let registry = self.session.active_capabilities();
        let schemas = registry.schemas();
        let invoker = CapabilityInvoker::new(registry);
        let options = self.session.generation_options();

        let mut transcript = Transcript::seeded(self.session.system_directive(), prompt);

        let mut round = 0;
        while round < self.config.max_tool_rounds {
            round += 1;

            let response = self
                .gateway
                .complete(transcript.messages(), &schemas, &options)
                .await?;

            if !response.requests_calls() {
                tracing::debug!(round, "No capability calls requested");
                break;
            }

            let calls = response.calls.clone();
            tracing::debug!(round, call_count = calls.len(), "Executing capability calls");
            transcript.push(response);

            for call in &calls {
                let output = self.execute_call(&invoker, call).await;
                transcript.push(Message::tool(output));
            }

            if round == self.config.max_tool_rounds {
                tracing::warn!(
                    max_tool_rounds = self.config.max_tool_rounds,
                    "Tool round budget exhausted; forcing synthesis"
                );
            }
        }

        transcript.push(Message::assistant(SYNTHESIS_DIRECTIVE));

        let stream = self.gateway.stream(transcript.messages(), &options).await?;

        Ok(TurnStream {
            inner: stream,
            _permit: permit,
        })
    }

    /// Run one turn and collect the streamed answer into a single string
    pub async fn run_collected(&self, prompt: &str) -> Result<String> {
        let mut stream = self.run(prompt).await?;
        let mut answer = String::new();

        while let Some(delta) = stream.next().await {
            answer.push_str(&delta?.content);
        }

        Ok(answer)
    }

    /// Execute one capability call with its lifecycle bookkeeping:
    /// pending record + event, invocation, completed record + event.
    async fn execute_call(&self, invoker: &CapabilityInvoker, call: &CapabilityCall) -> String {
        let mut record = CallRecord::dispatched(&call.name, call.arguments.clone());
        self.records.lock().unwrap().push(record.clone());
        let _ = self.events.send(record.dispatch_event());

        let output = invoker.invoke(call).await;

        record.complete(&output);
        let _ = self.events.send(record.completion_event());
        {
            let mut records = self.records.lock().unwrap();
            if let Some(entry) = records.iter_mut().find(|r| r.id == record.id) {
                *entry = record;
            }
        }

        output
    }
}
