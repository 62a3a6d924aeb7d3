//! Capability Lifecycle Events
//!
//! The engine announces every capability invocation twice: once when it is
//! dispatched and once when it completes. Events travel over an explicit
//! channel rather than a callback, and each carries the call id so observers
//! can pair dispatch/completion even when the same capability runs twice in
//! one round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress notification for one capability invocation
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum CapabilityLifecycleEvent {
    /// Invocation started; a matching `Completed` always follows
    Dispatched {
        call_id: Uuid,
        capability: String,
        arguments: serde_json::Value,
        at: DateTime<Utc>,
    },

    /// Invocation finished (successfully or folded into an error payload)
    Completed {
        call_id: Uuid,
        capability: String,
        output: String,
        at: DateTime<Utc>,
    },
}

impl CapabilityLifecycleEvent {
    /// The capability name this event describes
    pub fn capability(&self) -> &str {
        match self {
            CapabilityLifecycleEvent::Dispatched { capability, .. }
            | CapabilityLifecycleEvent::Completed { capability, .. } => capability,
        }
    }

    /// The call this event belongs to
    pub fn call_id(&self) -> Uuid {
        match self {
            CapabilityLifecycleEvent::Dispatched { call_id, .. }
            | CapabilityLifecycleEvent::Completed { call_id, .. } => *call_id,
        }
    }

    /// Pending flag: true for dispatch, false for completion
    pub fn is_pending(&self) -> bool {
        matches!(self, CapabilityLifecycleEvent::Dispatched { .. })
    }
}

/// One entry in the per-session call log.
///
/// Created with `pending = true` when the call is dispatched, flipped to
/// `pending = false` with the result on completion. The log is append-only;
/// entries are never removed within a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallRecord {
    /// Unique call id
    pub id: Uuid,

    /// Capability name as requested
    pub capability: String,

    /// Whether the call is still running
    pub pending: bool,

    /// Dispatch timestamp
    pub started_at: DateTime<Utc>,

    /// Raw argument payload, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,

    /// Normalized text result, present once completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl CallRecord {
    /// Open a pending record for a dispatched call
    pub fn dispatched(capability: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            capability: capability.into(),
            pending: true,
            started_at: Utc::now(),
            arguments: if arguments.is_null() {
                None
            } else {
                Some(arguments)
            },
            result: None,
        }
    }

    /// Close the record with its result
    pub fn complete(&mut self, result: impl Into<String>) {
        self.pending = false;
        self.result = Some(result.into());
    }

    /// Dispatch event for this record
    pub fn dispatch_event(&self) -> CapabilityLifecycleEvent {
        CapabilityLifecycleEvent::Dispatched {
            call_id: self.id,
            capability: self.capability.clone(),
            arguments: self.arguments.clone().unwrap_or(serde_json::Value::Null),
            at: self.started_at,
        }
    }

    /// Completion event for this record; call after [`CallRecord::complete`]
    pub fn completion_event(&self) -> CapabilityLifecycleEvent {
        CapabilityLifecycleEvent::Completed {
            call_id: self.id,
            capability: self.capability.clone(),
            output: self.result.clone().unwrap_or_default(),
            at: Utc::now(),
        }
    }
}
