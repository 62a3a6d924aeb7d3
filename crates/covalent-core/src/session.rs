//! Session Collaborator
//!
//! The engine does not own model selection, the system directive, or the set
//! of active capabilities; the hosting application does (settings panes,
//! parameter sliders, tool toggles). This trait is the narrow contract the
//! engine reads from at the start of every turn.

use std::sync::Arc;

use crate::capability::CapabilityRegistry;
use crate::gateway::GenerationOptions;

/// Per-turn configuration supplied by the hosting application.
pub trait SessionConfig: Send + Sync {
    /// Capabilities active for the turn, in declaration order.
    ///
    /// The returned registry must stay read-only while the turn runs.
    fn active_capabilities(&self) -> Arc<CapabilityRegistry>;

    /// Model identifier for the turn
    fn model(&self) -> String;

    /// System directive seeding the transcript
    fn system_directive(&self) -> String;

    /// Sampling options riding on inference requests.
    ///
    /// Defaults to the bare model with no sampling overrides; hosts with
    /// parameter sliders override this.
    fn generation_options(&self) -> GenerationOptions {
        GenerationOptions::for_model(self.model())
    }
}

/// Fixed session configuration, for tests and single-profile hosts.
pub struct StaticSession {
    capabilities: Arc<CapabilityRegistry>,
    model: String,
    directive: String,
    options: Option<GenerationOptions>,
}

impl StaticSession {
    pub fn new(
        capabilities: Arc<CapabilityRegistry>,
        model: impl Into<String>,
        directive: impl Into<String>,
    ) -> Self {
        Self {
            capabilities,
            model: model.into(),
            directive: directive.into(),
            options: None,
        }
    }

    /// No capabilities, default-model session
    pub fn bare(directive: impl Into<String>) -> Self {
        Self::new(
            Arc::new(CapabilityRegistry::new()),
            GenerationOptions::default().model,
            directive,
        )
    }

    /// Override the sampling options
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = Some(options);
        self
    }
}

impl SessionConfig for StaticSession {
    fn active_capabilities(&self) -> Arc<CapabilityRegistry> {
        self.capabilities.clone()
    }

    fn model(&self) -> String {
        self.model.clone()
    }

    fn system_directive(&self) -> String {
        self.directive.clone()
    }

    fn generation_options(&self) -> GenerationOptions {
        self.options
            .clone()
            .unwrap_or_else(|| GenerationOptions::for_model(self.model()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_session() {
        let session = StaticSession::bare("You are helpful.");
        assert_eq!(session.system_directive(), "You are helpful.");
        assert!(session.active_capabilities().is_empty());
        assert_eq!(session.generation_options().model, session.model());
    }

    #[test]
    fn test_options_override() {
        let mut options = GenerationOptions::for_model("cogito:14b");
        options.temperature = Some(0.2);

        let session = StaticSession::bare("sys").with_options(options);
        assert_eq!(session.generation_options().temperature, Some(0.2));
    }
}
