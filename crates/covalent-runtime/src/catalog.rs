//! Known Model Catalog
//!
//! Model tags verified to handle capability calling well on a local Ollama
//! install, with display labels for UI surfaces. The live list always comes
//! from the service; this catalog is for defaults and labelling.

/// A model tag with a human-readable label
#[derive(Clone, Copy, Debug)]
pub struct KnownModel {
    /// Ollama model tag
    pub tag: &'static str,

    /// Display label
    pub label: &'static str,
}

/// Models known to work with the capability-calling loop
pub const KNOWN_MODELS: &[KnownModel] = &[
    KnownModel { tag: "qwen3:0.6b", label: "Qwen 3 0.6B" },
    KnownModel { tag: "qwen3:1.7b", label: "Qwen 3 1.7B" },
    KnownModel { tag: "qwen3:4b", label: "Qwen 3 4B" },
    KnownModel { tag: "qwen3:8b", label: "Qwen 3 8B" },
    KnownModel { tag: "qwen3:14b", label: "Qwen 3 14B" },
    KnownModel { tag: "qwen3:30b", label: "Qwen 3 30B (A3B)" },
    KnownModel { tag: "cogito:3b", label: "Cogito 3B" },
    KnownModel { tag: "cogito:14b", label: "Cogito 14B" },
    KnownModel { tag: "llama3-groq-tool-use:latest", label: "Llama 3 8B Groq Tool Use" },
];

/// Default model tag when nothing is configured
pub const DEFAULT_MODEL: &str = "qwen3:14b";

/// Default model, honoring the `COVALENT_MODEL` override
pub fn default_model() -> String {
    std::env::var("COVALENT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into())
}

/// Whether a tag appears in the known catalog
pub fn is_known(tag: &str) -> bool {
    KNOWN_MODELS.iter().any(|m| m.tag == tag)
}

/// Label for a tag, falling back to the tag itself
pub fn label_for(tag: &str) -> &str {
    KNOWN_MODELS
        .iter()
        .find(|m| m.tag == tag)
        .map_or(tag, |m| m.label)
}
