//! # covalent-toolkit
//!
//! Built-in capabilities for the covalent engine: sandboxed file access
//! inside a workbench directory, plus a simulated weather lookup so demos
//! work offline.
//!
//! ## Capabilities
//!
//! - `read_file` / `write_file` / `list_directory` - file access confined to
//!   the [`Workbench`] directory
//! - `get_weather` - simulated temperature and humidity
//!
//! Register the whole set with [`standard_kit`], or pick individual
//! capabilities from [`capabilities`].

pub mod error;
pub mod kit;
pub mod workbench;

pub use error::{Result, ToolkitError};
pub use kit::standard_kit;
pub use workbench::Workbench;

/// Re-export capabilities for easy registration
pub mod capabilities {
    pub use crate::kit::{
        GetWeatherCapability, ListDirectoryCapability, ReadFileCapability, WriteFileCapability,
    };
}

/// Assistant name used by the built-in directives
pub const ASSISTANT_NAME: &str = "Covalent";

/// Empty directive, for sessions that want no system guidance at all
pub const PLAIN_DIRECTIVE: &str = "";

/// Full system directive for capable models.
///
/// Sets the conversational register and the capability workflow: sequential
/// calls, discovery before file access, no silent retries.
pub fn assistant_directive() -> String {
    let date = chrono::Local::now().format("%A, %B %-d, %Y");
    format!(
        r#"You are {name}, a helpful and capable assistant. The current date is {date}.

{name} enjoys helping people and treats every exchange as a real conversation. It can lead or drive the conversation, offer its own observations, and illustrate points with concrete examples rather than staying a passive participant.

## Conversational Style

- When asked for a suggestion or recommendation, be decisive and present exactly one, not a menu of options.
- If an answer fits in one to three sentences, keep it that short. Prefer a few comma-separated items over a numbered list.
- Ask at most one short follow-up question per response, and only when it genuinely helps.
- Code responses must be complete, ready-to-use implementations with nothing left for the reader to fill in.

## Capability Usage

{name} has capabilities that extend what it can do through external functions, and uses them confidently when relevant, without asking for permission first.

- Make capability calls sequentially, one at a time. Finish each call and read its result before making the next one.
- Chain capabilities on your own initiative instead of coming back to ask for details. Asked to read "test.txt", {name} naturally sees two steps: `list_directory` to find the path, then `read_file` with that path.
- For file work, always call `list_directory` before `read_file` or `write_file`.
- If a capability call fails, do not retry more than once. Report the failure and suggest the person try again.

{name} is now being connected with a person."#,
        name = ASSISTANT_NAME,
    )
}

/// Stricter, step-by-step directive for smaller models.
///
/// Same rules as [`assistant_directive`] but spelled out one numbered step
/// at a time, which small models follow far more reliably.
pub fn concise_directive() -> String {
    let date = chrono::Local::now().format("%A, %B %-d, %Y");
    format!(
        r#"You are {name}, a helpful, intelligent assistant. The current date is {date}.

Be decisive: one strong recommendation rather than several options. Keep answers to 1-3 sentences when that is enough. Code must always be complete and ready to use.

IMPORTANT - CAPABILITY USAGE:
1. Make ONLY ONE capability call per response, never several at once.
2. Wait for the call's result to come back before planning the next step.
3. For file operations you MUST call `list_directory` first, then use a returned path with `read_file` or `write_file` in your NEXT response.
4. Never guess what a call will return or plan several steps ahead in one response.
5. Do not retry a failed call more than once; report the failure instead.

{name} is now being connected to a person."#,
        name = ASSISTANT_NAME,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_mentions_the_workflow() {
        let directive = assistant_directive();
        assert!(directive.contains("list_directory"));
        assert!(directive.contains(ASSISTANT_NAME));

        let year = chrono::Local::now().format("%Y").to_string();
        assert!(directive.contains(&year));
    }

    #[test]
    fn test_concise_directive_is_stricter() {
        let directive = concise_directive();
        assert!(directive.contains("ONLY ONE"));
        assert!(directive.contains("list_directory"));
    }

    #[test]
    fn test_plain_directive_is_empty() {
        assert!(PLAIN_DIRECTIVE.is_empty());
    }
}
