//! Capability Kit
//!
//! Built-in capabilities implementing `covalent_core::Capability`: sandboxed
//! file access plus a simulated weather lookup.

use std::sync::Arc;

use covalent_core::{CapabilityRegistry, EngineError};

use crate::workbench::Workbench;

mod list_directory;
mod read_file;
mod weather;
mod write_file;

pub use list_directory::ListDirectoryCapability;
pub use read_file::ReadFileCapability;
pub use weather::GetWeatherCapability;
pub use write_file::WriteFileCapability;

/// Build a registry with the full built-in kit, in its advertised order
pub fn standard_kit(workbench: Workbench) -> covalent_core::Result<CapabilityRegistry> {
    let workbench = Arc::new(workbench);
    let mut registry = CapabilityRegistry::new();

    registry.register(ReadFileCapability::new(workbench.clone()))?;
    registry.register(WriteFileCapability::new(workbench.clone()))?;
    registry.register(ListDirectoryCapability::new(workbench))?;
    registry.register(GetWeatherCapability::new())?;

    Ok(registry)
}

/// Fetch a required string argument, for capabilities whose parameters are
/// all strings.
pub(crate) fn require_str<'a>(
    args: &'a serde_json::Map<String, serde_json::Value>,
    name: &str,
) -> covalent_core::Result<&'a str> {
    args.get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| EngineError::ArgumentDecode(format!("Parameter \"{name}\" must be a string")))
}
