//! Write File Capability

use std::sync::Arc;

use async_trait::async_trait;
use covalent_core::{
    Capability, CapabilityPayload, CapabilitySchema, ParameterSpec, Result as CoreResult,
};

use super::require_str;
use crate::error::ToolkitError;
use crate::workbench::Workbench;

/// Writes or overwrites a file in the workbench directory
pub struct WriteFileCapability {
    workbench: Arc<Workbench>,
}

impl WriteFileCapability {
    pub fn new(workbench: Arc<Workbench>) -> Self {
        Self { workbench }
    }
}

#[async_trait]
impl Capability for WriteFileCapability {
    fn schema(&self) -> CapabilitySchema {
        CapabilitySchema {
            name: "write_file".into(),
            description: "Writes or overwrites a file in the workbench directory. \
                For security reasons, only files inside the workbench can be modified. \
                Missing parent directories are created. \
                Returns a confirmation message on success."
                .into(),
            parameters: vec![
                ParameterSpec::string(
                    "path",
                    "Path to the file to write (use list_directory first)",
                ),
                ParameterSpec::string(
                    "content",
                    "The content to write. Replaces any existing content entirely.",
                ),
            ],
        }
    }

    async fn invoke(
        &self,
        args: &serde_json::Map<String, serde_json::Value>,
    ) -> CoreResult<CapabilityPayload> {
        let path = require_str(args, "path")?;
        let content = require_str(args, "content")?;
        let resolved = self.workbench.resolve(path)?;

        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ToolkitError::CreateDir)?;
        }

        tokio::fs::write(&resolved, content)
            .await
            .map_err(ToolkitError::Write)?;

        tracing::debug!(path = %resolved.display(), bytes = content.len(), "Wrote file");
        Ok(format!("Successfully wrote to file: {path}").into())
    }
}
