//! List Directory Capability

use std::sync::Arc;

use async_trait::async_trait;
use covalent_core::{Capability, CapabilityPayload, CapabilitySchema, Result as CoreResult};

use crate::error::ToolkitError;
use crate::workbench::Workbench;

/// Lists the files available in the workbench directory
pub struct ListDirectoryCapability {
    workbench: Arc<Workbench>,
}

impl ListDirectoryCapability {
    pub fn new(workbench: Arc<Workbench>) -> Self {
        Self { workbench }
    }
}

#[async_trait]
impl Capability for ListDirectoryCapability {
    fn schema(&self) -> CapabilitySchema {
        CapabilitySchema {
            name: "list_directory".into(),
            description: "Lists all files available in the workbench directory. \
                Returns each file's name and absolute path."
                .into(),
            parameters: vec![],
        }
    }

    async fn invoke(
        &self,
        _args: &serde_json::Map<String, serde_json::Value>,
    ) -> CoreResult<CapabilityPayload> {
        let mut entries = tokio::fs::read_dir(self.workbench.root())
            .await
            .map_err(ToolkitError::List)?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(ToolkitError::List)? {
            let name = entry.file_name().to_string_lossy().to_string();
            let path = entry.path().to_string_lossy().to_string();
            files.push(format!("{name}: {path}"));
        }

        // read_dir order is platform-dependent
        files.sort();

        tracing::debug!(count = files.len(), "Listed workbench");
        Ok(files.join(", ").into())
    }
}
