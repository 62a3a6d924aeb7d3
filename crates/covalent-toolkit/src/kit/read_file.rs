//! Read File Capability

use std::sync::Arc;

use async_trait::async_trait;
use covalent_core::{
    Capability, CapabilityPayload, CapabilitySchema, ParameterSpec, Result as CoreResult,
};

use super::require_str;
use crate::error::ToolkitError;
use crate::workbench::Workbench;

/// Reads a file from the workbench directory
pub struct ReadFileCapability {
    workbench: Arc<Workbench>,
}

impl ReadFileCapability {
    pub fn new(workbench: Arc<Workbench>) -> Self {
        Self { workbench }
    }
}

#[async_trait]
impl Capability for ReadFileCapability {
    fn schema(&self) -> CapabilitySchema {
        CapabilitySchema {
            name: "read_file".into(),
            description: "Reads the contents of a file from the workbench directory. \
                For security reasons, only files inside the workbench can be accessed. \
                Use list_directory first to discover file paths. \
                Returns the file contents as a UTF-8 string."
                .into(),
            parameters: vec![ParameterSpec::string(
                "path",
                "Path to the file to read (use list_directory first)",
            )],
        }
    }

    async fn invoke(
        &self,
        args: &serde_json::Map<String, serde_json::Value>,
    ) -> CoreResult<CapabilityPayload> {
        let path = require_str(args, "path")?;
        let resolved = self.workbench.resolve(path)?;

        let content = tokio::fs::read_to_string(&resolved)
            .await
            .map_err(ToolkitError::Read)?;

        tracing::debug!(path = %resolved.display(), bytes = content.len(), "Read file");
        Ok(content.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covalent_core::EngineError;
    use tempfile::TempDir;

    fn args_for(path: &str) -> serde_json::Map<String, serde_json::Value> {
        let mut args = serde_json::Map::new();
        args.insert("path".into(), serde_json::Value::String(path.into()));
        args
    }

    #[tokio::test]
    async fn test_reads_file_inside_workbench() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "remember the milk").unwrap();
        let capability = ReadFileCapability::new(Arc::new(Workbench::new(dir.path())));

        let payload = capability.invoke(&args_for("notes.txt")).await.unwrap();
        assert_eq!(payload.into_text(), "remember the milk");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let capability = ReadFileCapability::new(Arc::new(Workbench::new(dir.path())));

        let err = capability.invoke(&args_for("ghost.txt")).await.err().unwrap();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[tokio::test]
    async fn test_path_outside_workbench_is_denied() {
        let dir = TempDir::new().unwrap();
        let capability = ReadFileCapability::new(Arc::new(Workbench::new(dir.path())));

        let err = capability
            .invoke(&args_for("../../etc/hostname"))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("Access denied"));
    }

    #[tokio::test]
    async fn test_non_string_path_is_rejected() {
        let dir = TempDir::new().unwrap();
        let capability = ReadFileCapability::new(Arc::new(Workbench::new(dir.path())));

        let mut args = serde_json::Map::new();
        args.insert("path".into(), serde_json::Value::from(42));

        let err = capability.invoke(&args).await.err().unwrap();
        assert!(matches!(err, EngineError::ArgumentDecode(_)));
    }
}
