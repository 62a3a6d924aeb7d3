//! Error Types for the Toolkit

use covalent_core::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolkitError>;

#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("Access denied: {0} is outside the workbench directory")]
    AccessDenied(String),

    #[error("Workbench unavailable: {0}")]
    Workbench(String),

    #[error("Failed to list directory: {0}")]
    List(std::io::Error),

    #[error("Failed to read file: {0}")]
    Read(std::io::Error),

    #[error("Failed to write file: {0}")]
    Write(std::io::Error),

    #[error("Failed to create directory: {0}")]
    CreateDir(std::io::Error),
}

/// Toolkit failures surface to the model as capability execution errors
impl From<ToolkitError> for EngineError {
    fn from(e: ToolkitError) -> Self {
        EngineError::CapabilityExecution(e.to_string())
    }
}
