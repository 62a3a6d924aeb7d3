//! Workbench Sandbox
//!
//! Every file capability operates inside a single authorized directory, the
//! workbench. Requested paths are resolved and containment-checked here
//! before any filesystem access happens.

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, ToolkitError};

/// Environment variable overriding the workbench location
pub const WORKBENCH_DIR_ENV: &str = "COVALENT_WORKBENCH_DIR";

/// Default workbench directory, relative to the working directory
pub const DEFAULT_WORKBENCH_DIR: &str = "workbench";

/// The authorized directory for file capabilities
#[derive(Clone, Debug)]
pub struct Workbench {
    root: PathBuf,
}

impl Workbench {
    /// Create a workbench rooted at `root`, absolutized against the current
    /// working directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        Self { root }
    }

    /// Workbench from `COVALENT_WORKBENCH_DIR`, falling back to `./workbench`
    pub fn from_env() -> Self {
        let root =
            std::env::var(WORKBENCH_DIR_ENV).unwrap_or_else(|_| DEFAULT_WORKBENCH_DIR.into());
        Self::new(root)
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist yet
    pub async fn ensure_exists(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            ToolkitError::Workbench(format!("cannot create {}: {e}", self.root.display()))
        })
    }

    /// Resolve a requested path to an absolute path inside the workbench.
    ///
    /// Relative paths are joined onto the root. Existing targets are
    /// symlink-resolved before the containment check; a target that does not
    /// exist yet cannot be canonicalized, so `..` components are rejected
    /// outright instead.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf> {
        let root = self.root.canonicalize().map_err(|e| {
            ToolkitError::Workbench(format!("cannot resolve {}: {e}", self.root.display()))
        })?;

        let candidate = Path::new(requested);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            root.join(candidate)
        };

        if joined
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(ToolkitError::AccessDenied(requested.into()));
        }

        let resolved = joined.canonicalize().unwrap_or(joined);
        if !resolved.starts_with(&root) {
            return Err(ToolkitError::AccessDenied(requested.into()));
        }

        Ok(resolved)
    }
}
