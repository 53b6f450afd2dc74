use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptboxConfig {
    pub workspace: WorkspaceConfig,
    pub sandbox: SandboxConfig,
}

/// Configuration for the workspace file store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Workspace directory (defaults to the platform data directory)
    pub dir: Option<PathBuf>,
    /// Maximum stored file size in bytes
    pub max_file_bytes: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            dir: None,
            max_file_bytes: 10 * 1024,
        }
    }
}

/// Configuration for the JavaScript sandbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Wall-clock budget per execution in seconds
    pub timeout_seconds: u64,
    /// V8 heap limit in MB
    pub max_heap_mb: usize,
    /// Cap on the captured transcript size in bytes
    pub max_output_bytes: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 5,
            max_heap_mb: 64,
            max_output_bytes: 64 * 1024,
        }
    }
}
