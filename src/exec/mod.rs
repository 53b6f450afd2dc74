mod registry;
pub mod strategies;
mod traits;

pub use registry::StrategyRegistry;
pub use traits::ExecutionStrategy;

use thiserror::Error;

use crate::error::ScriptboxError;

/// Outcome of running a workspace file through an execution strategy.
///
/// Strategies never fail at the transport level: every fault is folded into
/// this shape. Faults raised *by* the executed script land in `output` as
/// tagged transcript lines; only sandbox-infrastructure failures set
/// `success: false`.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub success: bool,
    /// Captured transcript. Line-buffered; error and warning channels are
    /// tagged with `ERROR:` / `WARNING:` prefixes.
    pub output: String,
    /// Present exactly when `success` is false.
    pub error: Option<ExecutionError>,
}

impl ExecutionResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failed(error: ExecutionError) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error),
        }
    }
}

/// Infrastructure-level execution failures. Script-level faults are not
/// errors; they are transcript content.
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    #[error("Execution timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("{message}")]
    Runtime { message: String },
}

impl From<ExecutionError> for ScriptboxError {
    fn from(e: ExecutionError) -> Self {
        match e {
            ExecutionError::Timeout { seconds } => ScriptboxError::Timeout { seconds },
            ExecutionError::Runtime { message } => ScriptboxError::Runtime { message },
        }
    }
}
