use std::time::Duration;

use async_trait::async_trait;

use crate::exec::ExecutionResult;

/// Trait for per-language execution strategies.
///
/// This trait abstracts how a file type is "run", allowing the real sandbox,
/// the pattern simulators and the preview passthrough to be used
/// interchangeably behind the registry.
#[async_trait]
pub trait ExecutionStrategy: Send + Sync {
    /// Strategy name (e.g., "javascript", "python-sim")
    fn name(&self) -> &str;

    /// Caveat shown alongside results for strategies that do not really
    /// execute code. `None` means genuine execution.
    fn disclaimer(&self) -> Option<&str> {
        None
    }

    /// Run `content` under this strategy within the wall-clock `budget`.
    ///
    /// The content is a snapshot taken by the caller; a concurrent update to
    /// the source file must not affect a run already in flight.
    async fn run(&self, content: &str, budget: Duration) -> ExecutionResult;
}
