use std::time::Duration;

use async_trait::async_trait;

use crate::exec::traits::ExecutionStrategy;
use crate::exec::ExecutionResult;

/// Passthrough for storable-but-not-executable types (plain text, markup,
/// styles): the "output" is the stored content itself, untouched.
pub struct PreviewStrategy;

impl PreviewStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PreviewStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionStrategy for PreviewStrategy {
    fn name(&self) -> &str {
        "preview"
    }

    fn disclaimer(&self) -> Option<&str> {
        Some("Preview only; this file type is not executed")
    }

    async fn run(&self, content: &str, _budget: Duration) -> ExecutionResult {
        ExecutionResult::ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_content_is_returned_verbatim() {
        let result = PreviewStrategy::new()
            .run("abc", Duration::from_secs(5))
            .await;
        assert!(result.success);
        assert_eq!(result.output, "abc");
    }
}
