pub mod tool;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::ScriptboxError;
use crate::exec::StrategyRegistry;
use crate::workspace::{FilenamePolicy, WorkspaceStore};

/// The uniform response shape every operation produces, regardless of entry
/// point. Both the CLI and the model tool adapter consume `output`/`error`
/// directly, so this shape — and the message texts — are part of the
/// contract, not presentation detail.
#[derive(Debug, Clone, Serialize)]
pub struct OpResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OpResponse {
    fn ok() -> Self {
        Self {
            success: true,
            message: None,
            content: None,
            output: None,
            error: None,
        }
    }

    fn failure(err: &ScriptboxError) -> Self {
        Self {
            success: false,
            message: None,
            content: None,
            output: None,
            error: Some(err.user_message()),
        }
    }

    fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    fn output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// The file-ops façade: the single entry point for both the human-facing
/// file manager and model-issued tool calls.
///
/// Composes filename policy → workspace store → strategy registry with
/// direct calls. Execution reads the stored content once and runs the
/// dispatched strategy against that snapshot, so a concurrent write never
/// changes a run already in flight.
pub struct FileOps {
    store: Arc<dyn WorkspaceStore>,
    registry: StrategyRegistry,
    budget: Duration,
}

impl FileOps {
    pub fn new(store: Arc<dyn WorkspaceStore>, registry: StrategyRegistry, budget: Duration) -> Self {
        Self {
            store,
            registry,
            budget,
        }
    }

    pub async fn list(&self) -> OpResponse {
        match self.store.list().await {
            Ok(names) => {
                let count = names.len();
                OpResponse::ok()
                    .message(format!("{count} file(s) in workspace"))
                    .output(names.join("\n"))
            }
            Err(e) => OpResponse::failure(&e),
        }
    }

    pub async fn create(&self, name: &str, content: &str) -> OpResponse {
        match self.store.create(name, content).await {
            Ok(()) => {
                info!(file = %name, "File created");
                OpResponse::ok()
                    .message("File created")
                    .output(format!("File {name} created successfully."))
            }
            Err(e) => OpResponse::failure(&e),
        }
    }

    pub async fn read(&self, name: &str) -> OpResponse {
        match self.store.read(name).await {
            Ok(content) => OpResponse::ok()
                .content(content)
                .output(format!("File {name} content retrieved successfully.")),
            Err(e) => OpResponse::failure(&e),
        }
    }

    pub async fn update(&self, name: &str, content: &str) -> OpResponse {
        match self.store.update(name, content).await {
            Ok(()) => {
                info!(file = %name, "File updated");
                OpResponse::ok()
                    .message("File updated")
                    .output(format!("File {name} updated successfully."))
            }
            Err(e) => OpResponse::failure(&e),
        }
    }

    pub async fn delete(&self, name: &str) -> OpResponse {
        match self.store.delete(name).await {
            Ok(()) => {
                info!(file = %name, "File deleted");
                OpResponse::ok()
                    .message("File deleted")
                    .output(format!("File {name} deleted."))
            }
            Err(e) => OpResponse::failure(&e),
        }
    }

    pub async fn execute(&self, name: &str) -> OpResponse {
        // Snapshot first; the run is immune to concurrent writes
        let content = match self.store.read(name).await {
            Ok(content) => content,
            Err(e) => return OpResponse::failure(&e),
        };

        let extension = FilenamePolicy::extension(name).unwrap_or_default();
        let strategy = match self.registry.dispatch(extension) {
            Ok(strategy) => strategy,
            Err(e) => return OpResponse::failure(&e),
        };

        debug!(file = %name, strategy = %strategy.name(), "Executing workspace file");
        let result = strategy.run(&content, self.budget).await;

        if result.success {
            let message = strategy.disclaimer().unwrap_or("File executed");
            OpResponse::ok().message(message).output(result.output)
        } else {
            let err: ScriptboxError = result
                .error
                .unwrap_or(crate::exec::ExecutionError::Runtime {
                    message: "execution failed".to_string(),
                })
                .into();
            OpResponse::failure(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::SandboxConfig;
    use crate::workspace::MemStore;

    fn ops() -> FileOps {
        let store = Arc::new(MemStore::new(FilenamePolicy::standard(), 10 * 1024));
        let registry = StrategyRegistry::with_defaults(&SandboxConfig::default());
        FileOps::new(store, registry, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_text_file_lifecycle() {
        let ops = ops();

        let resp = ops.create("test.txt", "abc").await;
        assert!(resp.success, "{resp:?}");

        let resp = ops.read("test.txt").await;
        assert_eq!(resp.content.as_deref(), Some("abc"));

        let resp = ops.execute("test.txt").await;
        assert!(resp.success);
        assert!(resp.output.unwrap().contains("abc"));

        let resp = ops.delete("test.txt").await;
        assert!(resp.success);

        let resp = ops.read("test.txt").await;
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("File not found: test.txt"));
    }

    #[tokio::test]
    async fn test_traversal_rejected_without_mutation() {
        let ops = ops();
        let resp = ops.create("../../etc/passwd", "pwned").await;
        assert!(!resp.success);
        assert!(resp.error.unwrap().starts_with("Invalid filename:"));
        assert_eq!(ops.list().await.output.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_oversized_content_rejected() {
        let ops = ops();
        let resp = ops.create("big.txt", &"x".repeat(10 * 1024 + 1)).await;
        assert!(!resp.success);
        assert!(resp.error.unwrap().starts_with("Content too large:"));
        assert_eq!(ops.list().await.output.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let ops = ops();
        assert!(ops.create("a.txt", "1").await.success);
        let resp = ops.create("a.txt", "2").await;
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("File already exists: a.txt"));
    }

    #[tokio::test]
    async fn test_python_simulation_through_facade() {
        let ops = ops();
        ops.create("hello.py", r#"print("hello")"#).await;
        let resp = ops.execute("hello.py").await;
        assert!(resp.success);
        assert_eq!(resp.output.as_deref(), Some("hello\n"));
        assert!(resp.message.unwrap().contains("Simulated Python"));
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let ops = ops();
        ops.create("b.txt", "2").await;
        ops.create("a.py", "print(1)").await;
        let resp = ops.list().await;
        assert_eq!(resp.output.as_deref(), Some("a.py\nb.txt"));
        assert_eq!(resp.message.as_deref(), Some("2 file(s) in workspace"));
    }

    #[cfg(feature = "javascript")]
    #[tokio::test]
    async fn test_javascript_execution_through_facade() {
        let ops = ops();
        ops.create("hi.js", r#"console.log("hi")"#).await;
        let resp = ops.execute("hi.js").await;
        assert!(resp.success, "{resp:?}");
        assert_eq!(resp.output.as_deref(), Some("hi\n"));
        assert_eq!(resp.message.as_deref(), Some("File executed"));
    }

    #[tokio::test]
    async fn test_execute_missing_file_is_not_found() {
        let ops = ops();
        let resp = ops.execute("ghost.js").await;
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("File not found: ghost.js"));
    }

    #[tokio::test]
    async fn test_response_serialization_omits_empty_fields() {
        let resp = OpResponse::ok().message("File created");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "File created");
        assert!(json.get("content").is_none());
        assert!(json.get("error").is_none());
    }
}
