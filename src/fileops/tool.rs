//! Model-facing tool adapter for the file-ops façade.
//!
//! Exposes a single `manage_file` tool and turns a tool-use input value
//! into a façade call. The filename rules are stricter at this boundary
//! than for the human file manager.

use serde_json::{json, Value};
use tracing::info;

use crate::fileops::{FileOps, OpResponse};
use crate::workspace::FilenamePolicy;

/// A tool definition in the shape conversational providers expect.
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Result of one tool call, rendered as tool-result text.
pub struct ToolCallResult {
    pub output: String,
    pub is_error: bool,
}

/// The `manage_file` tool definition.
pub fn manage_file_definition() -> ToolDefinition {
    ToolDefinition {
        name: "manage_file".to_string(),
        description: "Create, read, update, delete, list and execute script files \
            in the workspace. When editing files, first use 'read' to get current \
            content, then 'update' to modify it. For new files, use 'create'. \
            Use 'execute' to run a file under its language's execution policy."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": ["create", "read", "update", "delete", "execute", "list"],
                    "description": "The operation to perform"
                },
                "filename": {
                    "type": "string",
                    "description": "Name of the file to work with. Must carry a supported \
                        extension; letters, digits, '-' and '_' only. Not required for list."
                },
                "content": {
                    "type": "string",
                    "description": "The file content when creating or updating. \
                        Not required for other operations."
                }
            },
            "required": ["operation"]
        }),
    }
}

/// Dispatch one tool-use input against the façade.
pub async fn handle_tool_call(ops: &FileOps, input: &Value) -> ToolCallResult {
    let operation = input["operation"].as_str().unwrap_or("");
    let filename = input["filename"].as_str().unwrap_or("");
    let content = input["content"].as_str().unwrap_or("");

    info!(operation = %operation, file = %filename, "Tool call");

    if !matches!(
        operation,
        "list" | "create" | "read" | "update" | "delete" | "execute"
    ) {
        return ToolCallResult {
            output: format!("Unknown operation: {operation}"),
            is_error: true,
        };
    }

    // The model-facing boundary applies the strict filename mode before the
    // façade sees the request
    if operation != "list" {
        if let Err(e) = FilenamePolicy::strict().validate(filename) {
            return ToolCallResult {
                output: format!("Error: {}", e.user_message()),
                is_error: true,
            };
        }
    }

    let response = match operation {
        "list" => ops.list().await,
        "create" => ops.create(filename, content).await,
        "read" => ops.read(filename).await,
        "update" => ops.update(filename, content).await,
        "delete" => ops.delete(filename).await,
        // Validated above; only "execute" remains
        _ => ops.execute(filename).await,
    };

    render_tool_result(&response, operation, filename)
}

fn render_tool_result(response: &OpResponse, operation: &str, filename: &str) -> ToolCallResult {
    if response.success {
        let text = response
            .output
            .clone()
            .or_else(|| response.content.clone())
            .or_else(|| response.message.clone())
            .unwrap_or_else(|| format!("Successfully {operation}d file {filename}"));
        ToolCallResult {
            output: text,
            is_error: false,
        }
    } else {
        let reason = response.error.as_deref().unwrap_or("unknown error");
        ToolCallResult {
            output: format!("Error: {reason}"),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::types::SandboxConfig;
    use crate::exec::StrategyRegistry;
    use crate::workspace::MemStore;

    fn ops() -> FileOps {
        let store = Arc::new(MemStore::new(FilenamePolicy::standard(), 10 * 1024));
        let registry = StrategyRegistry::with_defaults(&SandboxConfig::default());
        FileOps::new(store, registry, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_create_and_execute_round_trip() {
        let ops = ops();

        let result = handle_tool_call(
            &ops,
            &json!({"operation": "create", "filename": "hello.py", "content": "print(\"hi\")"}),
        )
        .await;
        assert!(!result.is_error);
        assert_eq!(result.output, "File hello.py created successfully.");

        let result =
            handle_tool_call(&ops, &json!({"operation": "execute", "filename": "hello.py"})).await;
        assert!(!result.is_error);
        assert_eq!(result.output, "hi\n");
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_names_the_ui_allows() {
        let ops = ops();
        let result = handle_tool_call(
            &ops,
            &json!({"operation": "create", "filename": "my notes.txt", "content": "x"}),
        )
        .await;
        assert!(result.is_error);
        assert!(result.output.starts_with("Error: Invalid filename:"));
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let ops = ops();
        let result =
            handle_tool_call(&ops, &json!({"operation": "rename", "filename": "a.txt"})).await;
        assert!(result.is_error);
        assert_eq!(result.output, "Unknown operation: rename");
    }

    #[tokio::test]
    async fn test_missing_content_reports_empty_content() {
        let ops = ops();
        let result = handle_tool_call(
            &ops,
            &json!({"operation": "create", "filename": "empty.js"}),
        )
        .await;
        assert!(result.is_error);
        assert_eq!(
            result.output,
            "Error: Content is required and may not be empty"
        );
    }

    #[tokio::test]
    async fn test_read_returns_content_as_tool_text() {
        let ops = ops();
        handle_tool_call(
            &ops,
            &json!({"operation": "create", "filename": "a.txt", "content": "abc"}),
        )
        .await;
        let result = handle_tool_call(&ops, &json!({"operation": "read", "filename": "a.txt"})).await;
        assert!(!result.is_error);
        assert_eq!(result.output, "File a.txt content retrieved successfully.");
    }

    #[tokio::test]
    async fn test_tool_definition_schema_shape() {
        let def = manage_file_definition();
        assert_eq!(def.name, "manage_file");
        let enum_values = def.input_schema["properties"]["operation"]["enum"]
            .as_array()
            .unwrap()
            .len();
        assert_eq!(enum_values, 6);
    }
}
