use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cli::args::{ListArgs, NameArgs, OutputFormat, RunArgs, ToolArgs, WriteArgs};
use crate::config::loader::default_workspace_dir;
use crate::config::types::ScriptboxConfig;
use crate::error::Result;
use crate::exec::StrategyRegistry;
use crate::fileops::tool::handle_tool_call;
use crate::fileops::{FileOps, OpResponse};
use crate::workspace::{DirStore, FilenamePolicy};

/// Workspace directory resolution: CLI override, then config, then the
/// platform default.
pub struct CommandContext {
    pub config: ScriptboxConfig,
    pub workspace_override: Option<std::path::PathBuf>,
}

impl CommandContext {
    async fn file_ops(&self, timeout_override: Option<u64>) -> Result<FileOps> {
        let dir = self
            .workspace_override
            .clone()
            .or_else(|| self.config.workspace.dir.clone())
            .unwrap_or_else(default_workspace_dir);

        let store = DirStore::open(
            dir,
            FilenamePolicy::standard(),
            self.config.workspace.max_file_bytes,
        )
        .await?;

        let registry = StrategyRegistry::with_defaults(&self.config.sandbox);
        let timeout = timeout_override.unwrap_or(self.config.sandbox.timeout_seconds);

        Ok(FileOps::new(
            Arc::new(store),
            registry,
            Duration::from_secs(timeout),
        ))
    }
}

/// List workspace files
pub async fn list(_args: ListArgs, ctx: CommandContext, format: OutputFormat) -> Result<()> {
    let ops = ctx.file_ops(None).await?;
    finish(ops.list().await, format)
}

/// Create a new workspace file
pub async fn create(args: WriteArgs, ctx: CommandContext, format: OutputFormat) -> Result<()> {
    let content = resolve_content(&args)?;
    let ops = ctx.file_ops(None).await?;
    finish(ops.create(&args.name, &content).await, format)
}

/// Print a file's content
pub async fn read(args: NameArgs, ctx: CommandContext, format: OutputFormat) -> Result<()> {
    let ops = ctx.file_ops(None).await?;
    finish(ops.read(&args.name).await, format)
}

/// Overwrite an existing workspace file
pub async fn update(args: WriteArgs, ctx: CommandContext, format: OutputFormat) -> Result<()> {
    let content = resolve_content(&args)?;
    let ops = ctx.file_ops(None).await?;
    finish(ops.update(&args.name, &content).await, format)
}

/// Delete a workspace file
pub async fn delete(args: NameArgs, ctx: CommandContext, format: OutputFormat) -> Result<()> {
    let ops = ctx.file_ops(None).await?;
    finish(ops.delete(&args.name).await, format)
}

/// Execute a workspace file
pub async fn run(args: RunArgs, ctx: CommandContext, format: OutputFormat) -> Result<()> {
    info!(file = %args.name, "Executing workspace file");
    let ops = ctx.file_ops(args.timeout).await?;
    finish(ops.execute(&args.name).await, format)
}

/// Dispatch a raw tool call the way a model adapter would
pub async fn tool(args: ToolArgs, ctx: CommandContext, format: OutputFormat) -> Result<()> {
    let input: serde_json::Value = serde_json::from_str(&args.input)?;
    let ops = ctx.file_ops(None).await?;
    let result = handle_tool_call(&ops, &input).await;

    match format {
        OutputFormat::Text => {
            println!("{}", result.output);
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "output": result.output,
                    "is_error": result.is_error,
                })
            );
        }
    }
    if result.is_error {
        std::process::exit(1);
    }
    Ok(())
}

fn resolve_content(args: &WriteArgs) -> Result<String> {
    if let Some(content) = &args.content {
        return Ok(content.clone());
    }
    if let Some(path) = &args.file {
        return Ok(std::fs::read_to_string(path)?);
    }
    // No inline content and no file: read stdin
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// Print a façade response and exit non-zero on failure.
fn finish(response: OpResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if let Some(message) = &response.message {
                eprintln!("{message}");
            }
            if let Some(content) = &response.content {
                print!("{content}");
                if !content.ends_with('\n') {
                    println!();
                }
            }
            if let Some(output) = &response.output {
                if !output.is_empty() {
                    print!("{output}");
                    if !output.ends_with('\n') {
                        println!();
                    }
                }
            }
            if let Some(error) = &response.error {
                eprintln!("Error: {error}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&response)?);
        }
    }

    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}
