use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "scriptbox")]
#[clap(version, about = "Sandboxed script workspace and execution environment")]
#[clap(propagate_version = true)]
pub struct Cli {
    #[clap(flatten)]
    pub global_opts: GlobalOpts,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Configuration file path
    #[clap(short, long, global = true, env = "SCRIPTBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Workspace directory override
    #[clap(short, long, global = true, env = "SCRIPTBOX_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[clap(long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List workspace files
    List(ListArgs),

    /// Create a new workspace file
    Create(WriteArgs),

    /// Print a workspace file's content
    Read(NameArgs),

    /// Overwrite an existing workspace file
    Update(WriteArgs),

    /// Delete a workspace file
    Delete(NameArgs),

    /// Execute a workspace file under its language's execution policy
    Run(RunArgs),

    /// Dispatch a raw manage_file tool call (JSON input, strict filenames)
    Tool(ToolArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {}

#[derive(Args, Debug)]
pub struct NameArgs {
    /// Workspace file name
    pub name: String,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Workspace file name
    pub name: String,

    /// Content to store (read from stdin when omitted)
    pub content: Option<String>,

    /// Read the content from a host file instead
    #[clap(long, short = 'f', conflicts_with = "content")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Workspace file name
    pub name: String,

    /// Execution timeout override in seconds
    #[clap(long)]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ToolArgs {
    /// Tool input as JSON, e.g. '{"operation":"read","filename":"a.js"}'
    pub input: String,
}

#[derive(Debug, Clone, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
