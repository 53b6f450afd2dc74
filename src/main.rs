use clap::Parser;

use scriptbox::cli::args::{Cli, Commands};
use scriptbox::cli::commands::{self, CommandContext};
use scriptbox::config::loader::load_config;
use scriptbox::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.global_opts.verbose);

    // Load configuration (file + CLI overrides)
    let config = load_config(cli.global_opts.config.as_deref())?;
    let format = cli.global_opts.format.clone();
    let ctx = CommandContext {
        config,
        workspace_override: cli.global_opts.workspace,
    };

    // Dispatch to subcommand handler
    match cli.command {
        Commands::List(args) => {
            commands::list(args, ctx, format).await?;
        }
        Commands::Create(args) => {
            commands::create(args, ctx, format).await?;
        }
        Commands::Read(args) => {
            commands::read(args, ctx, format).await?;
        }
        Commands::Update(args) => {
            commands::update(args, ctx, format).await?;
        }
        Commands::Delete(args) => {
            commands::delete(args, ctx, format).await?;
        }
        Commands::Run(args) => {
            commands::run(args, ctx, format).await?;
        }
        Commands::Tool(args) => {
            commands::tool(args, ctx, format).await?;
        }
    }

    Ok(())
}

fn init_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
