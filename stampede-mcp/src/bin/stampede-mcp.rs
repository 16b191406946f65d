use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use stampede_logging::{init_tracing, LogLevel, LogTarget, LoggingOptions};
use stampede_mcp::config::{DEFAULT_ENGINE_COMMAND, DEFAULT_RUN_TIMEOUT};
use stampede_mcp::{EngineCommand, LoadTestToolRegistry, McpServer, McpServerConfig, ToolRegistry};

#[derive(Parser)]
#[command(name = "stampede-mcp")]
#[command(about = "Stampede Model Context Protocol (MCP) tool server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error); logs go to stderr
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server on stdin/stdout
    Serve {
        /// Directory for generated configuration files
        #[arg(long, value_name = "DIR", default_value = "data")]
        data_dir: PathBuf,

        /// Directory for HTML reports, relative to the engine working directory
        #[arg(long, value_name = "DIR", default_value = "data/results")]
        results_dir: PathBuf,

        /// Load engine command; run flags are appended
        #[arg(long, value_name = "COMMAND", default_value = DEFAULT_ENGINE_COMMAND)]
        engine: EngineCommand,

        /// Working directory for the load engine
        #[arg(long, value_name = "DIR", default_value = ".")]
        workdir: PathBuf,

        /// Seconds before a load test is killed
        #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_RUN_TIMEOUT.as_secs())]
        timeout_secs: u64,
    },

    /// List available tools
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries protocol frames
    init_tracing(&LoggingOptions::new(cli.log_level, LogTarget::Stderr))?;

    match cli.command {
        Commands::Serve {
            data_dir,
            results_dir,
            engine,
            workdir,
            timeout_secs,
        } => {
            let config = McpServerConfig::default()
                .with_data_dir(data_dir)
                .with_results_dir(results_dir)
                .with_engine(engine)
                .with_workdir(workdir)
                .with_run_timeout(Duration::from_secs(timeout_secs));
            serve_command(config).await
        }
        Commands::Tools => tools_command().await,
    }
}

async fn serve_command(config: McpServerConfig) -> Result<()> {
    config.validate()?;

    let results_dir = config.results_dir_on_disk();
    tokio::fs::create_dir_all(&results_dir)
        .await
        .with_context(|| format!("creating results directory {}", results_dir.display()))?;

    tracing::info!(
        "Engine `{}` in {}, timeout {}s",
        config.engine,
        config.workdir.display(),
        config.run_timeout.as_secs()
    );

    let registry = LoadTestToolRegistry::new(&config);
    let server = McpServer::new(Arc::new(registry));
    server.run_stdio().await?;
    Ok(())
}

async fn tools_command() -> Result<()> {
    let registry = LoadTestToolRegistry::new(&McpServerConfig::default());
    let tools = registry.list_tools().await?;

    println!("Available MCP tools:");
    for tool in tools {
        println!("  {:<22} {}", tool.name, tool.description);
    }
    Ok(())
}
