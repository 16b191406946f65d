use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use stampede_config::{ProcessEnv, CONFIG_PATH_VAR};
use stampede_logging::{init_tracing, LogTarget, LoggingOptions};
use stampede_traffic::{ClientConfig, ReqwestClient};

mod cli;
mod commands;

use cli::Cli;
use commands::{check_config, prepare_plan, resolver_for, run_smoke};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // stdout is reserved for the listing and command output
    init_tracing(&LoggingOptions::new(cli.log_level, LogTarget::Stderr))?;

    if !cli.has_mode() {
        print_usage();
        return Ok(ExitCode::SUCCESS);
    }

    let resolver = resolver_for(cli.config.as_deref());
    let mut stdout = std::io::stdout().lock();

    if cli.check_config {
        return check_config(&resolver, &ProcessEnv, &cli.overrides, &mut stdout);
    }

    let resolved = match resolver.resolve(&ProcessEnv, &cli.overrides) {
        Ok(resolved) => resolved,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    let plan = prepare_plan(resolved, &mut stdout)?;

    if let Some(tasks) = cli.smoke {
        let client = ReqwestClient::new(&ClientConfig::default())
            .context("building HTTP client for smoke run")?;
        let tally = run_smoke(&plan.user(), &client, tasks, &mut stdout).await?;
        if tally.failed > 0 {
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_usage() {
    println!("Usage:");
    println!("  stampede --headless [--users N] [--spawn-rate R] [--run-time T] [--host URL]");
    println!("  stampede --check-config [--config PATH]");
    println!("  stampede --smoke N [--config PATH]");
    println!();
    println!("Environment variables:");
    println!("  {}, USERS, SPAWN_RATE, RUN_TIME, HOST, REPORT_HTML", CONFIG_PATH_VAR);
}
