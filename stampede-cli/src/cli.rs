//! CLI argument parsing definitions

use clap::Parser;
use stampede_config::CliOverrides;
use stampede_logging::LogLevel;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stampede", author, version, about, long_about = None)]
pub struct Cli {
    /// Template file; overrides CONFIG_PATH and the default candidates
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Resolve and print the configuration, then exit without running
    #[arg(long)]
    pub check_config: bool,

    /// Resolve the configuration and prepare the traffic plan without a UI
    #[arg(long)]
    pub headless: bool,

    /// Send N requests from one simulated user against the resolved host
    #[arg(long, value_name = "N")]
    pub smoke: Option<u64>,

    #[command(flatten)]
    pub overrides: CliOverrides,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    pub log_level: LogLevel,
}

impl Cli {
    /// Whether a run mode was requested; otherwise usage is printed
    pub fn has_mode(&self) -> bool {
        self.check_config || self.headless || self.smoke.is_some()
    }
}
