//! Load engine subprocess execution

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::results::TestRecord;
use crate::config::{resolve_against, EngineCommand, McpServerConfig};
use crate::error::{McpError, McpResult, SubprocessFailure};
use stampede_config::CONFIG_PATH_VAR;

/// Characters of engine stderr kept in the tool response
pub const STDERR_TAIL_CHARS: usize = 300;

/// One `run_load_test` invocation, with flag values already rendered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunRequest {
    pub config_path: String,
    pub users: Option<String>,
    pub spawn_rate: Option<String>,
    pub run_time: Option<String>,
    pub host: Option<String>,
}

impl RunRequest {
    pub fn new(config_path: impl Into<String>) -> Self {
        Self {
            config_path: config_path.into(),
            ..Default::default()
        }
    }
}

/// Starts the engine headless and waits for it under a timeout
#[derive(Debug, Clone)]
pub struct EngineRunner {
    engine: EngineCommand,
    workdir: PathBuf,
    results_dir: PathBuf,
    timeout: Duration,
}

impl EngineRunner {
    pub fn new(config: &McpServerConfig) -> Self {
        Self {
            engine: config.engine.clone(),
            workdir: config.workdir.clone(),
            results_dir: config.results_dir.clone(),
            timeout: config.run_timeout,
        }
    }

    /// Report path handed to the engine, relative to its working directory
    pub fn report_path(&self, test_id: &str) -> PathBuf {
        self.results_dir.join(format!("test_{}.html", test_id))
    }

    /// Engine arguments following the configured command
    pub fn run_args(&self, request: &RunRequest, report_path: &Path) -> Vec<String> {
        let mut args = self.engine.args.clone();
        args.push("--headless".to_string());
        args.push("--html".to_string());
        args.push(report_path.display().to_string());

        let overrides = [
            ("--users", &request.users),
            ("--spawn-rate", &request.spawn_rate),
            ("--run-time", &request.run_time),
            ("--host", &request.host),
        ];
        for (flag, value) in overrides {
            if let Some(value) = value {
                args.push(flag.to_string());
                args.push(value.clone());
            }
        }
        args
    }

    /// Run the engine once and capture its output.
    ///
    /// A non-zero exit is still a completed run; only failing to start the
    /// process or exceeding the timeout is an error. On timeout the child is
    /// killed.
    pub async fn run(&self, request: &RunRequest) -> McpResult<TestRecord> {
        let test_id = new_test_id();
        let report_path = self.report_path(&test_id);
        let args = self.run_args(request, &report_path);
        let command_line = std::iter::once(self.engine.program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");

        tokio::fs::create_dir_all(resolve_against(&self.workdir, &self.results_dir)).await?;

        info!("Starting load test {} with config {}", test_id, request.config_path);
        debug!("Engine command: {}", command_line);

        let mut command = Command::new(&self.engine.program);
        command
            .args(&args)
            .current_dir(&self.workdir)
            .env(CONFIG_PATH_VAR, &request.config_path)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(|source| SubprocessFailure {
                command: command_line.clone(),
                source,
            })?,
            Err(_) => {
                warn!(
                    "Load test {} exceeded {}s and was killed",
                    test_id,
                    self.timeout.as_secs()
                );
                return Err(McpError::Timeout {
                    timeout: self.timeout,
                });
            }
        };

        let report_written = resolve_against(&self.workdir, &report_path).exists();
        let record = TestRecord {
            id: test_id,
            config_path: request.config_path.clone(),
            command: command_line,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            return_code: output.status.code(),
            report_path: report_path.display().to_string(),
            report_written,
        };

        info!(
            "Load test {} finished with exit code {:?}",
            record.id, record.return_code
        );
        Ok(record)
    }
}

/// First 8 hex digits of a v4 UUID
fn new_test_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// The engine's aggregated statistics line, if it printed one
pub fn summary_line(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .find(|line| line.contains("Aggregated") && line.contains("req/s"))
        .map(str::trim)
}

/// Last `max` characters of `text`
pub fn tail_chars(text: &str, max: usize) -> &str {
    if max == 0 {
        return "";
    }
    match text.char_indices().rev().nth(max - 1) {
        Some((start, _)) => &text[start..],
        None => text,
    }
}
