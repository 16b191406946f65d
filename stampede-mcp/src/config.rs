//! MCP server configuration

use crate::error::{McpError, McpResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default wall-clock budget for one engine run
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(300);

/// Default engine invocation; run flags are appended after it
pub const DEFAULT_ENGINE_COMMAND: &str = "locust -f locustfile.py";

/// Program plus leading arguments used to start the load engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EngineCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl FromStr for EngineCommand {
    type Err = McpError;

    /// Whitespace separated; no shell quoting is interpreted
    fn from_str(s: &str) -> McpResult<Self> {
        let mut parts = s.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| McpError::config("engine command must not be empty"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl Default for EngineCommand {
    fn default() -> Self {
        Self::new("locust").arg("-f").arg("locustfile.py")
    }
}

/// MCP server configuration
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Where `create_basic_config` writes generated templates
    pub data_dir: PathBuf,

    /// Where engine HTML reports go, relative to `workdir` unless absolute
    pub results_dir: PathBuf,

    pub engine: EngineCommand,

    /// Working directory of the engine process
    pub workdir: PathBuf,

    pub run_timeout: Duration,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            results_dir: PathBuf::from("data").join("results"),
            engine: EngineCommand::default(),
            workdir: PathBuf::from("."),
            run_timeout: DEFAULT_RUN_TIMEOUT,
        }
    }
}

impl McpServerConfig {
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    pub fn with_engine(mut self, engine: EngineCommand) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = dir.into();
        self
    }

    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// Results directory as seen from this process
    pub fn results_dir_on_disk(&self) -> PathBuf {
        resolve_against(&self.workdir, &self.results_dir)
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> McpResult<()> {
        if self.run_timeout.is_zero() {
            return Err(McpError::config("run timeout must be greater than zero"));
        }
        if self.engine.program.trim().is_empty() {
            return Err(McpError::config("engine command must not be empty"));
        }
        Ok(())
    }
}

pub(crate) fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
