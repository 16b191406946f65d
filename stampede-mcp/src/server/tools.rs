//! Tool registry and the load-testing tools

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::results::{ResultStore, TestRecord};
use super::runner::{summary_line, tail_chars, EngineRunner, RunRequest, STDERR_TAIL_CHARS};
use crate::config::McpServerConfig;
use crate::error::{McpError, McpResult, ToolArgumentError};
use crate::protocol::{Tool, ToolsCallResult};
use stampede_config::{load_template, missing_required_keys, CliOverrides, ConfigResolver};

/// MCP tool definition with its registry category
#[derive(Debug, Clone)]
pub struct McpTool {
    pub tool: Tool,

    /// Tool category for organization
    pub category: String,
}

impl McpTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        category: impl Into<String>,
    ) -> Self {
        Self {
            tool: Tool {
                name: name.into(),
                description: description.into(),
                input_schema,
            },
            category: category.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.tool.name
    }
}

/// Tool execution context
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    pub arguments: Option<Value>,

    /// Request correlation ID
    pub request_id: Option<String>,
}

/// Tool registry trait for managing available tools
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    /// List all available tools, in registration order
    async fn list_tools(&self) -> McpResult<Vec<Tool>>;

    async fn get_tool(&self, name: &str) -> Option<McpTool>;

    /// Execute a tool.
    ///
    /// Failures inside a known tool come back as an `is_error` result; an
    /// unknown name is [`McpError::ToolNotFound`].
    async fn execute_tool(
        &self,
        name: &str,
        context: ToolExecutionContext,
    ) -> McpResult<ToolsCallResult>;
}

pub const VALIDATE_CONFIG: &str = "validate_config";
pub const RUN_LOAD_TEST: &str = "run_load_test";
pub const CREATE_BASIC_CONFIG: &str = "create_basic_config";

const DEFAULT_GENERATED_USERS: u64 = 10;
const GENERATED_RUN_TIME: &str = "5m";

/// Registry exposing the three load-testing tools
pub struct LoadTestToolRegistry {
    tools: Vec<McpTool>,
    runner: EngineRunner,
    results: ResultStore,
    data_dir: PathBuf,
}

impl LoadTestToolRegistry {
    pub fn new(config: &McpServerConfig) -> Self {
        let mut registry = Self {
            tools: Vec::new(),
            runner: EngineRunner::new(config),
            results: ResultStore::new(),
            data_dir: config.data_dir.clone(),
        };
        registry.register_builtin_tools();
        registry
    }

    /// Completed runs recorded by `run_load_test`
    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    fn register_builtin_tools(&mut self) {
        self.tools.push(McpTool::new(
            RUN_LOAD_TEST,
            "Execute a load test with specified configuration",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "config_path": {
                        "type": "string",
                        "description": "Path to test configuration file"
                    },
                    "users": {
                        "type": "number",
                        "description": "Number of concurrent users"
                    },
                    "spawn_rate": {
                        "type": "number",
                        "description": "Users spawned per second"
                    },
                    "run_time": {
                        "type": "string",
                        "description": "Test duration like '5m' or '30s'"
                    },
                    "host": {
                        "type": "string",
                        "description": "Target host URL"
                    }
                },
                "required": ["config_path"]
            }),
            "execution",
        ));

        self.tools.push(McpTool::new(
            VALIDATE_CONFIG,
            "Validate a load test configuration",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "config_path": {
                        "type": "string",
                        "description": "Path to configuration file"
                    }
                },
                "required": ["config_path"]
            }),
            "validation",
        ));

        self.tools.push(McpTool::new(
            CREATE_BASIC_CONFIG,
            "Create a basic load test configuration file",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "host": {
                        "type": "string",
                        "description": "Target host URL"
                    },
                    "users": {
                        "type": "number",
                        "default": DEFAULT_GENERATED_USERS,
                        "description": "Number of concurrent users"
                    },
                    "endpoints": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "List of endpoint paths to test"
                    }
                },
                "required": ["host"]
            }),
            "authoring",
        ));
    }

    async fn validate_config_tool(&self, context: ToolExecutionContext) -> ToolsCallResult {
        let args = Arguments::new(VALIDATE_CONFIG, context.arguments.as_ref());
        let config_path = match args.required_str("config_path") {
            Ok(path) => path,
            Err(e) => return ToolsCallResult::error_text(format!("❌ Validation failed: {}", e)),
        };

        let path = Path::new(config_path);
        if !path.exists() {
            return ToolsCallResult::error_text(format!(
                "❌ Configuration file not found: {}",
                config_path
            ));
        }

        let raw = match load_template(path) {
            Ok(raw) => raw,
            Err(e) => return ToolsCallResult::error_text(format!("❌ Validation failed: {}", e)),
        };

        let missing = missing_required_keys(&raw);
        if !missing.is_empty() {
            return ToolsCallResult::error_text(format!(
                "❌ Missing required fields: {}",
                missing.join(", ")
            ));
        }

        // Typed check of the template alone; the process environment is not consulted
        let no_env: HashMap<String, String> = HashMap::new();
        if let Err(e) = ConfigResolver::new()
            .with_template(path)
            .resolve(&no_env, &CliOverrides::default())
        {
            return ToolsCallResult::error_text(format!("❌ Validation failed: {}", e));
        }

        match serde_json::to_string_pretty(&Value::Object(raw)) {
            Ok(pretty) => ToolsCallResult::text(format!(
                "✅ Configuration is valid!\n\n```json\n{}\n```",
                pretty
            )),
            Err(e) => ToolsCallResult::error_text(format!("❌ Validation failed: {}", e)),
        }
    }

    async fn run_load_test_tool(&self, context: ToolExecutionContext) -> ToolsCallResult {
        let request = match run_request(context.arguments.as_ref()) {
            Ok(request) => request,
            Err(e) => return ToolsCallResult::error_text(format!("❌ Load test failed: {}", e)),
        };

        if !Path::new(&request.config_path).exists() {
            return ToolsCallResult::error_text(format!(
                "❌ Configuration file not found: {}",
                request.config_path
            ));
        }

        match self.runner.run(&request).await {
            Ok(record) => {
                let text = render_run_report(&record);
                self.results.insert(record).await;
                ToolsCallResult::text(text)
            }
            Err(e) => {
                error!("Error running load test: {}", e);
                ToolsCallResult::error_text(format!("❌ Load test failed: {}", e))
            }
        }
    }

    async fn create_basic_config_tool(&self, context: ToolExecutionContext) -> ToolsCallResult {
        match self.write_basic_config(context.arguments.as_ref()).await {
            Ok((file, pretty)) => ToolsCallResult::text(format!(
                "✅ **Created:** {}\n\n```json\n{}\n```\n\n💡 Use with `{}` tool.",
                file.display(),
                pretty,
                RUN_LOAD_TEST
            )),
            Err(e) => {
                ToolsCallResult::error_text(format!("❌ Failed to create configuration: {}", e))
            }
        }
    }

    async fn write_basic_config(&self, arguments: Option<&Value>) -> McpResult<(PathBuf, String)> {
        let config = basic_config(arguments)?;
        let pretty = serde_json::to_string_pretty(&config)?;

        let mut suffix = Uuid::new_v4().simple().to_string();
        suffix.truncate(8);
        let file = self
            .data_dir
            .join(format!("config_generated_{}.json", suffix));

        tokio::fs::create_dir_all(&self.data_dir).await?;
        tokio::fs::write(&file, &pretty).await?;
        info!("Wrote generated configuration {}", file.display());

        Ok((file, pretty))
    }
}

#[async_trait]
impl ToolRegistry for LoadTestToolRegistry {
    async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        Ok(self.tools.iter().map(|tool| tool.tool.clone()).collect())
    }

    async fn get_tool(&self, name: &str) -> Option<McpTool> {
        self.tools.iter().find(|tool| tool.name() == name).cloned()
    }

    async fn execute_tool(
        &self,
        name: &str,
        context: ToolExecutionContext,
    ) -> McpResult<ToolsCallResult> {
        info!(
            "Executing tool {} (request {})",
            name,
            context.request_id.as_deref().unwrap_or("-")
        );

        let result = match name {
            VALIDATE_CONFIG => self.validate_config_tool(context).await,
            RUN_LOAD_TEST => self.run_load_test_tool(context).await,
            CREATE_BASIC_CONFIG => self.create_basic_config_tool(context).await,
            _ => return Err(McpError::tool_not_found(name)),
        };

        if result.is_error {
            warn!("Tool {} reported failure: {}", name, result.joined_text());
        }
        Ok(result)
    }
}

/// Typed accessors over a tool's argument object
struct Arguments<'a> {
    tool: &'static str,
    values: Option<&'a Map<String, Value>>,
}

impl<'a> Arguments<'a> {
    fn new(tool: &'static str, arguments: Option<&'a Value>) -> Self {
        Self {
            tool,
            values: arguments.and_then(Value::as_object),
        }
    }

    /// `None` for absent or null arguments
    fn get(&self, name: &str) -> Option<&'a Value> {
        self.values
            .and_then(|values| values.get(name))
            .filter(|value| !value.is_null())
    }

    fn required_str(&self, name: &str) -> Result<&'a str, ToolArgumentError> {
        match self.get(name) {
            Some(value) => value
                .as_str()
                .ok_or_else(|| ToolArgumentError::wrong_type(self.tool, name, "a string")),
            None => Err(ToolArgumentError::missing(self.tool, name)),
        }
    }

    fn optional_str(&self, name: &str) -> Result<Option<&'a str>, ToolArgumentError> {
        self.get(name)
            .map(|value| {
                value
                    .as_str()
                    .ok_or_else(|| ToolArgumentError::wrong_type(self.tool, name, "a string"))
            })
            .transpose()
    }

    /// Number rendered the way it appeared in the request
    fn optional_number(&self, name: &str) -> Result<Option<String>, ToolArgumentError> {
        self.get(name)
            .map(|value| match value {
                Value::Number(number) => Ok(number.to_string()),
                _ => Err(ToolArgumentError::wrong_type(self.tool, name, "a number")),
            })
            .transpose()
    }

    fn optional_positive_integer(&self, name: &str) -> Result<Option<u64>, ToolArgumentError> {
        self.get(name)
            .map(|value| {
                value
                    .as_u64()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| {
                        ToolArgumentError::wrong_type(self.tool, name, "a positive integer")
                    })
            })
            .transpose()
    }

    fn optional_str_list(&self, name: &str) -> Result<Option<Vec<String>>, ToolArgumentError> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let wrong_type = || ToolArgumentError::wrong_type(self.tool, name, "a list of strings");
        value
            .as_array()
            .ok_or_else(wrong_type)?
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(wrong_type))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

fn run_request(arguments: Option<&Value>) -> Result<RunRequest, ToolArgumentError> {
    let args = Arguments::new(RUN_LOAD_TEST, arguments);
    Ok(RunRequest {
        config_path: args.required_str("config_path")?.to_string(),
        users: args.optional_number("users")?,
        spawn_rate: args.optional_number("spawn_rate")?,
        run_time: args.optional_str("run_time")?.map(str::to_string),
        host: args.optional_str("host")?.map(str::to_string),
    })
}

/// Template written by `create_basic_config`; field order is the file's key order
#[derive(Debug, Clone, PartialEq, Serialize)]
struct BasicConfig {
    host: String,
    users: u64,
    spawn_rate: u64,
    run_time: String,
    endpoints: Vec<BasicEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct BasicEndpoint {
    path: String,
    method: String,
    weight: u32,
}

fn basic_config(arguments: Option<&Value>) -> Result<BasicConfig, ToolArgumentError> {
    let args = Arguments::new(CREATE_BASIC_CONFIG, arguments);
    let host = args.required_str("host")?.to_string();
    let users = args
        .optional_positive_integer("users")?
        .unwrap_or(DEFAULT_GENERATED_USERS);
    let paths = args
        .optional_str_list("endpoints")?
        .unwrap_or_else(|| vec!["/".to_string()]);

    Ok(BasicConfig {
        host,
        users,
        spawn_rate: (users / 5).max(1),
        run_time: GENERATED_RUN_TIME.to_string(),
        endpoints: paths
            .into_iter()
            .map(|path| BasicEndpoint {
                path,
                method: "GET".to_string(),
                weight: 1,
            })
            .collect(),
    })
}

/// Markdown report for a completed run
pub fn render_run_report(record: &TestRecord) -> String {
    let mut text = String::from("🚀 Load test completed!\n\n");
    let _ = writeln!(text, "**Test ID:** {}", record.id);
    let status = if record.succeeded() {
        "✅ SUCCESS"
    } else {
        "⚠️ ERRORS"
    };
    let _ = write!(text, "**Status:** {}\n\n", status);

    if let Some(summary) = summary_line(&record.stdout) {
        let _ = writeln!(text, "**Summary:** {}", summary);
    }
    if record.report_written {
        let _ = write!(text, "\n📊 **HTML Report:** {}\n", record.report_path);
    }
    if !record.stderr.is_empty() {
        let _ = write!(
            text,
            "\n**Errors:** {}\n",
            tail_chars(&record.stderr, STDERR_TAIL_CHARS)
        );
    }
    text
}
