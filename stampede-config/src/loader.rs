//! Template loading and layered override resolution
//!
//! Precedence, lowest first: template file, environment variables, command
//! line flags. Defaults only fill keys no layer supplied.

use crate::env::{EnvSource, ProcessEnv, CONFIG_PATH_VAR};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{Configuration, EndpointSpec, DEFAULT_REPORT_HTML};
use crate::provenance::{Provenance, Source};
use crate::validation::{require_keys, Validatable};
use serde_json::{Map, Number, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Template locations tried, in order, when no path is given
pub const DEFAULT_TEMPLATE_CANDIDATES: [&str; 2] = ["data/config.yaml", "data/config.json"];

/// Example template used when no other template exists
pub const BUNDLED_TEMPLATE: &str = "data/config.example.json";

/// Declared type of an overridable key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Integer,
    Float,
    Text,
}

impl ValueKind {
    fn coerce(self, raw: &str) -> Option<Value> {
        match self {
            ValueKind::Integer => raw.trim().parse::<u32>().ok().map(Value::from),
            ValueKind::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            ValueKind::Text => Some(Value::String(raw.to_string())),
        }
    }
}

/// Environment variable, configuration key, declared type
const ENV_OVERRIDES: [(&str, &str, ValueKind); 5] = [
    ("USERS", "users", ValueKind::Integer),
    ("SPAWN_RATE", "spawn_rate", ValueKind::Float),
    ("RUN_TIME", "run_time", ValueKind::Text),
    ("HOST", "host", ValueKind::Text),
    ("REPORT_HTML", "report_html", ValueKind::Text),
];

/// Command line overrides, highest precedence.
///
/// When the external engine owns the flags, pass `CliOverrides::default()`
/// and the resolved values act as the fallback it consults.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct CliOverrides {
    /// Number of concurrent users
    #[cfg_attr(feature = "cli", arg(short = 'u', long, value_name = "N"))]
    pub users: Option<u32>,

    /// Users spawned per second
    #[cfg_attr(feature = "cli", arg(short = 'r', long, value_name = "RATE"))]
    pub spawn_rate: Option<f64>,

    /// Run duration, e.g. 5m or 30s
    #[cfg_attr(feature = "cli", arg(short = 't', long, value_name = "DURATION"))]
    pub run_time: Option<String>,

    /// Target host URL
    #[cfg_attr(feature = "cli", arg(short = 'H', long, value_name = "URL"))]
    pub host: Option<String>,

    /// HTML report path
    #[cfg_attr(feature = "cli", arg(long = "html", value_name = "PATH"))]
    pub report_html: Option<String>,
}

impl CliOverrides {
    fn apply(&self, raw: &mut Map<String, Value>, provenance: &mut Provenance) -> ConfigResult<()> {
        if let Some(users) = self.users {
            set(raw, provenance, "users", Value::from(users), Source::Cli("--users".into()));
        }
        if let Some(spawn_rate) = self.spawn_rate {
            let value = Number::from_f64(spawn_rate).ok_or_else(|| ConfigError::InvalidOverride {
                key: "--spawn-rate".to_string(),
                value: spawn_rate.to_string(),
            })?;
            set(
                raw,
                provenance,
                "spawn_rate",
                Value::Number(value),
                Source::Cli("--spawn-rate".into()),
            );
        }
        if let Some(run_time) = &self.run_time {
            set(
                raw,
                provenance,
                "run_time",
                Value::from(run_time.as_str()),
                Source::Cli("--run-time".into()),
            );
        }
        if let Some(host) = &self.host {
            set(raw, provenance, "host", Value::from(host.as_str()), Source::Cli("--host".into()));
        }
        if let Some(report) = &self.report_html {
            set(
                raw,
                provenance,
                "report_html",
                Value::from(report.as_str()),
                Source::Cli("--html".into()),
            );
        }
        Ok(())
    }
}

/// Configuration plus the side-channel record of where each value came from
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub config: Configuration,
    pub provenance: Provenance,
    /// Template file the base layer was read from
    pub template_path: PathBuf,
}

/// Resolves a [`Configuration`] from template, environment and CLI layers
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    /// Explicit template path, bypasses `CONFIG_PATH` and discovery
    template_path: Option<PathBuf>,
    /// Directory default candidates are looked up in
    base_dir: PathBuf,
}

impl ConfigResolver {
    /// Create a resolver that discovers templates relative to the working directory
    pub fn new() -> Self {
        Self {
            template_path: None,
            base_dir: PathBuf::new(),
        }
    }

    /// Use an explicit template path
    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    /// Look up default candidates and the bundled template under `dir`
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Resolve against the process environment
    pub fn resolve_from_process(&self, cli: &CliOverrides) -> ConfigResult<Resolved> {
        self.resolve(&ProcessEnv, cli)
    }

    /// Resolve the configuration.
    ///
    /// Fails on the first error; no partial configuration is returned.
    pub fn resolve<E>(&self, env: &E, cli: &CliOverrides) -> ConfigResult<Resolved>
    where
        E: EnvSource + ?Sized,
    {
        let template_path = self.locate_template(env)?;
        let mut raw = load_template(&template_path)?;

        let mut provenance = Provenance::new();
        for key in raw.keys() {
            provenance.record(key.clone(), Source::Template(template_path.clone()));
        }

        apply_env_overrides(&mut raw, &mut provenance, env)?;
        cli.apply(&mut raw, &mut provenance)?;
        require_keys(&raw)?;
        fill_defaults(&mut raw, &mut provenance);

        let config: Configuration = serde_json::from_value(Value::Object(raw))
            .map_err(|e| ConfigError::parse(&template_path, e))?;
        config.validate()?;

        debug!(
            "Resolved configuration from {} ({} endpoints)",
            template_path.display(),
            config.endpoints.len()
        );

        Ok(Resolved {
            config,
            provenance,
            template_path,
        })
    }

    /// Pick the template file: explicit path, `CONFIG_PATH`, first existing
    /// default candidate, then the bundled example.
    pub fn locate_template<E>(&self, env: &E) -> ConfigResult<PathBuf>
    where
        E: EnvSource + ?Sized,
    {
        let chosen = if let Some(path) = &self.template_path {
            path.clone()
        } else if let Some(path) = env.var(CONFIG_PATH_VAR).filter(|p| !p.is_empty()) {
            PathBuf::from(path)
        } else {
            DEFAULT_TEMPLATE_CANDIDATES
                .iter()
                .map(|candidate| self.base_dir.join(candidate))
                .find(|candidate| candidate.exists())
                .unwrap_or_else(|| self.base_dir.join(BUNDLED_TEMPLATE))
        };

        if !chosen.exists() {
            return Err(ConfigError::NotFound { path: chosen });
        }
        Ok(chosen)
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a template file into a raw JSON object.
///
/// `.yaml`/`.yml` files are decoded as YAML, everything else as JSON.
pub fn load_template(path: &Path) -> ConfigResult<Map<String, Value>> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    let value: Value = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| ConfigError::parse(path, e))?
    } else {
        serde_json::from_str(&content).map_err(|e| ConfigError::parse(path, e))?
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ConfigError::parse(
            path,
            format!("expected a top-level object, found {}", json_type_name(&other)),
        )),
    }
}

fn apply_env_overrides<E>(
    raw: &mut Map<String, Value>,
    provenance: &mut Provenance,
    env: &E,
) -> ConfigResult<()>
where
    E: EnvSource + ?Sized,
{
    for (var, key, kind) in ENV_OVERRIDES {
        let Some(raw_value) = env.var(var) else {
            continue;
        };
        let value = kind
            .coerce(&raw_value)
            .ok_or_else(|| ConfigError::InvalidOverride {
                key: var.to_string(),
                value: raw_value.clone(),
            })?;
        debug!("Environment override {} -> {}", var, key);
        set(raw, provenance, key, value, Source::Env(var.to_string()));
    }
    Ok(())
}

fn fill_defaults(raw: &mut Map<String, Value>, provenance: &mut Provenance) {
    let endpoints_missing = match raw.get("endpoints") {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    };
    if endpoints_missing {
        let fallback = serde_json::to_value(vec![EndpointSpec::root()])
            .unwrap_or_else(|_| Value::Array(Vec::new()));
        set(raw, provenance, "endpoints", fallback, Source::Default);
    }

    if !raw.contains_key("think_time_seconds") {
        set(raw, provenance, "think_time_seconds", Value::Null, Source::Default);
    }

    if !raw.contains_key("report_html") {
        set(
            raw,
            provenance,
            "report_html",
            Value::from(DEFAULT_REPORT_HTML),
            Source::Default,
        );
    }
}

fn set(
    raw: &mut Map<String, Value>,
    provenance: &mut Provenance,
    key: &str,
    value: Value,
    source: Source,
) {
    raw.insert(key.to_string(), value);
    provenance.record(key, source);
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
