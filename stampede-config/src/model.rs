//! Resolved configuration types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Report location used when neither the template nor the environment names one
pub const DEFAULT_REPORT_HTML: &str = "data/results/report.html";

/// Keys that must be present once every layer has been merged
pub const REQUIRED_KEYS: [&str; 4] = ["host", "users", "spawn_rate", "run_time"];

/// Fully resolved load-run configuration.
///
/// Built once per process and shared read-only (`Arc<Configuration>`) with
/// every simulated user. Where each value came from is tracked separately in
/// [`crate::Provenance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Base URL requests are issued against
    pub host: String,

    /// Target number of concurrent simulated users (engine-owned)
    pub users: u32,

    /// Users started per second during ramp-up (engine-owned)
    pub spawn_rate: f64,

    /// Run duration expression such as `5m` or `30s` (engine-owned)
    pub run_time: String,

    /// Weighted request mix
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<EndpointSpec>,

    /// Fixed delay between requests; the engine default applies when unset
    #[serde(default)]
    pub think_time_seconds: Option<f64>,

    /// Seed for reproducible endpoint selection; any integer, negative included
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,

    /// Where the engine writes its HTML report
    #[serde(default = "default_report_html")]
    pub report_html: String,

    /// Template keys this layer does not interpret
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Configuration {
    /// Fixed think time, if one is configured and positive
    pub fn think_time(&self) -> Option<Duration> {
        self.think_time_seconds
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f64)
    }
}

fn default_endpoints() -> Vec<EndpointSpec> {
    vec![EndpointSpec::root()]
}

fn default_report_html() -> String {
    DEFAULT_REPORT_HTML.to_string()
}

/// A single simulated request descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// Request path appended to the host
    pub path: String,

    /// HTTP method name; only GET, POST, PUT and DELETE are dispatched
    #[serde(default = "default_method")]
    pub method: String,

    /// Extra request headers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// JSON body sent with POST and PUT
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Relative selection weight, must be positive
    #[serde(default = "default_weight")]
    pub weight: i64,
}

impl EndpointSpec {
    /// Create a GET endpoint with weight 1
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: HttpMethod::Get.as_str().to_string(),
            headers: BTreeMap::new(),
            payload: None,
            weight: 1,
        }
    }

    /// The `GET /` endpoint used whenever no endpoints are configured
    pub fn root() -> Self {
        Self::get("/")
    }

    /// Set the method name
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set the selection weight
    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    /// Add a request header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the JSON payload
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// The dispatchable method, or `None` when the name is not supported
    pub fn http_method(&self) -> Option<HttpMethod> {
        self.method.parse().ok()
    }
}

fn default_method() -> String {
    HttpMethod::Get.as_str().to_string()
}

fn default_weight() -> i64 {
    1
}

/// HTTP methods a simulated user can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Get the string representation of the HTTP method
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether the endpoint payload is sent as the request body
    pub fn sends_payload(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(UnsupportedMethod(s.to_string())),
        }
    }
}

/// Method name outside GET/POST/PUT/DELETE
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported HTTP method: '{0}'")]
pub struct UnsupportedMethod(pub String);
