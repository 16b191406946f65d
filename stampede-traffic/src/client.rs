//! HTTP client seam and its reqwest implementation

use crate::errors::{TrafficError, TrafficResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value as JsonValue;
use stampede_config::HttpMethod;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// A fully assembled request for one drawn endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    /// JSON body, only ever set for POST and PUT
    pub body: Option<JsonValue>,
}

/// HTTP client trait used by simulated users.
///
/// The load engine normally supplies the client; [`ReqwestClient`] is the
/// standalone implementation.
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue the request and return the response status code
    async fn send(&self, request: OutboundRequest) -> TrafficResult<u16>;
}

/// Settings for [`ReqwestClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("stampede/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// reqwest-backed [`HttpClient`]
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new(config: &ClientConfig) -> TrafficResult<Self> {
        debug!(
            "Creating HTTP client with {}s timeout",
            config.timeout.as_secs()
        );
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> TrafficResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_str(name)
            .map_err(|_| TrafficError::InvalidHeaderName(name.clone()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| TrafficError::InvalidHeaderValue(name.clone()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: OutboundRequest) -> TrafficResult<u16> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| TrafficError::InvalidUrl(format!("{}: {}", request.url, e)))?;

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), url)
            .headers(header_map(&request.headers)?);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        debug!("{} {} -> {}", request.method, request.url, status);
        Ok(status)
    }
}
