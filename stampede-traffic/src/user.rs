//! Simulated users: endpoint draw plus request dispatch

use crate::client::{HttpClient, OutboundRequest};
use crate::rng::SharedRng;
use crate::selector::SelectionPool;
use stampede_config::{Configuration, EndpointSpec};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Shared state every simulated user of one run is built from.
///
/// Holds the immutable configuration, the expanded selection pool and the
/// run-wide random source; users only clone the `Arc`s.
#[derive(Debug, Clone)]
pub struct TrafficPlan {
    config: Arc<Configuration>,
    pool: Arc<SelectionPool>,
    rng: SharedRng,
}

impl TrafficPlan {
    pub fn new(config: Arc<Configuration>) -> Self {
        let pool = Arc::new(SelectionPool::build(&config.endpoints));
        let rng = SharedRng::new(config.seed);
        if rng.is_seeded() {
            debug!("Endpoint selection seeded for reproducible runs");
        }
        Self { config, pool, rng }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn pool(&self) -> &SelectionPool {
        &self.pool
    }

    /// Create one simulated user sharing this plan's state
    pub fn user(&self) -> SimulatedUser {
        SimulatedUser {
            config: Arc::clone(&self.config),
            pool: Arc::clone(&self.pool),
            rng: self.rng.clone(),
        }
    }
}

/// What a single task iteration did
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A request was issued and answered
    Sent {
        method: String,
        path: String,
        status: u16,
    },
    /// The endpoint's method is not dispatchable; no request was issued
    Skipped { method: String, path: String },
    /// The request failed before a response arrived
    Failed {
        method: String,
        path: String,
        error: String,
    },
}

impl DispatchOutcome {
    pub fn path(&self) -> &str {
        match self {
            DispatchOutcome::Sent { path, .. }
            | DispatchOutcome::Skipped { path, .. }
            | DispatchOutcome::Failed { path, .. } => path,
        }
    }
}

/// Running count of task outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    pub sent: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl OutcomeTally {
    pub fn record(&mut self, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Sent { .. } => self.sent += 1,
            DispatchOutcome::Skipped { .. } => self.skipped += 1,
            DispatchOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.sent + self.skipped + self.failed
    }
}

impl fmt::Display for OutcomeTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sent, {} skipped, {} failed",
            self.sent, self.skipped, self.failed
        )
    }
}

/// One simulated user
#[derive(Debug, Clone)]
pub struct SimulatedUser {
    config: Arc<Configuration>,
    pool: Arc<SelectionPool>,
    rng: SharedRng,
}

impl SimulatedUser {
    /// Fixed delay between tasks; `None` leaves the engine default in place
    pub fn wait_time(&self) -> Option<Duration> {
        self.config.think_time()
    }

    /// Draw the next endpoint from the shared pool
    pub fn next_endpoint(&self) -> &EndpointSpec {
        self.rng.draw(&self.pool)
    }

    /// Assemble the request for `endpoint`, or `None` for unsupported methods
    pub fn build_request(&self, endpoint: &EndpointSpec) -> Option<OutboundRequest> {
        let method = endpoint.http_method()?;
        let body = if method.sends_payload() {
            endpoint.payload.clone()
        } else {
            None
        };
        Some(OutboundRequest {
            method,
            url: join_url(&self.config.host, &endpoint.path),
            headers: endpoint.headers.clone(),
            body,
        })
    }

    /// Draw an endpoint and issue exactly one request for it.
    ///
    /// Transport errors are logged and reported as [`DispatchOutcome::Failed`];
    /// they never abort the user.
    pub async fn run_task<C>(&self, client: &C) -> DispatchOutcome
    where
        C: HttpClient + ?Sized,
    {
        let endpoint = self.next_endpoint();
        let method = endpoint.method.to_uppercase();
        let path = endpoint.path.clone();

        let Some(request) = self.build_request(endpoint) else {
            debug!("Skipping {} {}: unsupported method", method, path);
            return DispatchOutcome::Skipped { method, path };
        };

        match client.send(request).await {
            Ok(status) => DispatchOutcome::Sent {
                method,
                path,
                status,
            },
            Err(e) => {
                warn!("Request error for {} {}: {}", method, path, e);
                DispatchOutcome::Failed {
                    method,
                    path,
                    error: e.to_string(),
                }
            }
        }
    }
}

/// `host` + `path`; absolute URLs in `path` are used as-is
fn join_url(host: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let host = host.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{host}{path}")
    } else {
        format!("{host}/{path}")
    }
}
