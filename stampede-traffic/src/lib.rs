//! Synthetic traffic shaping for Stampede
//!
//! Turns the configured endpoint mix into requests: a weight-expanded
//! [`SelectionPool`], a run-wide [`SharedRng`] and [`SimulatedUser`]s that
//! draw an endpoint per task and dispatch it through an [`HttpClient`].
//! Spawning users, pacing and statistics stay with the load engine.

pub mod client;
pub mod errors;
pub mod rng;
pub mod selector;
pub mod user;

pub use client::{ClientConfig, HttpClient, OutboundRequest, ReqwestClient};
pub use errors::{TrafficError, TrafficResult};
pub use rng::SharedRng;
pub use selector::SelectionPool;
pub use user::{DispatchOutcome, OutcomeTally, SimulatedUser, TrafficPlan};
