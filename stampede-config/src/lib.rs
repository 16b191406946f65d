//! Layered configuration for Stampede load runs
//!
//! A run is described by a template file (JSON or YAML), optionally
//! overridden by environment variables and then by command line flags.
//! [`ConfigResolver`] merges the layers, validates the result and returns
//! it together with a [`Provenance`] record of where each value came from.

pub mod display;
pub mod env;
pub mod error;
pub mod loader;
pub mod model;
pub mod provenance;
pub mod validation;

// Re-export main types
pub use display::{print_resolved_config, render_resolved};
pub use env::{EnvSource, ProcessEnv, CONFIG_PATH_VAR};
pub use error::{ConfigError, ConfigResult};
pub use loader::{
    load_template, CliOverrides, ConfigResolver, Resolved, BUNDLED_TEMPLATE,
    DEFAULT_TEMPLATE_CANDIDATES,
};
pub use model::{
    Configuration, EndpointSpec, HttpMethod, UnsupportedMethod, DEFAULT_REPORT_HTML, REQUIRED_KEYS,
};
pub use provenance::{Provenance, Source};
pub use validation::{missing_required_keys, Validatable};
