//! CLI command implementations

pub mod check_config;
pub mod headless;

pub use check_config::*;
pub use headless::*;

use stampede_config::ConfigResolver;
use std::path::Path;

/// Resolver honouring an explicit `--config` path
pub fn resolver_for(config: Option<&Path>) -> ConfigResolver {
    match config {
        Some(path) => ConfigResolver::new().with_template(path),
        None => ConfigResolver::new(),
    }
}
