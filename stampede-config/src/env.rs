//! Environment variable sources

use std::collections::HashMap;

/// Variable naming the template file
pub const CONFIG_PATH_VAR: &str = "CONFIG_PATH";

/// Read-only view over environment variables.
///
/// Resolution only ever reads through this trait, so the process
/// environment is never mutated and tests can supply a plain map.
pub trait EnvSource {
    /// Value of `name`, or `None` when unset
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvSource for [(&str, &str)] {
    fn var(&self, name: &str) -> Option<String> {
        self.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

impl<const N: usize> EnvSource for [(&str, &str); N] {
    fn var(&self, name: &str) -> Option<String> {
        self.as_slice().var(name)
    }
}
