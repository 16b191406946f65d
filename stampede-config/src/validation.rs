//! Configuration validation traits and utilities

use crate::error::{ConfigError, ConfigResult};
use crate::model::{Configuration, EndpointSpec, REQUIRED_KEYS};
use serde_json::{Map, Value};

/// Trait for validatable configuration
pub trait Validatable {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;
}

/// Required keys absent from a raw template object, in declaration order.
///
/// A key counts as present even when its value is `null`, matching how the
/// template layer treats presence.
pub fn missing_required_keys(raw: &Map<String, Value>) -> Vec<String> {
    REQUIRED_KEYS
        .iter()
        .filter(|key| !raw.contains_key(**key))
        .map(|key| key.to_string())
        .collect()
}

/// Fail with every missing required key, sorted
pub fn require_keys(raw: &Map<String, Value>) -> ConfigResult<()> {
    let mut missing = missing_required_keys(raw);
    if missing.is_empty() {
        return Ok(());
    }
    missing.sort();
    Err(ConfigError::MissingKeys { keys: missing })
}

/// Validate a positive number
pub fn validate_positive<T>(value: T, field_name: &str, index: usize) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(ConfigError::InvalidEndpoint {
            index,
            reason: format!("{} must be greater than 0, got {}", field_name, value),
        });
    }
    Ok(())
}

impl EndpointSpec {
    fn validate_at(&self, index: usize) -> ConfigResult<()> {
        if self.path.is_empty() {
            return Err(ConfigError::InvalidEndpoint {
                index,
                reason: "path cannot be empty".to_string(),
            });
        }
        validate_positive(self.weight, "weight", index)
    }
}

impl Validatable for Configuration {
    fn validate(&self) -> ConfigResult<()> {
        for (index, endpoint) in self.endpoints.iter().enumerate() {
            endpoint.validate_at(index)?;
        }
        Ok(())
    }
}
