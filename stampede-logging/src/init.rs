use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Minimum level emitted when `RUST_LOG` does not say otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Stream log lines are written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    #[default]
    Stdout,
    /// Required whenever stdout carries a protocol
    Stderr,
}

#[derive(Debug, Clone, Default)]
pub struct LoggingOptions {
    pub level: LogLevel,
    pub target: LogTarget,
}

impl LoggingOptions {
    pub fn new(level: LogLevel, target: LogTarget) -> Self {
        Self { level, target }
    }

    /// Filter used by the subscriber: `RUST_LOG` when it is set and valid,
    /// otherwise the configured level
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.level.to_string()))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Install the global tracing subscriber.
///
/// Calling this twice is harmless: the second call keeps the first subscriber.
pub fn init_tracing(options: &LoggingOptions) -> Result<()> {
    let registry = tracing_subscriber::registry().with(options.env_filter());

    let result = match options.target {
        LogTarget::Stdout => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init(),
        LogTarget::Stderr => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_level_serde_is_lowercase() {
        let level: LogLevel = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(level, LogLevel::Error);
        assert_eq!(serde_json::to_string(&LogLevel::Trace).unwrap(), "\"trace\"");
    }

    #[test]
    fn test_rust_log_overrides_configured_level() {
        let options = LoggingOptions::new(LogLevel::Warn, LogTarget::Stdout);

        temp_env::with_var("RUST_LOG", Some("stampede_mcp=trace"), || {
            assert_eq!(options.env_filter().to_string(), "stampede_mcp=trace");
        });
        temp_env::with_var_unset("RUST_LOG", || {
            assert_eq!(options.env_filter().to_string(), "warn");
        });
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let options = LoggingOptions::new(LogLevel::Debug, LogTarget::Stderr);
        assert!(init_tracing(&options).is_ok());
        assert!(init_tracing(&options).is_ok());
    }
}
