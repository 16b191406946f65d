//! Tracking which layer supplied each resolved value

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Layer a resolved value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Template file at the given path
    Template(PathBuf),
    /// Environment variable
    Env(String),
    /// Command line flag
    Cli(String),
    /// Built-in default
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Template(path) => write!(f, "template:{}", path.display()),
            Source::Env(var) => write!(f, "env:{var}"),
            Source::Cli(flag) => write!(f, "cli:{flag}"),
            Source::Default => f.write_str("default"),
        }
    }
}

/// Per-key record of the winning layer.
///
/// Purely diagnostic; nothing reads it to make decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
    sources: BTreeMap<String, Source>,
}

impl Provenance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `source` as the supplier of `key`, replacing any earlier layer
    pub fn record(&mut self, key: impl Into<String>, source: Source) {
        self.sources.insert(key.into(), source);
    }

    pub fn get(&self, key: &str) -> Option<&Source> {
        self.sources.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Source)> {
        self.sources.iter().map(|(key, source)| (key.as_str(), source))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
