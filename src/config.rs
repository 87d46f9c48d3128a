//! Compiler configuration.
//!
//! The defaults reproduce the lenient behavior grid front-ends rely on: every
//! malformed input still compiles to a best-effort filter. Each lenient
//! fallback is a separately named policy so a stricter host can turn any of
//! them into a reported error without touching the compiler.

use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do when an input cannot be interpreted as intended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnInvalid {
    /// Substitute the documented fallback and keep compiling.
    #[default]
    Fallback,
    /// Abort compilation with a [`FilterError`].
    Reject,
}

impl OnInvalid {
    pub fn is_reject(self) -> bool {
        self == OnInvalid::Reject
    }
}

/// Named policies for every lenient fallback in the compiler.
///
/// | Policy | Fallback behavior |
/// |--------|-------------------|
/// | `unknown_operator` | resolve to the registry's default operator |
/// | `malformed_date` | use the zero timestamp `0001-01-01T00:00:00Z` |
/// | `malformed_bool` | read the text as `false` |
/// | `missing_bound` | leave that side of a `between` unconstrained |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackPolicy {
    pub unknown_operator: OnInvalid,
    pub malformed_date: OnInvalid,
    pub malformed_bool: OnInvalid,
    pub missing_bound: OnInvalid,
}

impl FallbackPolicy {
    pub fn lenient() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            unknown_operator: OnInvalid::Reject,
            malformed_date: OnInvalid::Reject,
            malformed_bool: OnInvalid::Reject,
            missing_bound: OnInvalid::Reject,
        }
    }
}

/// Configuration for a [`Compiler`](crate::Compiler).
///
/// # Example
/// ```rust
/// use filtertree::config::{CompilerConfig, OnInvalid};
///
/// let config = CompilerConfig::new()
///     .with_unknown_operator(OnInvalid::Reject)
///     .with_max_depth(16);
///
/// assert_eq!(config.max_depth, Some(16));
/// assert!(config.fallback.unknown_operator.is_reject());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Fallback policies for malformed input
    pub fallback: FallbackPolicy,
    /// Reject trees deeper than this many levels; unlimited when unset
    pub max_depth: Option<usize>,
}

impl CompilerConfig {
    /// Create the default (lenient) configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fallback substitutes a best-effort value. Same as `new()`.
    pub fn lenient() -> Self {
        Self::default()
    }

    /// Every fallback becomes an error.
    pub fn strict() -> Self {
        Self {
            fallback: FallbackPolicy::strict(),
            ..Default::default()
        }
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| FilterError::ConfigError(e.to_string()))
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FilterError::ConfigError(e.to_string()))
    }

    /// Load a configuration file. Files ending in `.json` are read as JSON,
    /// everything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_unknown_operator(mut self, policy: OnInvalid) -> Self {
        self.fallback.unknown_operator = policy;
        self
    }

    pub fn with_malformed_date(mut self, policy: OnInvalid) -> Self {
        self.fallback.malformed_date = policy;
        self
    }

    pub fn with_malformed_bool(mut self, policy: OnInvalid) -> Self {
        self.fallback.malformed_bool = policy;
        self
    }

    pub fn with_missing_bound(mut self, policy: OnInvalid) -> Self {
        self.fallback.missing_bound = policy;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn without_max_depth(mut self) -> Self {
        self.max_depth = None;
        self
    }
}
