//! Error types for the filtertree crate.
//!
//! Under the default lenient [`FallbackPolicy`](crate::config::FallbackPolicy)
//! compilation never fails for the built-in operators. The fallback variants
//! below only surface when a policy is switched to
//! [`OnInvalid::Reject`](crate::config::OnInvalid::Reject).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Unknown operator '{operator}' on field '{field}'")]
    UnknownOperator { field: String, operator: String },

    #[error("No default operator registered")]
    NoDefaultOperator,

    #[error("Invalid date '{value}' on field '{field}': {reason}")]
    InvalidDate {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid boolean '{value}' on field '{field}'")]
    InvalidBool { field: String, value: String },

    #[error("Missing {bound} bound for between on field '{field}'")]
    MissingBound { field: String, bound: &'static str },

    #[error("Filter tree exceeds maximum depth of {limit}")]
    DepthExceeded { limit: usize },

    #[error("Operator error: {0}")]
    OperatorError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for FilterError {
    fn from(err: std::io::Error) -> Self {
        FilterError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::InvalidRequest(err.to_string())
    }
}
