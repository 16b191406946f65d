//! Traffic error types

/// Error type for request dispatch
#[derive(Debug, thiserror::Error)]
pub enum TrafficError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(String),

    #[error("Invalid header value for {0}")]
    InvalidHeaderValue(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result type for request dispatch
pub type TrafficResult<T> = Result<T, TrafficError>;
