//! Error types for the discovery stage
//!
//! Fetching the catalog page is the only stage that can fail a pipeline run.
//! Parse-level skips and per-probe failures degrade in-band (a skipped token,
//! an unavailable result) and are never surfaced as errors.

use thiserror::Error;

/// Errors that can occur while fetching the catalog page
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server responded with a non-success status
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts exceeded")]
    MaxRetriesExceeded,

    /// Response body decoding error
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid catalog URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
