//! Error types for the record store client

use thiserror::Error;

/// Errors that can occur when talking to the record store
#[derive(Debug, Error)]
pub enum AirtableError {
    /// The configured endpoint cannot address a table
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// HTTP request failed before a response arrived
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Unauthorized - invalid or expired access token
    #[error("Unauthorized - check the access token")]
    Unauthorized,

    /// The record or table does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited - too many requests
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// The store answered with another non-2xx status
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the store's payload, or the status reason
        message: String,
    },

    /// The response body did not match the expected schema
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl AirtableError {
    /// HTTP status carried by this error, if the store answered at all
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::NotFound(_) => Some(404),
            Self::RateLimited => Some(429),
            Self::Api { status, .. } => Some(*status),
            Self::InvalidEndpoint(_) | Self::RequestFailed(_) | Self::MalformedResponse(_) => None,
        }
    }
}
