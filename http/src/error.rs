//! Error types for the reqwest client adapter

use thiserror::Error;

/// Errors that can occur when building a [`ReqwestClient`](crate::ReqwestClient)
#[derive(Debug, Error)]
pub enum ClientError {
    /// A default header name is not a valid HTTP header name
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(String),

    /// A default header value is not a valid HTTP header value
    #[error("Invalid value for header {name}")]
    InvalidHeaderValue {
        /// Header name
        name: String,
    },

    /// The underlying reqwest client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}
