//! Environment module - the HTTP client collaborator
//!
//! The API middleware never talks to the network itself. It is handed an
//! [`HttpClient`] and only relies on the small [`HttpResponse`] surface:
//! an ok flag, a status code, and a body that can be parsed as JSON.

use crate::error::{DispatchError, TransportError};
use crate::request::RequestOptions;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP client abstraction
///
/// # Examples
///
/// ```ignore
/// // Production - reqwest
/// let client = ReqwestClient::new();
///
/// // Test - canned responses
/// let client = MockHttpClient::new()
///     .with_json("http://fakeapi.test", json!({ "data": "some_fake_data" }));
/// ```
pub trait HttpClient: Send + Sync {
    /// Perform a request
    ///
    /// `options` are the request options from the API action, unmodified.
    /// The future resolves to a response for every status code; only
    /// failures to obtain a response are errors.
    fn fetch(
        &self,
        endpoint: String,
        options: Option<RequestOptions>,
    ) -> BoxFuture<'static, Result<HttpResponse, TransportError>>;
}

/// A received HTTP response with its body fully read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Final URL of the response
    pub url: String,
    /// Status code
    pub status: u16,
    /// Raw body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a response
    #[must_use]
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Parse the body as JSON
    ///
    /// # Errors
    ///
    /// Returns the parse error if the body is not valid JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// The body as text, replacing invalid UTF-8
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Payload of a failure action
///
/// Serialized with a `kind` tag so state consumers can tell a rejected
/// status from a network failure, while both still land in the single
/// `error` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchFailure {
    /// The server answered with a non-2xx status
    Status {
        /// Response URL
        url: String,
        /// Status code
        status: u16,
        /// Always `false`
        ok: bool,
        /// Response body as text
        body: String,
    },

    /// No response was obtained
    Network {
        /// Requested URL
        url: String,
        /// Error message
        message: String,
    },

    /// A 2xx response whose body is not JSON
    InvalidBody {
        /// Response URL
        url: String,
        /// Status code
        status: u16,
        /// Parse error message
        message: String,
    },
    /// The request succeeded but its success action could not be dispatched
    Dispatch {
        /// Requested URL
        url: String,
        /// Dispatch error message
        message: String,
    },
}

impl FetchFailure {
    /// Failure for a non-2xx response
    #[must_use]
    pub fn from_response(response: &HttpResponse) -> Self {
        Self::Status {
            url: response.url.clone(),
            status: response.status,
            ok: false,
            body: response.text(),
        }
    }

    /// Failure for a transport error on a request to `endpoint`
    #[must_use]
    pub fn from_transport(endpoint: &str, error: &TransportError) -> Self {
        Self::Network {
            url: error.url().unwrap_or(endpoint).to_string(),
            message: error.to_string(),
        }
    }

    /// Failure for a 2xx response whose body did not parse
    #[must_use]
    pub fn invalid_body(response: &HttpResponse, error: &serde_json::Error) -> Self {
        Self::InvalidBody {
            url: response.url.clone(),
            status: response.status,
            message: error.to_string(),
        }
    }

    /// Failure for a success action the store refused
    #[must_use]
    pub fn from_dispatch(endpoint: &str, error: &DispatchError) -> Self {
        Self::Dispatch {
            url: endpoint.to_string(),
            message: error.to_string(),
        }
    }

    /// Status code, when a response was received
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::InvalidBody { status, .. } => Some(*status),
            Self::Network { .. } | Self::Dispatch { .. } => None,
        }
    }

    /// The failure as a JSON payload
    #[must_use]
    pub fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
