//! Request descriptors carried by API actions

use crate::labels::LabelTriple;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Options forwarded unmodified to the HTTP client
///
/// The middleware never inspects these; how they are applied is up to the
/// [`HttpClient`](crate::environment::HttpClient) implementation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    /// HTTP method; clients default to `GET`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Request headers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// JSON request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl RequestOptions {
    /// Empty options
    #[must_use]
    pub const fn new() -> Self {
        Self {
            method: None,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Set the HTTP method
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the JSON body
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Everything the middleware needs to perform one API call
///
/// # Example
///
/// ```
/// use composable_api_core::{labels::LabelTriple, request::RequestDescriptor};
///
/// let labels = LabelTriple::new("PENDING", "SUCCESS", "FAILURE")?;
/// let request = RequestDescriptor::new("http://fakeapi.test", labels);
/// assert!(request.request_options.is_none());
/// # Ok::<(), composable_api_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    /// URL to request
    pub endpoint: String,

    /// Labels of the lifecycle actions this call emits
    pub types: LabelTriple,

    /// Options handed to the HTTP client as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_options: Option<RequestOptions>,
}

impl RequestDescriptor {
    /// Describe a call to `endpoint` emitting `types`
    #[must_use]
    pub fn new(endpoint: impl Into<String>, types: LabelTriple) -> Self {
        Self {
            endpoint: endpoint.into(),
            types,
            request_options: None,
        }
    }

    /// Attach request options
    #[must_use]
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.request_options = Some(options);
        self
    }
}
