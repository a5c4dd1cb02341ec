//! reqwest client adapter

use crate::error::ClientError;
use composable_api_core::{HttpClient, HttpResponse, RequestOptions, TransportError};
use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use std::collections::BTreeMap;
use std::time::Duration;

/// Configuration for a [`ReqwestClient`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Total request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// `User-Agent` header sent with every request
    pub user_agent: Option<String>,
    /// Headers sent with every request; request options override them
    pub default_headers: BTreeMap<String, String>,
}

impl ClientConfig {
    /// Set the request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the `User-Agent` header
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add a header sent with every request
    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }
}

/// [`HttpClient`] backed by `reqwest`
#[derive(Clone, Debug)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Create a client with reqwest's defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a client from `config`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if a default header is invalid or the
    /// underlying client cannot be built.
    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.default_headers {
            let header = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ClientError::InvalidHeaderName(name.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ClientError::InvalidHeaderValue { name: name.clone() })?;
            headers.insert(header, value);
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an already configured reqwest client
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestClient {
    fn fetch(
        &self,
        endpoint: String,
        options: Option<RequestOptions>,
    ) -> BoxFuture<'static, Result<HttpResponse, TransportError>> {
        let client = self.client.clone();

        Box::pin(async move {
            let request = build_request(&client, &endpoint, options.unwrap_or_default())?;

            let response = request.send().await.map_err(|e| TransportError::Network {
                url: endpoint.clone(),
                message: e.to_string(),
            })?;

            let url = response.url().to_string();
            let status = response.status().as_u16();
            tracing::trace!(%url, status, "Response received");

            let body = response.bytes().await.map_err(|e| TransportError::Body {
                url: url.clone(),
                message: e.to_string(),
            })?;

            Ok(HttpResponse::new(url, status, body.to_vec()))
        })
    }
}

/// Turn request options into a reqwest request
fn build_request(
    client: &Client,
    endpoint: &str,
    options: RequestOptions,
) -> Result<RequestBuilder, TransportError> {
    let method = match options.method.as_deref() {
        None => Method::GET,
        Some(method) => Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| TransportError::InvalidRequest(format!("invalid method `{method}`")))?,
    };

    let mut request = client.request(method, endpoint);

    for (name, value) in &options.headers {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::InvalidRequest(format!("invalid header name `{name}`")))?;
        let value = HeaderValue::from_str(value).map_err(|_| {
            TransportError::InvalidRequest(format!("invalid value for header `{name}`"))
        })?;
        request = request.header(header, value);
    }

    if let Some(body) = &options.body {
        request = request.json(body);
    }

    Ok(request)
}
