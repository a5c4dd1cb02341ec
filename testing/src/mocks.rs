//! Mock collaborators for API middleware tests
//!
//! - [`MockHttpClient`]: canned responses per endpoint, records every call
//! - [`RecordingDispatcher`]: a dispatch capability that only records

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on poisoned test locks

use composable_api_core::{
    Action, Dispatch, DispatchError, Dispatched, HttpClient, HttpResponse, PlainAction,
    RequestOptions, TransportError,
};
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One call made through a [`MockHttpClient`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Requested endpoint
    pub endpoint: String,
    /// Request options, exactly as handed to the client
    pub options: Option<RequestOptions>,
}

#[derive(Debug, Clone)]
enum MockReply {
    Response { status: u16, body: Vec<u8> },
    NetworkError(String),
}

#[derive(Debug, Clone)]
struct MockRoute {
    reply: MockReply,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct MockState {
    routes: HashMap<String, MockRoute>,
    calls: Vec<RecordedCall>,
}

/// HTTP client returning canned responses
///
/// Calls are recorded when `fetch` is invoked, before the returned future is
/// polled. Endpoints without a registered reply fail with a network error.
///
/// # Example
///
/// ```
/// use composable_api_testing::MockHttpClient;
/// use serde_json::json;
///
/// let client = MockHttpClient::new()
///     .with_json("http://fakeapi.test", json!({ "data": "some_fake_data" }))
///     .with_status("http://fakeapi.test/error", 500, "");
///
/// assert_eq!(client.call_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    state: Arc<Mutex<MockState>>,
}

impl MockHttpClient {
    /// A client with no registered endpoints
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `endpoint` with status 200 and `body` as JSON
    #[must_use]
    pub fn with_json(self, endpoint: impl Into<String>, body: Value) -> Self {
        self.with_status(endpoint, 200, body.to_string())
    }

    /// Reply to `endpoint` with `status` and a raw body
    #[must_use]
    pub fn with_status(self, endpoint: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.route(
            endpoint.into(),
            MockReply::Response {
                status,
                body: body.into(),
            },
            None,
        )
    }

    /// Like [`with_json`](Self::with_json), but the reply arrives after `delay`
    #[must_use]
    pub fn with_delayed_json(self, endpoint: impl Into<String>, body: Value, delay: Duration) -> Self {
        self.route(
            endpoint.into(),
            MockReply::Response {
                status: 200,
                body: body.to_string().into_bytes(),
            },
            Some(delay),
        )
    }

    /// Fail requests to `endpoint` as if the connection was refused
    #[must_use]
    pub fn with_network_error(self, endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        self.route(endpoint.into(), MockReply::NetworkError(message.into()), None)
    }

    fn route(self, endpoint: String, reply: MockReply, delay: Option<Duration>) -> Self {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert(endpoint, MockRoute { reply, delay });
        self
    }

    /// Every call made so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls made so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }
}

impl HttpClient for MockHttpClient {
    fn fetch(
        &self,
        endpoint: String,
        options: Option<RequestOptions>,
    ) -> BoxFuture<'static, Result<HttpResponse, TransportError>> {
        let route = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(RecordedCall {
                endpoint: endpoint.clone(),
                options,
            });
            state.routes.get(&endpoint).cloned()
        };

        Box::pin(async move {
            let Some(route) = route else {
                return Err(TransportError::Network {
                    url: endpoint,
                    message: "no mock registered for endpoint".to_string(),
                });
            };

            if let Some(delay) = route.delay {
                tokio::time::sleep(delay).await;
            }

            match route.reply {
                MockReply::Response { status, body } => Ok(HttpResponse::new(endpoint, status, body)),
                MockReply::NetworkError(message) => Err(TransportError::Network {
                    url: endpoint,
                    message,
                }),
            }
        })
    }
}

/// Dispatch capability that records actions instead of running a store
///
/// Plain actions are "reduced" by being recorded; API calls are recorded and
/// rejected with [`DispatchError::UnhandledApiCall`].
///
/// Also usable as the end of a chain via [`record`](Self::record), to check
/// what a middleware forwarded.
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatcher {
    actions: Arc<Mutex<Vec<Action>>>,
}

impl RecordingDispatcher {
    /// An empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `action`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnhandledApiCall`] for API calls.
    pub fn record(&self, action: Action) -> Result<Dispatched, DispatchError> {
        self.actions.lock().unwrap().push(action.clone());
        match action {
            Action::Plain(action) => Ok(Dispatched::Reduced(action)),
            Action::Api(request) => Err(DispatchError::UnhandledApiCall {
                endpoint: request.endpoint,
            }),
        }
    }

    /// Every recorded action, in order
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    /// Recorded plain actions, in order
    #[must_use]
    pub fn plain_actions(&self) -> Vec<PlainAction> {
        self.actions()
            .into_iter()
            .filter_map(|action| match action {
                Action::Plain(action) => Some(action),
                Action::Api(_) => None,
            })
            .collect()
    }

    /// Number of recorded actions
    #[must_use]
    pub fn count(&self) -> usize {
        self.actions.lock().unwrap().len()
    }
}

impl Dispatch for RecordingDispatcher {
    fn dispatch(&self, action: Action) -> Result<Dispatched, DispatchError> {
        self.record(action)
    }
}
