//! API middleware: performs API calls and emits their lifecycle actions
//!
//! For every [`Action::Api`] the middleware:
//!
//! 1. dispatches `{ type: pending }` before any I/O,
//! 2. spawns the request on the current tokio runtime,
//! 3. dispatches `{ type: success, payload: body }` or
//!    `{ type: failure, payload: failure }` once the request settles,
//! 4. settles the returned [`ApiCallHandle`] with that same action.
//!
//! If the store refuses the success action, the failure action is dispatched
//! in its place with a `dispatch` failure payload, and the handle is rejected.
//!
//! Plain actions are passed to the next handler untouched.

use composable_api_core::{
    Action, ApiCallHandle, Dispatch, DispatchError, Dispatched, FetchFailure, HttpClient,
    HttpResponse, LabelTriple, Middleware, Next, PlainAction, RequestDescriptor, TransportError,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Middleware turning API calls into HTTP requests and lifecycle actions
///
/// # Example
///
/// ```ignore
/// let store = Store::with_middleware(
///     reducer,
///     vec![Arc::new(ApiMiddleware::new(ReqwestClient::new()))],
/// );
/// ```
pub struct ApiMiddleware<C> {
    client: Arc<C>,
}

impl<C> ApiMiddleware<C>
where
    C: HttpClient + 'static,
{
    /// Middleware performing requests with `client`
    #[must_use]
    pub fn new(client: C) -> Self {
        Self::from_arc(Arc::new(client))
    }

    /// Middleware sharing an existing client
    #[must_use]
    pub const fn from_arc(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Start the call described by `request`
    #[tracing::instrument(
        skip(self, dispatcher, request),
        fields(endpoint = %request.endpoint),
        name = "api_call"
    )]
    fn start(
        &self,
        dispatcher: &Arc<dyn Dispatch>,
        request: RequestDescriptor,
    ) -> Result<Dispatched, DispatchError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| DispatchError::RuntimeUnavailable)?;

        let RequestDescriptor {
            endpoint,
            types,
            request_options,
        } = request;

        metrics::counter!("api.requests.total").increment(1);
        tracing::debug!(pending = types.pending(), "Dispatching pending action");

        dispatcher.dispatch(Action::Plain(PlainAction::new(types.pending())))?;

        let (settler, handle) = ApiCallHandle::channel();
        let response = self.client.fetch(endpoint.clone(), request_options);
        let dispatcher = Arc::clone(dispatcher);

        let call = async move {
            let started = Instant::now();
            let outcome = settle(&endpoint, response.await);
            metrics::histogram!("api.request.duration_seconds")
                .record(started.elapsed().as_secs_f64());

            let failure = match outcome {
                Ok(body) => {
                    metrics::counter!("api.requests.succeeded").increment(1);
                    tracing::debug!(success = types.success(), "API call succeeded");

                    let action = PlainAction::with_payload(types.success(), body);
                    match dispatch_terminal(dispatcher.as_ref(), &types, &action) {
                        Ok(()) => {
                            settler.resolve(action);
                            return;
                        },
                        Err(error) => FetchFailure::from_dispatch(&endpoint, &error),
                    }
                },
                Err(failure) => {
                    metrics::counter!("api.requests.failed").increment(1);
                    tracing::warn!(
                        status = failure.status(),
                        failure = types.failure(),
                        "API call failed"
                    );
                    failure
                },
            };

            let action = PlainAction::with_payload(types.failure(), failure.to_payload());
            // Logged inside; the handle is rejected either way
            let _ = dispatch_terminal(dispatcher.as_ref(), &types, &action);
            settler.reject(action);
        };

        runtime.spawn(call.in_current_span());

        Ok(Dispatched::ApiCall(handle))
    }
}

impl<C> Middleware for ApiMiddleware<C>
where
    C: HttpClient + 'static,
{
    fn handle(
        &self,
        dispatcher: &Arc<dyn Dispatch>,
        action: Action,
        next: Next<'_>,
    ) -> Result<Dispatched, DispatchError> {
        match action {
            Action::Api(request) => self.start(dispatcher, request),
            plain @ Action::Plain(_) => next.run(plain),
        }
    }
}

impl<C> std::fmt::Debug for ApiMiddleware<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMiddleware").finish_non_exhaustive()
    }
}

/// Map a request outcome to the success body or the failure payload
fn settle(
    endpoint: &str,
    response: Result<HttpResponse, TransportError>,
) -> Result<Value, FetchFailure> {
    let response = response.map_err(|error| FetchFailure::from_transport(endpoint, &error))?;

    if !response.ok() {
        return Err(FetchFailure::from_response(&response));
    }

    response
        .json()
        .map_err(|error| FetchFailure::invalid_body(&response, &error))
}

/// Dispatch a success or failure action
///
/// # Errors
///
/// Returns the store's [`DispatchError`] after logging it.
fn dispatch_terminal(
    dispatcher: &dyn Dispatch,
    types: &LabelTriple,
    action: &PlainAction,
) -> Result<(), DispatchError> {
    dispatcher
        .dispatch(Action::Plain(action.clone()))
        .map(|_| ())
        .inspect_err(|error| {
            tracing::error!(
                %error,
                pending = types.pending(),
                action_type = %action.action_type,
                "Failed to dispatch terminal action"
            );
        })
}
