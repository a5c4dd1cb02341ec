//! Integration tests for the API middleware lifecycle

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use composable_api_core::{
    Action, ApiCallError, ApiReducer, ApiState, Dispatch, DispatchError, Dispatched, LabelTriple,
    Middleware, Next, PlainAction, ReducerConfig, RequestDescriptor, RequestOptions, configure_api_reducer,
};
use composable_api_runtime::{ApiMiddleware, Store};
use composable_api_testing::{MockHttpClient, RecordedCall, RecordingDispatcher, helpers};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const ENDPOINT: &str = "http://fakeapi.test";

fn labels() -> LabelTriple {
    LabelTriple::new("PENDING", "SUCCESS", "FAILURE").unwrap()
}

fn api_call(endpoint: &str) -> Action {
    Action::Api(RequestDescriptor::new(endpoint, labels()))
}

#[tokio::test]
async fn test_pending_is_dispatched_before_the_request_settles() {
    helpers::init_tracing();
    let client = MockHttpClient::new().with_json(ENDPOINT, json!({ "data": "some_fake_data" }));
    let middleware = ApiMiddleware::new(client);
    let recorder = RecordingDispatcher::new();
    let dispatcher: Arc<dyn Dispatch> = Arc::new(recorder.clone());
    let terminal = |action: Action| recorder.record(action);

    let handle = middleware
        .handle(&dispatcher, api_call(ENDPOINT), Next::terminal(&dispatcher, &terminal))
        .unwrap()
        .into_api_call()
        .expect("API calls produce a handle");

    assert_eq!(recorder.plain_actions(), vec![PlainAction::new("PENDING")]);

    handle.await.unwrap();
    assert_eq!(recorder.count(), 2);
}

#[tokio::test]
async fn test_request_options_are_passed_to_the_client() {
    let client = MockHttpClient::new().with_json(ENDPOINT, json!({}));
    let store = helpers::create_test_store(["PENDING", "SUCCESS", "FAILURE"], client.clone()).unwrap();

    let options = RequestOptions::new()
        .with_method("POST")
        .with_header("accept", "application/json")
        .with_body(json!({ "title": "new" }));

    store
        .dispatch(Action::Api(
            RequestDescriptor::new(ENDPOINT, labels()).with_options(options.clone()),
        ))
        .unwrap()
        .into_api_call()
        .unwrap()
        .await
        .unwrap();

    assert_eq!(
        client.calls(),
        vec![RecordedCall {
            endpoint: ENDPOINT.to_string(),
            options: Some(options),
        }]
    );
}

#[tokio::test]
async fn test_success_dispatches_payload() {
    let client = MockHttpClient::new().with_json(ENDPOINT, json!({ "data": "some_fake_data" }));
    let middleware = ApiMiddleware::new(client);
    let recorder = RecordingDispatcher::new();
    let dispatcher: Arc<dyn Dispatch> = Arc::new(recorder.clone());
    let terminal = |action: Action| recorder.record(action);

    let success = middleware
        .handle(&dispatcher, api_call(ENDPOINT), Next::terminal(&dispatcher, &terminal))
        .unwrap()
        .into_api_call()
        .unwrap()
        .await
        .unwrap();

    let expected = PlainAction::with_payload("SUCCESS", json!({ "data": "some_fake_data" }));
    assert_eq!(success, expected);
    assert_eq!(
        recorder.plain_actions(),
        vec![PlainAction::new("PENDING"), expected]
    );
}

#[tokio::test]
async fn test_failure_dispatches_error_and_rejects() {
    let client = MockHttpClient::new().with_status(ENDPOINT, 500, "");
    let middleware = ApiMiddleware::new(client);
    let recorder = RecordingDispatcher::new();
    let dispatcher: Arc<dyn Dispatch> = Arc::new(recorder.clone());
    let terminal = |action: Action| recorder.record(action);

    let result = middleware
        .handle(&dispatcher, api_call(ENDPOINT), Next::terminal(&dispatcher, &terminal))
        .unwrap()
        .into_api_call()
        .unwrap()
        .await;

    let Err(ApiCallError::Failed { action }) = result else {
        panic!("a 500 response should reject the handle");
    };

    assert_eq!(action.action_type, "FAILURE");
    let error = action.payload.clone().unwrap();
    assert_eq!(error["kind"], "status");
    assert_eq!(error["status"], 500);
    assert_eq!(error["ok"], false);
    assert_eq!(error["url"], ENDPOINT);

    let dispatched = recorder.plain_actions();
    assert_eq!(dispatched.len(), 2);
    assert_eq!(dispatched[1], action);
}

#[tokio::test]
async fn test_plain_actions_pass_through() {
    let middleware = ApiMiddleware::new(MockHttpClient::new());
    let recorder = RecordingDispatcher::new();
    let dispatcher: Arc<dyn Dispatch> = Arc::new(recorder.clone());
    let forwarded = RecordingDispatcher::new();
    let terminal = |action: Action| forwarded.record(action);

    let dispatched = middleware
        .handle(
            &dispatcher,
            Action::Plain(PlainAction::new("NOT_API")),
            Next::terminal(&dispatcher, &terminal),
        )
        .unwrap();

    assert_eq!(dispatched.action(), Some(&PlainAction::new("NOT_API")));
    assert_eq!(forwarded.plain_actions(), vec![PlainAction::new("NOT_API")]);
    assert_eq!(recorder.count(), 0);
}

#[tokio::test]
async fn test_store_state_on_success() {
    let client = MockHttpClient::new().with_json(ENDPOINT, json!({ "name": "a" }));
    let store = helpers::create_test_store(["PENDING", "SUCCESS", "FAILURE"], client).unwrap();

    assert_eq!(*store.state(), ApiState::initial());

    let handle = store.dispatch(api_call(ENDPOINT)).unwrap().into_api_call().unwrap();

    assert_eq!(
        *store.state(),
        ApiState {
            error: None,
            is_pending: true,
            response: None,
        }
    );

    handle.await.unwrap();

    assert_eq!(
        *store.state(),
        ApiState {
            error: None,
            is_pending: false,
            response: Some(json!({ "name": "a" })),
        }
    );
}

#[tokio::test]
async fn test_store_state_on_failure() {
    let client = MockHttpClient::new().with_status(ENDPOINT, 400, "Not allowed");
    let store = helpers::create_test_store(["PENDING", "SUCCESS", "FAILURE"], client).unwrap();

    let handle = store.dispatch(api_call(ENDPOINT)).unwrap().into_api_call().unwrap();
    assert!(store.state().is_pending);

    let Err(ApiCallError::Failed { action }) = handle.await else {
        panic!("a 400 response should reject the handle");
    };

    let state = store.state();
    assert!(!state.is_pending);
    assert_eq!(state.response, None);
    assert_eq!(state.error, action.payload);
    assert_eq!(state.error.as_ref().unwrap()["body"], "Not allowed");
}

#[tokio::test]
async fn test_network_error_becomes_failure() {
    let client = MockHttpClient::new().with_network_error(ENDPOINT, "connection refused");
    let store = helpers::create_test_store(["PENDING", "SUCCESS", "FAILURE"], client).unwrap();

    let result = store
        .dispatch(api_call(ENDPOINT))
        .unwrap()
        .into_api_call()
        .unwrap()
        .await;

    let error = result.unwrap_err();
    let payload = error.action().unwrap().payload.clone().unwrap();
    assert_eq!(payload["kind"], "network");
    assert_eq!(payload["url"], ENDPOINT);
    assert!(payload["message"].as_str().unwrap().contains("connection refused"));
    assert_eq!(store.state().error, Some(payload));
}

#[tokio::test]
async fn test_non_json_success_body_becomes_failure() {
    let client = MockHttpClient::new().with_status(ENDPOINT, 200, "not json");
    let store = helpers::create_test_store(["PENDING", "SUCCESS", "FAILURE"], client).unwrap();

    let result = store
        .dispatch(api_call(ENDPOINT))
        .unwrap()
        .into_api_call()
        .unwrap()
        .await;

    assert!(matches!(result, Err(ApiCallError::Failed { .. })));
    assert_eq!(store.state().error.as_ref().unwrap()["kind"], "invalid_body");
}

#[test]
fn test_api_call_outside_runtime_is_rejected() {
    let store = helpers::create_test_store(["PENDING", "SUCCESS", "FAILURE"], MockHttpClient::new()).unwrap();

    let result = store.dispatch(api_call(ENDPOINT));

    assert!(matches!(result, Err(DispatchError::RuntimeUnavailable)));
    assert_eq!(*store.state(), ApiState::initial());
}

#[tokio::test]
async fn test_dropped_handle_still_settles_state() {
    let client = MockHttpClient::new().with_json(ENDPOINT, json!({ "name": "a" }));
    let store = helpers::create_test_store(["PENDING", "SUCCESS", "FAILURE"], client).unwrap();
    let mut actions = store.subscribe_actions();

    drop(store.dispatch(api_call(ENDPOINT)).unwrap());

    assert_eq!(actions.recv().await.unwrap(), PlainAction::new("PENDING"));
    assert_eq!(
        actions.recv().await.unwrap(),
        PlainAction::with_payload("SUCCESS", json!({ "name": "a" }))
    );
    assert_eq!(store.state().response, Some(json!({ "name": "a" })));
}

#[tokio::test]
async fn test_overlapping_calls_last_to_settle_wins() {
    let client = MockHttpClient::new()
        .with_delayed_json("http://fakeapi.test/slow", json!({ "n": 1 }), Duration::from_millis(50))
        .with_json("http://fakeapi.test/fast", json!({ "n": 2 }));
    let store = helpers::create_test_store(["PENDING", "SUCCESS", "FAILURE"], client).unwrap();

    let slow = store
        .dispatch(api_call("http://fakeapi.test/slow"))
        .unwrap()
        .into_api_call()
        .unwrap();
    let fast = store
        .dispatch(api_call("http://fakeapi.test/fast"))
        .unwrap()
        .into_api_call()
        .unwrap();

    fast.await.unwrap();
    assert_eq!(store.state().response, Some(json!({ "n": 2 })));

    slow.await.unwrap();
    assert_eq!(store.state().response, Some(json!({ "n": 1 })));
    assert!(!store.state().is_pending);
}

#[tokio::test]
async fn test_plain_actions_reach_the_reducer() {
    let client = MockHttpClient::new();
    let reducer = configure_api_reducer(ReducerConfig::new(["PENDING", "SUCCESS", "FAILURE"])).unwrap();
    let store = Store::with_middleware(reducer, vec![Arc::new(ApiMiddleware::new(client.clone()))]);

    store
        .dispatch(Action::Plain(PlainAction::new("PENDING")))
        .unwrap();

    assert!(store.state().is_pending);
    assert_eq!(client.call_count(), 0);
}

/// Refuses plain actions whose type is listed
struct Refuse(&'static [&'static str]);

impl Middleware for Refuse {
    fn handle(
        &self,
        _dispatcher: &Arc<dyn Dispatch>,
        action: Action,
        next: Next<'_>,
    ) -> Result<Dispatched, DispatchError> {
        match action {
            Action::Plain(action) if self.0.contains(&action.action_type.as_str()) => {
                Err(DispatchError::Rejected {
                    action_type: action.action_type,
                    reason: "refused".to_string(),
                })
            },
            other => next.run(other),
        }
    }
}

fn refusing_store(client: MockHttpClient, refused: &'static [&'static str]) -> Store<ApiReducer> {
    let reducer = configure_api_reducer(ReducerConfig::new(["PENDING", "SUCCESS", "FAILURE"])).unwrap();
    Store::with_middleware(
        reducer,
        vec![Arc::new(ApiMiddleware::new(client)), Arc::new(Refuse(refused))],
    )
}

#[tokio::test]
async fn test_refused_success_dispatches_failure() {
    let client = MockHttpClient::new().with_json(ENDPOINT, json!({ "name": "a" }));
    let store = refusing_store(client, &["SUCCESS"]);
    let mut actions = store.subscribe_actions();

    let result = store
        .dispatch(api_call(ENDPOINT))
        .unwrap()
        .into_api_call()
        .unwrap()
        .await;

    let Err(ApiCallError::Failed { action }) = result else {
        panic!("a refused success action should reject the handle");
    };
    assert_eq!(action.action_type, "FAILURE");

    let error = action.payload.clone().unwrap();
    assert_eq!(error["kind"], "dispatch");
    assert_eq!(error["url"], ENDPOINT);
    assert!(error["message"].as_str().unwrap().contains("SUCCESS"));

    let state = store.state();
    assert!(!state.is_pending);
    assert_eq!(state.response, None);
    assert_eq!(state.error, Some(error));

    assert_eq!(actions.recv().await.unwrap(), PlainAction::new("PENDING"));
    assert_eq!(actions.recv().await.unwrap(), action);
}

#[tokio::test]
async fn test_refused_failure_still_rejects() {
    let client = MockHttpClient::new().with_json(ENDPOINT, json!({ "name": "a" }));
    let store = refusing_store(client, &["SUCCESS", "FAILURE"]);

    let result = store
        .dispatch(api_call(ENDPOINT))
        .unwrap()
        .into_api_call()
        .unwrap()
        .await;

    assert!(matches!(result, Err(ApiCallError::Failed { action }) if action.action_type == "FAILURE"));
}

/// Log sink shared between the subscriber and the test
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_settle_events_are_inside_the_call_span() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let client = MockHttpClient::new().with_json(ENDPOINT, json!({ "name": "a" }));
    let store = helpers::create_test_store(["PENDING", "SUCCESS", "FAILURE"], client).unwrap();

    store
        .dispatch(api_call(ENDPOINT))
        .unwrap()
        .into_api_call()
        .unwrap()
        .await
        .unwrap();

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    let settled = output
        .lines()
        .find(|line| line.contains("API call succeeded"))
        .expect("success event logged");
    assert!(settled.contains(&format!("api_call{{endpoint={ENDPOINT}}}")));
}
