//! Integration tests for the reqwest client against a mock HTTP server

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use composable_api_core::{
    Action, ApiCallError, ApiState, HttpClient, LabelTriple, RequestDescriptor, RequestOptions,
    ReducerConfig, TransportError, configure_api_reducer,
};
use composable_api_http::{ClientConfig, ReqwestClient};
use composable_api_runtime::{ApiMiddleware, Store};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "a" })))
        .expect(1)
        .mount(&server)
        .await;

    let response = ReqwestClient::new()
        .fetch(format!("{}/users/1", server.uri()), None)
        .await
        .unwrap();

    assert!(response.ok());
    assert_eq!(response.status, 200);
    assert_eq!(response.url, format!("{}/users/1", server.uri()));
    assert_eq!(response.json().unwrap(), json!({ "name": "a" }));
}

#[tokio::test]
async fn test_request_options_are_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .and(header("authorization", "bearer token"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({ "title": "new" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    let options = RequestOptions::new()
        .with_method("POST")
        .with_header("accept", "application/json")
        .with_header("authorization", "bearer token")
        .with_body(json!({ "title": "new" }));

    let response = ReqwestClient::new()
        .fetch(format!("{}/items", server.uri()), Some(options))
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.json().unwrap(), json!({ "id": 7 }));
}

#[tokio::test]
async fn test_default_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("x-client", "composable-api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReqwestClient::with_config(
        ClientConfig::default().with_default_header("x-client", "composable-api"),
    )
    .unwrap();

    let response = client.fetch(server.uri(), None).await.unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_error_status_is_a_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let response = ReqwestClient::new()
        .fetch(format!("{}/error", server.uri()), None)
        .await
        .unwrap();

    assert!(!response.ok());
    assert_eq!(response.status, 500);
    assert_eq!(response.text(), "boom");
}

#[tokio::test]
async fn test_connection_failure_is_network_error() {
    // Nothing listens on the discard port
    let result = ReqwestClient::new()
        .fetch("http://127.0.0.1:9/".to_string(), None)
        .await;

    assert!(matches!(result, Err(TransportError::Network { url, .. }) if url == "http://127.0.0.1:9/"));
}

#[tokio::test]
async fn test_store_round_trip_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "name": "mario the ghost", "age": 23 })),
        )
        .mount(&server)
        .await;

    let reducer = configure_api_reducer(ReducerConfig::new(["PENDING", "SUCCESS", "FAILURE"])).unwrap();
    let store = Store::with_middleware(
        reducer,
        vec![Arc::new(ApiMiddleware::new(ReqwestClient::new()))],
    );

    let labels = LabelTriple::new("PENDING", "SUCCESS", "FAILURE").unwrap();
    let handle = store
        .dispatch(Action::Api(RequestDescriptor::new(server.uri(), labels)))
        .unwrap()
        .into_api_call()
        .unwrap();

    assert!(store.state().is_pending);

    let success = handle.await.unwrap();

    assert_eq!(
        *store.state(),
        ApiState {
            error: None,
            is_pending: false,
            response: Some(json!({ "name": "mario the ghost", "age": 23 })),
        }
    );
    assert_eq!(store.state().response, success.payload);
}

#[tokio::test]
async fn test_store_round_trip_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Not allowed"))
        .mount(&server)
        .await;

    let reducer = configure_api_reducer(ReducerConfig::new(["PENDING", "SUCCESS", "FAILURE"])).unwrap();
    let store = Store::with_middleware(
        reducer,
        vec![Arc::new(ApiMiddleware::new(ReqwestClient::new()))],
    );

    let labels = LabelTriple::new("PENDING", "SUCCESS", "FAILURE").unwrap();
    let endpoint = format!("{}/", server.uri());
    let handle = store
        .dispatch(Action::Api(RequestDescriptor::new(endpoint.clone(), labels)))
        .unwrap()
        .into_api_call()
        .unwrap();

    let Err(ApiCallError::Failed { action }) = handle.await else {
        panic!("request should have been rejected");
    };

    let state = store.state();
    assert!(!state.is_pending);
    assert_eq!(state.response, None);

    let error = state.error.clone().unwrap();
    assert_eq!(error["status"], 400);
    assert_eq!(error["url"], endpoint.as_str());
    assert_eq!(error["body"], "Not allowed");
    assert_eq!(state.error, action.payload);
}
