//! # Composable API Testing
//!
//! Testing utilities and helpers for Composable API.
//!
//! This crate provides:
//! - [`MockHttpClient`]: canned HTTP responses with call recording
//! - [`RecordingDispatcher`]: a dispatch capability that records actions
//! - [`ReducerTest`]: Given-When-Then assertions for reducers
//! - Store and tracing helpers for integration tests
//!
//! ## Example
//!
//! ```
//! use composable_api_core::{Action, LabelTriple, RequestDescriptor};
//! use composable_api_testing::{MockHttpClient, helpers};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let client = MockHttpClient::new().with_json("http://fakeapi.test", json!({ "name": "a" }));
//! let store = helpers::create_test_store(["PENDING", "SUCCESS", "FAILURE"], client).unwrap();
//!
//! let labels = LabelTriple::new("PENDING", "SUCCESS", "FAILURE").unwrap();
//! let handle = store
//!     .dispatch(Action::Api(RequestDescriptor::new("http://fakeapi.test", labels)))
//!     .unwrap()
//!     .into_api_call()
//!     .unwrap();
//!
//! handle.await.unwrap();
//! assert_eq!(store.state().response, Some(json!({ "name": "a" })));
//! # });
//! ```

pub mod mocks;

pub use mocks::{MockHttpClient, RecordedCall, RecordingDispatcher};
pub use reducer_test::ReducerTest;

/// Test helpers
pub mod helpers {
    use composable_api_core::{
        ApiReducer, ConfigError, HttpClient, ReducerConfig, configure_api_reducer,
    };
    use composable_api_runtime::{ApiMiddleware, Store};
    use std::sync::Arc;

    /// Store running an [`ApiReducer`] for `types` behind an [`ApiMiddleware`]
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `types` is not a valid label triple.
    pub fn create_test_store<I, T, C>(types: I, client: C) -> Result<Store<ApiReducer>, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
        C: HttpClient + 'static,
    {
        let reducer = configure_api_reducer(ReducerConfig::new(types))?;
        Ok(Store::with_middleware(
            reducer,
            vec![Arc::new(ApiMiddleware::new(client))],
        ))
    }

    /// Install a test subscriber honoring `RUST_LOG`
    ///
    /// Safe to call from every test; only the first call installs.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}
