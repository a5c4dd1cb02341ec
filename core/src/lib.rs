//! # Composable API Core
//!
//! Core types and traits for turning declarative API calls into lifecycle
//! actions and folding those actions into state.
//!
//! ## Core Concepts
//!
//! - **Action**: either a [`PlainAction`] for reducers or an API call
//!   ([`RequestDescriptor`]) for the API middleware
//! - **Label triple**: the `[pending, success, failure]` action types of one
//!   call site
//! - **Reducer**: pure function `(State, Action) → State`
//! - **Middleware**: a link in the dispatch chain, handed the store's
//!   dispatch capability
//! - **Environment**: the [`HttpClient`] the API middleware performs
//!   requests with
//!
//! ## Flow
//!
//! 1. A caller dispatches `Action::Api(request)`
//! 2. The API middleware dispatches `{ type: pending }` synchronously
//! 3. The request runs; on settle `{ type: success, payload: body }` or
//!    `{ type: failure, payload: failure }` is dispatched
//! 4. An [`ApiReducer`] configured with the same labels folds each of them
//!    into an [`ApiState`]
//!
//! ## Example
//!
//! ```
//! use composable_api_core::{ApiState, PlainAction, Reducer, ReducerConfig, configure_api_reducer};
//! use serde_json::json;
//!
//! let reducer = configure_api_reducer(ReducerConfig::new(["PENDING", "SUCCESS", "FAILURE"]))?;
//!
//! let state = reducer.reduce(None, &PlainAction::new("PENDING"));
//! assert!(state.is_pending);
//!
//! let state = reducer.reduce(
//!     Some(state),
//!     &PlainAction::with_payload("SUCCESS", json!({ "name": "a" })),
//! );
//! assert_eq!(
//!     *state,
//!     ApiState { error: None, is_pending: false, response: Some(json!({ "name": "a" })) }
//! );
//! # Ok::<(), composable_api_core::ConfigError>(())
//! ```

pub mod action;
pub mod composition;
pub mod environment;
pub mod error;
pub mod labels;
pub mod middleware;
pub mod reducer;
pub mod request;
pub mod state;

// Re-export commonly used types
pub use action::{API_ACTION_TYPE, Action, INIT_ACTION_TYPE, PlainAction};
pub use environment::{FetchFailure, HttpClient, HttpResponse};
pub use error::{ActionError, ApiCallError, ConfigError, DispatchError, TransportError};
pub use labels::{LabelTriple, Stage};
pub use middleware::{ApiCallHandle, ApiCallResult, Dispatch, Dispatched, Middleware, Next};
pub use reducer::{ApiReducer, Reducer, ReducerConfig, configure_api_reducer};
pub use request::{RequestDescriptor, RequestOptions};
pub use state::ApiState;
