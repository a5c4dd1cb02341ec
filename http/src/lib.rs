//! # Composable API HTTP Client
//!
//! [`HttpClient`](composable_api_core::HttpClient) implementation backed by
//! `reqwest`, for use with the API middleware.
//!
//! ## Example
//!
//! ```no_run
//! use composable_api_core::{ReducerConfig, configure_api_reducer};
//! use composable_api_http::{ClientConfig, ReqwestClient};
//! use composable_api_runtime::{ApiMiddleware, Store};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ReqwestClient::with_config(
//!     ClientConfig::default()
//!         .with_timeout(Duration::from_secs(10))
//!         .with_default_header("accept", "application/json"),
//! )?;
//!
//! let reducer = configure_api_reducer(ReducerConfig::new(["PENDING", "SUCCESS", "FAILURE"]))?;
//! let store = Store::with_middleware(reducer, vec![Arc::new(ApiMiddleware::new(client))]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Behavior
//!
//! - Request options from the API action are applied as-is: method
//!   (default `GET`), headers, JSON body
//! - Every status code yields a response; only failures to obtain one are
//!   reported as [`TransportError`](composable_api_core::TransportError)

pub mod client;
pub mod error;

// Re-export main types for convenience
pub use client::{ClientConfig, ReqwestClient};
pub use error::ClientError;
