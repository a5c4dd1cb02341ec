//! User lookup demo binary
//!
//! Fetches one resource through the API middleware and prints the state
//! before the call, while it is pending, and once it settled.
//!
//! ```text
//! cargo run -p user-lookup -- https://jsonplaceholder.typicode.com/users/1
//! ```

use anyhow::Context;
use composable_api_core::{
    API_ACTION_TYPE, Action, ApiCallError, ReducerConfig, configure_api_reducer,
};
use composable_api_http::{ClientConfig, ReqwestClient};
use composable_api_runtime::{ApiMiddleware, Store};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/users/1";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_lookup=debug,composable_api_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    println!("=== User Lookup: Composable API ===\n");

    let reducer = configure_api_reducer(ReducerConfig::from_json(&json!({
        "types": ["USER_PENDING", "USER_SUCCESS", "USER_FAILURE"]
    }))?)?;

    let client = ReqwestClient::with_config(
        ClientConfig::default()
            .with_timeout(Duration::from_secs(10))
            .with_user_agent("user-lookup-demo"),
    )?;

    let store = Store::with_middleware(reducer, vec![Arc::new(ApiMiddleware::new(client))]);
    println!("Initial state: {:?}", store.state());

    // Actions usually arrive as JSON from the host application
    let action = Action::from_value(json!({
        API_ACTION_TYPE: {
            "endpoint": endpoint,
            "types": ["USER_PENDING", "USER_SUCCESS", "USER_FAILURE"],
            "requestOptions": { "headers": { "accept": "application/json" } }
        }
    }))?;

    println!("\n>>> Dispatching API call to {endpoint}");
    let handle = store
        .dispatch(action)?
        .into_api_call()
        .context("API middleware did not start the call")?;
    println!("Pending state: {:?}", store.state());

    match handle.await {
        Ok(success) => tracing::info!(action_type = %success.action_type, "User loaded"),
        Err(ApiCallError::Failed { action }) => {
            tracing::warn!(action_type = %action.action_type, "User lookup failed");
        },
        Err(error) => return Err(error.into()),
    }

    let state = store.state();
    println!("\nSettled state:");
    println!("{}", serde_json::to_string_pretty(state.as_ref())?);

    Ok(())
}
