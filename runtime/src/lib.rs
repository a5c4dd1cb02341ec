//! # Composable API Runtime
//!
//! Runtime implementation for Composable API.
//!
//! This crate provides:
//!
//! - **Store**: holds the state snapshot, runs dispatched actions through the
//!   middleware chain and reduces the plain actions that reach its end
//! - **`ApiMiddleware`**: turns API calls into pending/success/failure actions
//!
//! ## Example
//!
//! ```ignore
//! use composable_api_core::{Action, LabelTriple, RequestDescriptor, ReducerConfig, configure_api_reducer};
//! use composable_api_runtime::{ApiMiddleware, Store};
//!
//! let reducer = configure_api_reducer(ReducerConfig::new(["PENDING", "SUCCESS", "FAILURE"]))?;
//! let store = Store::with_middleware(reducer, vec![Arc::new(ApiMiddleware::new(client))]);
//!
//! let labels = LabelTriple::new("PENDING", "SUCCESS", "FAILURE")?;
//! let handle = store
//!     .dispatch(Action::Api(RequestDescriptor::new("http://x.test", labels)))?
//!     .into_api_call();
//!
//! assert!(store.state().is_pending);
//! ```

use composable_api_core::{
    Action, Dispatch, DispatchError, Dispatched, INIT_ACTION_TYPE, Middleware, Next,
    PlainAction, Reducer,
};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tokio::sync::broadcast;

/// The API call middleware
pub mod middleware;

pub use middleware::ApiMiddleware;

/// Configuration for Store instances
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::default().with_broadcast_capacity(256);
/// let store = Store::with_config(reducer, middleware, config);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of reduced actions buffered for slow observers
    pub broadcast_capacity: usize,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(broadcast_capacity: usize) -> Self {
        Self { broadcast_capacity }
    }

    /// Set the action broadcast capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
        }
    }
}

/// The Store - runtime coordinator for a reducer and its middleware
///
/// The Store manages:
/// 1. State (an `Arc` snapshot behind a lock, replaced on every reduction)
/// 2. Reducer (pure state transitions)
/// 3. Middleware chain (runs before the reducer for every dispatch)
/// 4. Action broadcast (every reduced action, for observers)
///
/// Dispatching is synchronous. Middleware that need to wait on I/O (like
/// [`ApiMiddleware`]) spawn that work and dispatch follow-up actions later.
///
/// Cloning a store yields another handle to the same state.
pub struct Store<R>
where
    R: Reducer<Action = PlainAction>,
{
    inner: Arc<StoreInner<R>>,
}

struct StoreInner<R>
where
    R: Reducer<Action = PlainAction>,
{
    state: RwLock<Arc<R::State>>,
    reducer: R,
    middleware: Vec<Arc<dyn Middleware>>,
    /// Every reduced action, in reduction order.
    action_broadcast: broadcast::Sender<PlainAction>,
    /// Handed to middleware as their dispatch capability.
    this: Weak<StoreInner<R>>,
}

impl<R> Clone for Store<R>
where
    R: Reducer<Action = PlainAction>,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> Store<R>
where
    R: Reducer<Action = PlainAction> + Send + Sync + 'static,
    R::State: Send + Sync + 'static,
{
    /// Create a store without middleware
    ///
    /// The initial state is what the reducer returns for the
    /// [`INIT_ACTION_TYPE`] action and no prior state.
    #[must_use]
    pub fn new(reducer: R) -> Self {
        Self::with_config(reducer, Vec::new(), StoreConfig::default())
    }

    /// Create a store running `middleware` in order before the reducer
    #[must_use]
    pub fn with_middleware(reducer: R, middleware: Vec<Arc<dyn Middleware>>) -> Self {
        Self::with_config(reducer, middleware, StoreConfig::default())
    }

    /// Create a store with custom configuration
    #[must_use]
    pub fn with_config(
        reducer: R,
        middleware: Vec<Arc<dyn Middleware>>,
        config: StoreConfig,
    ) -> Self {
        let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));
        let initial_state = reducer.reduce(None, &PlainAction::new(INIT_ACTION_TYPE));

        tracing::debug!(middleware = middleware.len(), "Store created");

        Self {
            inner: Arc::new_cyclic(|this| StoreInner {
                state: RwLock::new(initial_state),
                reducer,
                middleware,
                action_broadcast,
                this: Weak::clone(this),
            }),
        }
    }

    /// Dispatch an action through the middleware chain
    ///
    /// Plain actions that reach the end of the chain are reduced before this
    /// returns. An API call intercepted by [`ApiMiddleware`] returns
    /// [`Dispatched::ApiCall`] once its pending action has been reduced.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnhandledApiCall`] if an API call reaches the
    ///   reducer, i.e. no API middleware is installed
    /// - any error a middleware returns
    pub fn dispatch(&self, action: Action) -> Result<Dispatched, DispatchError> {
        self.inner.dispatch(action)
    }

    /// Current state snapshot
    #[must_use]
    pub fn state(&self) -> Arc<R::State> {
        self.inner.read_state()
    }

    /// Read current state via a closure
    ///
    /// ```ignore
    /// let pending = store.state_with(|s| s.is_pending);
    /// ```
    pub fn state_with<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&R::State) -> T,
    {
        f(&self.inner.read_state())
    }

    /// Subscribe to every action the store reduces
    ///
    /// # Notes
    ///
    /// - API calls themselves are never broadcast, only their lifecycle actions
    /// - A receiver that falls behind skips old actions and receives
    ///   `RecvError::Lagged`
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<PlainAction> {
        self.inner.action_broadcast.subscribe()
    }
}

impl<R> Dispatch for StoreInner<R>
where
    R: Reducer<Action = PlainAction> + Send + Sync + 'static,
    R::State: Send + Sync + 'static,
{
    #[tracing::instrument(skip(self, action), fields(api_call = action.is_api_call()), name = "store_dispatch")]
    fn dispatch(&self, action: Action) -> Result<Dispatched, DispatchError> {
        metrics::counter!("store.actions.total").increment(1);

        let dispatcher: Arc<dyn Dispatch> = self.this.upgrade().ok_or(DispatchError::StoreClosed)?;
        let terminal = |action: Action| self.reduce(action);

        Next::new(&self.middleware, &dispatcher, &terminal).run(action)
    }
}

impl<R> StoreInner<R>
where
    R: Reducer<Action = PlainAction>,
{
    fn read_state(&self) -> Arc<R::State> {
        // A panicking reader cannot leave a half-written Arc behind
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// End of the middleware chain
    fn reduce(&self, action: Action) -> Result<Dispatched, DispatchError> {
        let action = match action {
            Action::Plain(action) => action,
            Action::Api(request) => {
                tracing::warn!(
                    endpoint = %request.endpoint,
                    "API call reached the reducer; no API middleware is installed"
                );
                return Err(DispatchError::UnhandledApiCall {
                    endpoint: request.endpoint,
                });
            },
        };

        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let next = self.reducer.reduce(Some(Arc::clone(&state)), &action);

            if Arc::ptr_eq(&state, &next) {
                tracing::trace!(action_type = %action.action_type, "State unchanged");
            } else {
                tracing::trace!(action_type = %action.action_type, "State replaced");
                *state = next;
            }
        }

        // No subscribers is not an error
        let _ = self.action_broadcast.send(action.clone());

        Ok(Dispatched::Reduced(action))
    }
}

impl<R> Dispatch for Store<R>
where
    R: Reducer<Action = PlainAction> + Send + Sync + 'static,
    R::State: Send + Sync + 'static,
{
    fn dispatch(&self, action: Action) -> Result<Dispatched, DispatchError> {
        Store::dispatch(self, action)
    }
}

impl<R> std::fmt::Debug for Store<R>
where
    R: Reducer<Action = PlainAction>,
    R::State: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.inner.read_state())
            .field("middleware", &self.inner.middleware.len())
            .finish_non_exhaustive()
    }
}
