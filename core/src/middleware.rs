//! Middleware module - the dispatch chain
//!
//! A store runs every dispatched [`Action`] through an ordered chain of
//! [`Middleware`]. Each middleware either handles the action itself or
//! passes it on with [`Next::run`]; the end of the chain reduces it.
//!
//! Middleware receive the store's [`Dispatch`] capability so they can emit
//! new actions. Those re-enter the chain from the top.

use crate::action::{Action, PlainAction};
use crate::error::{ApiCallError, DispatchError};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// The store's dispatch capability
pub trait Dispatch: Send + Sync {
    /// Dispatch `action` through the full middleware chain
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] if the action cannot be processed.
    fn dispatch(&self, action: Action) -> Result<Dispatched, DispatchError>;
}

/// What a dispatch produced
#[derive(Debug)]
pub enum Dispatched {
    /// The action reached the reducer
    Reduced(PlainAction),

    /// An API call was started; the handle settles when it completes
    ApiCall(ApiCallHandle),
}

impl Dispatched {
    /// The reduced action, if the dispatch reached the reducer
    #[must_use]
    pub const fn action(&self) -> Option<&PlainAction> {
        match self {
            Self::Reduced(action) => Some(action),
            Self::ApiCall(_) => None,
        }
    }

    /// The call handle, if the dispatch started an API call
    #[must_use]
    pub fn into_api_call(self) -> Option<ApiCallHandle> {
        match self {
            Self::ApiCall(handle) => Some(handle),
            Self::Reduced(_) => None,
        }
    }
}

/// A link in the dispatch chain
///
/// # Example
///
/// ```ignore
/// struct LogActions;
///
/// impl Middleware for LogActions {
///     fn handle(
///         &self,
///         _dispatcher: &Arc<dyn Dispatch>,
///         action: Action,
///         next: Next<'_>,
///     ) -> Result<Dispatched, DispatchError> {
///         tracing::info!(?action, "dispatching");
///         next.run(action)
///     }
/// }
/// ```
pub trait Middleware: Send + Sync {
    /// Process one dispatched action
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] if the action cannot be processed.
    fn handle(
        &self,
        dispatcher: &Arc<dyn Dispatch>,
        action: Action,
        next: Next<'_>,
    ) -> Result<Dispatched, DispatchError>;
}

/// End of the chain: what happens once every middleware passed an action on
pub type Terminal<'a> = &'a (dyn Fn(Action) -> Result<Dispatched, DispatchError> + Send + Sync);

/// The rest of the chain after the current middleware
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    dispatcher: &'a Arc<dyn Dispatch>,
    terminal: Terminal<'a>,
}

impl<'a> Next<'a> {
    /// A continuation running `chain` and then `terminal`
    #[must_use]
    pub const fn new(
        chain: &'a [Arc<dyn Middleware>],
        dispatcher: &'a Arc<dyn Dispatch>,
        terminal: Terminal<'a>,
    ) -> Self {
        Self {
            chain,
            dispatcher,
            terminal,
        }
    }

    /// A continuation going straight to `terminal`
    #[must_use]
    pub const fn terminal(dispatcher: &'a Arc<dyn Dispatch>, terminal: Terminal<'a>) -> Self {
        Self::new(&[], dispatcher, terminal)
    }

    /// Pass `action` to the next handler
    ///
    /// # Errors
    ///
    /// Returns whatever error the next handler returns.
    pub fn run(self, action: Action) -> Result<Dispatched, DispatchError> {
        match self.chain.split_first() {
            Some((head, rest)) => head.handle(
                self.dispatcher,
                action,
                Next::new(rest, self.dispatcher, self.terminal),
            ),
            None => (self.terminal)(action),
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.chain.len())
            .finish_non_exhaustive()
    }
}

/// Outcome of an API call
pub type ApiCallResult = Result<PlainAction, ApiCallError>;

/// Future returned when an API call is dispatched
///
/// Resolves with the dispatched success action, or fails with
/// [`ApiCallError::Failed`] carrying the dispatched failure action.
///
/// Dropping the handle does not cancel the request: the call still runs to
/// completion and still dispatches its terminal action.
///
/// # Example
///
/// ```ignore
/// let handle = store.dispatch(Action::Api(request))?.into_api_call()?;
/// match handle.await {
///     Ok(success) => println!("loaded {:?}", success.payload),
///     Err(ApiCallError::Failed { action }) => println!("failed {:?}", action.payload),
///     Err(ApiCallError::Abandoned) => {},
/// }
/// ```
pub struct ApiCallHandle {
    receiver: oneshot::Receiver<ApiCallResult>,
}

impl ApiCallHandle {
    /// Create a handle and the settler that completes it
    #[must_use]
    pub fn channel() -> (ApiCallSettler, Self) {
        let (sender, receiver) = oneshot::channel();
        (ApiCallSettler { sender }, Self { receiver })
    }
}

impl Future for ApiCallHandle {
    type Output = ApiCallResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().receiver)
            .poll(cx)
            .map(|settled| settled.unwrap_or(Err(ApiCallError::Abandoned)))
    }
}

impl std::fmt::Debug for ApiCallHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCallHandle").finish_non_exhaustive()
    }
}

/// Completes an [`ApiCallHandle`] exactly once
///
/// Dropping the settler without settling makes the handle resolve to
/// [`ApiCallError::Abandoned`].
#[derive(Debug)]
pub struct ApiCallSettler {
    sender: oneshot::Sender<ApiCallResult>,
}

impl ApiCallSettler {
    /// Fulfill the call with the dispatched success action
    pub fn resolve(self, action: PlainAction) {
        // Nobody awaiting the handle is fine
        let _ = self.sender.send(Ok(action));
    }

    /// Reject the call with the dispatched failure action
    pub fn reject(self, action: PlainAction) {
        let _ = self.sender.send(Err(ApiCallError::Failed { action }));
    }
}
