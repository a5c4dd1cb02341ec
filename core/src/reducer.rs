//! Reducers: pure `(state, action) -> state` transitions
//!
//! States are held behind [`Arc`] and replaced wholesale. A reducer that
//! does not react to an action hands back the very same `Arc`, so observers
//! can detect "nothing changed" with [`Arc::ptr_eq`].

use crate::action::PlainAction;
use crate::error::ConfigError;
use crate::labels::{LabelTriple, Stage};
use crate::state::ApiState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// The Reducer trait - a pure state transition
///
/// # Type Parameters
///
/// - `State`: The state this reducer produces
/// - `Action`: The action type this reducer processes
///
/// # Example
///
/// ```
/// use composable_api_core::reducer::Reducer;
/// use std::sync::Arc;
///
/// struct CountReducer;
///
/// impl Reducer for CountReducer {
///     type State = u32;
///     type Action = ();
///
///     fn reduce(&self, state: Option<Arc<u32>>, _action: &()) -> Arc<u32> {
///         Arc::new(state.map_or(0, |count| *count + 1))
///     }
/// }
///
/// let state = CountReducer.reduce(None, &());
/// assert_eq!(*CountReducer.reduce(Some(state), &()), 1);
/// ```
pub trait Reducer {
    /// The state type this reducer produces
    type State;

    /// The action type this reducer processes
    type Action;

    /// Compute the next state
    ///
    /// `None` stands for a store that has no state yet; the reducer supplies
    /// its initial state. Must not panic and must not mutate through the
    /// input `Arc`.
    fn reduce(&self, state: Option<Arc<Self::State>>, action: &Self::Action)
    -> Arc<Self::State>;
}

/// Configuration accepted by [`configure_api_reducer`]
///
/// Mirrors the `{ types: [pending, success, failure] }` configuration object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducerConfig {
    /// The three lifecycle labels, in `[pending, success, failure]` order
    #[serde(default)]
    pub types: Option<Vec<String>>,
}

impl ReducerConfig {
    /// Configuration for the given labels
    #[must_use]
    pub fn new<I, T>(types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            types: Some(types.into_iter().map(Into::into).collect()),
        }
    }

    /// Read a configuration from its JSON shape
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Malformed`] if `value` is not an object or its
    /// `types` entry is not an array of strings.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        Self::deserialize(value).map_err(|e| ConfigError::Malformed(e.to_string()))
    }
}

/// Build an [`ApiReducer`] from its configuration
///
/// # Errors
///
/// - [`ConfigError::MissingTypes`] if `types` is absent or empty
/// - [`ConfigError::WrongLength`] if `types` does not hold exactly 3 labels
/// - [`ConfigError::EmptyLabel`] / [`ConfigError::DuplicateLabel`] if the
///   labels are not three distinct non-empty strings
///
/// # Example
///
/// ```
/// use composable_api_core::reducer::{configure_api_reducer, ReducerConfig};
///
/// let reducer = configure_api_reducer(ReducerConfig::new(["PENDING", "SUCCESS", "FAILURE"]))?;
/// assert!(configure_api_reducer(ReducerConfig::new(["Not", "3"])).is_err());
/// assert!(configure_api_reducer(ReducerConfig::default()).is_err());
/// # Ok::<(), composable_api_core::ConfigError>(())
/// ```
pub fn configure_api_reducer(config: ReducerConfig) -> Result<ApiReducer, ConfigError> {
    let types = config.types.ok_or(ConfigError::MissingTypes)?;
    Ok(ApiReducer::new(LabelTriple::try_from(types)?))
}

/// Folds one call site's lifecycle actions into an [`ApiState`]
///
/// | action type | next state |
/// |---|---|
/// | pending | previous state with `is_pending = true` |
/// | success | `error = None`, `is_pending = false`, `response = payload` |
/// | failure | `error = payload`, `is_pending = false`, response kept |
/// | anything else | the input `Arc`, untouched |
///
/// There is no transition guard: a success arriving while nothing is
/// pending is applied like any other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReducer {
    labels: LabelTriple,
}

impl ApiReducer {
    /// A reducer reacting to `labels`
    #[must_use]
    pub const fn new(labels: LabelTriple) -> Self {
        Self { labels }
    }

    /// The labels this reducer reacts to
    #[must_use]
    pub const fn labels(&self) -> &LabelTriple {
        &self.labels
    }

    /// Whether `action` is one of this reducer's lifecycle actions
    #[must_use]
    pub fn recognizes(&self, action: &PlainAction) -> bool {
        self.labels.stage_of(&action.action_type).is_some()
    }
}

impl Reducer for ApiReducer {
    type State = ApiState;
    type Action = PlainAction;

    fn reduce(&self, state: Option<Arc<ApiState>>, action: &PlainAction) -> Arc<ApiState> {
        let state = state.unwrap_or_else(|| Arc::new(ApiState::initial()));

        let Some(stage) = self.labels.stage_of(&action.action_type) else {
            return state;
        };

        let next = match stage {
            Stage::Pending => ApiState {
                is_pending: true,
                ..(*state).clone()
            },
            Stage::Success => ApiState {
                error: None,
                is_pending: false,
                response: action.payload.clone(),
            },
            Stage::Failure => ApiState {
                error: action.payload.clone(),
                is_pending: false,
                response: state.response.clone(),
            },
        };

        Arc::new(next)
    }
}
