//! Reducer composition utilities
//!
//! A single [`ApiReducer`](crate::reducer::ApiReducer) tracks one call site.
//! Applications with several call sites give each its own label triple and
//! combine the reducers under string keys with [`combine_keyed`].
//!
//! # Example
//!
//! ```
//! use composable_api_core::action::PlainAction;
//! use composable_api_core::composition::combine_keyed;
//! use composable_api_core::reducer::{configure_api_reducer, Reducer, ReducerConfig};
//!
//! let users = configure_api_reducer(ReducerConfig::new(["USERS_P", "USERS_S", "USERS_F"]))?;
//! let posts = configure_api_reducer(ReducerConfig::new(["POSTS_P", "POSTS_S", "POSTS_F"]))?;
//! let reducer = combine_keyed([("users", users), ("posts", posts)]);
//!
//! let state = reducer.reduce(None, &PlainAction::new("USERS_P"));
//! assert!(state.get("users").is_some_and(|s| s.is_pending));
//! assert!(state.get("posts").is_some_and(|s| !s.is_pending));
//! # Ok::<(), composable_api_core::ConfigError>(())
//! ```

use crate::reducer::Reducer;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Combine reducers under string keys
///
/// Each reducer owns the slice of [`KeyedState`] stored under its key.
#[must_use]
pub fn combine_keyed<K, R, I>(reducers: I) -> KeyedReducer<R>
where
    I: IntoIterator<Item = (K, R)>,
    K: Into<String>,
    R: Reducer,
{
    KeyedReducer {
        reducers: reducers
            .into_iter()
            .map(|(key, reducer)| (key.into(), reducer))
            .collect(),
    }
}

/// State of a [`KeyedReducer`]: one sub-state per key
#[derive(Debug)]
pub struct KeyedState<S> {
    slices: BTreeMap<String, Arc<S>>,
}

impl<S> KeyedState<S> {
    /// The sub-state stored under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Arc<S>> {
        self.slices.get(key)
    }

    /// Iterate over `(key, sub-state)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<S>)> {
        self.slices.iter().map(|(key, state)| (key.as_str(), state))
    }

    /// Number of slices
    #[must_use]
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Whether there are no slices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

impl<S> Clone for KeyedState<S> {
    fn clone(&self) -> Self {
        Self {
            slices: self.slices.clone(),
        }
    }
}

impl<S: PartialEq> PartialEq for KeyedState<S> {
    fn eq(&self, other: &Self) -> bool {
        self.slices == other.slices
    }
}

/// Reducer routing every action to each keyed sub-reducer
///
/// Created by [`combine_keyed`]. When no sub-reducer changes its slice the
/// input state is returned as-is.
#[derive(Debug, Clone)]
pub struct KeyedReducer<R> {
    reducers: BTreeMap<String, R>,
}

impl<R: Reducer> Reducer for KeyedReducer<R> {
    type State = KeyedState<R::State>;
    type Action = R::Action;

    fn reduce(
        &self,
        state: Option<Arc<Self::State>>,
        action: &Self::Action,
    ) -> Arc<Self::State> {
        let mut changed = state.is_none();
        let mut slices = BTreeMap::new();

        for (key, reducer) in &self.reducers {
            let previous = state
                .as_ref()
                .and_then(|state| state.slices.get(key))
                .map(Arc::clone);
            let next = reducer.reduce(previous.clone(), action);

            if !previous.is_some_and(|previous| Arc::ptr_eq(&previous, &next)) {
                changed = true;
            }
            slices.insert(key.clone(), next);
        }

        match state {
            Some(state) if !changed => state,
            _ => Arc::new(KeyedState { slices }),
        }
    }
}
