//! Error types shared by the reducer factory, the action boundary and the
//! dispatch chain.

use crate::action::PlainAction;
use thiserror::Error;

/// Errors raised while building a reducer from its configuration
///
/// These fail fast, at construction time. A reducer that was built
/// successfully never fails when called.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration has no `types` entry
    #[error("Missing `types` array")]
    MissingTypes,

    /// `types` is present but does not hold exactly three labels
    #[error("`types` must be an array of 3 strings, found {found}")]
    WrongLength {
        /// Number of labels supplied
        found: usize,
    },

    /// One of the labels is an empty string
    #[error("Label at position {index} is empty")]
    EmptyLabel {
        /// Position of the empty label in the triple
        index: usize,
    },

    /// The same label appears more than once
    #[error("Label `{label}` is used for more than one lifecycle stage")]
    DuplicateLabel {
        /// The repeated label
        label: String,
    },

    /// The configuration could not be read as `{ types: [..] }`
    #[error("Malformed reducer configuration: {0}")]
    Malformed(String),
}

/// Errors raised while reading an action from its JSON shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Actions must be JSON objects
    #[error("Action must be a JSON object")]
    NotAnObject,

    /// A plain action without a string `type`
    #[error("Action is missing a string `type`")]
    MissingType,

    /// The API marker holds an object that is not a valid request descriptor
    #[error("Malformed API call: {0}")]
    MalformedApiCall(String),
}

/// Errors returned synchronously from `dispatch`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// An API action reached the end of the middleware chain
    ///
    /// This means no API middleware is installed in the store.
    #[error("No middleware handled the API call to {endpoint}")]
    UnhandledApiCall {
        /// Endpoint of the unhandled call
        endpoint: String,
    },

    /// The API middleware needs a tokio runtime to run the request on
    #[error("API calls must be dispatched from within a tokio runtime")]
    RuntimeUnavailable,

    /// The store was dropped while the action was being dispatched
    #[error("The store has been dropped")]
    StoreClosed,

    /// A middleware refused the action
    #[error("Action `{action_type}` rejected: {reason}")]
    Rejected {
        /// Type of the refused action
        action_type: String,
        /// Why it was refused
        reason: String,
    },
}

/// Errors produced by an [`HttpClient`](crate::environment::HttpClient)
/// before a response is available
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be sent or no response arrived
    #[error("Request to {url} failed: {message}")]
    Network {
        /// Requested URL
        url: String,
        /// Underlying error message
        message: String,
    },

    /// The request options could not be turned into a request
    #[error("Invalid request options: {0}")]
    InvalidRequest(String),

    /// The response arrived but its body could not be read
    #[error("Failed to read response body from {url}: {message}")]
    Body {
        /// Requested URL
        url: String,
        /// Underlying error message
        message: String,
    },
}

impl TransportError {
    /// The URL the failed request targeted, if known
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Network { url, .. } | Self::Body { url, .. } => Some(url),
            Self::InvalidRequest(_) => None,
        }
    }
}

/// The rejected outcome of an API call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiCallError {
    /// The request failed; carries the failure action that was dispatched
    #[error("API call failed with `{}`", .action.action_type)]
    Failed {
        /// The dispatched failure action
        action: PlainAction,
    },

    /// The request task ended without settling the call
    #[error("API call was abandoned before it settled")]
    Abandoned,
}

impl ApiCallError {
    /// The failure action, if the call was rejected by a failed request
    #[must_use]
    pub const fn action(&self) -> Option<&PlainAction> {
        match self {
            Self::Failed { action } => Some(action),
            Self::Abandoned => None,
        }
    }
}
