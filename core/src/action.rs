//! Actions flowing through the store
//!
//! Every dispatched value is an [`Action`]: either a [`PlainAction`] bound
//! for the reducers, or an API call bound for the API middleware. The split
//! is a tagged variant, so middleware match on it instead of probing shapes.
//!
//! Actions arriving as JSON are classified once, at the boundary, by
//! [`Action::from_value`]: an object holding [`API_ACTION_TYPE`] with an
//! object value is an API call, anything else must be a plain `{ type,
//! payload?, ... }` action. Keys a plain action carries beyond `type` and
//! `payload` are kept and written back out unchanged.

use crate::error::ActionError;
use crate::request::RequestDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marker key identifying an API call in the JSON action shape
///
/// ```json
/// { "@@composable-api/CALL_API": { "endpoint": "...", "types": ["P", "S", "F"] } }
/// ```
pub const API_ACTION_TYPE: &str = "@@composable-api/CALL_API";

/// Type of the action a store reduces once at creation to build its initial state
pub const INIT_ACTION_TYPE: &str = "@@composable-api/INIT";

/// An action the reducers see: a `type` label and an optional payload
///
/// Lifecycle actions emitted by the API middleware are plain actions whose
/// type is one of the call's three labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainAction {
    /// Action-type label
    #[serde(rename = "type")]
    pub action_type: String,

    /// Optional JSON payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Any other keys the action carried (`meta`, `error`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlainAction {
    /// An action without payload
    #[must_use]
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: None,
            extra: Map::new(),
        }
    }

    /// An action carrying `payload`
    #[must_use]
    pub fn with_payload(action_type: impl Into<String>, payload: Value) -> Self {
        Self {
            action_type: action_type.into(),
            payload: Some(payload),
            extra: Map::new(),
        }
    }

    /// Attach an extra top-level key
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Everything that can be dispatched to a store
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// An action for the reducers
    Plain(PlainAction),

    /// A request for the API middleware to perform
    Api(RequestDescriptor),
}

impl Action {
    /// Classify a JSON action
    ///
    /// # Errors
    ///
    /// - [`ActionError::NotAnObject`] if `value` is not a JSON object
    /// - [`ActionError::MalformedApiCall`] if the marker holds an object that
    ///   is not a valid request descriptor
    /// - [`ActionError::MissingType`] if a plain action has no string `type`
    pub fn from_value(value: Value) -> Result<Self, ActionError> {
        let Value::Object(mut map) = value else {
            return Err(ActionError::NotAnObject);
        };

        if map.get(API_ACTION_TYPE).is_some_and(Value::is_object) {
            let call = map.remove(API_ACTION_TYPE).unwrap_or(Value::Null);
            return serde_json::from_value(call)
                .map(Action::Api)
                .map_err(|e| ActionError::MalformedApiCall(e.to_string()));
        }

        let action_type = match map.remove("type") {
            Some(Value::String(action_type)) => action_type,
            _ => return Err(ActionError::MissingType),
        };

        let payload = map.remove("payload");

        Ok(Action::Plain(PlainAction {
            action_type,
            payload,
            extra: map,
        }))
    }

    /// The JSON shape of this action
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Plain(action) => {
                let mut map = action.extra.clone();
                map.insert("type".to_string(), Value::String(action.action_type.clone()));
                if let Some(payload) = &action.payload {
                    map.insert("payload".to_string(), payload.clone());
                }
                Value::Object(map)
            },
            Self::Api(request) => {
                let mut map = Map::new();
                // Descriptor fields are strings and string maps; this cannot fail.
                let call = serde_json::to_value(request).unwrap_or(Value::Null);
                map.insert(API_ACTION_TYPE.to_string(), call);
                Value::Object(map)
            },
        }
    }

    /// Whether this is an API call
    #[must_use]
    pub const fn is_api_call(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}

impl From<PlainAction> for Action {
    fn from(action: PlainAction) -> Self {
        Self::Plain(action)
    }
}

impl From<RequestDescriptor> for Action {
    fn from(request: RequestDescriptor) -> Self {
        Self::Api(request)
    }
}

impl TryFrom<Value> for Action {
    type Error = ActionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}
