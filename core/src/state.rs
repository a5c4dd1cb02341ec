//! The API state record folded from lifecycle actions

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of the most recent call for one label triple
///
/// `error` and `response` are not mutually exclusive: a failure keeps the
/// previous response, and a pending call keeps the previous error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiState {
    /// Payload of the last failure action, cleared by a success
    pub error: Option<Value>,

    /// Whether a call is in flight
    pub is_pending: bool,

    /// Payload of the last success action
    pub response: Option<Value>,
}

impl ApiState {
    /// The record a store starts from: nothing pending, no response, no error
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            error: None,
            is_pending: false,
            response: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_initial_state_shape() {
        assert_eq!(
            serde_json::to_value(ApiState::initial()).unwrap(),
            json!({ "error": null, "isPending": false, "response": null })
        );
        assert_eq!(ApiState::initial(), ApiState::default());
    }
}
