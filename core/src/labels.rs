//! The ordered `[pending, success, failure]` label triple

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Lifecycle stage named by one label of a [`LabelTriple`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The request has been issued
    Pending,
    /// The request settled with a parsed body
    Success,
    /// The request failed
    Failure,
}

/// Three distinct, non-empty action-type labels for one call site
///
/// Can only be obtained through validation, so a reducer holding a
/// `LabelTriple` always matches on three different labels.
///
/// # Example
///
/// ```
/// use composable_api_core::labels::{LabelTriple, Stage};
///
/// let labels = LabelTriple::new("USER_PENDING", "USER_SUCCESS", "USER_FAILURE")?;
/// assert_eq!(labels.stage_of("USER_SUCCESS"), Some(Stage::Success));
/// assert_eq!(labels.stage_of("OTHER"), None);
/// # Ok::<(), composable_api_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelTriple {
    pending: String,
    success: String,
    failure: String,
}

impl LabelTriple {
    /// Build a triple from three labels
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyLabel`] or [`ConfigError::DuplicateLabel`]
    /// when the labels are not three distinct non-empty strings.
    pub fn new(
        pending: impl Into<String>,
        success: impl Into<String>,
        failure: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let labels = [pending.into(), success.into(), failure.into()];

        if let Some(index) = labels.iter().position(String::is_empty) {
            return Err(ConfigError::EmptyLabel { index });
        }

        for (i, label) in labels.iter().enumerate() {
            if labels[i + 1..].contains(label) {
                return Err(ConfigError::DuplicateLabel {
                    label: label.clone(),
                });
            }
        }

        let [pending, success, failure] = labels;
        Ok(Self {
            pending,
            success,
            failure,
        })
    }

    /// Label of the pending action
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Label of the success action
    #[must_use]
    pub fn success(&self) -> &str {
        &self.success
    }

    /// Label of the failure action
    #[must_use]
    pub fn failure(&self) -> &str {
        &self.failure
    }

    /// Which stage `action_type` names, if any
    #[must_use]
    pub fn stage_of(&self, action_type: &str) -> Option<Stage> {
        if action_type == self.pending {
            Some(Stage::Pending)
        } else if action_type == self.success {
            Some(Stage::Success)
        } else if action_type == self.failure {
            Some(Stage::Failure)
        } else {
            None
        }
    }
}

impl TryFrom<Vec<String>> for LabelTriple {
    type Error = ConfigError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        match <[String; 3]>::try_from(labels) {
            Ok([pending, success, failure]) => Self::new(pending, success, failure),
            Err(labels) if labels.is_empty() => Err(ConfigError::MissingTypes),
            Err(labels) => Err(ConfigError::WrongLength {
                found: labels.len(),
            }),
        }
    }
}

impl TryFrom<&[&str]> for LabelTriple {
    type Error = ConfigError;

    fn try_from(labels: &[&str]) -> Result<Self, Self::Error> {
        labels
            .iter()
            .map(|label| (*label).to_string())
            .collect::<Vec<_>>()
            .try_into()
    }
}

impl From<LabelTriple> for Vec<String> {
    fn from(labels: LabelTriple) -> Self {
        vec![labels.pending, labels.success, labels.failure]
    }
}
