//! Status enums for workflows.

use serde::{Deserialize, Serialize};

/// Lifecycle of a review draft.
///
/// ```text
/// Editing -> Validating -> Submitting -> Settled(Accepted | Rejected) -> Editing
///                 \-> Editing (validation failure)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "state", content = "settlement")]
pub enum SubmissionState {
    #[default]
    Editing,
    Validating,
    Submitting,
    Settled(Settlement),
}

/// Terminal outcome of a review submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    Accepted,
    Rejected,
}

impl std::fmt::Display for Settlement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serialization() {
        assert_eq!(
            serde_json::to_string(&SubmissionState::Editing).unwrap(),
            r#"{"state":"editing"}"#
        );
        assert_eq!(
            serde_json::to_string(&SubmissionState::Settled(Settlement::Rejected)).unwrap(),
            r#"{"state":"settled","settlement":"rejected"}"#
        );
    }
}
