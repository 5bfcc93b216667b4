//! Authenticated user identity.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Name shown for reviewers without a usable display name.
pub const ANONYMOUS_USER_NAME: &str = "Anonymous User";

/// An authenticated user's stable reference.
///
/// Keys server-side cart persistence and attributes reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Identity {
    /// Create an identity.
    #[must_use]
    pub fn new(id: impl Into<UserId>, display_name: Option<String>) -> Self {
        Self {
            id: id.into(),
            display_name,
        }
    }

    /// Display name, or [`ANONYMOUS_USER_NAME`] when missing or blank.
    #[must_use]
    pub fn display_name_or_anonymous(&self) -> &str {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(ANONYMOUS_USER_NAME)
    }
}
