//! Page response types.

use serde::{Deserialize, Serialize};

/// Body of `POST /reset`.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResponse {
    /// Whether a personalized page was removed.
    pub removed: bool,
    pub message: String,
}

impl ResetResponse {
    /// Creates the response for the outcome of a reset.
    pub fn new(removed: bool) -> Self {
        let message = if removed {
            "Page restored to the original version"
        } else {
            "Already showing the original page"
        };

        Self {
            removed,
            message: message.to_owned(),
        }
    }
}
