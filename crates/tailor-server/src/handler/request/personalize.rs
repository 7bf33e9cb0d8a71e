//! Personalization request types.

use serde::{Deserialize, Serialize};

/// Body of `POST /personalize`.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizeRequest {
    /// The natural-language change to make to the page.
    pub message: String,
}
