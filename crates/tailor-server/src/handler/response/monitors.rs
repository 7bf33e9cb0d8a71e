//! Monitor response types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// System health status.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorStatus {
    /// Overall system health status.
    pub is_healthy: bool,
    /// Timestamp when this status was generated.
    pub updated_at: Timestamp,
}

impl MonitorStatus {
    /// Creates a status stamped with the current time.
    pub fn now(is_healthy: bool) -> Self {
        Self {
            is_healthy,
            updated_at: Timestamp::now(),
        }
    }
}
