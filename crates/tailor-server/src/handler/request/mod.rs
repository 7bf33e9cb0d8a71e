//! Request types for HTTP handlers.

mod personalize;

pub use personalize::*;
