//! Request extractors.
//!
//! - [`Json`] - JSON deserialization with descriptive rejections
//! - [`Session`] - the visitor identified by the `user_id` cookie

mod json;
mod session;

pub use crate::extract::json::Json;
pub use crate::extract::session::Session;
