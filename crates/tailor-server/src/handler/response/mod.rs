//! Response types for HTTP handlers.

mod error_response;
mod monitors;
mod pages;

pub use error_response::*;
pub use monitors::*;
pub use pages::*;
pub use tailor_engine::PersonalizeResponse;
