//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Security (CORS, body limits)
//! - Observability (request IDs, tracing)
//! - Recovery (panics, timeouts)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::Router;
//! use tailor_server::middleware::{
//!     RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
//! };
//!
//! let app: Router = Router::new()
//!     .with_default_security()
//!     .with_default_recovery()
//!     .with_observability();
//! ```

mod observability;
mod recovery;
mod security;

pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{CorsConfig, RouterSecurityExt, SecurityConfig};
