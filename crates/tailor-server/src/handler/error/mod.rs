//! [`Error`], [`ErrorKind`] and [`Result`].

mod engine_error;
mod http_error;
mod service_error;

pub use http_error::{Error, ErrorKind, Result};
