#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod generator;
pub mod provider;

pub use config::RigConfig;
pub use error::{Error, Result};
pub use provider::{CompletionModel, CompletionProvider, Credentials, ProviderKind};

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "tailor_rig";
