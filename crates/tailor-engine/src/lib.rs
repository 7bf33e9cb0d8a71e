#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod apply;
pub mod diagnostics;
mod document;
mod edit;
mod error;
mod generator;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
mod personalize;
mod prompt;
mod screen;

pub use apply::{ApplyReport, Patched, SkippedEdit, apply};
pub use diagnostics::{DiagnosticEvent, Diagnostics, Stage, TracingDiagnostics};
pub use document::{Document, IndexedDocument};
pub use edit::{
    EditBatch, EditDescriptor, EditFailure, EditKind, EditRequest, LINE_BREAK_PLACEHOLDER,
    strip_code_fence,
};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use generator::Generator;
pub use personalize::{Outcome, PersonalizeResponse, Personalizer};
pub use prompt::{DEFAULT_PROTECTED_CLASS, PromptTemplate};
pub use screen::{
    DANGEROUS_CALLS, EVENT_HANDLERS, SCRIPT_MARKUP, Screening, ScreeningPolicy, ThreatCategory,
};

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "tailor_engine";
