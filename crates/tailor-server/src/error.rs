//! Errors raised while setting up the service or touching the page store.
//!
//! Handlers never show these to visitors; they are logged and answered with
//! a generic 500.

use std::io;
use std::path::{Path, PathBuf};

use crate::service::UserId;

/// Result type for service setup and page store operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Service error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration value cannot be used.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The site directory has no readable base page.
    #[error("base page '{}' is missing or not a regular file", .path.display())]
    MissingBasePage {
        path: PathBuf,
        #[source]
        source: Option<io::Error>,
    },

    /// The screening policy file cannot be read.
    #[error("cannot read screening policy '{}'", .path.display())]
    PolicyUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The screening policy file is not a valid policy.
    #[error("invalid screening policy '{}'", .path.display())]
    PolicyInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A page store file operation failed.
    #[error("page store could not {action} '{}'", .path.display())]
    Storage {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A blank page was about to replace a user's page.
    #[error("refusing to store a blank page for user {0}")]
    BlankPage(UserId),
}

impl Error {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns a mapper for a failed page store `action` on `path`.
    ///
    /// ```
    /// use tailor_server::Error;
    ///
    /// let missing = std::io::Error::from(std::io::ErrorKind::NotFound);
    /// let error = Error::storage("read", "users/index.html")(missing);
    /// assert!(error.is_storage());
    /// ```
    pub fn storage(action: &'static str, path: impl AsRef<Path>) -> impl FnOnce(io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| Self::Storage {
            action,
            path,
            source,
        }
    }

    /// Returns true for errors raised while serving requests from the page
    /// store, as opposed to startup errors.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::BlankPage(_))
    }
}
