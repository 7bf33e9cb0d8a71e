//! Per-user page storage on the local file system.
//!
//! The site directory holds the base page and its static assets. Every
//! personalized page lives at `<users-dir>/<user-id>/index.html` and is
//! replaced atomically.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use uuid::Uuid;

use crate::service::UserId;
use crate::{Error, Result};

/// Tracing target for page storage operations.
const TRACING_TARGET: &str = "tailor_server::service::storage";

/// File name of the base page and of every personalized page.
pub const PAGE_FILE_NAME: &str = "index.html";

/// Kind of static file that may be served from the site directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Html,
    Css,
    Js,
}

impl AssetKind {
    /// Resolves a file extension, ignoring case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "html" => Some(Self::Html),
            "css" => Some(Self::Css),
            "js" => Some(Self::Js),
            _ => None,
        }
    }

    /// Returns the `Content-Type` header value.
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Css => "text/css; charset=utf-8",
            Self::Js => "text/javascript; charset=utf-8",
        }
    }
}

/// A validated path relative to the site directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPath {
    relative: PathBuf,
    kind: AssetKind,
}

impl AssetPath {
    /// Validates a request path.
    ///
    /// Returns `None` for paths that leave the site directory or name a
    /// file type that is not served.
    pub fn parse(path: &str) -> Option<Self> {
        if path.is_empty() || path.contains('\\') {
            return None;
        }

        let relative = Path::new(path);
        let is_contained = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !is_contained {
            return None;
        }

        let kind = relative
            .extension()
            .and_then(|extension| extension.to_str())
            .and_then(AssetKind::from_extension)?;

        Some(Self {
            relative: relative.to_path_buf(),
            kind,
        })
    }

    /// Returns the asset kind.
    pub fn kind(&self) -> AssetKind {
        self.kind
    }
}

/// A static file read from the site directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub kind: AssetKind,
    pub bytes: Vec<u8>,
}

/// A page as served to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPage {
    pub html: String,
    /// Whether this is the user's own copy rather than the base page.
    pub personalized: bool,
}

/// File system page store.
///
/// Cheap to clone.
#[derive(Debug, Clone)]
pub struct PageStore {
    inner: Arc<PageStoreInner>,
}

#[derive(Debug)]
struct PageStoreInner {
    site_dir: PathBuf,
    users_dir: PathBuf,
}

impl PageStore {
    /// Opens a store, checking that the base page exists and creating the
    /// users directory when missing.
    pub async fn open(site_dir: impl AsRef<Path>, users_dir: impl AsRef<Path>) -> Result<Self> {
        let site_dir = site_dir.as_ref().to_path_buf();
        let users_dir = users_dir.as_ref().to_path_buf();

        let base_page = site_dir.join(PAGE_FILE_NAME);
        match fs::metadata(&base_page).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => {
                return Err(Error::MissingBasePage {
                    path: base_page,
                    source: None,
                });
            }
            Err(e) => {
                return Err(Error::MissingBasePage {
                    path: base_page,
                    source: Some(e),
                });
            }
        }

        fs::create_dir_all(&users_dir)
            .await
            .map_err(Error::storage("create users directory", &users_dir))?;

        tracing::info!(
            target: TRACING_TARGET,
            site_dir = %site_dir.display(),
            users_dir = %users_dir.display(),
            "Page store opened",
        );

        Ok(Self {
            inner: Arc::new(PageStoreInner {
                site_dir,
                users_dir,
            }),
        })
    }

    /// Returns the site directory.
    pub fn site_dir(&self) -> &Path {
        &self.inner.site_dir
    }

    /// Returns the users directory.
    pub fn users_dir(&self) -> &Path {
        &self.inner.users_dir
    }

    fn user_dir(&self, user_id: &UserId) -> PathBuf {
        self.inner.users_dir.join(user_id.to_string())
    }

    fn user_page(&self, user_id: &UserId) -> PathBuf {
        self.user_dir(user_id).join(PAGE_FILE_NAME)
    }

    /// Reads the base page.
    pub async fn base_page(&self) -> Result<String> {
        let path = self.inner.site_dir.join(PAGE_FILE_NAME);
        fs::read_to_string(&path)
            .await
            .map_err(Error::storage("read base page", &path))
    }

    /// Returns the user's personalized page, or the base page when the
    /// user has none.
    pub async fn load(&self, user_id: &UserId) -> Result<StoredPage> {
        let path = self.user_page(user_id);
        match fs::read_to_string(&path).await {
            Ok(html) => Ok(StoredPage {
                html,
                personalized: true,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(StoredPage {
                html: self.base_page().await?,
                personalized: false,
            }),
            Err(e) => Err(Error::storage("read personalized page", &path)(e)),
        }
    }

    /// Replaces the user's personalized page.
    ///
    /// The page is written to a temporary file first and renamed into
    /// place, so readers never see a partial page.
    pub async fn save(&self, user_id: &UserId, html: &str) -> Result<()> {
        if html.trim().is_empty() {
            return Err(Error::BlankPage(*user_id));
        }

        let user_dir = self.user_dir(user_id);
        fs::create_dir_all(&user_dir)
            .await
            .map_err(Error::storage("create user directory", &user_dir))?;

        let temp = user_dir.join(format!(".{PAGE_FILE_NAME}.{}.tmp", Uuid::new_v4().simple()));
        fs::write(&temp, html)
            .await
            .map_err(Error::storage("write temporary page", &temp))?;

        let page = self.user_page(user_id);
        if let Err(e) = fs::rename(&temp, &page).await {
            let _ = fs::remove_file(&temp).await;
            return Err(Error::storage("replace personalized page", &page)(e));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            user_id = %user_id,
            bytes = html.len(),
            "Personalized page saved",
        );

        Ok(())
    }

    /// Deletes the user's personalized page.
    ///
    /// Returns whether a page was removed.
    pub async fn reset(&self, user_id: &UserId) -> Result<bool> {
        let page = self.user_page(user_id);
        match fs::remove_file(&page).await {
            Ok(()) => {
                // Best effort: fails while temp files remain.
                let _ = fs::remove_dir(self.user_dir(user_id)).await;

                tracing::debug!(
                    target: TRACING_TARGET,
                    user_id = %user_id,
                    "Personalized page removed",
                );
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::storage("remove personalized page", &page)(e)),
        }
    }

    /// Reads a static file from the site directory.
    ///
    /// Returns `None` when the file does not exist.
    pub async fn asset(&self, path: &AssetPath) -> Result<Option<Asset>> {
        let full_path = self.inner.site_dir.join(&path.relative);

        match fs::metadata(&full_path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::storage("inspect asset", &full_path)(e)),
        }

        let bytes = fs::read(&full_path)
            .await
            .map_err(Error::storage("read asset", &full_path))?;

        Ok(Some(Asset {
            kind: path.kind,
            bytes,
        }))
    }

    /// Returns true if the base page can still be found.
    pub async fn is_healthy(&self) -> bool {
        fs::metadata(self.inner.site_dir.join(PAGE_FILE_NAME))
            .await
            .is_ok_and(|metadata| metadata.is_file())
    }
}
