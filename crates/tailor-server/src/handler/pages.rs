//! Page, asset and reset handlers.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};

use super::response::ResetResponse;
use crate::extract::{Json, Session};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{AssetPath, PageStore, ServiceState};

/// Tracing target for page operations.
const TRACING_TARGET: &str = "tailor_server::handler::pages";

/// Serves the visitor's page.
#[tracing::instrument(skip_all, fields(user_id = %session.user_id()))]
async fn index(State(page_store): State<PageStore>, session: Session) -> Result<Html<String>> {
    let page = page_store.load(session.user_id()).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        personalized = page.personalized,
        "Serving page"
    );

    Ok(Html(page.html))
}

/// Serves a static file of the site.
#[tracing::instrument(skip(page_store))]
async fn asset(State(page_store): State<PageStore>, Path(path): Path<String>) -> Result<Response> {
    let Some(asset_path) = AssetPath::parse(&path) else {
        tracing::warn!(
            target: TRACING_TARGET,
            path = %path,
            "Disallowed asset requested"
        );

        return Err(Error::asset_forbidden());
    };

    match page_store.asset(&asset_path).await? {
        Some(asset) => {
            let content_type = [(header::CONTENT_TYPE, asset.kind.content_type())];
            Ok((content_type, asset.bytes).into_response())
        }
        None => Err(Error::asset_not_found(path)),
    }
}

/// Discards the visitor's personalized page.
#[tracing::instrument(skip_all, fields(user_id = %session.user_id()))]
async fn reset(
    State(page_store): State<PageStore>,
    session: Session,
) -> Result<(Session, Json<ResetResponse>)> {
    if session.is_new() {
        return Err(ErrorKind::MissingSession.with_message("There is no page to reset"));
    }

    let removed = page_store.reset(session.user_id()).await?;

    tracing::info!(
        target: TRACING_TARGET,
        removed = removed,
        "Page reset"
    );

    Ok((session, Json(ResetResponse::new(removed))))
}

/// Returns a [`Router`] with the page routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/", get(index))
        .route("/reset", post(reset))
        .route("/{*path}", get(asset))
}
