//! Page personalization handler.
//!
//! Every reply of `POST /personalize`, including failures, has the shape
//! `{"accepted": bool, "error"?: string}`.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use tailor_engine::{Document, Outcome, Personalizer};

use super::request::PersonalizeRequest;
use super::response::PersonalizeResponse;
use crate::extract::{Json, Session};
use crate::handler::{Error, ErrorKind};
use crate::service::{PageStore, ServiceState};

/// Tracing target for personalization requests.
const TRACING_TARGET: &str = "tailor_server::handler::personalize";

type Reply = (StatusCode, Session, Json<PersonalizeResponse>);

fn accepted(session: Session) -> Reply {
    let response = PersonalizeResponse {
        accepted: true,
        document: None,
        error: None,
    };

    (StatusCode::OK, session, Json(response))
}

fn rejected(session: Session, error: &Error) -> Reply {
    let response = error.to_personalize_response();
    (error.kind().status_code(), session, Json(response))
}

/// Applies a natural-language change to the visitor's page.
#[tracing::instrument(skip_all, fields(user_id = %session.user_id()))]
async fn personalize(
    State(personalizer): State<Personalizer>,
    State(page_store): State<PageStore>,
    session: Session,
    request: Result<Json<PersonalizeRequest>, Error>,
) -> Reply {
    let request = match request {
        Ok(Json(request)) => request,
        Err(error) => {
            tracing::debug!(target: TRACING_TARGET, error = %error, "Rejected request body");
            return rejected(session, &error);
        }
    };

    if request.message.trim().is_empty() {
        let error = ErrorKind::BadRequest.with_message("The message cannot be empty");
        return rejected(session, &error);
    }

    let page = match page_store.load(session.user_id()).await {
        Ok(page) => page,
        Err(error) => return rejected(session, &Error::from(error)),
    };

    tracing::info!(
        target: TRACING_TARGET,
        personalized = page.personalized,
        message_len = request.message.len(),
        "Personalization requested"
    );

    let document = Document::from(page.html);
    let outcome = match personalizer.personalize(&request.message, &document).await {
        Ok(outcome) => outcome,
        Err(error) => return rejected(session, &Error::from(&error)),
    };

    match outcome {
        Outcome::Applied(patched) => {
            if let Err(error) = page_store
                .save(session.user_id(), &patched.document.to_text())
                .await
            {
                return rejected(session, &Error::from(error));
            }

            tracing::info!(
                target: TRACING_TARGET,
                applied = patched.report.applied,
                skipped = patched.report.skipped.len(),
                "Personalized page stored"
            );

            accepted(session)
        }
        declined @ Outcome::Declined { .. } => {
            tracing::info!(target: TRACING_TARGET, "Personalization declined");
            (StatusCode::OK, session, Json(PersonalizeResponse::from(&declined)))
        }
    }
}

/// Returns a [`Router`] with the personalization routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/personalize", post(personalize))
}

#[cfg(test)]
mod tests {
    use axum::http::header;
    use serde_json::json;
    use tailor_engine::mock::MockGenerator;
    use tailor_engine::{EditBatch, EditRequest};

    use super::*;
    use crate::handler::test::{BASE_PAGE, create_test_site};
    use crate::service::UserId;

    fn title_change() -> MockGenerator {
        let batch = EditBatch::accepted(vec![EditRequest::replace(2, "Base", "Mine")]);
        MockGenerator::batch(&batch)
    }

    fn session_cookie(response: &axum_test::TestResponse) -> anyhow::Result<UserId> {
        let cookie = response.header(header::SET_COOKIE);
        let value = cookie
            .to_str()?
            .split(';')
            .next()
            .and_then(|pair| pair.strip_prefix("user_id="))
            .and_then(UserId::parse);
        value.ok_or_else(|| anyhow::anyhow!("missing user_id cookie"))
    }

    #[tokio::test]
    async fn applies_and_stores_changes() -> anyhow::Result<()> {
        let site = create_test_site(title_change()).await?;
        let server = site.server(routes())?;

        let response = server
            .post("/personalize")
            .json(&json!({ "message": "rename the title" }))
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({ "accepted": true }));

        let user_id = session_cookie(&response)?;
        let page = site.state.page_store.load(&user_id).await?;
        assert!(page.personalized);
        assert_eq!(page.html, BASE_PAGE.replace("Base", "Mine"));

        let received = site.generator.received();
        assert_eq!(received.len(), 1);
        assert!(received[0].prompt.contains("rename the title"));

        Ok(())
    }

    #[tokio::test]
    async fn builds_on_the_personalized_page() -> anyhow::Result<()> {
        let batch = EditBatch::accepted(vec![EditRequest::replace(1, "Mine", "Ours")]);
        let site = create_test_site(MockGenerator::batch(&batch)).await?;
        let server = site.server(routes())?;

        let user_id = UserId::new_v4();
        site.state.page_store.save(&user_id, "<h1>Mine</h1>").await?;

        let response = server
            .post("/personalize")
            .add_header("Cookie", format!("user_id={user_id}"))
            .json(&json!({ "message": "rename again" }))
            .await;
        response.assert_status_ok();

        assert_eq!(session_cookie(&response)?, user_id);
        let page = site.state.page_store.load(&user_id).await?;
        assert_eq!(page.html, "<h1>Ours</h1>");

        Ok(())
    }

    #[tokio::test]
    async fn decline_passes_through() -> anyhow::Result<()> {
        let site = create_test_site(MockGenerator::batch(&EditBatch::declined(
            "needs scripting",
        )))
        .await?;
        let server = site.server(routes())?;

        let response = server
            .post("/personalize")
            .json(&json!({ "message": "add a popup" }))
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({ "accepted": false, "error": "needs scripting" }));

        let user_id = session_cookie(&response)?;
        assert!(!site.state.page_store.load(&user_id).await?.personalized);

        Ok(())
    }

    #[tokio::test]
    async fn invalid_bodies_are_bad_requests() -> anyhow::Result<()> {
        let site = create_test_site(title_change()).await?;
        let server = site.server(routes())?;

        let not_json = server.post("/personalize").text("make it blue").await;
        not_json.assert_status(StatusCode::BAD_REQUEST);

        let missing = server.post("/personalize").json(&json!({})).await;
        missing.assert_status(StatusCode::BAD_REQUEST);

        let blank = server
            .post("/personalize")
            .json(&json!({ "message": "   " }))
            .await;
        blank.assert_status(StatusCode::BAD_REQUEST);

        let body = blank.json::<PersonalizeResponse>();
        assert!(!body.accepted);
        assert_eq!(body.error.as_deref(), Some("The message cannot be empty"));

        assert_eq!(site.generator.calls(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn unsafe_changes_are_unprocessable() -> anyhow::Result<()> {
        let batch = EditBatch::accepted(vec![EditRequest::insert(1, "<script>alert(1)</script>")]);
        let site = create_test_site(MockGenerator::batch(&batch)).await?;
        let server = site.server(routes())?;

        let response = server
            .post("/personalize")
            .json(&json!({ "message": "add an alert" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body = response.json::<PersonalizeResponse>();
        assert!(!body.accepted);
        assert!(body.error.unwrap_or_default().contains("<script"));

        Ok(())
    }

    #[tokio::test]
    async fn unreachable_service_is_bad_gateway() -> anyhow::Result<()> {
        let site = create_test_site(MockGenerator::unreachable()).await?;
        let server = site.server(routes())?;

        let response = server
            .post("/personalize")
            .json(&json!({ "message": "make it blue" }))
            .await;
        response.assert_status(StatusCode::BAD_GATEWAY);
        assert!(!response.json::<PersonalizeResponse>().accepted);

        Ok(())
    }
}
