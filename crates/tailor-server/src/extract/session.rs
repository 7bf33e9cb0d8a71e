//! Cookie-backed visitor sessions.

use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::CookieJar;

use crate::service::{SessionConfig, USER_ID_COOKIE, UserId};

/// Tracing target for session extraction.
const TRACING_TARGET: &str = "tailor_server::extract::session";

/// The visitor behind a request.
///
/// Read from the `user_id` cookie. A missing or malformed cookie yields a
/// fresh identifier. Returning the session from a handler (re)sets the
/// cookie.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    user_id: UserId,
    is_new: bool,
    config: SessionConfig,
}

impl Session {
    /// Returns the visitor's identifier.
    #[inline]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns true if the request carried no valid session cookie.
    #[inline]
    pub fn is_new(&self) -> bool {
        self.is_new
    }
}

impl<S> FromRequestParts<S> for Session
where
    SessionConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = SessionConfig::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let existing = jar
            .get(USER_ID_COOKIE)
            .and_then(|cookie| UserId::parse(cookie.value()));

        let session = match existing {
            Some(user_id) => Self {
                user_id,
                is_new: false,
                config,
            },
            None => {
                let user_id = UserId::new_v4();
                tracing::debug!(
                    target: TRACING_TARGET,
                    user_id = %user_id,
                    "New session issued",
                );
                Self {
                    user_id,
                    is_new: true,
                    config,
                }
            }
        };

        Ok(session)
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        CookieJar::new()
            .add(self.config.cookie(&self.user_id))
            .into_response_parts(res)
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::header;
    use axum::routing::get;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;

    use super::*;

    async fn visit(session: Session) -> (Session, String) {
        let body = format!("{}:{}", session.user_id(), session.is_new());
        (session, body)
    }

    fn server(secure: bool) -> anyhow::Result<TestServer> {
        let config = SessionConfig {
            secure,
            max_age: 60,
        };
        let app = Router::new().route("/", get(visit)).with_state(config);
        Ok(TestServer::new(app)?)
    }

    #[tokio::test]
    async fn new_visitor_gets_a_cookie() -> anyhow::Result<()> {
        let server = server(true)?;
        let response = server.get("/").await;

        let (user_id, is_new) = response
            .text()
            .split_once(':')
            .map(|(id, new)| (id.to_owned(), new.to_owned()))
            .ok_or_else(|| anyhow::anyhow!("unexpected body"))?;
        assert_eq!(is_new, "true");

        let cookie = response.header(header::SET_COOKIE);
        let cookie = Cookie::parse(cookie.to_str()?.to_owned())?;
        assert_eq!(cookie.name(), USER_ID_COOKIE);
        assert_eq!(cookie.value(), user_id);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));

        Ok(())
    }

    #[tokio::test]
    async fn known_visitor_keeps_their_id() -> anyhow::Result<()> {
        let server = server(false)?;
        let user_id = UserId::new_v4();

        let response = server
            .get("/")
            .add_header(header::COOKIE, format!("{USER_ID_COOKIE}={user_id}"))
            .await;
        assert_eq!(response.text(), format!("{user_id}:false"));

        let malformed = server
            .get("/")
            .add_header(header::COOKIE, format!("{USER_ID_COOKIE}=../../etc"))
            .await;
        assert!(malformed.text().ends_with(":true"));

        Ok(())
    }
}
