//! Visitor identity and session cookie settings.

use std::fmt;

use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the session cookie.
pub const USER_ID_COOKIE: &str = "user_id";

/// Identifier of one visitor.
///
/// Always a parsed UUID, so it is safe to use as a directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generates a new random identifier.
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier, returning `None` for anything but a UUID.
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session cookie settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Adds the `Secure` attribute.
    pub secure: bool,
    /// Cookie lifetime in seconds.
    pub max_age: u64,
}

impl SessionConfig {
    /// Builds the session cookie carrying `user_id`.
    pub fn cookie(&self, user_id: &UserId) -> Cookie<'static> {
        let max_age = i64::try_from(self.max_age).unwrap_or(i64::MAX);

        Cookie::build((USER_ID_COOKIE, user_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::seconds(max_age))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_only_uuids() {
        let user_id = UserId::new_v4();
        assert_eq!(UserId::parse(&user_id.to_string()), Some(user_id));

        assert_eq!(UserId::parse("../../etc"), None);
        assert_eq!(UserId::parse(""), None);
    }

    #[test]
    fn cookie_carries_attributes() {
        let user_id = UserId::new_v4();
        let config = SessionConfig {
            secure: false,
            max_age: 2_592_000,
        };

        let cookie = config.cookie(&user_id);
        assert_eq!(cookie.name(), USER_ID_COOKIE);
        assert_eq!(cookie.value(), user_id.to_string());
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(2_592_000)));
        assert_ne!(cookie.secure(), Some(true));

        let rendered = cookie.to_string();
        assert!(rendered.starts_with(&format!("user_id={user_id};")));
        assert!(rendered.contains("Max-Age=2592000"));
        assert!(!rendered.contains("Secure"));

        let secure = SessionConfig {
            secure: true,
            ..config
        };
        assert!(secure.cookie(&user_id).to_string().contains("Secure"));
    }

    #[test]
    fn oversized_max_age_saturates() {
        let config = SessionConfig {
            secure: false,
            max_age: u64::MAX,
        };
        let cookie = config.cookie(&UserId::new_v4());
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(i64::MAX)));
    }
}
