use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::repo_types::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    DuplicateUser,
    InvalidCredentials,
    Unauthenticated,
    InvalidInput,
    Internal,
}

/// Uniform `{success, user, error}` envelope for every auth endpoint.
/// Only built through [`AuthPayload::ok`] and [`AuthPayload::fail`].
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    success: bool,
    user: Option<PublicUser>,
    error: Option<AuthErrorKind>,
}

impl AuthPayload {
    pub fn ok(user: Option<PublicUser>) -> Self {
        Self {
            success: true,
            user,
            error: None,
        }
    }

    pub fn fail(kind: AuthErrorKind) -> Self {
        Self {
            success: false,
            user: None,
            error: Some(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: 1,
            email: "test@example.com".into(),
            name: "Test".into(),
            password_hash: "digest".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn public_user_drops_password_hash() {
        let json = serde_json::to_value(PublicUser::from(user())).unwrap();
        assert_eq!(json["email"], "test@example.com");
        assert_eq!(json["name"], "Test");
        assert!(json.get("password_hash").is_none());
        assert!(json["created_at"].is_string());
    }

    #[test]
    fn failure_envelope_shape() {
        let json = serde_json::to_value(AuthPayload::fail(AuthErrorKind::DuplicateUser)).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["user"].is_null());
        assert_eq!(json["error"], "duplicate_user");
    }

    #[test]
    fn success_envelope_shape() {
        let json = serde_json::to_value(AuthPayload::ok(Some(user().into()))).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["user"]["id"], 1);
        assert!(json["error"].is_null());
    }
}
