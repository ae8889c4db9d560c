use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::auth::{
    dto::{AuthErrorKind, AuthPayload},
    services::AuthError,
};

/// Failure half of an auth endpoint, rendered as the `{success, user, error}`
/// envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: AuthErrorKind,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: AuthErrorKind) -> Self {
        Self { status, kind }
    }

    pub fn invalid_credentials() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, AuthErrorKind::InvalidCredentials)
    }

    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, AuthErrorKind::Unauthenticated)
    }

    pub fn invalid_input() -> Self {
        Self::new(StatusCode::BAD_REQUEST, AuthErrorKind::InvalidInput)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateUser => {
                Self::new(StatusCode::CONFLICT, AuthErrorKind::DuplicateUser)
            }
            other => {
                error!(error = %other, "auth service failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, AuthErrorKind::Internal)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(AuthPayload::fail(self.kind))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_user_maps_to_conflict() {
        let res = ApiError::from(AuthError::DuplicateUser).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn infrastructure_failures_are_opaque() {
        let err = ApiError::from(AuthError::Store(anyhow::anyhow!("connection reset")));
        assert_eq!(err.kind, AuthErrorKind::Internal);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let res = ApiError::from(AuthError::UserNotFound(3)).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let res = ApiError::from(AuthError::ExpiryOutOfRange(time::Duration::MAX)).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
