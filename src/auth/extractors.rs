use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use super::{
    cookie::{CookieTransport, TokenTransport},
    dto::PublicUser,
    errors::ApiError,
};
use crate::state::AppState;

/// Session token from the cookie, or from `Authorization: Bearer` for
/// clients that cannot hold cookies.
pub fn request_token(parts: &Parts, state: &AppState) -> Option<String> {
    let transport =
        CookieTransport::new(CookieJar::from_headers(&parts.headers), &state.config.session);
    transport.get_token().or_else(|| {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|auth| {
                auth.strip_prefix("Bearer ")
                    .or_else(|| auth.strip_prefix("bearer "))
            })
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    })
}

/// Resolves the caller's session to a user, rejecting with 401 otherwise.
pub struct CurrentUser(pub PublicUser);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = request_token(parts, state) else {
            debug!("no session token on request");
            return Err(ApiError::unauthenticated());
        };

        state
            .auth
            .validate_session(&token)
            .await?
            .map(CurrentUser)
            .ok_or_else(ApiError::unauthenticated)
    }
}

/// The raw session token, if the request carries one.
pub struct SessionToken(pub Option<String>);

#[async_trait]
impl FromRequestParts<AppState> for SessionToken {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(SessionToken(request_token(parts, state)))
    }
}
