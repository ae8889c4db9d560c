use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookie::{CookieTransport, TokenTransport},
        dto::{AuthPayload, LoginRequest, PublicUser, RegisterRequest},
        errors::ApiError,
        extractors::{CurrentUser, SessionToken},
        services::is_valid_email,
    },
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

/// Issues a session for `user` and attaches it to the response cookie.
async fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: &PublicUser,
) -> Result<CookieJar, ApiError> {
    let session = state.auth.create_session(user.id).await?;
    Ok(CookieTransport::new(jar, &state.config.session)
        .set_token(&session.id, session.expires_at)
        .into_jar())
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthPayload>), ApiError> {
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::invalid_input());
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::invalid_input());
    }
    let name = payload.name.trim();
    if name.is_empty() {
        warn!("empty display name");
        return Err(ApiError::invalid_input());
    }

    let user = state
        .auth
        .register(&payload.email, &payload.password, name)
        .await?;
    let jar = start_session(&state, jar, &user).await?;

    Ok((StatusCode::CREATED, jar, Json(AuthPayload::ok(Some(user)))))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthPayload>), ApiError> {
    let Some(user) = state.auth.login(&payload.email, &payload.password).await? else {
        return Err(ApiError::invalid_credentials());
    };
    let jar = start_session(&state, jar, &user).await?;

    Ok((jar, Json(AuthPayload::ok(Some(user)))))
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AuthPayload>), ApiError> {
    if let Some(token) = token {
        state.auth.delete_session(&token).await?;
        info!("user logged out");
    }
    let jar = CookieTransport::new(jar, &state.config.session)
        .clear_token()
        .into_jar();
    Ok((jar, Json(AuthPayload::ok(None))))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<AuthPayload> {
    Json(AuthPayload::ok(Some(user)))
}
