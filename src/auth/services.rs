use std::sync::Arc;

use base64ct::{Base64UrlUnpadded, Encoding};
use lazy_static::lazy_static;
use rand::{rngs::OsRng, RngCore};
use regex::Regex;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, instrument, warn};

use crate::auth::{
    dto::PublicUser,
    password::{CredentialHasher, HashError, KEY_LEN, SALT_LEN},
    repo::{CreateUser, SessionStore, UserStore},
    repo_types::Session,
};

/// Raw entropy in a session id (256 bits).
const SESSION_ID_BYTES: usize = 32;

/// Well-formed digest that matches no password; verified against when the
/// email is unknown so both login failures cost the same.
const DUMMY_DIGEST: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("a user with this email already exists")]
    DuplicateUser,
    #[error("user {0} not found")]
    UserNotFound(i64),
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error("entropy source unavailable: {0}")]
    Entropy(#[from] rand::Error),
    #[error("session lifetime {0} overflows the expiry timestamp")]
    ExpiryOutOfRange(Duration),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Short, log-safe prefix of a session id.
pub(crate) fn token_prefix(id: &str) -> String {
    id.chars().take(6).collect()
}

fn generate_session_id() -> Result<String, rand::Error> {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    hasher: CredentialHasher,
    session_lifetime: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        session_lifetime: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher: CredentialHasher::new(),
            session_lifetime,
        }
    }

    /// Creates a user. Does not log them in.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> AuthResult<PublicUser> {
        if self.users.find_by_email(email).await?.is_some() {
            warn!(email, "email already registered");
            return Err(AuthError::DuplicateUser);
        }

        let hash = self.hasher.hash(password)?;

        // A concurrent register can still win between the check and the insert.
        let user = match self.users.create(email, &hash, name).await? {
            CreateUser::Created(user) => user,
            CreateUser::EmailTaken => {
                warn!(email, "email taken by concurrent registration");
                return Err(AuthError::DuplicateUser);
            }
        };

        info!(user_id = user.id, email = %user.email, "user registered");
        Ok(user.into())
    }

    /// Checks credentials. `None` covers both an unknown email and a wrong
    /// password.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<Option<PublicUser>> {
        let Some(user) = self.users.find_by_email(email).await? else {
            self.hasher.verify(password, DUMMY_DIGEST);
            warn!(email, "login unknown email");
            return Ok(None);
        };

        if !self.hasher.verify(password, &user.password_hash) {
            warn!(user_id = user.id, "login invalid password");
            return Ok(None);
        }

        info!(user_id = user.id, "user logged in");
        Ok(Some(user.into()))
    }

    /// Issues a new session for `user_id`. The returned record's `id` is the
    /// bearer token; `expires_at` is handed to the transport. Users may hold
    /// any number of sessions at once.
    #[instrument(skip(self))]
    pub async fn create_session(&self, user_id: i64) -> AuthResult<Session> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(AuthError::UserNotFound(user_id));
        }

        let created_at = OffsetDateTime::now_utc();
        let expires_at = created_at
            .checked_add(self.session_lifetime)
            .filter(|at| *at > created_at)
            .ok_or(AuthError::ExpiryOutOfRange(self.session_lifetime))?;
        let session = Session {
            id: generate_session_id()?,
            user_id,
            expires_at,
            created_at,
        };
        self.sessions.create(&session).await?;

        debug!(
            user_id,
            session = %token_prefix(&session.id),
            expires_at = %session.expires_at,
            "session created"
        );
        Ok(session)
    }

    /// Resolves a session id to its user. Missing, expired and orphaned
    /// sessions all yield `None`.
    #[instrument(skip_all, fields(session = %token_prefix(session_id)))]
    pub async fn validate_session(&self, session_id: &str) -> AuthResult<Option<PublicUser>> {
        let Some(session) = self.sessions.find_by_id(session_id).await? else {
            debug!("session not found");
            return Ok(None);
        };

        if session.is_expired_at(OffsetDateTime::now_utc()) {
            debug!(expires_at = %session.expires_at, "session expired");
            return Ok(None);
        }

        match self.users.find_by_id(session.user_id).await? {
            Some(user) => Ok(Some(user.into())),
            None => {
                warn!(user_id = session.user_id, "session references missing user");
                Ok(None)
            }
        }
    }

    #[instrument(skip_all, fields(session = %token_prefix(session_id)))]
    pub async fn delete_session(&self, session_id: &str) -> AuthResult<()> {
        self.sessions.delete_by_id(session_id).await?;
        debug!("session deleted");
        Ok(())
    }
}

// DUMMY_DIGEST must decode to exactly salt || key.
const _: () = assert!(DUMMY_DIGEST.len() == (SALT_LEN + KEY_LEN) / 3 * 4);
