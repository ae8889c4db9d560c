use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::{Duration, OffsetDateTime};

use crate::config::SessionConfig;

/// Carries a session token between the client and the auth service.
pub trait TokenTransport: Sized {
    fn get_token(&self) -> Option<String>;
    fn set_token(self, token: &str, expires_at: OffsetDateTime) -> Self;
    fn clear_token(self) -> Self;
}

/// Session token stored in an `HttpOnly; SameSite=Lax` cookie.
pub struct CookieTransport {
    jar: CookieJar,
    name: String,
    secure: bool,
}

impl CookieTransport {
    pub fn new(jar: CookieJar, config: &SessionConfig) -> Self {
        Self {
            jar,
            name: config.cookie_name.clone(),
            secure: config.cookie_secure,
        }
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar
    }
}

impl TokenTransport for CookieTransport {
    fn get_token(&self) -> Option<String> {
        self.jar
            .get(&self.name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    fn set_token(self, token: &str, expires_at: OffsetDateTime) -> Self {
        let max_age = (expires_at - OffsetDateTime::now_utc()).max(Duration::ZERO);
        let cookie = Cookie::build((self.name.clone(), token.to_string()))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .expires(expires_at);
        Self {
            jar: self.jar.add(cookie),
            ..self
        }
    }

    fn clear_token(self) -> Self {
        let cookie = Cookie::build((self.name.clone(), "")).path("/");
        Self {
            jar: self.jar.remove(cookie),
            ..self
        }
    }
}
