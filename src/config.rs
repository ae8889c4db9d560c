use std::net::SocketAddr;

use serde::Deserialize;

const DEFAULT_SESSION_TTL_MINUTES: i64 = 60 * 24 * 7;

/// Ten years. Keeps `now + lifetime` well inside `OffsetDateTime`'s range.
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_minutes: i64,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl SessionConfig {
    pub fn lifetime(&self) -> time::Duration {
        time::Duration::minutes(self.ttl_minutes)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        // expires_at must land strictly after created_at
        anyhow::ensure!(
            self.ttl_minutes > 0,
            "SESSION_TTL_MINUTES must be positive, got {}",
            self.ttl_minutes
        );
        anyhow::ensure!(
            self.ttl_minutes <= MAX_SESSION_TTL_MINUTES,
            "SESSION_TTL_MINUTES must be at most {}, got {}",
            MAX_SESSION_TTL_MINUTES,
            self.ttl_minutes
        );
        anyhow::ensure!(!self.cookie_name.is_empty(), "SESSION_COOKIE_NAME is empty");
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
            cookie_name: "session_id".into(),
            cookie_secure: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let session = SessionConfig {
            ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(DEFAULT_SESSION_TTL_MINUTES),
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "session_id".into()),
            cookie_secure: std::env::var("SESSION_COOKIE_SECURE")
                .ok()
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(true),
        };
        session.validate()?;

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            database_url,
            max_connections,
            session,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(ttl_minutes: i64) -> SessionConfig {
        SessionConfig {
            ttl_minutes,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn default_session_lifetime_is_seven_days() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.lifetime(), time::Duration::days(7));
        assert_eq!(cfg.cookie_name, "session_id");
        assert!(cfg.cookie_secure);
        cfg.validate().expect("defaults are valid");
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        assert!(session(0).validate().is_err());
        assert!(session(-5).validate().is_err());
    }

    #[test]
    fn oversized_ttl_is_rejected() {
        let err = session(10_000_000_000).validate().unwrap_err();
        assert!(err.to_string().contains("at most"));
        assert!(session(MAX_SESSION_TTL_MINUTES + 1).validate().is_err());
        session(MAX_SESSION_TTL_MINUTES).validate().expect("upper bound is inclusive");
    }

    #[test]
    fn empty_cookie_name_is_rejected() {
        let cfg = SessionConfig {
            cookie_name: String::new(),
            ..SessionConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn bind_addr_from_host_and_port() {
        let cfg = AppConfig {
            host: "127.0.0.1".into(),
            port: 9000,
            database_url: String::new(),
            max_connections: 1,
            session: SessionConfig::default(),
        };
        assert_eq!(cfg.bind_addr().unwrap().to_string(), "127.0.0.1:9000");

        let bad = AppConfig {
            host: "not a host".into(),
            ..cfg
        };
        assert!(bad.bind_addr().is_err());
    }
}
