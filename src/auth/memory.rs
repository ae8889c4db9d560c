//! In-process stores used by tests in place of Postgres.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::auth::repo::{CreateUser, SessionStore, UserStore};
use crate::auth::repo_types::{Session, User};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    /// Drops a user, leaving any of its sessions orphaned.
    pub fn remove(&self, id: i64) {
        self.users.lock().unwrap().retain(|u| u.id != id);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> anyhow::Result<CreateUser> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Ok(CreateUser::EmailTaken);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
            email: email.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(CreateUser::Created(user))
    }
}

/// Always loses the insert race: the email looks free on lookup, but the
/// insert hits the uniqueness constraint.
#[derive(Default)]
pub struct RacingUserStore;

#[async_trait]
impl UserStore for RacingUserStore {
    async fn find_by_email(&self, _email: &str) -> anyhow::Result<Option<User>> {
        Ok(None)
    }

    async fn find_by_id(&self, _id: i64) -> anyhow::Result<Option<User>> {
        Ok(None)
    }

    async fn create(
        &self,
        _email: &str,
        _password_hash: &str,
        _name: &str,
    ) -> anyhow::Result<CreateUser> {
        Ok(CreateUser::EmailTaken)
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: &Session) -> anyhow::Result<()> {
        let mut sessions = self.sessions.lock().unwrap();
        anyhow::ensure!(
            !sessions.contains_key(&session.id),
            "duplicate session id"
        );
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Session>> {
        Ok(self.sessions.lock().unwrap().get(id).cloned())
    }

    async fn delete_by_id(&self, id: &str) -> anyhow::Result<()> {
        self.sessions.lock().unwrap().remove(id);
        Ok(())
    }
}
