//! In-process store, used by tests and the `memory` backend

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::UserStore;
use crate::auth::{NewUser, Role, Session, SessionStore, User};
use crate::error::{Error, Result};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    sessions: HashMap<String, Session>,
}

/// Users and sessions held in memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, including expired ones not yet purged
    pub async fn session_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(Error::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn set_role(&self, id: &str, role: Role) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn save(&self, session: &Session) -> Result<()> {
        self.inner
            .write()
            .await
            .sessions
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<Session>> {
        let mut inner = self.inner.write().await;
        if let Some(session) = inner.sessions.get(id) {
            if session.is_expired() {
                inner.sessions.remove(id);
                return Ok(None);
            }
            return Ok(Some(session.clone()));
        }
        Ok(None)
    }

    async fn touch(&self, id: &str, expires_at: DateTime<Utc>) -> Result<()> {
        if let Some(session) = self.inner.write().await.sessions.get_mut(id) {
            session.expires_at = expires_at;
        }
        Ok(())
    }

    async fn destroy(&self, id: &str) -> Result<()> {
        self.inner.write().await.sessions.remove(id);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.sessions.len();
        inner.sessions.retain(|_, session| !session.is_expired());
        Ok((before - inner.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionUser;
    use chrono::Duration;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "alice1".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let store = MemoryStore::new();
        let user = store.insert(new_user("a@x.com")).await.unwrap();
        assert!(!user.id.is_empty());
        assert_eq!(user.role, Role::User);

        let found = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.insert(new_user("a@x.com")).await.unwrap();
        let err = store.insert(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_set_role_missing_id_is_noop() {
        let store = MemoryStore::new();
        let user = store.insert(new_user("a@x.com")).await.unwrap();

        assert!(!store.set_role("missing", Role::Admin).await.unwrap());
        assert!(store.set_role(&user.id, Role::Admin).await.unwrap());

        let users = store.list().await.unwrap();
        assert_eq!(users[0].role, Role::Admin);
    }

    #[tokio::test]
    async fn test_purge_expired_sessions() {
        let store = MemoryStore::new();
        let live = Session::new(SessionUser::name_only("live"), Duration::hours(1));
        let dead = Session::new(SessionUser::name_only("dead"), Duration::seconds(-1));
        store.save(&live).await.unwrap();
        store.save(&dead).await.unwrap();

        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.session_count().await, 1);
        assert!(store.load(&live.id).await.unwrap().is_some());
    }
}
