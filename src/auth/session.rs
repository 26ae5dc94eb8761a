//! Session management

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::jwt::CookieSigner;
use crate::auth::models::SessionUser;
use crate::config::{SessionConfig, MAX_SESSION_TTL_SECS};
use crate::error::Result;

/// Session information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Session ID
    pub id: String,
    /// User snapshot taken at login or signup
    pub user: SessionUser,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session stops being valid unless touched again
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session
    pub fn new(user: SessionUser, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Persistent backing for sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert or replace a session
    async fn save(&self, session: &Session) -> Result<()>;

    /// Fetch a live session; expired records are reported as absent
    async fn load(&self, id: &str) -> Result<Option<Session>>;

    /// Push the expiry of a session forward
    async fn touch(&self, id: &str, expires_at: DateTime<Utc>) -> Result<()>;

    async fn destroy(&self, id: &str) -> Result<()>;

    /// Delete expired records, returning how many were removed
    async fn purge_expired(&self) -> Result<u64>;
}

/// Creates, resolves and destroys sessions and their cookies
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    signer: CookieSigner,
    ttl: Duration,
    cookie_name: String,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, config: &SessionConfig) -> Self {
        Self {
            store,
            signer: CookieSigner::new(config.secret.as_bytes()),
            ttl: Duration::seconds(config.ttl_secs.min(MAX_SESSION_TTL_SECS) as i64),
            cookie_name: config.cookie_name.clone(),
        }
    }

    /// Create a session and return it with its signed cookie value
    pub async fn create(&self, user: SessionUser) -> Result<(Session, String)> {
        let session = Session::new(user, self.ttl);
        self.store.save(&session).await?;
        let token = self.signer.sign(&session.id)?;
        tracing::debug!("Created session {}", session.id);
        Ok((session, token))
    }

    /// Resolve a signed cookie value to a live session, extending its expiry
    pub async fn resolve(&self, token: &str) -> Result<Option<Session>> {
        let session_id = match self.signer.verify(token) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!("Ignoring session cookie: {}", e);
                return Ok(None);
            }
        };

        let Some(mut session) = self.store.load(&session_id).await? else {
            return Ok(None);
        };

        session.expires_at = Utc::now() + self.ttl;
        self.store.touch(&session.id, session.expires_at).await?;
        Ok(Some(session))
    }

    /// Delete a session
    pub async fn destroy(&self, session_id: &str) -> Result<()> {
        self.store.destroy(session_id).await
    }

    /// Delete the session behind a signed cookie value without loading it.
    ///
    /// Returns the destroyed session id, or `None` when the cookie does not
    /// carry a valid signature.
    pub async fn revoke(&self, token: &str) -> Result<Option<String>> {
        let session_id = match self.signer.verify(token) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!("Ignoring session cookie on revoke: {}", e);
                return Ok(None);
            }
        };
        self.store.destroy(&session_id).await?;
        Ok(Some(session_id))
    }

    /// Find the session cookie in a `Cookie` header value
    pub fn token_from_cookie_header<'a>(&self, header: &'a str) -> Option<&'a str> {
        header.split(';').find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            (name == self.cookie_name && !value.is_empty()).then_some(value)
        })
    }

    /// `Set-Cookie` value establishing a session
    pub fn set_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie_name,
            token,
            self.ttl.num_seconds()
        )
    }

    /// `Set-Cookie` value that removes the session cookie
    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
            self.cookie_name
        )
    }

    /// Periodically remove expired sessions until the task is dropped
    pub fn spawn_reaper(&self, every: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                match store.purge_expired().await {
                    Ok(0) => {}
                    Ok(n) => tracing::debug!("Purged {} expired sessions", n),
                    Err(e) => tracing::error!("Failed to purge expired sessions: {}", e),
                }
            }
        })
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .field("cookie_name", &self.cookie_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use crate::store::MemoryStore;

    fn manager(store: Arc<MemoryStore>) -> SessionManager {
        let config = SessionConfig {
            secret: "test-secret".to_string(),
            ..SessionConfig::default()
        };
        SessionManager::new(store, &config)
    }

    fn snapshot() -> SessionUser {
        SessionUser {
            id: Some("u1".to_string()),
            name: "testuser".to_string(),
            email: Some("t@x.com".to_string()),
            role: Some(Role::User),
        }
    }

    #[tokio::test]
    async fn test_create_and_resolve_session() {
        let manager = manager(Arc::new(MemoryStore::new()));
        let (session, token) = manager.create(snapshot()).await.unwrap();

        let resolved = manager.resolve(&token).await.unwrap();
        assert!(resolved.is_some());
        let resolved = resolved.unwrap();
        assert_eq!(resolved.id, session.id);
        assert_eq!(resolved.user.name, "testuser");
    }

    #[tokio::test]
    async fn test_destroy_session() {
        let manager = manager(Arc::new(MemoryStore::new()));
        let (session, token) = manager.create(snapshot()).await.unwrap();

        manager.destroy(&session.id).await.unwrap();
        assert!(manager.resolve(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_absent() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager(Arc::clone(&store));
        let (session, token) = manager.create(snapshot()).await.unwrap();

        store
            .touch(&session.id, Utc::now() - Duration::minutes(1))
            .await
            .unwrap();

        assert!(manager.resolve(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_extends_expiry() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager(Arc::clone(&store));
        let (session, token) = manager.create(snapshot()).await.unwrap();

        let soon = Utc::now() + Duration::seconds(5);
        store.touch(&session.id, soon).await.unwrap();

        let resolved = manager.resolve(&token).await.unwrap().unwrap();
        assert!(resolved.expires_at > soon);
        let stored = store.load(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.expires_at, resolved.expires_at);
    }

    #[tokio::test]
    async fn test_tampered_cookie_is_ignored() {
        let manager = manager(Arc::new(MemoryStore::new()));
        let (_, token) = manager.create(snapshot()).await.unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(manager.resolve(&tampered).await.unwrap().is_none());
        assert!(manager.resolve("not-a-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke_by_token() {
        let manager = manager(Arc::new(MemoryStore::new()));
        let (session, token) = manager.create(snapshot()).await.unwrap();

        assert_eq!(manager.revoke(&token).await.unwrap(), Some(session.id));
        assert!(manager.resolve(&token).await.unwrap().is_none());
        assert_eq!(manager.revoke("forged").await.unwrap(), None);
    }

    #[test]
    fn test_cookie_header_parsing() {
        let manager = manager(Arc::new(MemoryStore::new()));
        assert_eq!(
            manager.token_from_cookie_header("theme=dark; gallery.sid=abc.def.ghi"),
            Some("abc.def.ghi")
        );
        assert_eq!(manager.token_from_cookie_header("gallery.sid="), None);
        assert_eq!(manager.token_from_cookie_header("other=1"), None);
    }

    #[test]
    fn test_oversized_ttl_is_clamped() {
        let config = SessionConfig {
            secret: "test-secret".to_string(),
            ttl_secs: u64::MAX,
            ..SessionConfig::default()
        };
        let manager = SessionManager::new(Arc::new(MemoryStore::new()), &config);
        assert_eq!(manager.ttl.num_seconds() as u64, MAX_SESSION_TTL_SECS);
    }

    #[test]
    fn test_cookie_attributes() {
        let manager = manager(Arc::new(MemoryStore::new()));
        let cookie = manager.set_cookie("tok");
        assert!(cookie.starts_with("gallery.sid=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(manager.clear_cookie().contains("Max-Age=0"));
    }
}
