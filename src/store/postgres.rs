//! PostgreSQL-backed user and session store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Row};

use super::UserStore;
use crate::auth::{NewUser, Role, Session, SessionStore, SessionUser, User};
use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY DEFAULT gen_random_uuid()::text,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
    created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS sessions (
    id         TEXT PRIMARY KEY,
    user_id    TEXT,
    name       TEXT NOT NULL,
    email      TEXT,
    role       TEXT,
    created_at TIMESTAMPTZ NOT NULL,
    expires_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS sessions_expires_at_idx ON sessions (expires_at);
"#;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

/// Users and sessions in PostgreSQL, sharing one client connection
#[derive(Clone)]
pub struct PgStore {
    client: Arc<Client>,
}

impl PgStore {
    /// Connect using the configured credentials
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let (client, connection) = config.pg_config().connect(NoTls).await?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        tracing::info!(
            "Connected to PostgreSQL at {}:{}/{}",
            config.host,
            config.port,
            config.name
        );

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Create tables and indexes if they do not exist
    pub async fn migrate(&self) -> Result<()> {
        self.client.batch_execute(SCHEMA).await?;
        tracing::debug!("Database schema is up to date");
        Ok(())
    }
}

fn user_from_row(row: &Row) -> Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse()?,
        created_at: row.try_get("created_at")?,
    })
}

fn session_from_row(row: &Row) -> Result<Session> {
    let role: Option<String> = row.try_get("role")?;
    Ok(Session {
        id: row.try_get("id")?,
        user: SessionUser {
            id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            role: role.map(|r| r.parse::<Role>()).transpose()?,
        },
        created_at: row.try_get("created_at")?,
        expires_at: row.try_get("expires_at")?,
    })
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: NewUser) -> Result<User> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let row = self
            .client
            .query_one(
                &query,
                &[&user.name, &user.email, &user.password_hash, &user.role.as_str()],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    Error::Conflict(format!("email '{}' is already registered", user.email))
                } else {
                    Error::Database(e)
                }
            })?;
        user_from_row(&row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = self.client.query_opt(&query, &[&email]).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<User>> {
        let query = format!("SELECT {} FROM users ORDER BY created_at, id", USER_COLUMNS);
        let rows = self.client.query(&query, &[]).await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn set_role(&self, id: &str, role: Role) -> Result<bool> {
        let updated = self
            .client
            .execute(
                "UPDATE users SET role = $1 WHERE id = $2",
                &[&role.as_str(), &id],
            )
            .await?;
        Ok(updated > 0)
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn save(&self, session: &Session) -> Result<()> {
        let role = session.user.role.map(|r| r.as_str());
        self.client
            .execute(
                "INSERT INTO sessions (id, user_id, name, email, role, created_at, expires_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (id) DO UPDATE SET user_id = $2, name = $3, email = $4, role = $5, expires_at = $7",
                &[
                    &session.id,
                    &session.user.id,
                    &session.user.name,
                    &session.user.email,
                    &role,
                    &session.created_at,
                    &session.expires_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<Session>> {
        let row = self
            .client
            .query_opt(
                "SELECT id, user_id, name, email, role, created_at, expires_at \
                 FROM sessions WHERE id = $1 AND expires_at > now()",
                &[&id],
            )
            .await?;
        row.as_ref().map(session_from_row).transpose()
    }

    async fn touch(&self, id: &str, expires_at: DateTime<Utc>) -> Result<()> {
        self.client
            .execute(
                "UPDATE sessions SET expires_at = $1 WHERE id = $2",
                &[&expires_at, &id],
            )
            .await?;
        Ok(())
    }

    async fn destroy(&self, id: &str) -> Result<()> {
        self.client
            .execute("DELETE FROM sessions WHERE id = $1", &[&id])
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let removed = self
            .client
            .execute("DELETE FROM sessions WHERE expires_at <= now()", &[])
            .await?;
        Ok(removed)
    }
}
