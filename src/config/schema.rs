//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served under `/public` (gallery images, stylesheets)
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("./public")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_dir: default_public_dir(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// Process-local store, lost on restart
    Memory,
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_db_host")]
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    #[serde(default = "default_db_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_db_name")]
    pub name: String,
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_name() -> String {
    "gallery".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            host: default_db_host(),
            port: default_db_port(),
            user: default_db_user(),
            password: String::new(),
            name: default_db_name(),
        }
    }
}

impl DatabaseConfig {
    /// Connection parameters for tokio-postgres.
    ///
    /// Values are set field by field, so empty passwords and passwords with
    /// spaces or quotes reach the server unchanged.
    pub fn pg_config(&self) -> tokio_postgres::Config {
        let mut pg = tokio_postgres::Config::new();
        pg.host(&self.host)
            .port(self.port)
            .user(&self.user)
            .dbname(&self.name);
        if !self.password.is_empty() {
            pg.password(&self.password);
        }
        pg
    }
}

/// Session cookie and expiry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key used to sign the session cookie
    #[serde(default)]
    pub secret: String,

    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// How often expired session rows are deleted
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

/// Longest idle lifetime a session may be configured with (one year)
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

fn default_ttl_secs() -> u64 {
    3600
}

fn default_cookie_name() -> String {
    "gallery.sid".to_string()
}

fn default_purge_interval_secs() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_secs: default_ttl_secs(),
            cookie_name: default_cookie_name(),
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

impl Config {
    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.session.secret.trim().is_empty() {
            return Err(Error::Config(
                "session secret must be set (SESSION_SECRET)".to_string(),
            ));
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(Error::Config(format!(
                "bcrypt cost must be between 4 and 31, got {}",
                self.auth.bcrypt_cost
            )));
        }
        if self.session.ttl_secs == 0 {
            return Err(Error::Config("session ttl must be positive".to_string()));
        }
        if self.session.ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(Error::Config(format!(
                "session ttl must be at most {} seconds, got {}",
                MAX_SESSION_TTL_SECS, self.session.ttl_secs
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.session.ttl_secs, 3600);
        assert_eq!(config.database.backend, StoreBackend::Postgres);
    }

    fn database(password: &str) -> DatabaseConfig {
        DatabaseConfig {
            backend: StoreBackend::Postgres,
            host: "db".to_string(),
            port: 5433,
            user: "app".to_string(),
            password: password.to_string(),
            name: "pics".to_string(),
        }
    }

    #[test]
    fn test_pg_config_fields() {
        let pg = database("pw").pg_config();
        assert_eq!(pg.get_user(), Some("app"));
        assert_eq!(pg.get_password(), Some(&b"pw"[..]));
        assert_eq!(pg.get_dbname(), Some("pics"));
        assert_eq!(pg.get_ports(), &[5433]);
        assert!(matches!(
            pg.get_hosts(),
            [tokio_postgres::config::Host::Tcp(host)] if host == "db"
        ));
    }

    #[test]
    fn test_pg_config_empty_password_keeps_dbname() {
        let pg = database("").pg_config();
        assert_eq!(pg.get_password(), None);
        assert_eq!(pg.get_dbname(), Some("pics"));
    }

    #[test]
    fn test_pg_config_password_with_spaces_and_quotes() {
        let pg = database("p w 'q' \\x").pg_config();
        assert_eq!(pg.get_password(), Some("p w 'q' \\x".as_bytes()));
        assert_eq!(pg.get_dbname(), Some("pics"));
        assert_eq!(pg.get_user(), Some("app"));
    }

    #[test]
    fn test_validate_requires_secret() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.session.secret = "keyboard cat".to_string();
        assert!(config.validate().is_ok());

        config.auth.bcrypt_cost = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_session_ttl() {
        let mut config = Config::default();
        config.session.secret = "keyboard cat".to_string();

        config.session.ttl_secs = MAX_SESSION_TTL_SECS;
        assert!(config.validate().is_ok());

        config.session.ttl_secs = MAX_SESSION_TTL_SECS + 1;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.session.ttl_secs = u64::MAX;
        assert!(config.validate().is_err());
    }
}
