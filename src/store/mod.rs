//! Credential and session persistence

mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::auth::{NewUser, Role, User};
use crate::error::Result;

/// Persisted user records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; fails with `Error::Conflict` when the email is taken
    async fn insert(&self, user: NewUser) -> Result<User>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// All users, oldest first
    async fn list(&self) -> Result<Vec<User>>;

    /// Set a user's role. Returns false when no user has that id.
    async fn set_role(&self, id: &str, role: Role) -> Result<bool>;
}
