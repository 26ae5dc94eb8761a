//! Password hashing

use crate::auth::validation::PASSWORD_MAX_BYTES;
use crate::error::{Error, Result};

/// bcrypt hasher; work runs on the blocking pool
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plain password.
    ///
    /// Passwords longer than bcrypt's input limit are refused rather than
    /// silently truncated.
    pub async fn hash(&self, password: &str) -> Result<String> {
        if password.len() > PASSWORD_MAX_BYTES {
            return Err(Error::Validation(format!(
                "\"password\" must be at most {} bytes",
                PASSWORD_MAX_BYTES
            )));
        }
        let password = password.to_owned();
        let cost = self.cost;
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(hashed)
    }

    /// Check a plain password against a stored hash.
    ///
    /// A malformed stored hash counts as a mismatch.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        if password.len() > PASSWORD_MAX_BYTES {
            return Ok(false);
        }
        let password = password.to_owned();
        let hash = hash.to_owned();
        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;
        match outcome {
            Ok(matches) => Ok(matches),
            Err(e) => {
                tracing::warn!("Stored password hash is unreadable: {}", e);
                Ok(false)
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
