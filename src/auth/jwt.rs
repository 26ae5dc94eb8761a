//! Signed session cookie values

use crate::error::{Error, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Claims carried by the session cookie.
///
/// Expiry lives server-side with the session record, so no `exp` claim.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Session ID
    pub sid: String,
    /// Issued at
    pub iat: i64,
}

/// Signs and verifies session ids with the configured secret
#[derive(Clone)]
pub struct CookieSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl CookieSigner {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Create a cookie value for a session id
    pub fn sign(&self, session_id: &str) -> Result<String> {
        let claims = Claims {
            sid: session_id.to_string(),
            iat: chrono::Utc::now().timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Config(format!("Failed to sign session cookie: {}", e)))
    }

    /// Recover the session id from a cookie value
    pub fn verify(&self, token: &str) -> Result<String> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.sid)
            .map_err(Error::from)
    }
}

impl std::fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSigner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let signer = CookieSigner::new(b"keyboard cat");
        let token = signer.sign("abc-123").expect("Failed to sign");
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(signer.verify(&token).expect("Failed to verify"), "abc-123");
    }

    #[test]
    fn test_other_secret_rejected() {
        let token = CookieSigner::new(b"one").sign("abc-123").unwrap();
        assert!(CookieSigner::new(b"two").verify(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let signer = CookieSigner::new(b"keyboard cat");
        assert!(signer.verify("invalid.token.here").is_err());
        assert!(signer.verify("").is_err());
    }
}
