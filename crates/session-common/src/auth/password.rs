//! Password hashing and verification
//!
//! Uses Argon2id with a per-hash random salt.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2,
};
use session_core::{DomainError, PasswordVerifier};

/// Argon2id implementation of the password port
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordService;

impl Argon2PasswordService {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PasswordVerifier for Argon2PasswordService {
    fn hash(&self, secret: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::InternalError(format!("Password hashing failed: {e}")))
    }

    fn verify(&self, digest: &str, secret: &str) -> bool {
        use argon2::password_hash::PasswordVerifier as _;

        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };

        Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}
