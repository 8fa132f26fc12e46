//! Password verification collaborator

use crate::error::DomainError;

/// Opaque one-way password primitive.
///
/// Implementations are CPU-bound; async callers should run them on a
/// blocking thread.
pub trait PasswordVerifier: Send + Sync {
    /// Produce a digest for `secret`
    fn hash(&self, secret: &str) -> Result<String, DomainError>;

    /// Check `secret` against a stored digest. A malformed digest verifies as false.
    fn verify(&self, digest: &str, secret: &str) -> bool;
}
