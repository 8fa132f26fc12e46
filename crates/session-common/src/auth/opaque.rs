//! Opaque refresh-token secrets
//!
//! Refresh tokens carry no structure; they are random bytes from the OS
//! CSPRNG, encoded so they are safe in URLs and JSON bodies.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use rand::{rngs::OsRng, RngCore};

/// Entropy per secret, in bytes
pub const SECRET_BYTES: usize = 32;

fn random_bytes() -> [u8; SECRET_BYTES] {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generator for refresh-token secrets
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueTokenGenerator;

impl OpaqueTokenGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// A fresh 256-bit secret, base64url without padding (43 chars)
    pub fn new_secret(&self) -> String {
        URL_SAFE_NO_PAD.encode(random_bytes())
    }
}

/// Generate a value suitable for `JWT_SECRET`
pub fn generate_signing_secret() -> String {
    STANDARD.encode(random_bytes())
}
