//! Authentication primitives

mod jwt;
mod opaque;
mod password;

pub use jwt::{
    AccessClaims, CredentialError, CredentialSigner, IssuedCredential, SessionTokens,
    SigningAlgorithm,
};
pub use opaque::{generate_signing_secret, OpaqueTokenGenerator, SECRET_BYTES};
pub use password::Argon2PasswordService;
