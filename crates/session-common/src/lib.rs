//! # session-common
//!
//! Shared utilities including configuration, error handling, credential
//! signing, opaque token generation, password hashing, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    generate_signing_secret, AccessClaims, Argon2PasswordService, CredentialError,
    CredentialSigner, IssuedCredential, OpaqueTokenGenerator, SessionTokens, SigningAlgorithm,
};
pub use config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, Environment, MaintenanceConfig,
    ServerConfig, SessionConfig, StoreBackend, StoreConfig, MAX_TOKEN_TTL_SECS,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
