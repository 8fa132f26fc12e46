//! # session-core
//!
//! Domain layer for the credential session engine: refresh-token records,
//! the access-credential denylist, identifiers, and the store contracts the
//! session authority depends on.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    DenylistedCredential, PurgeReport, RefreshToken, RevocationReason, TokenState, User,
};
pub use error::{DomainError, StoreError, StoreResult};
pub use traits::{PasswordVerifier, RepoResult, SessionStore, UserRepository};
pub use value_objects::{FamilyId, IdParseError, SubjectId, TokenId};
