//! Store traits (ports) - define the interface for session persistence
//!
//! The session authority holds no state of its own; every decision it makes
//! is a read from a `SessionStore` followed by a conditional write. The
//! conditional operations below are the atomicity contract implementations
//! must honour: each one must succeed for exactly one of any set of
//! concurrent callers targeting the same ACTIVE row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{DenylistedCredential, PurgeReport, RefreshToken, RevocationReason, User};
use crate::error::{DomainError, StoreResult};
use crate::value_objects::{FamilyId, SubjectId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Session Store
// ============================================================================

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new record. A duplicate `token` is a `StoreError::Conflict`.
    async fn create_refresh_token(&self, token: &RefreshToken) -> StoreResult<()>;

    /// Find a record by its secret value
    async fn find_refresh_token(&self, token: &str) -> StoreResult<Option<RefreshToken>>;

    /// List every record (any state) owned by a subject, newest first
    async fn find_refresh_tokens_by_subject(
        &self,
        subject_id: SubjectId,
    ) -> StoreResult<Vec<RefreshToken>>;

    /// Overwrite a record by id. Returns false if no such record exists.
    async fn update_refresh_token(&self, token: &RefreshToken) -> StoreResult<bool>;

    /// Atomically supersede `presented` with `successor`.
    ///
    /// Revokes the presented record only if it is still ACTIVE at `now`
    /// (`revoked = false AND expires_at > now`), pointing `replaced_by` at the
    /// successor's secret, and inserts `successor` in the same unit of work.
    /// Returns false, persisting nothing, when the conditional revoke matched
    /// no row.
    async fn rotate_refresh_token(
        &self,
        presented: &str,
        successor: &RefreshToken,
        now: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Revoke one record if it is not yet revoked. Returns whether this call
    /// performed the transition.
    async fn revoke_refresh_token(
        &self,
        token: &str,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Revoke every non-revoked record of a family in one conditional update
    async fn revoke_family(&self, family_id: &FamilyId, now: DateTime<Utc>) -> StoreResult<u64>;

    /// Revoke every non-revoked record of a subject in one conditional update
    async fn revoke_subject(&self, subject_id: SubjectId, now: DateTime<Utc>) -> StoreResult<u64>;

    /// Add an access credential to the denylist. Re-adding is a no-op.
    async fn add_to_denylist(&self, entry: &DenylistedCredential) -> StoreResult<()>;

    /// Whether the credential is denylisted and the entry has not expired at `now`
    async fn is_denylisted(&self, credential: &str, now: DateTime<Utc>) -> StoreResult<bool>;

    /// Delete refresh tokens and denylist entries whose `expires_at` has passed
    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<PurgeReport>;

    /// Cheap reachability probe for readiness checks
    async fn health_check(&self) -> StoreResult<()>;
}

// ============================================================================
// User Repository
// ============================================================================

/// Account lookup used by password login. Profile management lives elsewhere.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: SubjectId) -> RepoResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Create a new account with an already-hashed password
    async fn create(&self, user: &User) -> RepoResult<()>;
}
