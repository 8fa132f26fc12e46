//! Refresh token record - the persisted unit of the rotation state machine
//!
//! A record is created ACTIVE at login or rotation and is revoked exactly
//! once. Expiry is never stored as a transition; it is computed from
//! `expires_at` whenever the record is read.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{FamilyId, SubjectId, TokenId};

/// Why a record left the ACTIVE state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationReason {
    /// Superseded by its successor during a normal rotation
    Rotated,
    /// Revoked by an explicit logout naming this token
    Logout,
    /// Revoked because a token of the same family was re-presented
    FamilyRevoked,
    /// Revoked by a "log out everywhere" for the owning subject
    SubjectRevoked,
}

impl RevocationReason {
    /// Stable storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rotated => "rotated",
            Self::Logout => "logout",
            Self::FamilyRevoked => "family_revoked",
            Self::SubjectRevoked => "subject_revoked",
        }
    }

    /// Parse the storage representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "rotated" => Some(Self::Rotated),
            "logout" => Some(Self::Logout),
            "family_revoked" => Some(Self::FamilyRevoked),
            "subject_revoked" => Some(Self::SubjectRevoked),
            _ => None,
        }
    }
}

/// Observable state of a record at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Active,
    /// Not revoked, but `now >= expires_at`
    Expired,
    Superseded,
    ExplicitlyRevoked,
    FamilyRevoked,
}

impl TokenState {
    /// Terminal states are the revoked ones; `Expired` is derived, not stored
    pub fn is_revoked(&self) -> bool {
        matches!(
            self,
            Self::Superseded | Self::ExplicitlyRevoked | Self::FamilyRevoked
        )
    }
}

/// Persisted refresh-token record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: TokenId,
    pub subject_id: SubjectId,
    /// Email carried forward so a rotation can mint a new access credential
    pub subject_email: String,
    /// High-entropy opaque secret, globally unique
    pub token: String,
    pub family_id: FamilyId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revocation_reason: Option<RevocationReason>,
    /// Secret of the record that superseded this one
    pub replaced_by: Option<String>,
}

impl RefreshToken {
    /// Create a new ACTIVE record valid for `ttl` from `now`
    pub fn issue(
        subject_id: SubjectId,
        subject_email: impl Into<String>,
        token: String,
        family_id: FamilyId,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: TokenId::generate(),
            subject_id,
            subject_email: subject_email.into(),
            token,
            family_id,
            issued_at: now,
            expires_at: now + ttl,
            revoked: false,
            revoked_at: None,
            revocation_reason: None,
            replaced_by: None,
        }
    }

    /// Create the successor of this record, inheriting subject and family
    pub fn successor(&self, token: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self::issue(
            self.subject_id,
            self.subject_email.clone(),
            token,
            self.family_id.clone(),
            now,
            ttl,
        )
    }

    #[inline]
    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    /// Expired at `now` (boundary inclusive: `now == expires_at` is expired)
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Valid iff not revoked and `now < expires_at`
    #[inline]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired_at(now)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Classify the record at `now`
    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        if self.revoked {
            return match self.revocation_reason {
                Some(RevocationReason::Rotated) => TokenState::Superseded,
                Some(RevocationReason::FamilyRevoked) => TokenState::FamilyRevoked,
                // A replaced_by pointer without a reason still means supersession
                None if self.replaced_by.is_some() => TokenState::Superseded,
                _ => TokenState::ExplicitlyRevoked,
            };
        }

        if self.is_expired_at(now) {
            TokenState::Expired
        } else {
            TokenState::Active
        }
    }

    /// Apply a revocation in place. Returns false if already revoked.
    ///
    /// Store adapters use this to keep in-process records consistent with
    /// the conditional SQL updates.
    pub fn revoke(
        &mut self,
        reason: RevocationReason,
        now: DateTime<Utc>,
        replaced_by: Option<String>,
    ) -> bool {
        if self.revoked {
            return false;
        }
        self.revoked = true;
        self.revoked_at = Some(now);
        self.revocation_reason = Some(reason);
        self.replaced_by = replaced_by;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(now: DateTime<Utc>) -> RefreshToken {
        RefreshToken::issue(
            SubjectId::new(42),
            "user@example.com",
            "secret-0".to_string(),
            FamilyId::new("family-a"),
            now,
            Duration::days(7),
        )
    }

    #[test]
    fn test_new_record_is_active() {
        let now = Utc::now();
        let token = record(now);

        assert!(token.is_valid_at(now));
        assert_eq!(token.state_at(now), TokenState::Active);
        assert_eq!(token.expires_at, now + Duration::days(7));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let now = Utc::now();
        let token = record(now);

        assert!(token.is_expired_at(token.expires_at));
        assert_eq!(token.state_at(token.expires_at), TokenState::Expired);
        assert!(!token.is_expired_at(token.expires_at - Duration::seconds(1)));
    }

    #[test]
    fn test_successor_keeps_family_and_subject() {
        let now = Utc::now();
        let token = record(now);
        let next = token.successor("secret-1".to_string(), now, Duration::days(7));

        assert_eq!(next.family_id, token.family_id);
        assert_eq!(next.subject_id, token.subject_id);
        assert_eq!(next.subject_email, token.subject_email);
        assert_ne!(next.id, token.id);
        assert_ne!(next.token, token.token);
    }

    #[test]
    fn test_revoke_happens_once() {
        let now = Utc::now();
        let mut token = record(now);

        assert!(token.revoke(RevocationReason::Rotated, now, Some("secret-1".to_string())));
        assert!(!token.revoke(RevocationReason::FamilyRevoked, now, None));

        assert_eq!(token.revocation_reason, Some(RevocationReason::Rotated));
        assert_eq!(token.replaced_by.as_deref(), Some("secret-1"));
        assert_eq!(token.state_at(now), TokenState::Superseded);
    }

    #[test]
    fn test_revoked_state_wins_over_expiry() {
        let now = Utc::now();
        let mut token = record(now);
        token.revoke(RevocationReason::Logout, now, None);

        let later = token.expires_at + Duration::days(1);
        assert_eq!(token.state_at(later), TokenState::ExplicitlyRevoked);
        assert!(token.state_at(later).is_revoked());
    }

    #[test]
    fn test_reason_storage_roundtrip() {
        for reason in [
            RevocationReason::Rotated,
            RevocationReason::Logout,
            RevocationReason::FamilyRevoked,
            RevocationReason::SubjectRevoked,
        ] {
            assert_eq!(RevocationReason::parse(reason.as_str()), Some(reason));
        }
        assert_eq!(RevocationReason::parse("bogus"), None);
    }
}
