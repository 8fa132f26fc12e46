//! RefreshToken entity <-> model mapper

use chrono::{DateTime, Utc};
use session_core::{
    DenylistedCredential, FamilyId, RefreshToken, RevocationReason, SubjectId, TokenId,
};

use uuid::Uuid;

use crate::models::{DenylistModel, RefreshTokenModel};

impl From<RefreshTokenModel> for RefreshToken {
    fn from(model: RefreshTokenModel) -> Self {
        RefreshToken {
            id: TokenId::from_uuid(model.id),
            subject_id: SubjectId::new(model.subject_id),
            subject_email: model.subject_email,
            token: model.token,
            family_id: FamilyId::new(model.family_id),
            issued_at: model.issued_at,
            expires_at: model.expires_at,
            revoked: model.revoked,
            revoked_at: model.revoked_at,
            // Unknown reasons degrade to "explicitly revoked" in state_at
            revocation_reason: model
                .revocation_reason
                .as_deref()
                .and_then(RevocationReason::parse),
            replaced_by: model.replaced_by,
        }
    }
}

impl From<DenylistModel> for DenylistedCredential {
    fn from(model: DenylistModel) -> Self {
        DenylistedCredential::new(model.credential, model.expires_at)
    }
}

/// Borrowed column values for inserting a refresh token
pub struct RefreshTokenInsert<'a> {
    pub id: Uuid,
    pub subject_id: i64,
    pub subject_email: &'a str,
    pub token: &'a str,
    pub family_id: &'a str,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revocation_reason: Option<&'static str>,
    pub replaced_by: Option<&'a str>,
}

impl<'a> RefreshTokenInsert<'a> {
    pub fn new(token: &'a RefreshToken) -> Self {
        Self {
            id: token.id.into_inner(),
            subject_id: token.subject_id.into_inner(),
            subject_email: &token.subject_email,
            token: &token.token,
            family_id: token.family_id.as_str(),
            issued_at: token.issued_at,
            expires_at: token.expires_at,
            revoked: token.revoked,
            revoked_at: token.revoked_at,
            revocation_reason: token.revocation_reason.map(|r| r.as_str()),
            replaced_by: token.replaced_by.as_deref(),
        }
    }
}
