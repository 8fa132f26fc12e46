//! Session authority - issuance, rotation, revocation and reuse detection
//!
//! The authority holds no session state of its own. Every decision is a read
//! from the `SessionStore` followed by one of the store's conditional writes;
//! rotation in particular relies on `rotate_refresh_token` succeeding for
//! exactly one of any set of concurrent callers.
//!
//! Refresh verdicts, in order:
//! - unknown token: `InvalidRefreshToken`
//! - already revoked: the whole family is revoked, then `RefreshTokenReused`
//! - expired: `RefreshTokenExpired`, no family action
//! - otherwise the token is superseded by a successor in the same family

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use session_common::{
    CredentialError, CredentialSigner, OpaqueTokenGenerator, SessionConfig, SessionTokens,
};
use session_core::{
    DenylistedCredential, DomainError, FamilyId, RefreshToken, RevocationReason, SessionStore,
    SubjectId,
};

use super::error::{ServiceError, ServiceResult};

/// Lifetimes applied to a newly issued credential pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl TokenLifetimes {
    pub fn new(access: Duration, refresh: Duration) -> Self {
        Self { access, refresh }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            access: Duration::seconds(config.access_token_ttl),
            refresh: Duration::seconds(config.refresh_token_ttl),
        }
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self::new(Duration::minutes(15), Duration::days(7))
    }
}

/// Logout policy toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Logout also revokes every other session of the subject
    pub revoke_all_on_logout: bool,
    /// Logout denylists the access credential it was called with
    pub denylist_access_on_logout: bool,
}

impl SessionPolicy {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            revoke_all_on_logout: config.revoke_all_on_logout,
            denylist_access_on_logout: config.denylist_access_on_logout,
        }
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            revoke_all_on_logout: false,
            denylist_access_on_logout: true,
        }
    }
}

/// A caller whose access credential passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject_id: SubjectId,
    pub email: String,
    /// The raw credential, kept so logout can denylist it
    pub credential: String,
    pub expires_at: DateTime<Utc>,
}

/// The session state machine
#[derive(Clone)]
pub struct SessionAuthority {
    store: Arc<dyn SessionStore>,
    signer: CredentialSigner,
    generator: OpaqueTokenGenerator,
    lifetimes: TokenLifetimes,
    policy: SessionPolicy,
}

impl SessionAuthority {
    pub fn new(
        store: Arc<dyn SessionStore>,
        signer: CredentialSigner,
        lifetimes: TokenLifetimes,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            store,
            signer,
            generator: OpaqueTokenGenerator::new(),
            lifetimes,
            policy,
        }
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Start a new session family for an already-authenticated subject
    pub async fn login(
        &self,
        subject_id: SubjectId,
        subject_email: &str,
    ) -> ServiceResult<SessionTokens> {
        self.login_with_lifetimes(subject_id, subject_email, self.lifetimes)
            .await
    }

    /// `login` with explicit lifetimes
    #[instrument(skip(self, subject_email, lifetimes))]
    pub async fn login_with_lifetimes(
        &self,
        subject_id: SubjectId,
        subject_email: &str,
        lifetimes: TokenLifetimes,
    ) -> ServiceResult<SessionTokens> {
        let now = Utc::now();
        let access = self
            .signer
            .issue_at(subject_id, subject_email, now, lifetimes.access)?;

        // Secret and family id come from independent draws
        let record = RefreshToken::issue(
            subject_id,
            subject_email,
            self.generator.new_secret(),
            FamilyId::new(self.generator.new_secret()),
            now,
            lifetimes.refresh,
        );
        self.store.create_refresh_token(&record).await?;

        info!(family_id = %record.family_id, "Session family started");
        Ok(SessionTokens::bearer(access, record.token))
    }

    /// Exchange a refresh token for a new pair
    pub async fn refresh(&self, presented: &str) -> ServiceResult<SessionTokens> {
        self.refresh_with_lifetimes(presented, self.lifetimes).await
    }

    /// `refresh` with explicit lifetimes
    #[instrument(skip_all)]
    pub async fn refresh_with_lifetimes(
        &self,
        presented: &str,
        lifetimes: TokenLifetimes,
    ) -> ServiceResult<SessionTokens> {
        let now = Utc::now();

        let Some(record) = self.store.find_refresh_token(presented).await? else {
            return Err(DomainError::InvalidRefreshToken.into());
        };

        if record.is_revoked() {
            return Err(self.contain_reuse(&record, now).await);
        }

        if record.is_expired_at(now) {
            info!(
                subject_id = %record.subject_id,
                family_id = %record.family_id,
                "Refresh token expired"
            );
            return Err(DomainError::RefreshTokenExpired.into());
        }

        let access = self.signer.issue_at(
            record.subject_id,
            &record.subject_email,
            now,
            lifetimes.access,
        )?;
        let successor = record.successor(self.generator.new_secret(), now, lifetimes.refresh);

        if !self
            .store
            .rotate_refresh_token(presented, &successor, now)
            .await?
        {
            // Another caller superseded or revoked it between our read and write
            return Err(self.contain_reuse(&record, now).await);
        }

        info!(
            subject_id = %record.subject_id,
            family_id = %record.family_id,
            "Refresh token rotated"
        );
        Ok(SessionTokens::bearer(access, successor.token))
    }

    /// Revoke the family of a re-presented token and produce the verdict
    async fn contain_reuse(&self, record: &RefreshToken, now: DateTime<Utc>) -> ServiceError {
        warn!(
            subject_id = %record.subject_id,
            family_id = %record.family_id,
            "Refresh token reuse detected, revoking family"
        );

        match self.store.revoke_family(&record.family_id, now).await {
            Ok(revoked) => {
                warn!(family_id = %record.family_id, revoked, "Token family revoked");
                DomainError::RefreshTokenReused.into()
            }
            Err(e) => {
                error!(
                    family_id = %record.family_id,
                    error = %e,
                    "Failed to revoke token family after reuse"
                );
                e.into()
            }
        }
    }

    /// End a session. Never fails: every store failure here is logged and
    /// swallowed.
    #[instrument(skip_all, fields(subject_id = %principal.subject_id))]
    pub async fn logout(&self, principal: &Principal, refresh_token: Option<&str>) {
        let now = Utc::now();

        if let Some(token) = refresh_token {
            self.revoke_presented(principal.subject_id, token, now).await;
        }

        if self.policy.revoke_all_on_logout {
            match self.store.revoke_subject(principal.subject_id, now).await {
                Ok(revoked) => info!(revoked, "Revoked all sessions on logout"),
                Err(e) => warn!(error = %e, "Failed to revoke all sessions on logout"),
            }
        }

        if self.policy.denylist_access_on_logout && principal.expires_at > now {
            let entry = DenylistedCredential::new(principal.credential.clone(), principal.expires_at);
            if let Err(e) = self.store.add_to_denylist(&entry).await {
                warn!(error = %e, "Failed to denylist access credential on logout");
            }
        }

        info!("Logged out");
    }

    async fn revoke_presented(&self, subject_id: SubjectId, token: &str, now: DateTime<Utc>) {
        let record = match self.store.find_refresh_token(token).await {
            Ok(Some(record)) => record,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Failed to look up refresh token on logout");
                return;
            }
        };

        if record.subject_id != subject_id {
            warn!(
                owner = %record.subject_id,
                "Logout presented a refresh token owned by another subject"
            );
            return;
        }

        if let Err(e) = self
            .store
            .revoke_refresh_token(token, RevocationReason::Logout, now)
            .await
        {
            warn!(family_id = %record.family_id, error = %e, "Failed to revoke refresh token on logout");
        }
    }

    /// Verify an access credential and check it against the denylist
    #[instrument(skip_all)]
    pub async fn validate_access_credential(&self, credential: &str) -> ServiceResult<Principal> {
        let claims = self.signer.verify(credential)?;
        let subject_id = claims.subject_id()?;

        if self.store.is_denylisted(credential, Utc::now()).await? {
            return Err(CredentialError::Revoked.into());
        }

        Ok(Principal {
            subject_id,
            expires_at: claims.expires_at(),
            email: claims.email,
            credential: credential.to_string(),
        })
    }

    /// Records of the subject that can still be refreshed, newest first
    #[instrument(skip(self))]
    pub async fn list_active_sessions(
        &self,
        subject_id: SubjectId,
    ) -> ServiceResult<Vec<RefreshToken>> {
        let now = Utc::now();
        let records = self.store.find_refresh_tokens_by_subject(subject_id).await?;
        Ok(records.into_iter().filter(|r| r.is_valid_at(now)).collect())
    }

    /// Log out everywhere, independent of the logout policy
    #[instrument(skip(self))]
    pub async fn revoke_all_sessions(&self, subject_id: SubjectId) -> ServiceResult<u64> {
        let revoked = self.store.revoke_subject(subject_id, Utc::now()).await?;
        info!(revoked, "Revoked all sessions");
        Ok(revoked)
    }
}

impl std::fmt::Debug for SessionAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuthority")
            .field("signer", &self.signer)
            .field("lifetimes", &self.lifetimes)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
