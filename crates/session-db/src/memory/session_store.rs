//! In-memory implementation of SessionStore

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

use session_core::{
    DenylistedCredential, FamilyId, PurgeReport, RefreshToken, RevocationReason, SessionStore,
    StoreError, StoreResult, SubjectId,
};

#[derive(Debug, Default)]
struct State {
    /// Records keyed by their secret
    tokens: HashMap<String, RefreshToken>,
    /// Denylisted credential -> expiry
    denylist: HashMap<String, DateTime<Utc>>,
}

impl State {
    fn revoke_where<P>(&mut self, now: DateTime<Utc>, reason: RevocationReason, predicate: P) -> u64
    where
        P: Fn(&RefreshToken) -> bool,
    {
        let mut count = 0;
        for record in self.tokens.values_mut().filter(|r| predicate(r)) {
            if record.revoke(reason, now, None) {
                count += 1;
            }
        }
        count
    }
}

/// In-memory SessionStore
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: Mutex<State>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored refresh-token records, any state
    pub fn refresh_token_count(&self) -> usize {
        self.state.lock().tokens.len()
    }

    /// Number of stored denylist entries, expired or not
    pub fn denylist_count(&self) -> usize {
        self.state.lock().denylist.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create_refresh_token(&self, token: &RefreshToken) -> StoreResult<()> {
        let mut state = self.state.lock();
        if state.tokens.contains_key(&token.token) {
            return Err(StoreError::Conflict("refresh token already exists".to_string()));
        }
        state.tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn find_refresh_token(&self, token: &str) -> StoreResult<Option<RefreshToken>> {
        Ok(self.state.lock().tokens.get(token).cloned())
    }

    async fn find_refresh_tokens_by_subject(
        &self,
        subject_id: SubjectId,
    ) -> StoreResult<Vec<RefreshToken>> {
        let mut records: Vec<RefreshToken> = self
            .state
            .lock()
            .tokens
            .values()
            .filter(|r| r.subject_id == subject_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
        Ok(records)
    }

    async fn update_refresh_token(&self, token: &RefreshToken) -> StoreResult<bool> {
        let mut state = self.state.lock();
        let Some(key) = state
            .tokens
            .iter()
            .find(|(_, r)| r.id == token.id)
            .map(|(k, _)| k.clone())
        else {
            return Ok(false);
        };

        state.tokens.remove(&key);
        state.tokens.insert(token.token.clone(), token.clone());
        Ok(true)
    }

    async fn rotate_refresh_token(
        &self,
        presented: &str,
        successor: &RefreshToken,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut state = self.state.lock();

        if state.tokens.contains_key(&successor.token) {
            return Err(StoreError::Conflict("refresh token already exists".to_string()));
        }

        let Some(record) = state.tokens.get_mut(presented) else {
            return Ok(false);
        };
        if !record.is_valid_at(now) {
            return Ok(false);
        }
        record.revoke(
            RevocationReason::Rotated,
            now,
            Some(successor.token.clone()),
        );

        state
            .tokens
            .insert(successor.token.clone(), successor.clone());
        Ok(true)
    }

    async fn revoke_refresh_token(
        &self,
        token: &str,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        Ok(self
            .state
            .lock()
            .tokens
            .get_mut(token)
            .is_some_and(|record| record.revoke(reason, now, None)))
    }

    async fn revoke_family(&self, family_id: &FamilyId, now: DateTime<Utc>) -> StoreResult<u64> {
        Ok(self
            .state
            .lock()
            .revoke_where(now, RevocationReason::FamilyRevoked, |r| {
                &r.family_id == family_id
            }))
    }

    async fn revoke_subject(&self, subject_id: SubjectId, now: DateTime<Utc>) -> StoreResult<u64> {
        Ok(self
            .state
            .lock()
            .revoke_where(now, RevocationReason::SubjectRevoked, |r| {
                r.subject_id == subject_id
            }))
    }

    async fn add_to_denylist(&self, entry: &DenylistedCredential) -> StoreResult<()> {
        self.state
            .lock()
            .denylist
            .entry(entry.credential.clone())
            .or_insert(entry.expires_at);
        Ok(())
    }

    async fn is_denylisted(&self, credential: &str, now: DateTime<Utc>) -> StoreResult<bool> {
        Ok(self
            .state
            .lock()
            .denylist
            .get(credential)
            .is_some_and(|expires_at| now < *expires_at))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<PurgeReport> {
        let mut state = self.state.lock();

        let tokens_before = state.tokens.len();
        state.tokens.retain(|_, r| r.expires_at > now);
        let denylist_before = state.denylist.len();
        state.denylist.retain(|_, expires_at| *expires_at > now);

        Ok(PurgeReport {
            refresh_tokens: (tokens_before - state.tokens.len()) as u64,
            denylist: (denylist_before - state.denylist.len()) as u64,
        })
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
