//! Denylisted access credentials - logout-only, purely additive

use chrono::{DateTime, Utc};

/// An access credential invalidated before its natural expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenylistedCredential {
    /// The raw signed credential string as presented by the caller
    pub credential: String,
    /// Copied from the credential's own `exp`; the entry is prunable afterwards
    pub expires_at: DateTime<Utc>,
}

impl DenylistedCredential {
    pub fn new(credential: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            credential: credential.into(),
            expires_at,
        }
    }

    /// An entry only denies while the credential itself could still verify
    #[inline]
    pub fn is_effective_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Rows reclaimed by an expiry sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub refresh_tokens: u64,
    pub denylist: u64,
}

impl PurgeReport {
    pub fn total(&self) -> u64 {
        self.refresh_tokens + self.denylist
    }
}
