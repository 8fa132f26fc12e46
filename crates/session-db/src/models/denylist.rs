//! Access denylist database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for access_denylist table
#[derive(Debug, Clone, FromRow)]
pub struct DenylistModel {
    pub credential: String,
    pub expires_at: DateTime<Utc>,
}
