//! User entity - the principal a session is issued to

use chrono::{DateTime, Utc};

use crate::value_objects::SubjectId;

/// Minimal account view needed to authenticate a login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: SubjectId,
    pub email: String,
    /// Opaque one-way digest produced by the password hashing collaborator
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: SubjectId, email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}
