//! In-memory implementation of UserRepository

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use session_core::{DomainError, RepoResult, StoreError, SubjectId, User, UserRepository};

/// In-memory UserRepository keyed by subject id
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<SubjectId, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: SubjectId) -> RepoResult<Option<User>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        let mut users = self.users.write();
        if users.contains_key(&user.id)
            || users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(DomainError::Store(StoreError::Conflict(
                "user already exists".to_string(),
            )));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }
}
