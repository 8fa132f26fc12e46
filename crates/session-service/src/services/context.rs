//! Service context - dependency container for services
//!
//! Holds the user repository, the session store, the session authority, and
//! the password verifier.

use std::sync::Arc;

use session_core::{PasswordVerifier, SessionStore, UserRepository};

use super::authority::SessionAuthority;
use super::error::{ServiceError, ServiceResult};

/// Hashed at startup so unknown emails cost one verification too
const DUMMY_PASSWORD: &str = "session-authority-dummy-password";

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    user_repo: Arc<dyn UserRepository>,
    session_store: Arc<dyn SessionStore>,
    authority: Arc<SessionAuthority>,
    password: Arc<dyn PasswordVerifier>,
    dummy_digest: Arc<str>,
}

impl ServiceContext {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        authority: Arc<SessionAuthority>,
        password: Arc<dyn PasswordVerifier>,
    ) -> ServiceResult<Self> {
        let dummy_digest = password.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            user_repo,
            session_store: Arc::clone(authority.store()),
            authority,
            password,
            dummy_digest: dummy_digest.into(),
        })
    }

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the session store shared with the authority
    pub fn session_store(&self) -> &Arc<dyn SessionStore> {
        &self.session_store
    }

    pub fn authority(&self) -> &SessionAuthority {
        self.authority.as_ref()
    }

    /// Get the password verifier
    pub fn password(&self) -> &Arc<dyn PasswordVerifier> {
        &self.password
    }

    pub(crate) fn dummy_digest(&self) -> &Arc<str> {
        &self.dummy_digest
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("user_repo", &"UserRepository")
            .field("session_store", &"SessionStore")
            .field("authority", &self.authority)
            .finish_non_exhaustive()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    authority: Option<Arc<SessionAuthority>>,
    password: Option<Arc<dyn PasswordVerifier>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn authority(mut self, authority: Arc<SessionAuthority>) -> Self {
        self.authority = Some(authority);
        self
    }

    pub fn password(mut self, password: Arc<dyn PasswordVerifier>) -> Self {
        self.password = Some(password);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        ServiceContext::new(
            self.user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            self.authority
                .ok_or_else(|| ServiceError::validation("authority is required"))?,
            self.password
                .ok_or_else(|| ServiceError::validation("password is required"))?,
        )
    }
}
