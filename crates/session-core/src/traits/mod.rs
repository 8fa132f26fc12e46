//! Ports the session domain depends on

mod password;
mod repositories;

pub use password::PasswordVerifier;
pub use repositories::{RepoResult, SessionStore, UserRepository};
