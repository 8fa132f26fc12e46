//! Repository implementations
//!
//! PostgreSQL implementations of the store traits defined in session-core.

mod error;
mod session_store;
mod user;

pub use session_store::PgSessionStore;
pub use user::PgUserRepository;
