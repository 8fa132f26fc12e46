//! Process-local store implementations
//!
//! All state sits behind one `parking_lot::Mutex`, so every conditional
//! transition is trivially atomic. Sessions do not survive a restart.

mod session_store;
mod user;

pub use session_store::MemorySessionStore;
pub use user::MemoryUserRepository;
