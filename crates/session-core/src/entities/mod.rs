//! Domain entities - session records and the principals that own them

mod denylist;
mod refresh_token;
mod user;

pub use denylist::{DenylistedCredential, PurgeReport};
pub use refresh_token::{RefreshToken, RevocationReason, TokenState};
pub use user::User;
