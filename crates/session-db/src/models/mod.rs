//! Database models with SQLx `FromRow` derives

mod denylist;
mod refresh_token;
mod user;

pub use denylist::DenylistModel;
pub use refresh_token::RefreshTokenModel;
pub use user::UserModel;
