//! Business logic services

pub mod auth;
pub mod authority;
pub mod context;
pub mod error;
pub mod maintenance;

pub use auth::AuthService;
pub use authority::{Principal, SessionAuthority, SessionPolicy, TokenLifetimes};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use maintenance::{ExpiredSessionSweeper, SweeperHandle};
