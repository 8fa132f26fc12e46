//! Entity to model mappers
//!
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert` structs: Prepare entity data for database writes

mod refresh_token;
mod user;

pub use refresh_token::RefreshTokenInsert;
