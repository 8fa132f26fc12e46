//! # session-db
//!
//! Store layer implementing the session-core store traits.
//!
//! ## Overview
//!
//! - `PgSessionStore` / `PgUserRepository`: PostgreSQL via SQLx, every call
//!   bounded by an operation timeout
//! - `MemorySessionStore` / `MemoryUserRepository`: process-local stores
//!   guarded by a single lock, used for tests and single-node deployments
//! - Connection pool management and bundled schema migrations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use session_db::{create_pool, run_migrations, PgSessionStore, PoolConfig};
//! use std::time::Duration;
//!
//! async fn example(url: &str) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::new(url)).await?;
//!     run_migrations(&pool).await?;
//!     let store = PgSessionStore::new(pool, Duration::from_secs(5));
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{MemorySessionStore, MemoryUserRepository};
pub use migrations::run_migrations;
pub use pool::{create_pool, PgPool, PoolConfig};
pub use repositories::{PgSessionStore, PgUserRepository};
