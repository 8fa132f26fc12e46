//! Integration test utilities for the session API
//!
//! Spawns the API in-process on an ephemeral port with the memory backend
//! and drives it over real HTTP.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
