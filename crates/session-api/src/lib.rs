//! # session-api
//!
//! REST API for the session authority built with Axum.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{build_app_state, connect_stores, create_app, create_app_state, run, StoreHandles};
pub use state::AppState;
