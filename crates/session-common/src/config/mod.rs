//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, Environment, MaintenanceConfig,
    ServerConfig, SessionConfig, StoreBackend, StoreConfig, MAX_TOKEN_TTL_SECS,
};
