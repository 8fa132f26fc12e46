//! Application configuration structs
//!
//! Loads configuration from environment variables (and `.env` if present).

use serde::Deserialize;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::SigningAlgorithm;

/// Minimum accepted length of the signing secret, in bytes
const MIN_SECRET_BYTES: usize = 32;

/// Longest accepted token lifetime: ten years, in seconds
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub store: StoreConfig,
    /// Present whenever `DATABASE_URL` is set; required for the postgres backend
    pub database: Option<DatabaseConfig>,
    pub session: SessionConfig,
    pub maintenance: MaintenanceConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which session store implementation backs the authority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// Process-local store for tests and local runs. Sessions do not survive
    /// a restart and users can only be added in-process. Rejected in production.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

/// Session store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

impl StoreConfig {
    /// Upper bound for a single store call
    #[must_use]
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

/// Credential and session policy configuration
#[derive(Clone, Deserialize)]
pub struct SessionConfig {
    pub signing_secret: String,
    #[serde(default)]
    pub algorithm: SigningAlgorithm,
    /// Access credential lifetime in seconds
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl: i64,
    /// Refresh token lifetime in seconds
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl: i64,
    /// Logout revokes every active session of the subject
    #[serde(default)]
    pub revoke_all_on_logout: bool,
    /// Logout denylists the presented access credential
    #[serde(default = "default_true")]
    pub denylist_access_on_logout: bool,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("signing_secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("revoke_all_on_logout", &self.revoke_all_on_logout)
            .field("denylist_access_on_logout", &self.denylist_access_on_logout)
            .finish()
    }
}

/// Background maintenance configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceConfig {
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl MaintenanceConfig {
    /// `None` when sweeping is disabled
    #[must_use]
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

// Default value functions
fn default_app_name() -> String {
    "session-authority".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_operation_timeout_ms() -> u64 {
    5000
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_access_token_ttl() -> i64 {
    900 // 15 minutes
}

fn default_refresh_token_ttl() -> i64 {
    604_800 // 7 days
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_true() -> bool {
    true
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse an optional variable, falling back to `default` when unset
fn parsed<T, F>(
    lookup: &F,
    key: &'static str,
    default: impl FnOnce() -> T,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse(&raw).ok_or(ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

/// A token lifetime in seconds that is positive, at most ten years, and
/// representable as an expiry from now
fn parse_ttl(s: &str) -> Option<i64> {
    let secs: i64 = s.parse().ok()?;
    if secs <= 0 || secs > MAX_TOKEN_TTL_SECS {
        return None;
    }
    chrono::Duration::try_seconds(secs)
        .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
        .map(|_| secs)
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if required values are missing or invalid
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = StoreConfig {
            backend: parsed(&lookup, "SESSION_STORE", StoreBackend::default, |s| s.parse().ok())?,
            operation_timeout_ms: parsed(
                &lookup,
                "STORE_OPERATION_TIMEOUT_MS",
                default_operation_timeout_ms,
                |s| s.parse().ok().filter(|ms| *ms > 0),
            )?,
        };

        let database = match lookup("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parsed(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    default_max_connections,
                    |s| s.parse().ok(),
                )?,
                min_connections: parsed(
                    &lookup,
                    "DATABASE_MIN_CONNECTIONS",
                    default_min_connections,
                    |s| s.parse().ok(),
                )?,
                run_migrations: parsed(&lookup, "DATABASE_RUN_MIGRATIONS", default_true, parse_bool)?,
            }),
            None if store.backend == StoreBackend::Postgres => {
                return Err(ConfigError::MissingVar("DATABASE_URL"));
            }
            None => None,
        };

        let signing_secret = lookup("JWT_SECRET").ok_or(ConfigError::MissingVar("JWT_SECRET"))?;
        if signing_secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::InvalidValue(
                "JWT_SECRET",
                format!("must be at least {MIN_SECRET_BYTES} bytes"),
            ));
        }

        let session = SessionConfig {
            signing_secret,
            algorithm: parsed(&lookup, "JWT_ALGORITHM", SigningAlgorithm::default, |s| {
                s.parse().ok()
            })?,
            access_token_ttl: parsed(
                &lookup,
                "JWT_ACCESS_TOKEN_EXPIRY",
                default_access_token_ttl,
                parse_ttl,
            )?,
            refresh_token_ttl: parsed(
                &lookup,
                "JWT_REFRESH_TOKEN_EXPIRY",
                default_refresh_token_ttl,
                parse_ttl,
            )?,
            revoke_all_on_logout: parsed(
                &lookup,
                "SESSION_REVOKE_ALL_ON_LOGOUT",
                bool::default,
                parse_bool,
            )?,
            denylist_access_on_logout: parsed(
                &lookup,
                "SESSION_DENYLIST_ACCESS_ON_LOGOUT",
                default_true,
                parse_bool,
            )?,
        };

        let env = lookup("APP_ENV")
            .and_then(|s| Environment::parse(&s))
            .unwrap_or_default();
        if env.is_production() && store.backend == StoreBackend::Memory {
            return Err(ConfigError::InvalidValue(
                "SESSION_STORE",
                "memory backend is not allowed in production".to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            api: ServerConfig {
                host: lookup("API_HOST").unwrap_or_else(default_host),
                port: parsed(&lookup, "API_PORT", default_port, |s| s.parse().ok())?,
            },
            store,
            database,
            session,
            maintenance: MaintenanceConfig {
                sweep_interval_secs: parsed(
                    &lookup,
                    "SESSION_SWEEP_INTERVAL_SECS",
                    default_sweep_interval_secs,
                    |s| s.parse().ok(),
                )?,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
