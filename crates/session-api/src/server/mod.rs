//! Server setup and initialization
//!
//! Provides store selection, the application builder and the server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use session_common::{AppConfig, AppError, Argon2PasswordService, CredentialSigner, StoreBackend};
use session_core::{SessionStore, UserRepository};
use session_db::{
    create_pool, run_migrations, MemorySessionStore, MemoryUserRepository, PgSessionStore,
    PgUserRepository, PoolConfig,
};
use session_service::{
    ExpiredSessionSweeper, ServiceContextBuilder, SessionAuthority, SessionPolicy, TokenLifetimes,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// The store adapters backing a running server
#[derive(Clone)]
pub struct StoreHandles {
    pub user_repo: Arc<dyn UserRepository>,
    pub session_store: Arc<dyn SessionStore>,
}

impl StoreHandles {
    /// Fresh process-local stores
    pub fn memory() -> Self {
        Self {
            user_repo: Arc::new(MemoryUserRepository::new()),
            session_store: Arc::new(MemorySessionStore::new()),
        }
    }
}

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    apply_middleware(create_router()).with_state(state)
}

/// Open the configured store backend
pub async fn connect_stores(config: &AppConfig) -> Result<StoreHandles, AppError> {
    match config.store.backend {
        StoreBackend::Memory => {
            warn!(
                "Using the in-memory stores (testing only): the user table starts empty and \
                 sessions will not survive a restart"
            );
            Ok(StoreHandles::memory())
        }
        StoreBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .ok_or_else(|| AppError::Config("DATABASE_URL is required".to_string()))?;
            let timeout = config.store.operation_timeout();

            info!("Connecting to PostgreSQL...");
            let pool = create_pool(&PoolConfig::from_database_config(database, timeout))
                .await
                .map_err(|e| AppError::Config(format!("Failed to connect to PostgreSQL: {e}")))?;
            info!("PostgreSQL connection established");

            if database.run_migrations {
                run_migrations(&pool)
                    .await
                    .map_err(|e| AppError::Config(format!("Failed to run migrations: {e}")))?;
                info!("Database migrations applied");
            }

            Ok(StoreHandles {
                user_repo: Arc::new(PgUserRepository::new(pool.clone(), timeout)),
                session_store: Arc::new(PgSessionStore::new(pool, timeout)),
            })
        }
    }
}

/// Wire the session authority and services on top of the given stores
pub fn build_app_state(config: AppConfig, stores: StoreHandles) -> Result<AppState, AppError> {
    let signer = CredentialSigner::new(
        config.session.signing_secret.as_bytes(),
        config.session.algorithm,
    );
    let authority = SessionAuthority::new(
        stores.session_store,
        signer,
        TokenLifetimes::from_config(&config.session),
        SessionPolicy::from_config(&config.session),
    );

    let service_context = ServiceContextBuilder::new()
        .user_repo(stores.user_repo)
        .authority(Arc::new(authority))
        .password(Arc::new(Argon2PasswordService::new()))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config))
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let stores = connect_stores(&config).await?;
    build_app_state(config, stores)
}

/// Serve `app` on an already-bound listener until ctrl-c
pub async fn run_server(app: Router, listener: TcpListener) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        info!("Server listening on http://{}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {e}")))?;
    let sweep_interval = config.maintenance.sweep_interval();

    let state = create_app_state(config).await?;

    let sweeper = sweep_interval.map(|interval| {
        info!(interval_secs = interval.as_secs(), "Starting expired session sweeper");
        ExpiredSessionSweeper::new(Arc::clone(state.service_context().session_store()), interval)
            .spawn()
    });

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    let result = run_server(create_app(state), listener).await;

    if let Some(sweeper) = sweeper {
        sweeper.shutdown().await;
    }

    result
}
