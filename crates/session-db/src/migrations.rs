//! Bundled schema migrations
//!
//! Every script is idempotent (`IF NOT EXISTS`), so they are simply applied
//! in order at startup.

use sqlx::PgPool;

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "0001_create_users",
        include_str!("../migrations/0001_create_users.sql"),
    ),
    (
        "0002_create_refresh_tokens",
        include_str!("../migrations/0002_create_refresh_tokens.sql"),
    ),
    (
        "0003_create_access_denylist",
        include_str!("../migrations/0003_create_access_denylist.sql"),
    ),
];

/// Apply all bundled migrations
///
/// # Errors
/// Returns the first SQL error encountered
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    for (name, sql) in MIGRATIONS {
        tracing::debug!(migration = name, "Applying migration");
        sqlx::raw_sql(sql).execute(pool).await?;
    }

    tracing::info!(count = MIGRATIONS.len(), "Migrations completed successfully");
    Ok(())
}
