use crate::error::DbError;
use configuration::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::env;
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// The URL comes from `config.url` when set, otherwise from `DATABASE_URL`
/// (a `.env` file is honored if present). This pool can be shared across the
/// entire application.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let database_url = resolve_database_url(config)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&database_url)
        .await?;

    tracing::info!(max_connections = config.max_connections, "Database pool established.");
    Ok(pool)
}

fn resolve_database_url(config: &DatabaseConfig) -> Result<String, DbError> {
    if let Some(url) = config.url.as_ref().filter(|u| !u.trim().is_empty()) {
        return Ok(url.clone());
    }

    // A missing .env file is fine; the variable may come from the real environment.
    dotenvy::dotenv().ok();
    env::var("DATABASE_URL").map_err(|_e| {
        DbError::ConnectionConfigError(
            "database.url is not configured and DATABASE_URL is not set.".to_string(),
        )
    })
}

/// A utility function to run database migrations automatically.
///
/// Ensures the `users` and `asset_analyses` tables exist before the first save.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
