use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DatabaseConfig;

/// Builds the pool without connecting; the first query opens a connection.
/// The service therefore starts, and reports DOWN, while the store is away.
pub fn connect_lazy(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let options = config
        .connect_options()
        .context("parse database connection options")?;
    Ok(PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_lazy_with(options))
}

/// Creates the `users` table if absent. Failure is logged, not fatal.
pub async fn migrate(pool: &PgPool) {
    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => tracing::info!("users table ready"),
        Err(e) => tracing::warn!(error = %e, "database migration failed; continuing"),
    }
}
