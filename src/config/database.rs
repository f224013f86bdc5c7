//! PostgreSQL connection pool initialization.
//!
//! The connection string is read from `DATABASE_URL`. The returned pool is
//! cheaply cloneable and lives in [`crate::state::AppState`] for the whole
//! process lifetime.

use sqlx::PgPool;
use std::env;

/// Initialize the connection pool.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is unset or the database is unreachable; both
/// are startup-fatal conditions.
pub async fn init_db_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database")
}
