//! SQLite-backed stores for users and tasks.
//!
//! All queries are built at runtime with `sqlx::query_as`, so no database is
//! needed at compile time. The schema lives in `migrations/` and is applied by
//! [`connect`].

pub mod tasks;
pub mod users;

pub use tasks::TaskRepository;
pub use users::UserRepository;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

/// Opens a pool for `database_url` and runs pending migrations.
///
/// An in-memory database (`sqlite::memory:`) only lives as long as its
/// connection, so it gets a single connection that is never recycled.
pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?
    };

    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("database ready at {}", database_url);
    Ok(pool)
}
