use std::{str::FromStr, time::Duration};

use log::{debug, info};
use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite,
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Writers queue on the database lock for up to [`BUSY_TIMEOUT`]; readers
/// never block them under WAL.
pub async fn establish_pool(database_url: &str, max_connections: u32) -> Result<Pool<Sqlite>, sqlx::Error> {
    debug!("Connecting to {database_url}");
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// A private in-memory database. Every connection to `:memory:` is its own
/// database, so the pool holds exactly one connection that never expires.
pub async fn establish_memory_pool() -> Result<Pool<Sqlite>, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
