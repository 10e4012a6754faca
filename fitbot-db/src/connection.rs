use std::{str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    Executor, SqlitePool,
};

use crate::Result;

const SCHEMA_QUERY: &str = "CREATE TABLE IF NOT EXISTS user_profile (
    user_id INTEGER PRIMARY KEY NOT NULL,
    chat_id INTEGER NOT NULL,
    name TEXT,
    sex TEXT CHECK (sex IN ('M', 'F')),
    age INTEGER CHECK (age > 0),
    height_cm INTEGER CHECK (height_cm > 0),
    weight_kg REAL CHECK (weight_kg > 0),
    activity INTEGER CHECK (activity BETWEEN 1 AND 5),
    updated_at INTEGER NOT NULL
);";

/// Handle to the profile database, shared by every request handler.
///
/// Cloning is cheap: clones share the same pool.
#[derive(Clone)]
pub struct Connection {
    pool: SqlitePool,
}

impl Connection {
    pub async fn establish(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Self::setup(pool).await
    }

    /// Private in-memory database. The pool is pinned to a single connection
    /// that never expires, since every new connection would see an empty
    /// database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::setup(pool).await
    }

    async fn setup(pool: SqlitePool) -> Result<Self> {
        pool.execute(SCHEMA_QUERY).await?;
        info!("Database schema ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        info!("Closing database connections");
        self.pool.close().await;
    }
}
