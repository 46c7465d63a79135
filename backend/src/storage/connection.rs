use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

// Concurrent writers wait this long for the database lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// DbConnection manages the SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection, creating the database file if needed
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;
        info!("Connected to database at {}", url);

        Ok(Self { pool: Arc::new(pool) })
    }

    /// In-memory database for tests.
    ///
    /// Uses a single long-lived connection: an in-memory SQLite database only
    /// lives as long as its connection, and one connection also serializes
    /// transactions.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // Money columns hold canonical decimal strings so no precision is lost
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS loans (
                id TEXT PRIMARY KEY,
                customer_name TEXT NOT NULL,
                loan_amount TEXT NOT NULL,
                remaining_amount TEXT NOT NULL,
                loan_duration INTEGER NOT NULL CHECK (loan_duration >= 1 AND loan_duration <= 120),
                bank_file TEXT NOT NULL,
                created_at DATETIME NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_loans_created_at
            ON loans(created_at);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS installments (
                loan_id TEXT NOT NULL,
                installment_number INTEGER NOT NULL CHECK (installment_number >= 1),
                due_date DATETIME NOT NULL,
                installment_amount TEXT NOT NULL,
                remaining_balance TEXT NOT NULL,
                is_paid BOOLEAN NOT NULL DEFAULT FALSE,
                PRIMARY KEY (loan_id, installment_number),
                FOREIGN KEY (loan_id) REFERENCES loans (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
