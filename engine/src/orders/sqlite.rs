//! SQLite-backed order storage
//!
//! Each order is one row; the full record is kept as JSON text so the
//! schema does not change when the record gains optional fields.

use async_trait::async_trait;
use sdk::errors::BotError;
use sdk::OrderRecord;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{ConnectOptions, Row};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::{generate_order_id, OrderRecorder};

fn storage_err(context: &str, e: sqlx::Error) -> BotError {
    BotError::Storage(format!("{}: {}", context, e))
}

/// Orders table in a WAL-mode SQLite database
#[derive(Debug, Clone)]
pub struct SqliteOrderRecorder {
    pool: SqlitePool,
}

impl SqliteOrderRecorder {
    /// Open (or create) the database and apply migrations
    pub async fn new(db_path: &Path) -> Result<Self, BotError> {
        info!("Opening order database at {}", db_path.display());

        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                BotError::Storage(format!("Failed to create database directory: {}", e))
            })?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))
            .map_err(|e| storage_err("Invalid database path", e))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| storage_err("Failed to connect to database", e))?;

        let recorder = Self { pool };
        recorder.run_migrations().await?;
        Ok(recorder)
    }

    async fn run_migrations(&self) -> Result<(), BotError> {
        sqlx::raw_sql(include_str!("../../migrations/001_orders.sql"))
            .execute(&self.pool)
            .await
            .map_err(|e| storage_err("Failed to execute migration 001_orders.sql", e))?;
        debug!("Order database migrations applied");
        Ok(())
    }

    /// Checkpoint the WAL and close the pool
    pub async fn close(self) {
        if let Err(e) = sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await
        {
            warn!("Failed to checkpoint WAL: {}", e);
        }
        self.pool.close().await;
    }
}

#[async_trait]
impl OrderRecorder for SqliteOrderRecorder {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn save(&self, mut record: OrderRecord) -> Result<String, BotError> {
        let total = i64::try_from(record.total).map_err(|_| {
            BotError::Storage(format!("Order total {} does not fit the database", record.total))
        })?;
        record.id = generate_order_id();
        let json = serde_json::to_string(&record)?;

        sqlx::query(
            "INSERT INTO orders (id, created_at, customer_phone, total, record) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(record.timestamp.to_rfc3339())
        .bind(&record.customer_phone)
        .bind(total)
        .bind(json)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_err("Failed to insert order", e))?;

        info!("Order {} saved to database", record.id);
        Ok(record.id)
    }

    async fn list(&self) -> Result<Vec<OrderRecord>, BotError> {
        let rows = sqlx::query("SELECT id, record FROM orders ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_err("Failed to list orders", e))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("id");
            let json: String = row.get("record");
            match serde_json::from_str::<OrderRecord>(&json) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping malformed order row {}: {}", id, e),
            }
        }
        Ok(records)
    }
}
