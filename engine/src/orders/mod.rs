//! Order Recorder
//!
//! Durable storage for confirmed orders. The conversation only sees the
//! `OrderRecorder` trait; the backend is picked by `[storage] backend`.

use async_trait::async_trait;
use chrono::Utc;
use sdk::errors::BotError;
use sdk::OrderRecord;
use std::sync::Arc;

use crate::config::{Config, StorageBackend};

pub mod files;
pub mod sqlite;

pub use files::FileOrderRecorder;
pub use sqlite::SqliteOrderRecorder;

/// Persists confirmed orders
#[async_trait]
pub trait OrderRecorder: Send + Sync {
    /// Backend name for logs and diagnostics
    fn name(&self) -> &str;

    /// Assign an id to `record`, write it durably, and return the id.
    ///
    /// # Errors
    ///
    /// Returns `BotError::Storage` (or `Io`/`Serialization`) when the record
    /// could not be persisted. Nothing is considered saved in that case.
    async fn save(&self, record: OrderRecord) -> Result<String, BotError>;

    /// All saved records, oldest first
    async fn list(&self) -> Result<Vec<OrderRecord>, BotError>;
}

/// Generate an order id: `ORD-<UTC timestamp>-<8 hex chars>`
///
/// The random suffix keeps ids unique for orders placed in the same second.
pub fn generate_order_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "ORD-{}-{}",
        Utc::now().format("%Y%m%d%H%M%S"),
        &suffix[..8]
    )
}

/// Open the recorder selected in config
pub async fn open(config: &Config) -> Result<Arc<dyn OrderRecorder>, BotError> {
    let recorder: Arc<dyn OrderRecorder> = match config.storage.backend {
        StorageBackend::Files => Arc::new(FileOrderRecorder::new(config.orders_dir()).await?),
        StorageBackend::Sqlite => {
            Arc::new(SqliteOrderRecorder::new(&config.database_path()).await?)
        }
    };
    Ok(recorder)
}
