//! One JSON file per order under the orders directory

use async_trait::async_trait;
use sdk::errors::BotError;
use sdk::OrderRecord;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::{generate_order_id, OrderRecorder};

/// Writes `<dir>/<id>.json`
#[derive(Debug, Clone)]
pub struct FileOrderRecorder {
    dir: PathBuf,
}

impl FileOrderRecorder {
    /// Create the recorder, creating `dir` if needed
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, BotError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            BotError::Storage(format!(
                "Failed to create orders directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        debug!("Order files stored in {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    async fn write_durably(&self, id: &str, contents: &[u8]) -> std::io::Result<()> {
        let final_path = self.path_for(id);
        let tmp_path = self.dir.join(format!(".{}.json.tmp", id));

        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = tokio::fs::rename(&tmp_path, &final_path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRecorder for FileOrderRecorder {
    fn name(&self) -> &str {
        "files"
    }

    async fn save(&self, mut record: OrderRecord) -> Result<String, BotError> {
        record.id = generate_order_id();
        let json = serde_json::to_vec_pretty(&record)?;

        self.write_durably(&record.id, &json).await.map_err(|e| {
            BotError::Storage(format!("Failed to write order {}: {}", record.id, e))
        })?;

        info!(
            "Order {} saved to {}",
            record.id,
            self.path_for(&record.id).display()
        );
        Ok(record.id)
    }

    async fn list(&self) -> Result<Vec<OrderRecord>, BotError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let contents = match tokio::fs::read(&path).await {
                Ok(contents) => contents,
                Err(e) => {
                    warn!("Skipping unreadable order file {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_slice::<OrderRecord>(&contents) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping malformed order file {}: {}", path.display(), e),
            }
        }

        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdk::{CartLine, MenuItem, OrderDraft};
    use tempfile::TempDir;

    fn record() -> OrderRecord {
        let mut line = CartLine::from_item(&MenuItem::new("paneer_tikka", "Paneer Tikka", 160));
        line.quantity = 2;
        OrderRecord::assemble("whatsapp:+911", vec![line], &OrderDraft::default(), "upi")
    }

    #[tokio::test]
    async fn test_save_writes_pretty_json_named_by_id() {
        let dir = TempDir::new().unwrap();
        let recorder = FileOrderRecorder::new(dir.path()).await.unwrap();

        let id = recorder.save(record()).await.unwrap();
        let path = dir.path().join(format!("{}.json", id));
        assert!(path.exists());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains('\n'));
        let saved: OrderRecord = serde_json::from_str(&contents).unwrap();
        assert_eq!(saved.id, id);
        assert_eq!(saved.total, 320);
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let recorder = FileOrderRecorder::new(dir.path()).await.unwrap();
        recorder.save(record()).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".json"));
        assert!(!names[0].starts_with('.'));
    }

    #[tokio::test]
    async fn test_list_skips_foreign_and_malformed_files() {
        let dir = TempDir::new().unwrap();
        let recorder = FileOrderRecorder::new(dir.path()).await.unwrap();
        recorder.save(record()).await.unwrap();

        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();

        let records = recorder.list().await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_list_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let recorder = FileOrderRecorder::new(dir.path().join("orders")).await.unwrap();
        std::fs::remove_dir(recorder.dir()).unwrap();
        assert!(recorder.list().await.unwrap().is_empty());
    }
}
