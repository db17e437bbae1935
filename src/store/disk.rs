use crate::core::history::{HistoricalRatePoint, HistoryStore, prune};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

const HISTORY_PARTITION: &str = "history";

/// Rate history persisted in a fjall keyspace, one JSON-encoded series per
/// currency key.
pub struct DiskHistoryStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
    retention: chrono::Duration,
    // Serializes read-modify-write appends so concurrent writers to one
    // series never drop each other's points.
    write_lock: Mutex<()>,
}

impl DiskHistoryStore {
    pub fn open(path: &Path, retention: chrono::Duration) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path.join("history"))
            .open()
            .with_context(|| format!("Failed to open history store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(HISTORY_PARTITION, PartitionCreateOptions::default())
            .context("Failed to open history partition")?;

        debug!("Opened history store at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
            retention,
            write_lock: Mutex::new(()),
        })
    }

    fn load(&self, currency: &str) -> Result<Vec<HistoricalRatePoint>> {
        match self.partition.get(currency.as_bytes())? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("Corrupt history series for currency: {currency}")),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl HistoryStore for DiskHistoryStore {
    async fn append(&self, currency: &str, point: HistoricalRatePoint) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut series = self.load(currency)?;
        series.push(point);
        let series = prune(series, Utc::now(), self.retention);

        self.partition
            .insert(currency.as_bytes(), serde_json::to_vec(&series)?)
            .with_context(|| format!("Failed to write history for currency: {currency}"))?;

        debug!(currency, points = series.len(), "History series written");
        Ok(())
    }

    async fn series(&self, currency: &str) -> Result<Vec<HistoricalRatePoint>> {
        Ok(prune(self.load(currency)?, Utc::now(), self.retention))
    }

    /// Syncs the journal to disk on the blocking pool.
    async fn flush(&self) -> Result<()> {
        let keyspace = self.keyspace.clone();
        tokio::task::spawn_blocking(move || keyspace.persist(PersistMode::SyncAll))
            .await
            .context("History flush task failed")?
            .context("Failed to persist history store")?;
        debug!("History store flushed");
        Ok(())
    }
}
