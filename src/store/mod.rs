pub mod disk;
pub mod memory;

use crate::core::HistoryStore;
use crate::core::config::AppConfig;
use disk::DiskHistoryStore;
use memory::MemoryHistoryStore;
use std::sync::Arc;
use tracing::warn;

/// Opens the persistent history store under the configured data path.
///
/// If the data directory cannot be resolved or opened, history is kept in
/// memory for this run instead.
pub fn open_history_store(config: &AppConfig) -> Arc<dyn HistoryStore> {
    let retention = config.history.retention();
    let disk = config
        .default_data_path()
        .and_then(|path| DiskHistoryStore::open(&path, retention));

    match disk {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "History store unavailable, keeping history in memory");
            Arc::new(MemoryHistoryStore::new(retention))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HistoricalRatePoint;
    use chrono::Utc;

    #[tokio::test]
    async fn test_open_history_store_uses_data_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.history.data_path = Some(dir.path().to_string_lossy().to_string());

        let store = open_history_store(&config);
        let point = HistoricalRatePoint {
            buying_rate: 1.0,
            selling_rate: 1.2,
            middle_rate: 1.1,
            timestamp: Utc::now(),
        };
        store.append("USD", point).await.unwrap();

        assert!(dir.path().join("history").exists());
        assert_eq!(store.series("USD").await.unwrap().len(), 1);
    }
}
