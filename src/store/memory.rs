use crate::core::cache::Cache;
use crate::core::history::{HistoricalRatePoint, HistoryStore, default_retention, prune};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now)
    }
}

/// Process-local TTL cache. Expired entries are evicted when read.
pub struct MemoryCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> MemoryCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for MemoryCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().await;
        if entries.get(key)?.is_expired(Instant::now()) {
            debug!(?key, "Evicting expired cache entry");
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        debug!(?key, ?ttl, "Caching value");
        self.entries
            .lock()
            .await
            .insert(key, Entry { value, expires_at });
    }
}

/// Rate history kept only for the lifetime of the process.
pub struct MemoryHistoryStore {
    series: Mutex<HashMap<String, Vec<HistoricalRatePoint>>>,
    retention: chrono::Duration,
}

impl MemoryHistoryStore {
    pub fn new(retention: chrono::Duration) -> Self {
        Self {
            series: Mutex::new(HashMap::new()),
            retention,
        }
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new(default_retention())
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, currency: &str, point: HistoricalRatePoint) -> Result<()> {
        let mut all = self.series.lock().await;
        let mut series = all.remove(currency).unwrap_or_default();
        series.push(point);
        all.insert(
            currency.to_string(),
            prune(series, Utc::now(), self.retention),
        );
        Ok(())
    }

    async fn series(&self, currency: &str) -> Result<Vec<HistoricalRatePoint>> {
        let all = self.series.lock().await;
        let series = all.get(currency).cloned().unwrap_or_default();
        Ok(prune(series, Utc::now(), self.retention))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::{HistoryWrite, record};
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = MemoryCache::<String, i32>::new();

        // Initially, cache is empty
        assert!(cache.get(&"key1".to_string()).await.is_none());

        // Put a value without TTL
        cache.put("key1".to_string(), 123, None).await;

        // Get the value
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        // Get a non-existent key
        assert!(cache.get(&"key2".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_ttl_expiration() {
        let cache = MemoryCache::<String, i32>::new();

        cache
            .put("key1".to_string(), 123, Some(Duration::from_millis(10)))
            .await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());
        assert!(cache.entries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_cache_put_replaces_value() {
        let cache = MemoryCache::<String, i32>::new();

        cache.put("key1".to_string(), 123, None).await;
        cache.put("key1".to_string(), 456, None).await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(456));
    }

    #[tokio::test]
    async fn test_history_write_then_read() {
        let store = MemoryHistoryStore::default();
        let write = HistoryWrite {
            currency: "USD".to_string(),
            buying_rate: 7.1,
            selling_rate: 7.3,
            middle_rate: 7.2,
        };

        record(&store, write).await.unwrap();
        let series = store.series("USD").await.unwrap();

        let last = series.last().unwrap();
        assert_eq!(last.buying_rate, 7.1);
        assert_eq!(last.selling_rate, 7.3);
        assert_eq!(last.middle_rate, 7.2);
        assert!((Utc::now() - last.timestamp).num_seconds() < 5);
        assert!(store.series("EUR").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_write_prunes_expired_points() {
        let store = MemoryHistoryStore::default();
        let old = HistoricalRatePoint {
            buying_rate: 1.0,
            selling_rate: 1.0,
            middle_rate: 1.0,
            timestamp: Utc::now() - chrono::Duration::days(31),
        };
        store
            .series
            .lock()
            .await
            .insert("USD".to_string(), vec![old]);

        let fresh = HistoricalRatePoint {
            buying_rate: 2.0,
            selling_rate: 2.0,
            middle_rate: 2.0,
            timestamp: Utc::now(),
        };
        store.append("USD", fresh).await.unwrap();

        let series = store.series("USD").await.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].middle_rate, 2.0);
        assert_eq!(store.series.lock().await["USD"].len(), 1);
    }

    #[tokio::test]
    async fn test_record_rejects_empty_currency() {
        let store = MemoryHistoryStore::default();
        let write = HistoryWrite {
            currency: "  ".to_string(),
            buying_rate: 1.0,
            selling_rate: 1.0,
            middle_rate: 1.0,
        };
        assert!(record(&store, write).await.is_err());
    }
}
