//! Rolling per-currency rate history.
//!
//! Points are stamped when written and kept for a sliding retention window.
//! Retention is enforced by [`prune`], a pure function that every store
//! applies on write and again on read.

use crate::core::rate::ExchangeRate;
use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default retention window for stored series.
pub const RETENTION_DAYS: i64 = 30;

pub fn default_retention() -> Duration {
    Duration::days(RETENTION_DAYS)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRatePoint {
    pub buying_rate: f64,
    pub selling_rate: f64,
    pub middle_rate: f64,
    pub timestamp: DateTime<Utc>,
}

/// A history write as accepted from callers; the timestamp is assigned by
/// [`record`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryWrite {
    pub currency: String,
    pub buying_rate: f64,
    pub selling_rate: f64,
    pub middle_rate: f64,
}

impl From<&ExchangeRate> for HistoryWrite {
    fn from(rate: &ExchangeRate) -> Self {
        HistoryWrite {
            currency: rate.currency.clone(),
            buying_rate: rate.buying_rate,
            selling_rate: rate.selling_rate,
            middle_rate: rate.middle_rate,
        }
    }
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends `point` to the series for `currency` and prunes expired points.
    async fn append(&self, currency: &str, point: HistoricalRatePoint) -> Result<()>;

    /// Returns the retained series for `currency`, oldest first.
    async fn series(&self, currency: &str) -> Result<Vec<HistoricalRatePoint>>;

    /// Makes previously appended points durable. A no-op for stores that
    /// hold nothing outside the process.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Drops points older than `now - retention` and orders the rest by
/// timestamp ascending.
pub fn prune(
    mut series: Vec<HistoricalRatePoint>,
    now: DateTime<Utc>,
    retention: Duration,
) -> Vec<HistoricalRatePoint> {
    let cutoff = now - retention;
    series.retain(|p| p.timestamp >= cutoff);
    series.sort_by_key(|p| p.timestamp);
    series
}

async fn append_stamped(store: &dyn HistoryStore, write: HistoryWrite) -> Result<HistoricalRatePoint> {
    let currency = write.currency.trim();
    if currency.is_empty() {
        bail!("Currency is required for a history write");
    }

    let point = HistoricalRatePoint {
        buying_rate: write.buying_rate,
        selling_rate: write.selling_rate,
        middle_rate: write.middle_rate,
        timestamp: Utc::now(),
    };
    store.append(currency, point.clone()).await?;
    debug!(currency, middle_rate = point.middle_rate, "Recorded history point");
    Ok(point)
}

/// Stamps `write` with the current time, appends it to `store` and flushes.
pub async fn record(store: &dyn HistoryStore, write: HistoryWrite) -> Result<HistoricalRatePoint> {
    let point = append_stamped(store, write).await?;
    store.flush().await?;
    Ok(point)
}

/// Records one point per rate and flushes the store once for the batch.
/// Individual failures are logged and counted, not propagated; returns the
/// number of points written.
pub async fn record_all(store: &dyn HistoryStore, rates: &[ExchangeRate]) -> usize {
    let results = join_all(
        rates
            .iter()
            .map(|rate| append_stamped(store, HistoryWrite::from(rate))),
    )
    .await;

    let written = results
        .into_iter()
        .zip(rates)
        .filter(|(result, rate)| match result {
            Ok(_) => true,
            Err(e) => {
                warn!(currency = %rate.currency, error = %e, "Failed to record history point");
                false
            }
        })
        .count();

    if written > 0
        && let Err(e) = store.flush().await
    {
        warn!(error = %e, "Failed to flush history store");
    }
    written
}
