use crate::core::cache::Cache;
use crate::providers::fallback::{FallbackRateProvider, RatesOutcome};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const RATES_KEY: &str = "rates";

/// Serves live rates from `cache` while they are younger than `freshness`.
///
/// The check and the refill are not locked together, so two callers racing
/// on an expired entry may both hit the upstream boards. Seed data is never
/// cached so the next caller retries the live sources.
pub struct CachingRateProvider {
    inner: FallbackRateProvider,
    cache: Arc<dyn Cache<String, RatesOutcome>>,
    freshness: Duration,
}

impl CachingRateProvider {
    pub fn new(
        inner: FallbackRateProvider,
        cache: Arc<dyn Cache<String, RatesOutcome>>,
        freshness: Duration,
    ) -> Self {
        Self {
            inner,
            cache,
            freshness,
        }
    }

    pub async fn fetch(&self) -> RatesOutcome {
        match self.cached().await {
            Some(outcome) => outcome,
            None => self.refresh().await,
        }
    }

    /// Returns the cached outcome if it is still fresh.
    pub async fn cached(&self) -> Option<RatesOutcome> {
        let cached = self.cache.get(&RATES_KEY.to_string()).await;
        debug!(hit = cached.is_some(), "Checked rates cache");
        cached
    }

    /// Fetches from the upstream chain regardless of cache state.
    pub async fn refresh(&self) -> RatesOutcome {
        let outcome = self.inner.fetch().await;
        if outcome.is_live() {
            self.cache
                .put(RATES_KEY.to_string(), outcome.clone(), Some(self.freshness))
                .await;
        }
        outcome
    }
}
