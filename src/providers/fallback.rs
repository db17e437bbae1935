//! Tries the primary board, then the secondary board, then serves seed data.
//!
//! The chain is linear with no retries inside a source. Failures never
//! escape: callers always receive a non-empty rate list.

use crate::core::config::AppConfig;
use crate::core::rate::seed_rates;
use crate::core::{ExchangeRate, RateProvider, SourceError};
use crate::providers::{bank_of_china, cib};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{info, warn};

/// Which tier of the chain produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateOrigin {
    Primary,
    Secondary,
    /// Every live source failed.
    Seed,
}

impl Display for RateOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RateOrigin::Primary => "primary",
                RateOrigin::Secondary => "secondary",
                RateOrigin::Seed => "seed",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesOutcome {
    pub rates: Vec<ExchangeRate>,
    pub origin: RateOrigin,
}

impl RatesOutcome {
    pub fn is_live(&self) -> bool {
        self.origin != RateOrigin::Seed
    }
}

pub struct FallbackRateProvider {
    primary: Box<dyn RateProvider>,
    secondary: Box<dyn RateProvider>,
}

impl FallbackRateProvider {
    pub fn new(primary: Box<dyn RateProvider>, secondary: Box<dyn RateProvider>) -> Self {
        Self { primary, secondary }
    }

    /// Builds the Bank of China -> CIB chain from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let primary = bank_of_china::provider(&config.providers.bank_of_china.url, &config.fetch)?;
        let secondary = cib::provider(&config.providers.cib.url, &config.fetch)?;
        Ok(Self::new(Box::new(primary), Box::new(secondary)))
    }

    async fn attempt(provider: &dyn RateProvider) -> Option<Vec<ExchangeRate>> {
        match provider.fetch_rates().await {
            Ok(rates) if !rates.is_empty() => Some(rates),
            Ok(_) => {
                warn!("{} returned no rates", provider.name());
                None
            }
            Err(e) => {
                match e.downcast_ref::<SourceError>() {
                    Some(source_err) if source_err.is_empty() => {
                        warn!("No {} rates found in the response", provider.name());
                    }
                    _ => {
                        warn!(error = %e, "Error fetching {} rates", provider.name());
                    }
                }
                None
            }
        }
    }

    pub async fn fetch(&self) -> RatesOutcome {
        info!("Attempting to fetch {} exchange rates", self.primary.name());
        if let Some(rates) = Self::attempt(self.primary.as_ref()).await {
            return RatesOutcome {
                rates,
                origin: RateOrigin::Primary,
            };
        }

        info!("Falling back to {} exchange rates", self.secondary.name());
        if let Some(rates) = Self::attempt(self.secondary.as_ref()).await {
            return RatesOutcome {
                rates,
                origin: RateOrigin::Secondary,
            };
        }

        warn!("All rate sources failed, serving seed rates");
        RatesOutcome {
            rates: seed_rates(),
            origin: RateOrigin::Seed,
        }
    }

    /// Always returns at least the seed rates.
    pub async fn get_rates(&self) -> Vec<ExchangeRate> {
        self.fetch().await.rates
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub fn rate(currency: &str, buy: f64, sell: f64) -> ExchangeRate {
        ExchangeRate {
            currency: currency.to_string(),
            name: currency.to_string(),
            buying_rate: buy,
            cash_buying_rate: buy,
            selling_rate: sell,
            cash_selling_rate: sell,
            middle_rate: (buy + sell) / 2.0,
            pub_time: "2024.12.02 22:38:59".to_string(),
        }
    }

    pub enum Behaviour {
        Rates(Vec<ExchangeRate>),
        Empty,
        Fail,
    }

    pub struct MockProvider {
        name: String,
        behaviour: Behaviour,
        pub calls: Arc<AtomicUsize>,
    }

    impl MockProvider {
        pub fn new(name: &str, behaviour: Behaviour) -> Self {
            Self {
                name: name.to_string(),
                behaviour,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl RateProvider for MockProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch_rates(&self) -> Result<Vec<ExchangeRate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behaviour {
                Behaviour::Rates(rates) => Ok(rates.clone()),
                Behaviour::Empty => Err(SourceError::Empty {
                    source_name: self.name.clone(),
                }
                .into()),
                Behaviour::Fail => Err(anyhow!("connection refused")),
            }
        }
    }
}
