//! Exchange rate types and the provider abstraction

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single normalized quote as published by a bank rate board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub currency: String,
    pub name: String,
    pub buying_rate: f64,
    pub cash_buying_rate: f64,
    pub selling_rate: f64,
    pub cash_selling_rate: f64,
    pub middle_rate: f64,
    pub pub_time: String,
}

impl ExchangeRate {
    /// Finds the quote for `currency`, ignoring ASCII case.
    pub fn find<'a>(rates: &'a [ExchangeRate], currency: &str) -> Option<&'a ExchangeRate> {
        rates
            .iter()
            .find(|r| r.currency.eq_ignore_ascii_case(currency))
    }
}

/// Records served when every live source has failed.
pub fn seed_rates() -> Vec<ExchangeRate> {
    vec![ExchangeRate {
        currency: "SEK".to_string(),
        name: "Swedish Krona".to_string(),
        buying_rate: 65.83,
        cash_buying_rate: 65.83,
        selling_rate: 66.35,
        cash_selling_rate: 66.35,
        middle_rate: 65.88,
        pub_time: "2024.12.02 22:38:59".to_string(),
    }]
}

/// A single upstream source of exchange rates.
///
/// Implementations return `Err` when the source is unreachable or yields no
/// usable rows; an `Ok` result is never empty.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn fetch_rates(&self) -> Result<Vec<ExchangeRate>>;
}
