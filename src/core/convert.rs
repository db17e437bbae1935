//! Linear cross-rate conversion over a published rate board.
//!
//! Boards quote every currency against the bank's home currency, so any pair
//! converts through it using middle rates.

use crate::core::rate::ExchangeRate;
use anyhow::{Result, anyhow, bail};

pub const BASE_CURRENCY: &str = "CNY";

fn middle_rate(rates: &[ExchangeRate], currency: &str) -> Result<f64> {
    let rate = ExchangeRate::find(rates, currency)
        .ok_or_else(|| anyhow!("No rate available for currency: {}", currency))?;
    if rate.middle_rate <= 0.0 {
        bail!("Middle rate for {} is not usable: {}", currency, rate.middle_rate);
    }
    Ok(rate.middle_rate)
}

pub fn convert(rates: &[ExchangeRate], amount: f64, from: &str, to: &str) -> Result<f64> {
    let amount = amount.max(0.0);
    let is_base = |c: &str| c.eq_ignore_ascii_case(BASE_CURRENCY);

    match (is_base(from), is_base(to)) {
        (true, true) => Ok(amount),
        (true, false) => Ok(amount / middle_rate(rates, to)?),
        (false, true) => Ok(amount * middle_rate(rates, from)?),
        (false, false) => Ok(amount * middle_rate(rates, from)? / middle_rate(rates, to)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(currency: &str, middle_rate: f64) -> ExchangeRate {
        ExchangeRate {
            currency: currency.to_string(),
            name: currency.to_string(),
            buying_rate: middle_rate,
            cash_buying_rate: middle_rate,
            selling_rate: middle_rate,
            cash_selling_rate: middle_rate,
            middle_rate,
            pub_time: String::new(),
        }
    }

    #[test]
    fn test_convert_from_and_to_base() {
        let rates = vec![rate("USD", 7.2)];
        assert!((convert(&rates, 72.0, "CNY", "USD").unwrap() - 10.0).abs() < 1e-9);
        assert!((convert(&rates, 10.0, "USD", "CNY").unwrap() - 72.0).abs() < 1e-9);
    }

    #[test]
    fn test_cross_conversion_goes_through_base() {
        let rates = vec![rate("USD", 7.2), rate("EUR", 7.8)];
        let result = convert(&rates, 100.0, "usd", "EUR").unwrap();
        assert!((result - 100.0 * 7.2 / 7.8).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_currency_is_an_error() {
        let rates = vec![rate("USD", 7.2)];
        let err = convert(&rates, 1.0, "USD", "JPY").unwrap_err();
        assert_eq!(err.to_string(), "No rate available for currency: JPY");
    }

    #[test]
    fn test_zero_middle_rate_is_rejected() {
        let rates = vec![rate("USD", 0.0)];
        assert!(convert(&rates, 1.0, "CNY", "USD").is_err());
    }

    #[test]
    fn test_negative_amount_is_clamped() {
        let rates = vec![rate("USD", 7.2)];
        assert_eq!(convert(&rates, -5.0, "USD", "CNY").unwrap(), 0.0);
    }
}
