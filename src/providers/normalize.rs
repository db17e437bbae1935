//! Maps extracted rows onto [`ExchangeRate`] records.
//!
//! Unparseable numeric cells become `0` rather than failing the row, so one
//! garbled cell never costs the rest of the board.

use crate::core::ExchangeRate;
use crate::providers::extract::RawRow;
use chrono::{SecondsFormat, Utc};
use tracing::debug;

/// Column mapping of a source's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Cells 0..=6 are currency, buy, cash buy, sell, cash sell, middle and
    /// publish time.
    BankOfChina,
    /// Cells are code, name, unit, buy, sell; the middle rate is derived.
    Cib,
}

/// Parses the leading numeric part of `text`, ignoring surrounding
/// whitespace and thousands separators. Returns `None` when no finite number
/// is present.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    let candidate: String = cleaned
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
        .collect();

    // Longest prefix that parses, e.g. "7.1e" -> "7.1"
    (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parses a rate cell, coercing anything unusable (missing, garbled or
/// negative) to `0`.
pub fn coerce_rate(text: &str) -> f64 {
    match parse_number(text) {
        Some(value) if value >= 0.0 => value,
        _ => {
            if !text.is_empty() {
                debug!("Coercing unparseable rate cell '{}' to 0", text);
            }
            0.0
        }
    }
}

/// Uppercases plain alphabetic codes; symbols and localized names are kept
/// as published.
pub fn normalize_currency(text: &str) -> String {
    let text = text.trim();
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_alphabetic()) {
        text.to_ascii_uppercase()
    } else {
        text.to_string()
    }
}

fn generated_pub_time() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Converts `row` into a record using the column mapping of `kind`.
///
/// Returns `None` only when the row has no currency or no numeric rate cell
/// at all; otherwise a record is always produced, possibly with zeroed
/// fields.
pub fn normalize(row: &RawRow, kind: SourceKind) -> Option<ExchangeRate> {
    let currency = normalize_currency(row.cell(0));
    let has_number = row
        .cells()
        .iter()
        .skip(1)
        .any(|cell| parse_number(cell).is_some());
    if currency.is_empty() || !has_number {
        debug!(cells = ?row.cells(), "Skipping row without currency or rates");
        return None;
    }

    let rate = match kind {
        SourceKind::BankOfChina => {
            let pub_time = row.cell(6);
            ExchangeRate {
                name: currency.clone(),
                currency,
                buying_rate: coerce_rate(row.cell(1)),
                cash_buying_rate: coerce_rate(row.cell(2)),
                selling_rate: coerce_rate(row.cell(3)),
                cash_selling_rate: coerce_rate(row.cell(4)),
                middle_rate: coerce_rate(row.cell(5)),
                pub_time: if pub_time.is_empty() {
                    generated_pub_time()
                } else {
                    pub_time.to_string()
                },
            }
        }
        SourceKind::Cib => {
            let buying_rate = coerce_rate(row.cell(3));
            let selling_rate = coerce_rate(row.cell(4));
            let name = match row.cell(1) {
                "" => currency.clone(),
                name => name.to_string(),
            };
            ExchangeRate {
                currency,
                name,
                buying_rate,
                cash_buying_rate: buying_rate,
                selling_rate,
                cash_selling_rate: selling_rate,
                middle_rate: (buying_rate + selling_rate) / 2.0,
                pub_time: generated_pub_time(),
            }
        }
    };
    Some(rate)
}

/// Normalizes every row, dropping the ones [`normalize`] rejects.
pub fn normalize_all(rows: &[RawRow], kind: SourceKind) -> Vec<ExchangeRate> {
    rows.iter().filter_map(|row| normalize(row, kind)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn row(cells: &[&str]) -> RawRow {
        cells.iter().copied().collect()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("709.52"), Some(709.52));
        assert_eq!(parse_number("  1,234.5 "), Some(1234.5));
        assert_eq!(parse_number("7.1e"), Some(7.1));
        assert_eq!(parse_number("12abc"), Some(12.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_coerce_rate_zeroes_bad_input() {
        assert_eq!(coerce_rate("N/A"), 0.0);
        assert_eq!(coerce_rate(""), 0.0);
        assert_eq!(coerce_rate("-3.2"), 0.0);
        assert_eq!(coerce_rate("4.5"), 4.5);
    }

    #[test]
    fn test_normalize_currency() {
        assert_eq!(normalize_currency("usd"), "USD");
        assert_eq!(normalize_currency(" Eur "), "EUR");
        assert_eq!(normalize_currency("美元"), "美元");
        assert_eq!(normalize_currency("HK$"), "HK$");
    }

    #[test]
    fn test_bank_of_china_mapping() {
        let rate = normalize(
            &row(&[
                "usd",
                "709.52",
                "703.75",
                "712.50",
                "712.81",
                "711.20",
                "2024.12.02 22:38:59",
            ]),
            SourceKind::BankOfChina,
        )
        .unwrap();

        assert_eq!(rate.currency, "USD");
        assert_eq!(rate.name, "USD");
        assert_eq!(rate.buying_rate, 709.52);
        assert_eq!(rate.cash_buying_rate, 703.75);
        assert_eq!(rate.selling_rate, 712.50);
        assert_eq!(rate.cash_selling_rate, 712.81);
        // Source-provided, not derived
        assert_eq!(rate.middle_rate, 711.20);
        assert_eq!(rate.pub_time, "2024.12.02 22:38:59");
    }

    #[test]
    fn test_unparseable_fields_are_zeroed_not_dropped() {
        let rate = normalize(
            &row(&["JPY", "4.71", "", "N/A", "4.88", "abc", "2024.12.02 22:38:59"]),
            SourceKind::BankOfChina,
        )
        .unwrap();

        assert_eq!(rate.buying_rate, 4.71);
        assert_eq!(rate.cash_buying_rate, 0.0);
        assert_eq!(rate.selling_rate, 0.0);
        assert_eq!(rate.cash_selling_rate, 4.88);
        assert_eq!(rate.middle_rate, 0.0);
    }

    #[test]
    fn test_missing_pub_time_is_generated() {
        let rate = normalize(
            &row(&["HKD", "91.27", "91.27", "91.63", "91.63", "91.30", ""]),
            SourceKind::BankOfChina,
        )
        .unwrap();

        let stamped = DateTime::parse_from_rfc3339(&rate.pub_time).unwrap();
        let age = Utc::now() - stamped.with_timezone(&Utc);
        assert!(age.num_seconds() < 5);
    }

    #[test]
    fn test_cib_mapping_derives_middle_rate() {
        let rate = normalize(
            &row(&["USD", "US Dollar", "100", "710.5", "713.4", "706.2"]),
            SourceKind::Cib,
        )
        .unwrap();

        assert_eq!(rate.currency, "USD");
        assert_eq!(rate.name, "US Dollar");
        assert_eq!(rate.buying_rate, 710.5);
        assert_eq!(rate.cash_buying_rate, 710.5);
        assert_eq!(rate.selling_rate, 713.4);
        assert_eq!(rate.cash_selling_rate, 713.4);
        assert_eq!(rate.middle_rate, (710.5 + 713.4) / 2.0);
    }

    #[test]
    fn test_cib_name_falls_back_to_currency() {
        let rate = normalize(&row(&["GBP", "", "100", "900", "910", ""]), SourceKind::Cib).unwrap();
        assert_eq!(rate.name, "GBP");
    }

    #[test]
    fn test_rows_without_currency_or_numbers_are_rejected() {
        assert!(normalize(&row(&["", "1.0", "2.0"]), SourceKind::BankOfChina).is_none());
        assert!(
            normalize(
                &row(&["Currency", "Buying", "Cash", "Selling", "Cash", "Middle", "Time"]),
                SourceKind::BankOfChina
            )
            .is_none()
        );
    }

    #[test]
    fn test_normalize_all_keeps_order() {
        let rows = vec![
            row(&["USD", "1", "1", "1", "1", "1", "t"]),
            row(&["", "1", "1", "1", "1", "1", "t"]),
            row(&["EUR", "2", "2", "2", "2", "2", "t"]),
        ];
        let rates = normalize_all(&rows, SourceKind::BankOfChina);
        let currencies: Vec<&str> = rates.iter().map(|r| r.currency.as_str()).collect();
        assert_eq!(currencies, vec!["USD", "EUR"]);
    }
}
