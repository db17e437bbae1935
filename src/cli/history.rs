use super::ui;
use crate::core::history::{HistoricalRatePoint, HistoryStore};
use anyhow::{Result, bail};
use chrono::Local;
use comfy_table::{Cell, Table};

fn history_table(series: &[HistoricalRatePoint]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Recorded"),
        ui::header_cell("Buying"),
        ui::header_cell("Selling"),
        ui::header_cell("Middle"),
        ui::header_cell("Change"),
    ]);

    let mut previous: Option<f64> = None;
    for point in series {
        let change = match previous {
            Some(prev) if prev > 0.0 => {
                ui::change_cell((point.middle_rate - prev) / prev * 100.0)
            }
            _ => Cell::new("-"),
        };
        table.add_row(vec![
            Cell::new(
                point
                    .timestamp
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
            ),
            ui::rate_cell(point.buying_rate),
            ui::rate_cell(point.selling_rate),
            ui::rate_cell(point.middle_rate),
            change,
        ]);
        previous = Some(point.middle_rate);
    }
    table
}

pub async fn run(history: &dyn HistoryStore, currency: &str) -> Result<()> {
    let currency = currency.trim().to_ascii_uppercase();
    if currency.is_empty() {
        bail!("Currency is required");
    }

    let series = history.series(&currency).await?;
    if series.is_empty() {
        println!("No history recorded for {currency} yet. Run `fxboard rates` to start collecting.");
        return Ok(());
    }

    println!(
        "\n{}",
        ui::style_text(&format!("History: {currency}"), ui::StyleType::Title)
    );
    println!("{}", history_table(&series));

    let middles: Vec<f64> = series.iter().map(|p| p.middle_rate).collect();
    let low = middles.iter().copied().fold(f64::INFINITY, f64::min);
    let high = middles.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    println!(
        "{} {}  {}",
        ui::style_text("Middle rate:", ui::StyleType::TotalLabel),
        ui::sparkline(&middles),
        ui::style_text(&format!("low {low:.4} / high {high:.4}"), ui::StyleType::Subtle)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_history_table_shows_change_between_points() {
        let now = Utc::now();
        let series = vec![
            HistoricalRatePoint {
                buying_rate: 7.0,
                selling_rate: 7.2,
                middle_rate: 7.1,
                timestamp: now - Duration::hours(1),
            },
            HistoricalRatePoint {
                buying_rate: 7.1,
                selling_rate: 7.3,
                middle_rate: 7.2,
                timestamp: now,
            },
        ];

        let rendered = history_table(&series).to_string();
        assert!(rendered.contains("7.1000"));
        assert!(rendered.contains("7.2000"));
        assert!(rendered.contains("1.41%"));
    }
}
