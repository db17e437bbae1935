use super::ui;
use crate::core::history::{HistoryStore, record_all};
use crate::providers::{CachingRateProvider, RateOrigin, RatesOutcome};
use anyhow::Result;
use comfy_table::{Cell, Table};
use std::time::Duration;
use tracing::{debug, info};

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

impl RatesOutcome {
    fn to_table(&self) -> Table {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell("Name"),
            ui::header_cell("Buying"),
            ui::header_cell("Cash Buying"),
            ui::header_cell("Selling"),
            ui::header_cell("Cash Selling"),
            ui::header_cell("Middle"),
        ]);

        for rate in &self.rates {
            table.add_row(vec![
                Cell::new(&rate.currency),
                Cell::new(&rate.name),
                ui::rate_cell(rate.buying_rate),
                ui::rate_cell(rate.cash_buying_rate),
                ui::rate_cell(rate.selling_rate),
                ui::rate_cell(rate.cash_selling_rate),
                ui::rate_cell(rate.middle_rate),
            ]);
        }
        table
    }

    pub fn display_as_table(&self) {
        println!(
            "\n{}",
            ui::style_text("Exchange Rates", ui::StyleType::Title)
        );
        if let Some(first) = self.rates.first() {
            println!(
                "{} {}",
                ui::style_text("Last updated:", ui::StyleType::TotalLabel),
                first.pub_time
            );
        }
        println!("{}", self.to_table());

        match self.origin {
            RateOrigin::Primary => {}
            RateOrigin::Secondary => println!(
                "{}",
                ui::style_text("Primary board unavailable, showing secondary board", ui::StyleType::Subtle)
            ),
            RateOrigin::Seed => println!(
                "{}",
                ui::style_text(
                    "Live sources unavailable, showing fallback rates",
                    ui::StyleType::Error
                )
            ),
        }
    }
}

/// Returns the current board, from the cache unless `refresh` is set.
/// History is recorded only when the board came from a live fetch.
pub async fn load(
    provider: &CachingRateProvider,
    history: &dyn HistoryStore,
    refresh: bool,
) -> RatesOutcome {
    if !refresh && let Some(outcome) = provider.cached().await {
        return outcome;
    }

    let outcome = provider.refresh().await;
    if outcome.is_live() {
        let written = record_all(history, &outcome.rates).await;
        debug!(written, origin = %outcome.origin, "Recorded history after live fetch");
    }
    outcome
}

pub async fn run(
    provider: &CachingRateProvider,
    history: &dyn HistoryStore,
    refresh: bool,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching exchange rates");
    let outcome = load(provider, history, refresh).await;
    pb.finish_and_clear();

    outcome.display_as_table();
    Ok(())
}

/// Redraws the board every `interval` until interrupted.
pub async fn watch(
    provider: &CachingRateProvider,
    history: &dyn HistoryStore,
    interval: Duration,
    refresh: bool,
) -> Result<()> {
    let mut ticker = tokio::time::interval(interval.max(MIN_POLL_INTERVAL));
    let mut force = refresh;
    info!("Watching exchange rates every {}s", interval.as_secs());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let outcome = load(provider, history, force).await;
                force = false;
                ui::print_separator();
                outcome.display_as_table();
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("Stopping rate watch");
                return Ok(());
            }
        }
    }
}
