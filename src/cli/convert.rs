use super::{rates, ui};
use crate::core::convert::convert;
use crate::core::history::HistoryStore;
use crate::providers::CachingRateProvider;
use anyhow::Result;

pub async fn run(
    provider: &CachingRateProvider,
    history: &dyn HistoryStore,
    amount: f64,
    from: &str,
    to: &str,
) -> Result<()> {
    let outcome = rates::load(provider, history, false).await;
    let converted = convert(&outcome.rates, amount, from, to)?;

    println!(
        "{} {} = {} {}",
        amount.max(0.0),
        from.to_ascii_uppercase(),
        ui::style_text(&format!("{converted:.4}"), ui::StyleType::TotalValue),
        to.to_ascii_uppercase()
    );
    if !outcome.is_live() {
        println!(
            "{}",
            ui::style_text("Converted with fallback rates", ui::StyleType::Error)
        );
    }
    Ok(())
}
