use crate::core::config::FetchConfig;
use crate::providers::board::{BoardProvider, BoardSpec};
use crate::providers::extract::Layout;
use crate::providers::fetcher::HtmlFetcher;
use crate::providers::normalize::SourceKind;
use anyhow::Result;

pub const BANK_OF_CHINA: BoardSpec = BoardSpec {
    name: "Bank of China",
    accept_language: "en-US,en;q=0.9",
    send_origin: true,
    layouts: &[Layout::CenteredWhiteCells, Layout::PublishTable],
    kind: SourceKind::BankOfChina,
};

pub fn provider(url: &str, fetch: &FetchConfig) -> Result<BoardProvider> {
    Ok(BoardProvider::new(
        BANK_OF_CHINA,
        url,
        HtmlFetcher::new(fetch)?,
    ))
}
