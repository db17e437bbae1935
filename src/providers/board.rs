//! A [`RateProvider`] backed by a scraped HTML rate board.

use crate::core::{ExchangeRate, RateProvider, SourceError};
use crate::providers::extract::{Layout, extract_with};
use crate::providers::fetcher::{HtmlFetcher, browser_headers};
use crate::providers::normalize::{SourceKind, normalize_all};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info, instrument};

/// Static description of how to read one bank's board.
#[derive(Debug, Clone, Copy)]
pub struct BoardSpec {
    pub name: &'static str,
    pub accept_language: &'static str,
    /// Send `Referer`/`Origin` headers pointing at the board's own site.
    pub send_origin: bool,
    /// Table layouts to try, highest priority first.
    pub layouts: &'static [Layout],
    pub kind: SourceKind,
}

pub struct BoardProvider {
    spec: BoardSpec,
    url: String,
    fetcher: HtmlFetcher,
}

impl BoardProvider {
    pub fn new(spec: BoardSpec, url: &str, fetcher: HtmlFetcher) -> Self {
        BoardProvider {
            spec,
            url: url.to_string(),
            fetcher,
        }
    }

    /// Extracts and normalizes rates from already fetched markup.
    pub fn parse(&self, html: &str) -> Result<Vec<ExchangeRate>, SourceError> {
        let rates = extract_with(html, self.spec.layouts, |rows| {
            normalize_all(&rows, self.spec.kind)
        });
        if rates.is_empty() {
            return Err(SourceError::Empty {
                source_name: self.spec.name.to_string(),
            });
        }
        Ok(rates)
    }

    fn site_root(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .map(|url| url.origin().ascii_serialization())
    }
}

#[async_trait]
impl RateProvider for BoardProvider {
    fn name(&self) -> &str {
        self.spec.name
    }

    #[instrument(
        name = "BoardFetch",
        skip(self),
        fields(source = %self.spec.name, url = %self.url)
    )]
    async fn fetch_rates(&self) -> Result<Vec<ExchangeRate>> {
        let site_root = if self.spec.send_origin {
            self.site_root()
        } else {
            None
        };
        let headers = browser_headers(self.spec.accept_language, site_root.as_deref());

        let html = self.fetcher.fetch(&self.url, headers).await?;
        debug!(bytes = html.len(), "Fetched rate board");

        let rates = self.parse(&html)?;
        info!("Successfully parsed {} {} exchange rates", rates.len(), self.spec.name);
        Ok(rates)
    }
}
