//! Plain HTTP GET of a rate board page with browser-like headers.
//!
//! No retries happen here; falling back to another source is the
//! orchestrator's job.

use crate::core::SourceError;
use crate::core::config::FetchConfig;
use anyhow::{Context, Result};
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderName, HeaderValue, ORIGIN, PRAGMA,
    REFERER, USER_AGENT,
};
use tracing::{debug, instrument};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const HTML_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";

/// Builds the request headers a desktop browser would send, with caching
/// disabled so the board is always fresh.
pub fn browser_headers(accept_language: &str, site_root: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    insert_header(&mut headers, ACCEPT_LANGUAGE, accept_language);

    if let Some(root) = site_root {
        insert_header(&mut headers, REFERER, &format!("{}/", root.trim_end_matches('/')));
        insert_header(&mut headers, ORIGIN, root.trim_end_matches('/'));
    }
    headers
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(e) => debug!("Skipping invalid {} header '{}': {}", name, value, e),
    }
}

#[derive(Clone)]
pub struct HtmlFetcher {
    client: reqwest::Client,
}

impl HtmlFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Returns the page body for any final status in `[200, 400)`.
    #[instrument(name = "HtmlFetch", skip(self, url, headers), fields(url = %url))]
    pub async fn fetch(&self, url: &str, headers: HeaderMap) -> Result<String, SourceError> {
        debug!("Requesting rate board from {}", url);

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|source| SourceError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        debug!(%status, final_url = %response.url(), "Received rate board response");
        if !(status.is_success() || status.is_redirection()) {
            return Err(SourceError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| SourceError::Body {
            url: url.to_string(),
            source,
        })
    }
}
