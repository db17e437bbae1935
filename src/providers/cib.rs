use crate::core::config::FetchConfig;
use crate::providers::board::{BoardProvider, BoardSpec};
use crate::providers::extract::Layout;
use crate::providers::fetcher::HtmlFetcher;
use crate::providers::normalize::SourceKind;
use anyhow::Result;

/// Industrial Bank quotation board, used when Bank of China is unavailable.
pub const CIB: BoardSpec = BoardSpec {
    name: "CIB",
    accept_language: "zh-CN,zh;q=0.9,en;q=0.8",
    send_origin: false,
    layouts: &[Layout::ListTable],
    kind: SourceKind::Cib,
};

pub fn provider(url: &str, fetch: &FetchConfig) -> Result<BoardProvider> {
    Ok(BoardProvider::new(CIB, url, HtmlFetcher::new(fetch)?))
}


#[cfg(test)]
mod tests {
    use super::fixtures::list_page;
    use super::*;
    use crate::core::RateProvider;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PATH: &str = "/pers/main/pubinfo/ifxQuotationQuery.do";

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .and(header_exists("accept-language"))
            .respond_with(ResponseTemplate::new(200).set_body_string(list_page(&[
                ("USD", "美元", 710.5, 713.4),
                ("EUR", "", 748.0, 752.0),
            ])))
            .mount(&mock_server)
            .await;

        let cib = provider(
            &format!("{}{PATH}", mock_server.uri()),
            &FetchConfig::default(),
        )
        .unwrap();
        let rates = cib.fetch_rates().await.unwrap();

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].currency, "USD");
        assert_eq!(rates[0].name, "美元");
        assert_eq!(rates[0].middle_rate, (710.5 + 713.4) / 2.0);
        assert_eq!(rates[1].name, "EUR");
        assert_eq!(rates[1].middle_rate, 750.0);
    }

    #[test]
    fn test_header_row_is_not_a_rate() {
        let cib = provider("http://localhost/cib", &FetchConfig::default()).unwrap();
        assert!(cib.parse(&list_page(&[])).is_err());
    }
}
