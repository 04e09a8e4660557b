//! NewsAPI `everything` endpoint.
//!
//! See <https://newsapi.org/docs/endpoints/everything>. Each keyword is sent as
//! the `q` parameter; the response's `articles` array maps straight onto
//! [`Article`].

use super::NewsSource;
use crate::models::Article;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use tracing::{debug, info, instrument};
use url::Url;

pub const ENDPOINT: &str = "https://newsapi.org/v2/everything";
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(rename = "totalResults")]
    total_results: Option<u32>,
    #[serde(default)]
    articles: Vec<Article>,
    code: Option<String>,
    message: Option<String>,
}

/// Client for the NewsAPI `everything` search.
pub struct NewsApiSource {
    client: Client,
    api_key: String,
    page_size: u32,
}

impl fmt::Debug for NewsApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiSource")
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl NewsApiSource {
    pub fn new(client: Client, api_key: String, page_size: u32) -> Self {
        Self {
            client,
            api_key,
            page_size,
        }
    }

    fn request_url(&self, keyword: &str) -> Result<Url, url::ParseError> {
        let page_size = self.page_size.to_string();
        Url::parse_with_params(
            ENDPOINT,
            &[
                ("q", keyword),
                ("apiKey", self.api_key.as_str()),
                ("pageSize", page_size.as_str()),
            ],
        )
    }
}

impl NewsSource for NewsApiSource {
    #[instrument(level = "info", skip(self))]
    async fn search(&self, keyword: &str) -> Result<Vec<Article>, Box<dyn Error>> {
        let url = self.request_url(keyword)?;
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        let articles = parse_status_and_body(status, &body)?;
        info!(count = articles.len(), "Fetched NewsAPI articles");
        Ok(articles)
    }
}

/// Check the HTTP status, then parse the body.
///
/// NewsAPI reports client errors (bad key, rate limit) as JSON with
/// `status: "error"`, so those bodies go through [`parse_response`] for the
/// API's own message. Anything else that is not a success gives the HTTP status.
fn parse_status_and_body(status: StatusCode, body: &str) -> Result<Vec<Article>, Box<dyn Error>> {
    if status.is_success() {
        return parse_response(body);
    }
    match parse_response(body) {
        Err(e) if body.trim_start().starts_with('{') => Err(format!("HTTP {status}: {e}").into()),
        _ => Err(format!("NewsAPI request failed with HTTP {status}").into()),
    }
}

/// Parse a NewsAPI response body.
///
/// A body with `status` other than `"ok"` is turned into an error carrying the
/// API's `code` and `message`.
pub fn parse_response(body: &str) -> Result<Vec<Article>, Box<dyn Error>> {
    let resp: NewsApiResponse = serde_json::from_str(body)?;
    if resp.status != "ok" {
        return Err(format!(
            "NewsAPI error {}: {}",
            resp.code.as_deref().unwrap_or("unknown"),
            resp.message.as_deref().unwrap_or("no message")
        )
        .into());
    }
    debug!(total_results = ?resp.total_results, returned = resp.articles.len(), "NewsAPI response");
    Ok(resp.articles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_carries_query_key_and_page_size() {
        let source = NewsApiSource::new(Client::new(), "secret".to_string(), DEFAULT_PAGE_SIZE);
        let url = source.request_url("Yale University").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(url.host_str(), Some("newsapi.org"));
        assert!(pairs.contains(&("q".to_string(), "Yale University".to_string())));
        assert!(pairs.contains(&("apiKey".to_string(), "secret".to_string())));
        assert!(pairs.contains(&("pageSize".to_string(), "10".to_string())));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let source = NewsApiSource::new(Client::new(), "secret".to_string(), 5);
        assert!(!format!("{source:?}").contains("secret"));
    }

    #[test]
    fn test_parse_ok_response() {
        let body = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"source": {"id": null, "name": "Wire"}, "title": "Chips rally",
                 "description": "Strong demand", "url": "https://example.com/1"},
                {"source": {"id": null, "name": "Wire"}, "title": "Quiet day",
                 "description": null, "url": "https://example.com/2"}
            ]
        }"#;
        let articles = parse_response(body).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].description.as_deref(), Some("Strong demand"));
        assert_eq!(articles[1].description, None);
    }

    #[test]
    fn test_parse_error_response() {
        let body = r#"{"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid."}"#;
        let err = parse_response(body).unwrap_err();
        assert!(err.to_string().contains("apiKeyInvalid"));
    }

    #[test]
    fn test_parse_ok_without_articles() {
        let articles = parse_response(r#"{"status": "ok", "totalResults": 0}"#).unwrap();
        assert!(articles.is_empty());
    }

    #[test]
    fn test_server_error_reports_http_status() {
        let err = parse_status_and_body(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>")
            .unwrap_err();
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_json_error_body_keeps_api_message() {
        let body = r#"{"status": "error", "code": "rateLimited", "message": "Too many requests"}"#;
        let err = parse_status_and_body(StatusCode::TOO_MANY_REQUESTS, body).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("rateLimited"));
    }
}
