//! Google Custom Search JSON API.
//!
//! Results carry a `snippet` rather than a description; it is used as the
//! article description.

use super::NewsSource;
use crate::models::Article;
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use tracing::{info, instrument};
use url::Url;

pub const ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
pub const DEFAULT_NUM_RESULTS: u32 = 3;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    snippet: Option<String>,
}

impl From<SearchItem> for Article {
    fn from(item: SearchItem) -> Self {
        Article {
            title: item.title,
            description: item.snippet,
            url: item.link,
        }
    }
}

/// Client for a Google programmable search engine.
pub struct CustomSearchSource {
    client: Client,
    api_key: String,
    engine_id: String,
    num_results: u32,
}

impl fmt::Debug for CustomSearchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomSearchSource")
            .field("engine_id", &self.engine_id)
            .field("num_results", &self.num_results)
            .finish_non_exhaustive()
    }
}

impl CustomSearchSource {
    pub fn new(client: Client, api_key: String, engine_id: String, num_results: u32) -> Self {
        Self {
            client,
            api_key,
            engine_id,
            num_results,
        }
    }

    fn request_url(&self, keyword: &str) -> Result<Url, url::ParseError> {
        // the API rejects num outside 1..=10
        let num = self.num_results.clamp(1, 10).to_string();
        Url::parse_with_params(
            ENDPOINT,
            &[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", keyword),
                ("num", num.as_str()),
            ],
        )
    }
}

impl NewsSource for CustomSearchSource {
    #[instrument(level = "info", skip(self))]
    async fn search(&self, keyword: &str) -> Result<Vec<Article>, Box<dyn Error>> {
        let url = self.request_url(keyword)?;
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let articles = parse_response(&body)?;
        info!(count = articles.len(), "Fetched custom search results");
        Ok(articles)
    }
}

/// Parse a Custom Search response body. A response without `items` has no results.
pub fn parse_response(body: &str) -> Result<Vec<Article>, Box<dyn Error>> {
    let resp: SearchResponse = serde_json::from_str(body)?;
    Ok(resp.items.into_iter().map(Article::from).collect())
}
