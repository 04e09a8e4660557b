//! News providers that turn a keyword into a list of [`Article`]s.
//!
//! Every provider implements [`NewsSource`]. The configured provider is wrapped
//! in the [`Provider`] enum so the pipeline can stay generic over one type.
//!
//! # Supported Providers
//!
//! | Provider | Module | Method | Notes |
//! |----------|--------|--------|-------|
//! | NewsAPI | [`newsapi`] | `/v2/everything` JSON | Requires API key |
//! | Google News | [`google_news`] | RSS search feed | No key; descriptions are HTML |
//! | Google Custom Search | [`custom_search`] | Custom Search JSON API | Requires API key and engine id |

use crate::models::Article;
use clap::ValueEnum;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::Duration;

pub mod custom_search;
pub mod google_news;
pub mod newsapi;

pub use custom_search::CustomSearchSource;
pub use google_news::GoogleNewsSource;
pub use newsapi::NewsApiSource;

const USER_AGENT: &str = concat!("news_sentiment_trends/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// A search/news provider.
pub trait NewsSource {
    /// Fetch articles matching `keyword`.
    async fn search(&self, keyword: &str) -> Result<Vec<Article>, Box<dyn Error>>;
}

/// Which provider to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Newsapi,
    GoogleNews,
    CustomSearch,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderKind::Newsapi => "newsapi",
            ProviderKind::GoogleNews => "google_news",
            ProviderKind::CustomSearch => "custom_search",
        };
        f.write_str(s)
    }
}

/// The configured provider.
#[derive(Debug)]
pub enum Provider {
    NewsApi(NewsApiSource),
    GoogleNews(GoogleNewsSource),
    CustomSearch(CustomSearchSource),
}

impl NewsSource for Provider {
    async fn search(&self, keyword: &str) -> Result<Vec<Article>, Box<dyn Error>> {
        match self {
            Provider::NewsApi(s) => s.search(keyword).await,
            Provider::GoogleNews(s) => s.search(keyword).await,
            Provider::CustomSearch(s) => s.search(keyword).await,
        }
    }
}

/// Shared HTTP client with a timeout and identifying user agent.
pub fn http_client() -> Result<Client, Box<dyn Error>> {
    let client = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_yaml_names() {
        let kind: ProviderKind = serde_yaml::from_str("google_news").unwrap();
        assert_eq!(kind, ProviderKind::GoogleNews);
        assert_eq!(kind.to_string(), "google_news");
        assert_eq!(ProviderKind::default(), ProviderKind::Newsapi);
    }

    #[test]
    fn test_provider_kind_cli_names() {
        let kind = ProviderKind::from_str("custom-search", true).unwrap();
        assert_eq!(kind, ProviderKind::CustomSearch);
    }
}
