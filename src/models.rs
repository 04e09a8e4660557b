//! Data models for articles, sentiment observations and the history table.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: Raw article record returned by a news provider
//! - [`Observation`]: One `(date, keyword, topics, sentiment)` row
//! - [`HistoricalTable`]: The accumulated observations persisted across runs
//! - [`TrendPoint`]: One point of a per-keyword sentiment series
//! - [`KeywordReport`]: Everything computed for a keyword during a run

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown for articles that arrive without a description.
pub const NO_DESCRIPTION: &str = "No description available";

/// A raw news article as returned by a news provider.
///
/// Providers disagree on field names, so `desc` and `link` are accepted as
/// aliases for `description` and `url`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Article {
    /// The article headline.
    #[serde(default)]
    pub title: String,
    /// A short description or snippet, when the provider supplies one.
    #[serde(default, alias = "desc")]
    pub description: Option<String>,
    /// Link to the full article.
    #[serde(default, alias = "link")]
    pub url: String,
}

impl Article {
    /// The description, or [`NO_DESCRIPTION`] when absent or blank.
    pub fn display_description(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => NO_DESCRIPTION,
        }
    }
}

/// One sentiment observation for a keyword on a calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub keyword: String,
    /// Comma-joined top terms, e.g. `"ai, chip, market"`.
    pub topics: String,
    /// Aggregate sentiment in `[-100, 100]`.
    pub sentiment: f64,
}

impl Observation {
    pub fn new(
        date: NaiveDate,
        keyword: impl Into<String>,
        topics: impl Into<String>,
        sentiment: f64,
    ) -> Self {
        Self {
            date,
            keyword: keyword.into(),
            topics: topics.into(),
            sentiment,
        }
    }
}

/// The accumulated history of observations.
///
/// After a merge there is at most one row per `(date, keyword)`. Tables are
/// plain values: every operation that changes the rows returns a new table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalTable {
    rows: Vec<Observation>,
}

impl HistoricalTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<Observation>> for HistoricalTable {
    fn from(rows: Vec<Observation>) -> Self {
        Self { rows }
    }
}

/// One point of a per-keyword sentiment series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub sentiment: f64,
}

/// Discrete sentiment classification of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score > 0.0 {
            SentimentLabel::Positive
        } else if score < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        };
        f.write_str(s)
    }
}

/// Everything computed for a single keyword during a run.
///
/// Used by the output writers; the persisted part is the [`Observation`].
#[derive(Debug, Clone)]
pub struct KeywordReport {
    pub keyword: String,
    pub articles: Vec<Article>,
    pub topics: String,
    pub sentiment: f64,
    pub label: SentimentLabel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_accepts_desc_and_link_aliases() {
        let json = r#"{"title": "Chips rally", "desc": "Shares rose", "link": "https://example.com/a"}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.title, "Chips rally");
        assert_eq!(article.description.as_deref(), Some("Shares rose"));
        assert_eq!(article.url, "https://example.com/a");
    }

    #[test]
    fn test_article_null_description() {
        let json = r#"{"title": "Quiet day", "description": null, "url": "https://example.com/b"}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.description, None);
        assert_eq!(article.display_description(), NO_DESCRIPTION);
    }

    #[test]
    fn test_blank_description_uses_placeholder() {
        let article = Article {
            title: "t".to_string(),
            description: Some("   ".to_string()),
            url: String::new(),
        };
        assert_eq!(article.display_description(), NO_DESCRIPTION);
    }

    #[test]
    fn test_sentiment_label_from_score() {
        assert_eq!(SentimentLabel::from_score(12.5), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(0.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.1), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::Negative.to_string(), "Negative");
    }
}
