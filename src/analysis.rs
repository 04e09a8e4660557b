//! Text analysis over the articles fetched for a keyword.
//!
//! - [`aggregate_text`]: joins titles and descriptions into one block of text
//! - [`tokenize`]: lowercase, purely alphabetic word tokens
//! - [`Stopwords`]: built-in English list, optionally extended from a remote stoplist
//! - [`top_terms`]: most frequent non-stopword tokens, joined into the `topics` string

use crate::models::Article;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use tracing::{error, info, instrument};

/// Number of top terms stored per observation.
pub const DEFAULT_TOP_TERMS: usize = 5;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\W\d_]+").unwrap());

/// Join `"{title} {description}"` for every article, skipping blank parts.
pub fn aggregate_text(articles: &[Article]) -> String {
    articles
        .iter()
        .flat_map(|a| [Some(a.title.as_str()), a.description.as_deref()])
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .join(" ")
}

/// Split text into lowercase alphabetic tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// The `n` most frequent tokens not in `stopwords`, joined with `", "`.
///
/// Ties are broken by first occurrence in the text.
pub fn top_terms(text: &str, stopwords: &Stopwords, n: usize) -> String {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (pos, token) in tokenize(text).into_iter().enumerate() {
        if stopwords.contains(&token) {
            continue;
        }
        counts.entry(token).or_insert((0, pos)).0 += 1;
    }
    counts
        .into_iter()
        .sorted_by(|(_, (ca, fa)), (_, (cb, fb))| cb.cmp(ca).then(fa.cmp(fb)))
        .take(n)
        .map(|(word, _)| word)
        .join(", ")
}

/// A set of lowercase words excluded from topic extraction.
#[derive(Debug, Clone)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::english()
    }
}

impl Stopwords {
    /// The built-in English stopword list.
    pub fn english() -> Self {
        Self {
            words: ENGLISH.iter().map(|w| (*w).to_string()).collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Add whitespace-separated words from a stoplist body.
    ///
    /// Lines starting with `#` are comments.
    pub fn extend_from_list(&mut self, body: &str) {
        let words = body
            .lines()
            .filter(|l| !l.trim_start().starts_with('#'))
            .flat_map(str::split_whitespace)
            .map(str::to_lowercase);
        self.words.extend(words);
    }

    /// The English list extended with the stoplist at `url`.
    ///
    /// A failed fetch is logged and the built-in list is returned.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn with_remote(url: &str) -> Self {
        let mut stopwords = Self::english();
        match fetch_stoplist(url).await {
            Ok(body) => {
                let before = stopwords.len();
                stopwords.extend_from_list(&body);
                info!(added = stopwords.len() - before, "Loaded remote stoplist");
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch custom stopwords; using built-in list");
            }
        }
        stopwords
    }
}

async fn fetch_stoplist(url: &str) -> Result<String, Box<dyn Error>> {
    let resp = reqwest::get(url).await?.error_for_status()?;
    Ok(resp.text().await?)
}

const ENGLISH: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren",
    "couldn", "didn", "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn",
    "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, description: Option<&str>) -> Article {
        Article {
            title: title.to_string(),
            description: description.map(str::to_string),
            url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn test_aggregate_text_joins_title_and_description() {
        let articles = vec![
            article("Chip stocks rally", Some("Investors cheer AI demand")),
            article("Quiet session", None),
            article("  ", Some("")),
        ];
        assert_eq!(
            aggregate_text(&articles),
            "Chip stocks rally Investors cheer AI demand Quiet session"
        );
    }

    #[test]
    fn test_tokenize_keeps_alphabetic_words_only() {
        assert_eq!(
            tokenize("AI chips, 2024's Q3: up 15%!"),
            vec!["ai", "chips", "s", "q", "up"]
        );
    }

    #[test]
    fn test_top_terms_skips_stopwords_and_orders_by_count() {
        let text = "The chip maker said the chip demand and AI demand rose. AI chip sales.";
        let topics = top_terms(text, &Stopwords::english(), 3);
        assert_eq!(topics, "chip, demand, ai");
    }

    #[test]
    fn test_top_terms_ties_keep_first_occurrence() {
        let topics = top_terms("zebra apple mango", &Stopwords::english(), 2);
        assert_eq!(topics, "zebra, apple");
    }

    #[test]
    fn test_top_terms_empty_text() {
        assert_eq!(top_terms("", &Stopwords::english(), DEFAULT_TOP_TERMS), "");
        assert_eq!(top_terms("the and of", &Stopwords::english(), DEFAULT_TOP_TERMS), "");
    }

    #[test]
    fn test_extend_from_list() {
        let mut stopwords = Stopwords::english();
        assert!(!stopwords.contains("said"));
        stopwords.extend_from_list("#stop word list\nSaid\nalso  within\n");
        assert!(stopwords.contains("said"));
        assert!(stopwords.contains("within"));
        assert!(!stopwords.contains("#stop"));
    }

    /// Serve one HTTP response with `body` on a local port and return its URL.
    async fn serve_once(body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let resp = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(resp.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/SmartStoplist.txt")
    }

    #[tokio::test]
    async fn test_with_remote_falls_back_when_fetch_fails() {
        let stopwords = Stopwords::with_remote("http://127.0.0.1:9/stoplist.txt").await;
        assert_eq!(stopwords.len(), Stopwords::english().len());
        assert!(stopwords.contains("the"));
    }

    #[tokio::test]
    async fn test_with_remote_merges_rake_stoplist() {
        let url = serve_once("#stop word list from SMART (Salton,1971).\na\na's\nable\nabout\nabove\naccording\n").await;
        let stopwords = Stopwords::with_remote(&url).await;
        assert!(stopwords.contains("able"));
        assert!(stopwords.contains("according"));
        assert!(stopwords.contains("a's"));
        assert!(!stopwords.contains("#stop"));
        assert!(stopwords.contains("the"));
        assert_eq!(stopwords.len(), Stopwords::english().len() + 3);
    }
}
