//! Google News RSS search feed.
//!
//! The feed at `https://news.google.com/rss/search?q=...` is standard RSS 2.0.
//! Each `<item>` yields one [`Article`]; the `<description>` is an escaped HTML
//! fragment (a link plus the publisher name) and is reduced to plain text.

use super::NewsSource;
use crate::models::Article;
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Client;
use scraper::Html;
use std::error::Error;
use tracing::{debug, info, instrument};

pub const SEARCH_URL: &str = "https://news.google.com/rss/search";
pub const DEFAULT_MAX_ITEMS: usize = 10;

/// Client for the Google News RSS search.
#[derive(Debug)]
pub struct GoogleNewsSource {
    client: Client,
    max_items: usize,
}

impl GoogleNewsSource {
    pub fn new(client: Client, max_items: usize) -> Self {
        Self { client, max_items }
    }

    fn request_url(keyword: &str) -> String {
        format!(
            "{}?q={}&hl=en-US&gl=US&ceid=US:en",
            SEARCH_URL,
            urlencoding::encode(keyword)
        )
    }
}

impl NewsSource for GoogleNewsSource {
    #[instrument(level = "info", skip(self))]
    async fn search(&self, keyword: &str) -> Result<Vec<Article>, Box<dyn Error>> {
        let url = Self::request_url(keyword);
        debug!(%url, "Fetching Google News RSS");
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let mut articles = parse_feed(&body)?;
        articles.truncate(self.max_items);
        info!(count = articles.len(), "Fetched Google News articles");
        Ok(articles)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Title,
    Link,
    Description,
}

/// Parse an RSS body into articles. Items without a link are skipped.
pub fn parse_feed(xml: &str) -> Result<Vec<Article>, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);

    let mut articles = Vec::new();
    let mut in_item = false;
    let mut field: Option<Field> = None;
    let mut title = String::new();
    let mut link = String::new();
    let mut description = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"item" => {
                    in_item = true;
                    title.clear();
                    link.clear();
                    description.clear();
                }
                b"title" if in_item => field = Some(Field::Title),
                b"link" if in_item => field = Some(Field::Link),
                b"description" if in_item => field = Some(Field::Description),
                _ => field = None,
            },
            Event::End(e) => {
                if e.name().as_ref() == b"item" && in_item {
                    in_item = false;
                    if !link.trim().is_empty() {
                        articles.push(Article {
                            title: title.trim().to_string(),
                            description: html_to_text(&description),
                            url: link.trim().to_string(),
                        });
                    }
                }
                field = None;
            }
            Event::Text(e) => {
                let raw = String::from_utf8_lossy(&e);
                let text = match quick_xml::escape::unescape(&raw) {
                    Ok(t) => t.into_owned(),
                    Err(_) => raw.to_string(),
                };
                push_field(field, &text, &mut title, &mut link, &mut description);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                push_field(field, &text, &mut title, &mut link, &mut description);
            }
            Event::GeneralRef(e) => {
                let name = String::from_utf8_lossy(&e).into_owned();
                if let Some(resolved) = resolve_entity(&name) {
                    push_field(field, &resolved, &mut title, &mut link, &mut description);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(articles)
}

fn push_field(
    field: Option<Field>,
    text: &str,
    title: &mut String,
    link: &mut String,
    description: &mut String,
) {
    match field {
        Some(Field::Title) => title.push_str(text),
        Some(Field::Link) => link.push_str(text),
        Some(Field::Description) => description.push_str(text),
        None => {}
    }
}

/// Resolve a predefined XML entity or a character reference (`#38`, `#x26`).
fn resolve_entity(name: &str) -> Option<String> {
    let resolved = match name {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "apos" => '\'',
        "quot" => '"',
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some(resolved.to_string())
}

/// Reduce an HTML fragment to whitespace-normalised text; `None` if empty.
fn html_to_text(fragment: &str) -> Option<String> {
    let doc = Html::parse_fragment(fragment);
    let text = doc
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() { None } else { Some(text) }
}
