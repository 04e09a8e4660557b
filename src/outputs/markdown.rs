//! Markdown rendering of a run.
//!
//! One report per run, laid out per keyword:
//!
//! ```text
//! # News Sentiment Report
//!
//! ## technology
//!
//! #### [Headline](https://example.com/a)
//! *Description*
//!
//! | Keyword | Top Words | Sentiment Score | Label |
//!
//! ### Sentiment Trend for "technology"
//! | Date | Sentiment |
//! ```

use crate::models::{KeywordReport, TrendPoint};
use chrono::NaiveDateTime;
use std::error::Error;
use std::fmt::Write;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Render the report for one run.
///
/// Keywords without a report are listed with "No results found.".
pub fn render_report(
    run_at: NaiveDateTime,
    keywords: &[String],
    reports: &[KeywordReport],
    series: &[(String, Vec<TrendPoint>)],
) -> String {
    let mut md = String::new();
    writeln!(md, "# News Sentiment Report\n").unwrap();
    writeln!(md, "_Generated {}_\n", run_at.format("%Y-%m-%d %H:%M:%S")).unwrap();

    let mut seen: Vec<&str> = Vec::new();
    for keyword in keywords {
        if seen.contains(&keyword.as_str()) {
            continue;
        }
        seen.push(keyword.as_str());
        writeln!(md, "## {}\n", keyword).unwrap();

        // last report wins when a keyword was processed twice
        match reports.iter().rev().find(|r| &r.keyword == keyword) {
            Some(report) => write_keyword_section(&mut md, report),
            None => writeln!(md, "No results found.\n").unwrap(),
        }

        if let Some((_, points)) = series.iter().find(|(k, _)| k == keyword) {
            write_trend_table(&mut md, keyword, points);
        }
    }
    md
}

fn write_keyword_section(md: &mut String, report: &KeywordReport) {
    for article in &report.articles {
        if article.url.is_empty() {
            writeln!(md, "#### {}", escape_link_text(&article.title)).unwrap();
        } else {
            writeln!(
                md,
                "#### [{}](<{}>)",
                escape_link_text(&article.title),
                escape_link_url(&article.url)
            )
            .unwrap();
        }
        writeln!(md, "*{}*\n", article.display_description().trim()).unwrap();
        writeln!(md, "---\n").unwrap();
    }

    writeln!(md, "| Keyword | Top Words | Sentiment Score | Label |").unwrap();
    writeln!(md, "|---|---|---|---|").unwrap();
    writeln!(
        md,
        "| {} | {} | {:.2} | {} |\n",
        escape_cell(&report.keyword),
        escape_cell(&report.topics),
        report.sentiment,
        report.label
    )
    .unwrap();
}

fn write_trend_table(md: &mut String, keyword: &str, points: &[TrendPoint]) {
    writeln!(md, "### Sentiment Trend for \"{}\"\n", keyword).unwrap();
    writeln!(md, "| Date | Sentiment |").unwrap();
    writeln!(md, "|---|---|").unwrap();
    for p in points {
        writeln!(md, "| {} | {:.2} |", p.date, p.sentiment).unwrap();
    }
    md.push('\n');
}

/// Link destinations are emitted in angle brackets, which only forbid `<`, `>` and newlines.
fn escape_link_url(url: &str) -> String {
    url.trim()
        .replace('<', "%3C")
        .replace('>', "%3E")
        .replace(['\n', '\r'], "")
}

fn escape_link_text(s: &str) -> String {
    s.replace('[', "\\[").replace(']', "\\]")
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

/// Write the report to `{markdown_output_dir}/{date}_{HHMMSS}.md`.
#[instrument(level = "info", skip(md))]
pub async fn write_report(
    md: &str,
    markdown_output_dir: &str,
    run_at: NaiveDateTime,
) -> Result<PathBuf, Box<dyn Error>> {
    let filename = format!("{}.md", run_at.format("%Y-%m-%d_%H%M%S"));
    let path = PathBuf::from(markdown_output_dir).join(filename);
    fs::write(&path, md).await?;
    info!(path = %path.display(), "Wrote Markdown report");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, SentimentLabel};
    use chrono::NaiveDate;

    fn run_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 6)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn report() -> KeywordReport {
        KeywordReport {
            keyword: "technology".to_string(),
            articles: vec![
                Article {
                    title: "Chips [rally]".to_string(),
                    description: Some("Strong demand".to_string()),
                    url: "https://example.com/a".to_string(),
                },
                Article {
                    title: "Untitled".to_string(),
                    description: None,
                    url: "https://example.com/b".to_string(),
                },
            ],
            topics: "chips, demand".to_string(),
            sentiment: 42.123,
            label: SentimentLabel::Positive,
        }
    }

    #[test]
    fn test_render_report_sections() {
        let keywords = vec!["technology".to_string(), "health".to_string()];
        let series = vec![(
            "technology".to_string(),
            vec![TrendPoint {
                date: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
                sentiment: 42.123,
            }],
        )];
        let md = render_report(run_at(), &keywords, &[report()], &series);

        assert!(md.contains("_Generated 2025-05-06 14:30:00_"));
        assert!(md.contains("#### [Chips \\[rally\\]](<https://example.com/a>)"));
        assert!(md.contains("*Strong demand*"));
        assert!(md.contains("*No description available*"));
        assert!(md.contains("| technology | chips, demand | 42.12 | Positive |"));
        assert!(md.contains("### Sentiment Trend for \"technology\""));
        assert!(md.contains("| 2025-05-06 | 42.12 |"));
        assert!(md.contains("## health\n\nNo results found."));
    }

    #[test]
    fn test_duplicate_keywords_render_once() {
        let keywords = vec!["technology".to_string(), "technology".to_string()];
        let md = render_report(run_at(), &keywords, &[report()], &[]);
        assert_eq!(md.matches("## technology").count(), 1);
    }

    #[tokio::test]
    async fn test_write_report_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report("# hi\n", dir.path().to_str().unwrap(), run_at())
            .await
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "2025-05-06_143000.md");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# hi\n");
    }

    #[test]
    fn test_link_destination_survives_parens_and_spaces() {
        let mut r = report();
        r.articles.truncate(1);
        r.articles[0].url = "https://example.com/a (b)/<c>".to_string();
        let keywords = vec!["technology".to_string()];
        let md = render_report(run_at(), &keywords, &[r], &[]);
        assert!(md.contains("(<https://example.com/a (b)/%3Cc%3E>)"));
    }
}
