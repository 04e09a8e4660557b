//! Per-keyword processing: fetch, analyse, score, merge.
//!
//! The history table is threaded through explicitly: every step takes the
//! current table by value and hands back the (possibly) extended one.

use crate::analysis::{Stopwords, aggregate_text, top_terms};
use crate::history::{merge, series_for};
use crate::models::{HistoricalTable, KeywordReport, Observation, SentimentLabel, TrendPoint};
use crate::sentiment::SentimentOracle;
use crate::sources::NewsSource;
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use tracing::{debug, error, info, instrument, warn};

/// Collaborators used while processing keywords.
#[derive(Debug)]
pub struct Pipeline<N, O> {
    pub source: N,
    pub oracle: O,
    pub stopwords: Stopwords,
    pub top_terms: usize,
}

/// Result of a full run over all keywords.
#[derive(Debug)]
pub struct RunOutcome {
    /// History after merging this run's observations.
    pub table: HistoricalTable,
    /// Reports for keywords that produced an observation, one per keyword.
    pub reports: Vec<KeywordReport>,
    /// Sentiment series per keyword with at least one point.
    pub series: Vec<(String, Vec<TrendPoint>)>,
}

impl<N: NewsSource, O: SentimentOracle> Pipeline<N, O> {
    /// Process one keyword and merge its observation into `table`.
    ///
    /// A provider error or an empty result leaves the table unchanged and
    /// yields no report.
    #[instrument(level = "info", skip(self, table), fields(rows = table.len()))]
    pub async fn process_keyword(
        &self,
        table: HistoricalTable,
        keyword: &str,
        date: NaiveDate,
    ) -> (HistoricalTable, Option<KeywordReport>) {
        let articles = match self.source.search(keyword).await {
            Ok(articles) => articles,
            Err(e) => {
                error!(error = %e, "Failed to fetch news; skipping keyword");
                return (table, None);
            }
        };
        if articles.is_empty() {
            warn!("No results found");
            return (table, None);
        }

        let text = aggregate_text(&articles);
        if text.is_empty() {
            warn!(articles = articles.len(), "Articles carried no text; skipping keyword");
            return (table, None);
        }
        debug!(preview = %truncate_for_log(&text, 200), "Aggregated article text");

        let topics = top_terms(&text, &self.stopwords, self.top_terms);
        let sentiment = self.oracle.score(&text);
        let label = SentimentLabel::from_score(sentiment);
        info!(articles = articles.len(), %topics, sentiment, %label, "Scored keyword");

        let observation = Observation::new(date, keyword, topics.clone(), sentiment);
        let table = merge(&table, &[observation]);

        let report = KeywordReport {
            keyword: keyword.to_string(),
            articles,
            topics,
            sentiment,
            label,
        };
        (table, Some(report))
    }

    /// Process `keywords` in order, then extract each keyword's series.
    pub async fn run(
        &self,
        mut table: HistoricalTable,
        keywords: &[String],
        date: NaiveDate,
    ) -> RunOutcome {
        let mut reports = Vec::new();
        for keyword in keywords {
            let (next, report) = self.process_keyword(table, keyword, date).await;
            table = next;
            if let Some(report) = report {
                // a repeated keyword keeps only its latest report, like the history row
                reports.retain(|r: &KeywordReport| r.keyword != report.keyword);
                reports.push(report);
            }
        }

        let mut series = Vec::new();
        for keyword in keywords {
            if series.iter().any(|(k, _): &(String, Vec<TrendPoint>)| k == keyword) {
                continue;
            }
            let points = series_for(&table, keyword);
            if !points.is_empty() {
                series.push((keyword.clone(), points));
            }
        }

        info!(
            keywords = keywords.len(),
            scored = reports.len(),
            rows = table.len(),
            "Run complete"
        );
        RunOutcome {
            table,
            reports,
            series,
        }
    }
}
