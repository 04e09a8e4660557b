//! Historical sentiment table: merging, series extraction and CSV encoding.
//!
//! Each run produces one [`Observation`] per keyword. Observations are merged
//! into the [`HistoricalTable`] with last-wins semantics: for every
//! `(date, keyword)` pair only the most recently appended row survives. The
//! merged table is ordered by date, then keyword.
//!
//! # CSV Layout
//!
//! ```text
//! Date,Keyword,Topics,Sentiment
//! 2024-01-01,technology,"ai, chip, market",10.5
//! ```
//!
//! Older history files stored a full timestamp in `Date`
//! (`2024-01-01 13:45:02`); those reduce to the calendar date when read.

use crate::models::{HistoricalTable, Observation, TrendPoint};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ByteRecord, ReaderBuilder, Writer};
use std::collections::BTreeMap;
use std::error::Error;
use tracing::{debug, instrument};

/// Column names of the persisted table, in file order.
pub const HEADER: [&str; 4] = ["Date", "Keyword", "Topics", "Sentiment"];

/// Merge `new_rows` into `existing` and return the reduced table.
///
/// `new_rows` are appended after `existing`; for each `(date, keyword)` the
/// last row in that order wins. `existing` is left untouched. An empty
/// `new_rows` returns a copy of `existing` as-is.
pub fn merge(existing: &HistoricalTable, new_rows: &[Observation]) -> HistoricalTable {
    if new_rows.is_empty() {
        return existing.clone();
    }
    reduce_last_wins(existing.rows().iter().chain(new_rows).cloned())
}

/// Sentiment series for one keyword, ascending by date, one point per date.
pub fn series_for(table: &HistoricalTable, keyword: &str) -> Vec<TrendPoint> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in table.rows().iter().filter(|r| r.keyword == keyword) {
        by_date.insert(row.date, row.sentiment);
    }
    by_date
        .into_iter()
        .map(|(date, sentiment)| TrendPoint { date, sentiment })
        .collect()
}

fn reduce_last_wins(rows: impl IntoIterator<Item = Observation>) -> HistoricalTable {
    let mut latest: BTreeMap<(NaiveDate, String), Observation> = BTreeMap::new();
    for row in rows {
        latest.insert((row.date, row.keyword.clone()), row);
    }
    HistoricalTable::from(latest.into_values().collect::<Vec<_>>())
}

/// Parse a `Date` cell as a calendar date.
///
/// Accepts `YYYY-MM-DD` and timestamps with a date prefix
/// (`YYYY-MM-DD HH:MM:SS`, optionally fractional or `T`-separated).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

/// Encode the table as CSV with the [`HEADER`] row.
pub fn to_csv(table: &HistoricalTable) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for row in table.rows() {
        writer.write_record([
            row.date.format("%Y-%m-%d").to_string(),
            row.keyword.clone(),
            row.topics.clone(),
            row.sentiment.to_string(),
        ])?;
    }
    writer.flush()?;
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(bytes)
}

/// Decode a CSV body into a reduced table.
///
/// Columns are located by header name, so extra columns are ignored. Rows
/// whose date or sentiment cannot be parsed are dropped. An empty body yields
/// an empty table; a header lacking one of the [`HEADER`] columns is an error.
#[instrument(level = "debug", skip_all, fields(bytes = body.len()))]
pub fn from_csv(body: &[u8]) -> Result<HistoricalTable, Box<dyn Error>> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(HistoricalTable::new());
    }

    let mut reader = ReaderBuilder::new().flexible(true).from_reader(body);
    let headers = reader.headers()?.clone();
    let mut columns = [0usize; 4];
    for (slot, name) in columns.iter_mut().zip(HEADER) {
        *slot = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("history CSV is missing the {name} column"))?;
    }

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for (line, record) in reader.byte_records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                dropped += 1;
                debug!(line = line + 2, error = %e, "Dropping unreadable history row");
                continue;
            }
        };
        match decode_row(&record, &columns) {
            Some(row) => rows.push(row),
            None => {
                dropped += 1;
                debug!(line = line + 2, record = ?record, "Dropping unparseable history row");
            }
        }
    }
    debug!(kept = rows.len(), dropped, "Decoded history CSV");

    Ok(reduce_last_wins(rows))
}

fn decode_row(record: &ByteRecord, columns: &[usize; 4]) -> Option<Observation> {
    let field = |i: usize| record.get(i).and_then(|b| std::str::from_utf8(b).ok());
    let [date, keyword, topics, sentiment] = *columns;
    let date = parse_date(field(date)?)?;
    let keyword = field(keyword)?.trim();
    if keyword.is_empty() {
        return None;
    }
    // an absent trailing Topics cell is empty; undecodable bytes drop the row
    let topics = match record.get(topics) {
        Some(b) => std::str::from_utf8(b).ok()?,
        None => "",
    };
    let sentiment: f64 = field(sentiment)?.trim().parse().ok()?;
    if !sentiment.is_finite() {
        return None;
    }
    Some(Observation::new(date, keyword, topics, sentiment))
}
