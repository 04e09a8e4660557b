//! JSON output of the per-keyword sentiment series.
//!
//! The file is meant for chart consumers (line charts of sentiment over time).
//!
//! # Output Path
//!
//! `{json_output_dir}/{date}/trends.json`:
//!
//! ```json
//! {
//!   "date": "2025-05-06",
//!   "series": {
//!     "technology": [{"date": "2025-05-05", "sentiment": 12.4}, ...]
//!   }
//! }
//! ```

use crate::models::TrendPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialized form of the trend file.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TrendsDocument {
    pub date: NaiveDate,
    pub series: BTreeMap<String, Vec<TrendPoint>>,
}

impl TrendsDocument {
    pub fn new(date: NaiveDate, series: &[(String, Vec<TrendPoint>)]) -> Self {
        Self {
            date,
            series: series.iter().cloned().collect(),
        }
    }
}

/// Write the trend series to `{json_output_dir}/{date}/trends.json`.
///
/// Returns the path written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_trends(
    doc: &TrendsDocument,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(doc)?;

    let full_json_dir = PathBuf::from(json_output_dir).join(doc.date.to_string());
    info!(dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = full_json_dir.join("trends.json");
    fs::write(&path, json).await?;
    info!(path = %path.display(), keywords = doc.series.len(), "Wrote trends JSON");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    #[test]
    fn test_document_shape() {
        let series = vec![(
            "technology".to_string(),
            vec![TrendPoint { date: day(5), sentiment: 12.5 }],
        )];
        let doc = TrendsDocument::new(day(6), &series);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["date"], "2025-05-06");
        assert_eq!(value["series"]["technology"][0]["date"], "2025-05-05");
        assert_eq!(value["series"]["technology"][0]["sentiment"], 12.5);
    }

    #[tokio::test]
    async fn test_write_trends_creates_dated_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let doc = TrendsDocument::new(day(6), &[]);
        let path = write_trends(&doc, out).await.unwrap();
        assert_eq!(path, dir.path().join("2025-05-06").join("trends.json"));
        let written: TrendsDocument =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, doc);
    }
}
