//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Secrets can be provided via environment variables; everything else can
//! also come from the YAML config file, with flags taking precedence.

use crate::sources::ProviderKind;
use clap::Parser;

/// Command-line arguments for a sentiment tracking run.
///
/// # Examples
///
/// ```sh
/// # Default keywords from NewsAPI, history left untouched
/// news_sentiment_trends -j ./json -m ./markdown
///
/// # Google News for two keywords, then write the merged history back
/// news_sentiment_trends -j ./json -m ./markdown -p google-news \
///     -k "Yale University" -k "Brown University" --update
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for the trend JSON file
    #[arg(short, long)]
    pub json_output_dir: String,

    /// Output directory for the Markdown report
    #[arg(short, long)]
    pub markdown_output_dir: String,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Keyword to analyze (repeatable; replaces the configured keywords)
    #[arg(short, long = "keyword")]
    pub keywords: Vec<String>,

    /// News provider to query
    #[arg(short, long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Write the merged history back to the object store
    #[arg(long)]
    pub update: bool,

    /// Root directory of the object store
    #[arg(long, env = "STORE_ROOT")]
    pub store_root: Option<String>,

    /// Bucket holding the history object
    #[arg(long, env = "STORE_BUCKET")]
    pub bucket: Option<String>,

    /// Object key of the history CSV
    #[arg(long, env = "STORE_OBJECT_KEY")]
    pub object_key: Option<String>,

    /// NewsAPI key
    #[arg(long, env = "NEWSAPI_API_KEY", hide_env_values = true)]
    pub newsapi_key: Option<String>,

    /// Google API key for the Custom Search provider
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// Google programmable search engine id
    #[arg(long, env = "GOOGLE_CSE_ID")]
    pub google_cse_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "news_sentiment_trends",
            "--json-output-dir",
            "./json",
            "--markdown-output-dir",
            "./markdown",
        ]);

        assert_eq!(cli.json_output_dir, "./json");
        assert_eq!(cli.markdown_output_dir, "./markdown");
        assert!(cli.keywords.is_empty());
        assert!(!cli.update);
    }

    #[test]
    fn test_cli_short_flags_and_repeated_keywords() {
        let cli = Cli::parse_from([
            "news_sentiment_trends",
            "-j",
            "/tmp/json",
            "-m",
            "/tmp/markdown",
            "-k",
            "Yale University",
            "-k",
            "Brown University",
            "-p",
            "google-news",
            "--update",
        ]);

        assert_eq!(cli.json_output_dir, "/tmp/json");
        assert_eq!(cli.keywords, vec!["Yale University", "Brown University"]);
        assert_eq!(cli.provider, Some(ProviderKind::GoogleNews));
        assert!(cli.update);
    }

    #[test]
    fn test_cli_rejects_unknown_provider() {
        let result = Cli::try_parse_from([
            "news_sentiment_trends",
            "-j",
            "j",
            "-m",
            "m",
            "--provider",
            "bing",
        ]);
        assert!(result.is_err());
    }
}
