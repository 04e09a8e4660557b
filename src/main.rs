//! # News Sentiment Trends
//!
//! Tracks how news coverage of a set of keywords feels over time. Each run
//! fetches articles per keyword, scores the aggregate sentiment, extracts the
//! top terms, and merges one observation per keyword into a history table
//! kept in an object store.
//!
//! ## Features
//!
//! - Fetches articles from NewsAPI, Google News RSS or Google Custom Search
//! - Lexicon-based sentiment score in `[-100, 100]` with a Positive/Neutral/Negative label
//! - Top terms per keyword with stopword filtering (built-in plus an optional remote stoplist)
//! - History merged with last-wins semantics: one row per `(date, keyword)`
//! - Outputs a Markdown report and a JSON file of per-keyword sentiment series
//!
//! ## Usage
//!
//! ```sh
//! news_sentiment_trends -j ./json -m ./markdown --update
//! ```
//!
//! ## Architecture
//!
//! 1. **Load**: Read config and the stored history (missing history starts empty)
//! 2. **Process**: For each keyword, fetch, analyse and merge (sequentially)
//! 3. **Output**: Write the Markdown report and the trend JSON
//! 4. **Persist**: With `--update`, write the merged history back to the store

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod cli;
mod config;
mod history;
mod models;
mod outputs;
mod pipeline;
mod sentiment;
mod sources;
mod storage;
mod utils;

use analysis::Stopwords;
use cli::Cli;
use config::{Config, load_config};
use outputs::{json, markdown};
use pipeline::Pipeline;
use sentiment::LexiconScorer;
use sources::{CustomSearchSource, GoogleNewsSource, NewsApiSource, Provider, ProviderKind};
use storage::{FsBlobStore, load_history, save_history};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Run failed");
            ExitCode::FAILURE
        }
    }
}

#[instrument(skip_all)]
async fn run(args: Cli) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    info!("news_sentiment_trends starting up");
    debug!(?args.json_output_dir, ?args.markdown_output_dir, ?args.config, "Parsed CLI arguments");

    // ---- Config ----
    let mut config = load_config(args.config.as_deref())?;
    config.apply_cli(&args);
    config.validate()?;
    info!(
        provider = %config.provider,
        keywords = ?config.keywords,
        bucket = %config.storage.bucket,
        object_key = %config.storage.object_key,
        "Loaded configuration"
    );

    // Early check: output dirs must be writable before any network work
    for dir in [&args.json_output_dir, &args.markdown_output_dir] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Output directory is not writable");
            return Err(e);
        }
    }

    let provider = build_provider(&config, &args)?;

    // ---- History ----
    let store = FsBlobStore::new(&config.storage.root);
    let table = load_history(&store, &config.storage.bucket, &config.storage.object_key).await;

    // ---- Process keywords ----
    let stopwords = match &config.stoplist_url {
        Some(url) => Stopwords::with_remote(url).await,
        None => Stopwords::english(),
    };
    let pipeline = Pipeline {
        source: provider,
        oracle: LexiconScorer::new().with_valences(config.lexicon.clone()),
        stopwords,
        top_terms: config.top_terms,
    };

    let run_at = Local::now().naive_local();
    let outcome = pipeline.run(table, &config.keywords, run_at.date()).await;

    // ---- Outputs ----
    let md = markdown::render_report(run_at, &config.keywords, &outcome.reports, &outcome.series);
    if let Err(e) = markdown::write_report(&md, &args.markdown_output_dir, run_at).await {
        error!(error = %e, "Failed to write Markdown report");
    }

    let doc = json::TrendsDocument::new(run_at.date(), &outcome.series);
    if let Err(e) = json::write_trends(&doc, &args.json_output_dir).await {
        error!(error = %e, "Failed to write trends JSON");
    }

    // ---- Persist ----
    let mut result = Ok(());
    if args.update {
        if outcome.table.is_empty() {
            info!("No data to save");
        } else if let Err(e) = save_history(
            &store,
            &config.storage.bucket,
            &config.storage.object_key,
            &outcome.table,
        )
        .await
        {
            error!(
                error = %e,
                rows = outcome.table.len(),
                "Failed to update history in the object store; rerun with --update to retry"
            );
            result = Err(e);
        } else {
            info!(rows = outcome.table.len(), "Updated history uploaded");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        scored = outcome.reports.len(),
        "Execution complete"
    );
    result
}

/// Construct the configured provider, checking its credentials.
fn build_provider(config: &Config, args: &Cli) -> Result<Provider, Box<dyn Error>> {
    let client = sources::http_client()?;
    let provider = match config.provider {
        ProviderKind::Newsapi => {
            let key = args
                .newsapi_key
                .clone()
                .ok_or("NewsAPI provider needs --newsapi-key or NEWSAPI_API_KEY")?;
            Provider::NewsApi(NewsApiSource::new(client, key, config.page_size))
        }
        ProviderKind::GoogleNews => {
            Provider::GoogleNews(GoogleNewsSource::new(client, config.max_items))
        }
        ProviderKind::CustomSearch => {
            let key = args
                .google_api_key
                .clone()
                .ok_or("Custom Search provider needs --google-api-key or GOOGLE_API_KEY")?;
            let engine = args
                .google_cse_id
                .clone()
                .ok_or("Custom Search provider needs --google-cse-id or GOOGLE_CSE_ID")?;
            Provider::CustomSearch(CustomSearchSource::new(
                client,
                key,
                engine,
                config.num_results,
            ))
        }
    };
    Ok(provider)
}
