//! Run configuration loaded from an optional `config.yaml`.
//!
//! ```yaml
//! keywords: [technology, health, finance]
//! provider: google_news
//! page_size: 10
//! stoplist_url: https://github.com/aneesha/RAKE/raw/master/SmartStoplist.txt
//! lexicon:
//!   bullish: 2.0
//!   layoffs: -2.2
//! storage:
//!   root: ./store
//!   bucket: strategicinsights
//!   object_key: news.csv
//! ```
//!
//! Every field is optional; missing fields take the defaults below. CLI flags
//! are applied on top with [`Config::apply_cli`].

use crate::analysis::DEFAULT_TOP_TERMS;
use crate::cli::Cli;
use crate::sources::{ProviderKind, custom_search, google_news, newsapi};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use tracing::{debug, instrument};

pub const DEFAULT_KEYWORDS: [&str; 5] = ["technology", "health", "finance", "sports", "entertainment"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keywords processed in order on each run.
    pub keywords: Vec<String>,
    pub provider: ProviderKind,
    /// NewsAPI `pageSize`.
    pub page_size: u32,
    /// Maximum items kept from a Google News feed.
    pub max_items: usize,
    /// Custom Search `num`.
    pub num_results: u32,
    /// Number of top terms stored as an observation's topics.
    pub top_terms: usize,
    /// Extra stoplist merged into the built-in stopwords.
    pub stoplist_url: Option<String>,
    /// Extra sentiment valences (`[-4, 4]`) added to the built-in lexicon.
    pub lexicon: BTreeMap<String, f64>,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: String,
    pub bucket: String,
    pub object_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            provider: ProviderKind::default(),
            page_size: newsapi::DEFAULT_PAGE_SIZE,
            max_items: google_news::DEFAULT_MAX_ITEMS,
            num_results: custom_search::DEFAULT_NUM_RESULTS,
            top_terms: DEFAULT_TOP_TERMS,
            stoplist_url: None,
            lexicon: BTreeMap::new(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: "./store".to_string(),
            bucket: "strategicinsights".to_string(),
            object_key: "news.csv".to_string(),
        }
    }
}

impl Config {
    /// Parse a YAML document. An empty document gives the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, Box<dyn Error>> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields with any values given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if !cli.keywords.is_empty() {
            self.keywords = cli.keywords.clone();
        }
        if let Some(provider) = cli.provider {
            self.provider = provider;
        }
        if let Some(root) = &cli.store_root {
            self.storage.root = root.clone();
        }
        if let Some(bucket) = &cli.bucket {
            self.storage.bucket = bucket.clone();
        }
        if let Some(key) = &cli.object_key {
            self.storage.object_key = key.clone();
        }
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err("keywords must not be blank".into());
        }
        if let Some((word, v)) = self.lexicon.iter().find(|(_, v)| !(-4.0..=4.0).contains(*v)) {
            return Err(format!("lexicon valence for {word:?} is {v}, expected -4..=4").into());
        }
        if self.storage.bucket.is_empty() || self.storage.object_key.is_empty() {
            return Err("storage bucket and object_key must be set".into());
        }
        Ok(())
    }
}

/// Load the configuration: the file at `path` if given, otherwise defaults.
#[instrument(level = "info")]
pub fn load_config(path: Option<&str>) -> Result<Config, Box<dyn Error>> {
    let Some(path) = path else {
        debug!("No config file given; using defaults");
        return Ok(Config::default());
    };
    let yaml = fs::read_to_string(path).map_err(|e| format!("cannot read config {path}: {e}"))?;
    Config::from_yaml(&yaml)
}
