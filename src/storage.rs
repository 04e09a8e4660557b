//! Object storage for the persisted history table.
//!
//! The history lives in a blob store keyed by `(bucket, key)`. [`FsBlobStore`]
//! maps objects onto `<root>/<bucket>/<key>` on the local filesystem; any other
//! store can be plugged in through [`BlobStore`].
//!
//! # Failure Policy
//!
//! - [`load_history`] never fails: a missing object means "no history yet"
//!   and any other problem is logged, both yielding an empty table.
//! - [`save_history`] returns the error so the caller can report it; the
//!   in-memory table is never touched.

use crate::history;
use crate::models::HistoricalTable;
use std::error::Error;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },
    #[error("invalid object name {0:?}")]
    InvalidName(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A blob store addressed by bucket and object key.
pub trait BlobStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;
    async fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError>;
}

/// Filesystem-backed blob store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `(bucket, key)` to a path under the root.
    ///
    /// Buckets must be a single path segment; keys may contain `/` but no
    /// `..`, root or prefix components.
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == "." || bucket == ".." {
            return Err(StoreError::InvalidName(bucket.to_string()));
        }
        let key_path = Path::new(key);
        let is_plain = key_path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !is_plain {
            return Err(StoreError::InvalidName(key.to_string()));
        }
        Ok(self.root.join(bucket).join(key_path))
    }
}

impl BlobStore for FsBlobStore {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(bucket, key)?;
        match fs::read(&path).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(level = "debug", skip(self, body), fields(bytes = body.len()))]
    async fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        // write-then-rename so readers never see a partial object
        let mut tmp = path.clone().into_os_string();
        tmp.push(".partial");
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// Load the history table, or an empty one if it cannot be read.
#[instrument(level = "info", skip(store))]
pub async fn load_history<S: BlobStore>(store: &S, bucket: &str, key: &str) -> HistoricalTable {
    let body = match store.get(bucket, key).await {
        Ok(body) => body,
        Err(StoreError::NotFound { .. }) => {
            info!("No history stored yet; starting empty");
            return HistoricalTable::new();
        }
        Err(e) => {
            warn!(error = %e, "Failed to read history; starting empty");
            return HistoricalTable::new();
        }
    };
    match history::from_csv(&body) {
        Ok(table) => {
            info!(rows = table.len(), "Loaded history");
            table
        }
        Err(e) => {
            warn!(error = %e, "Stored history is not a valid table; starting empty");
            HistoricalTable::new()
        }
    }
}

/// Encode and write the history table.
#[instrument(level = "info", skip(store, table), fields(rows = table.len()))]
pub async fn save_history<S: BlobStore>(
    store: &S,
    bucket: &str,
    key: &str,
    table: &HistoricalTable,
) -> Result<(), Box<dyn Error>> {
    let body = history::to_csv(table)?;
    store.put(bucket, key, &body).await?;
    info!(bytes = body.len(), "Saved history");
    Ok(())
}
