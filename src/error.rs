//! Error kinds for each I/O boundary. Per-record problems never surface here;
//! those are coerced or skipped where they occur.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Input batch could not be read.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input not found: {0}")]
    NotFound(PathBuf),

    #[error("unsupported input format: {0} (expected .csv, .jsonl, .ndjson or .zst)")]
    UnsupportedFormat(PathBuf),

    #[error("read {path}: {source}")]
    Io { path: PathBuf, #[source] source: io::Error },

    #[error("csv {path}: {source}")]
    Csv { path: PathBuf, #[source] source: csv::Error },
}

/// Output batch (or summary) could not be written. Nothing partial is left behind.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("unsupported output format: {0} (expected .csv, .jsonl, .ndjson or .zst)")]
    UnsupportedFormat(PathBuf),

    #[error("write {path}: {source}")]
    Io { path: PathBuf, #[source] source: io::Error },

    #[error("csv {path}: {source}")]
    Csv { path: PathBuf, #[source] source: csv::Error },

    #[error("json encode: {0}")]
    Json(#[from] serde_json::Error),

    #[error("promote {path}: {message}")]
    Promote { path: PathBuf, message: String },

    #[error("render {path}: {message}")]
    Render { path: PathBuf, message: String },
}

/// Relational store failures (connection, schema, single-row writes).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid table name: {0:?}")]
    InvalidTable(String),
}

/// Collection client failures for a single search.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("malformed listing: {0}")]
    Malformed(String),
}
