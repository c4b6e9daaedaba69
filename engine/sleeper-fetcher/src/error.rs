//! Error types for the Sleeper fetch pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised while talking to the Sleeper API
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with something other than 200
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body could not be decoded into the expected JSON shape
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    /// Create a new transport error
    pub fn transport(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport { url: url.into(), message: message.to_string() }
    }

    /// Create a new decode error
    pub fn decode(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode { url: url.into(), message: message.to_string() }
    }
}

/// Reasons a roster cache file could not be used.
///
/// Never surfaced to callers; every variant is treated as a cache miss.
#[derive(Error, Debug)]
pub enum CacheReadError {
    #[error("cache file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache file is not valid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("cache file contains no players")]
    Empty,

    #[error("cache file has no usable cache_date")]
    MissingCacheDate,
}

/// Errors raised while reading or writing tabular output
#[derive(Error, Debug)]
pub enum TableError {
    #[error("I/O error on {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("CSV error on {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

impl TableError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io { path: path.display().to_string(), source }
    }

    pub(crate) fn csv(path: &std::path::Path, source: csv::Error) -> Self {
        Self::Csv { path: path.display().to_string(), source }
    }
}

/// Top-level pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Mandatory roster fetch failed with no usable cache
    #[error("roster fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Fresh roster could not be persisted
    #[error("failed to write roster cache: {0}")]
    CacheWrite(TableError),

    /// Output table could not be written
    #[error("table error: {0}")]
    Table(#[from] TableError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// A requested player id is absent from the roster snapshot
    #[error("player {0} not found in roster cache")]
    PlayerNotFound(String),
}

impl PipelineError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error should abort a batch run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::PlayerNotFound(_))
    }
}
