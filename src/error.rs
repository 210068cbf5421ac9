//! Error types for thumbgrab
//!
//! Every error is fatal to a run. Variants carry the URL or path of the
//! operation that failed so the final log line is enough to diagnose it.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for thumbgrab operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid command line value
    #[error("configuration error: {0}")]
    Config(String),

    /// The HTTP client could not be constructed
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    /// The search endpoint could not be turned into a request url
    #[error("invalid search url: {0}")]
    Url(#[from] url::ParseError),

    /// Request failed before a response was received, or the body could not be read
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("request to {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Search API answered but rejected the query
    #[error("search api rejected {url}: {details}")]
    Api { url: String, details: String },

    /// Response body did not have the expected JSON shape
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A page came back with fewer results than are needed to fill the request
    #[error("page {page} returned {received} of {expected} results")]
    PartialPage {
        page: usize,
        received: usize,
        expected: usize,
    },

    /// Directory creation or file write failed
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A download thread panicked
    #[error("download worker panicked")]
    WorkerPanic,
}
