//! Failure taxonomy for upstream rate sources

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// No row matched any known table layout. Not a defect, just a signal to
    /// try the next source.
    #[error("No rate rows found in {source_name} markup")]
    Empty { source_name: String },
}

impl SourceError {
    pub fn is_empty(&self) -> bool {
        matches!(self, SourceError::Empty { .. })
    }
}
