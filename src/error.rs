//! Error types for the enrichment pipeline.
//!
//! Errors are split by how the orchestrator treats them:
//!
//! - [`LookupError`] is per photo. It is logged and the photo is skipped.
//! - [`DecodeError`], [`WriteError`] and [`SourceError`] abort the run and
//!   surface to the caller wrapped in [`Error`].

use std::time::Duration;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by a page source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A page payload could not be decoded.
#[derive(Debug, thiserror::Error)]
#[error("failed to decode page {page}: {message}")]
pub struct DecodeError {
    pub page: u32,
    pub message: String,
}

impl DecodeError {
    pub fn new(page: u32, message: impl Into<String>) -> Self {
        Self {
            page,
            message: message.into(),
        }
    }
}

/// A point-in-polygon lookup failed.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("lookup service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a valid place list.
    #[error("malformed response: {0}")]
    Parse(String),

    /// No response within the per-lookup deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Rows could not be written to the output stream.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The page source failed.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct SourceError(pub BoxError);

impl SourceError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }
}

impl From<flickr_api::Error> for SourceError {
    fn from(err: flickr_api::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Fatal errors that abort an enrichment run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("failed to write output: {0}")]
    Write(#[from] WriteError),

    #[error("page source failed: {0}")]
    Source(#[from] SourceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display() {
        let err = Error::from(DecodeError::new(3, "expected value at line 1 column 1"));
        assert_eq!(
            err.to_string(),
            "failed to decode page 3: expected value at line 1 column 1"
        );
    }

    #[test]
    fn source_error_keeps_message() {
        let err = Error::from(SourceError::from(flickr_api::Error::Api {
            code: 105,
            message: "Service currently unavailable".to_string(),
        }));
        assert_eq!(
            err.to_string(),
            "page source failed: Flickr API error 105: Service currently unavailable"
        );
    }

    #[test]
    fn timeout_display() {
        let err = LookupError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "timed out after 10s");
    }
}
