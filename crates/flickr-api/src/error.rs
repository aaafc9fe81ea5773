//! Error types for flickr-api.

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the Flickr API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client URI could not be parsed.
    #[error("invalid client URI: {0}")]
    InvalidUri(String),

    /// A required parameter was missing from the client URI.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// The HTTP request could not be completed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success HTTP status.
    #[error("Flickr API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The API answered with `stat: "fail"`.
    #[error("Flickr API error {code}: {message}")]
    Api { code: i64, message: String },

    /// The response body was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid URI error.
    pub fn invalid_uri(msg: impl Into<String>) -> Self {
        Self::InvalidUri(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = Error::Api {
            code: 100,
            message: "Invalid API Key (Key has invalid format)".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Flickr API error 100: Invalid API Key (Key has invalid format)"
        );
    }

    #[test]
    fn invalid_uri_display() {
        let err = Error::invalid_uri("unsupported scheme 'http'");
        assert_eq!(err.to_string(), "invalid client URI: unsupported scheme 'http'");
    }
}
