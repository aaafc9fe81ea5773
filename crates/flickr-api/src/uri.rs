//! Client URI parsing.
//!
//! A client is described by a single URI so it can be passed around as one
//! opaque string (on the command line, in a config file):
//!
//! ```text
//! flickr://api?api_key={KEY}[&endpoint={URL}][&rate={REQUESTS_PER_SECOND}]
//! ```

use std::num::NonZeroU32;
use std::str::FromStr;

use reqwest::Url;

use crate::error::{Error, Result};

/// URI scheme accepted by [`ClientUri::parse`].
pub const SCHEME: &str = "flickr";

/// Default Flickr REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.flickr.com/services/rest/";

/// Default request rate, in requests per second.
pub const DEFAULT_RATE: NonZeroU32 = NonZeroU32::MIN;

/// Parsed client URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientUri {
    pub api_key: String,
    pub endpoint: String,
    pub rate: NonZeroU32,
}

impl ClientUri {
    pub fn parse(uri: &str) -> Result<Self> {
        let url = Url::parse(uri).map_err(|e| Error::invalid_uri(format!("{uri}: {e}")))?;

        if url.scheme() != SCHEME {
            return Err(Error::invalid_uri(format!(
                "unsupported scheme '{}', expected '{SCHEME}'",
                url.scheme()
            )));
        }

        let mut api_key = None;
        let mut endpoint = DEFAULT_ENDPOINT.to_string();
        let mut rate = DEFAULT_RATE;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "api_key" => api_key = Some(value.into_owned()),
                "endpoint" => {
                    Url::parse(&value)
                        .map_err(|e| Error::invalid_uri(format!("endpoint {value}: {e}")))?;
                    endpoint = value.into_owned();
                }
                "rate" => {
                    rate = value.parse::<NonZeroU32>().map_err(|_| {
                        Error::invalid_uri(format!("rate must be a positive integer, got '{value}'"))
                    })?;
                }
                other => {
                    tracing::debug!(parameter = other, "Ignoring unknown client URI parameter");
                }
            }
        }

        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or(Error::MissingParameter("api_key"))?;

        Ok(Self {
            api_key,
            endpoint,
            rate,
        })
    }
}

impl FromStr for ClientUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
