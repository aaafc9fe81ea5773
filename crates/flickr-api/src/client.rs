//! Flickr REST client.
//!
//! Wraps the REST endpoint with:
//! - Token-bucket rate limiting via [`governor`] (rate taken from the client URI).
//! - 30-second request timeout.
//! - HTTP status and Flickr `stat` checking.
//!
//! Responses are returned as raw bytes; interpreting the payload is up to the
//! caller.

use std::time::Duration;

use bytes::Bytes;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::uri::ClientUri;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Envelope shared by every JSON response.
#[derive(Debug, Deserialize)]
struct Status {
    stat: Option<String>,
    code: Option<i64>,
    message: Option<String>,
}

/// Flickr API client.
///
/// # Examples
///
/// ```no_run
/// use flickr_api::{ClientUri, FlickrClient};
///
/// # async fn run() -> flickr_api::Result<()> {
/// let uri = ClientUri::parse("flickr://api?api_key=your-key")?;
/// let client = FlickrClient::new(uri)?;
/// let body = client
///     .execute_method(&[("method".into(), "flickr.photos.search".into())])
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct FlickrClient {
    client: reqwest::Client,
    uri: ClientUri,
    rate_limiter: DefaultDirectRateLimiter,
}

impl FlickrClient {
    pub fn new(uri: ClientUri) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let rate_limiter = RateLimiter::direct(Quota::per_second(uri.rate));

        Ok(Self {
            client,
            uri,
            rate_limiter,
        })
    }

    /// Parse `uri` and build a client from it.
    pub fn from_uri(uri: &str) -> Result<Self> {
        Self::new(ClientUri::parse(uri)?)
    }

    pub fn endpoint(&self) -> &str {
        &self.uri.endpoint
    }

    /// Call an API method and return the raw JSON body.
    ///
    /// `params` must include `method`. The response format parameters and the
    /// API key are added here; anything else is passed through unchanged.
    pub async fn execute_method(&self, params: &[(String, String)]) -> Result<Bytes> {
        self.rate_limiter.until_ready().await;

        let method = params
            .iter()
            .find(|(k, _)| k == "method")
            .map(|(_, v)| v.as_str())
            .unwrap_or("");
        debug!(method, endpoint = %self.uri.endpoint, "Calling Flickr API");

        let resp = self
            .client
            .get(&self.uri.endpoint)
            .query(params)
            .query(&[
                ("api_key", self.uri.api_key.as_str()),
                ("format", "json"),
                ("nojsoncallback", "1"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        check_stat(&body)?;
        Ok(body)
    }
}

/// Map a `stat: "fail"` envelope to [`Error::Api`].
fn check_stat(body: &[u8]) -> Result<()> {
    let status: Status = serde_json::from_slice(body)?;
    match status.stat.as_deref() {
        Some("fail") => Err(Error::Api {
            code: status.code.unwrap_or(0),
            message: status.message.unwrap_or_default(),
        }),
        _ => Ok(()),
    }
}
