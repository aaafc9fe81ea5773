//! HTTP point-in-polygon client.
//!
//! Implements [`PlaceLookup`] against a Who's On First spatial server
//! (`POST /api/point-in-polygon`).

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::PipConfig;
use crate::error::LookupError;
use crate::pip::lookup::{Coordinate, Place, PlaceLookup, PlacesResponse, PointInPolygonRequest};

/// Point-in-polygon client over HTTP.
///
/// # Examples
///
/// ```no_run
/// use flickr_pip::config::PipConfig;
/// use flickr_pip::pip::{Coordinate, PipClient, PlaceLookup};
///
/// # async fn run() -> anyhow::Result<()> {
/// let client = PipClient::new(&PipConfig::default())?;
/// let places = client.lookup(Coordinate::new(37.6, -122.4)).await?;
/// # Ok(())
/// # }
/// ```
pub struct PipClient {
    client: reqwest::Client,
    endpoint: String,
}

impl PipClient {
    pub fn new(config: &PipConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PlaceLookup for PipClient {
    async fn lookup(&self, coord: Coordinate) -> Result<Vec<Place>, LookupError> {
        let request = PointInPolygonRequest::current(coord);
        debug!(
            latitude = coord.latitude,
            longitude = coord.longitude,
            endpoint = %self.endpoint,
            "Point-in-polygon query"
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LookupError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        let parsed: PlacesResponse =
            serde_json::from_slice(&body).map_err(|e| LookupError::Parse(e.to_string()))?;

        debug!(
            latitude = coord.latitude,
            longitude = coord.longitude,
            places = parsed.places.len(),
            "Point-in-polygon results"
        );

        Ok(parsed.places)
    }
}
