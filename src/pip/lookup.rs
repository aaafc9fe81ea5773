//! Trait definition and types for point-in-polygon lookups.
//!
//! This module defines the [`PlaceLookup`] trait that every reverse-geocoding
//! backend implements, along with the request and response types of the
//! point-in-polygon API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LookupError;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Body of a `POST /api/point-in-polygon` request.
#[derive(Debug, Clone, Serialize)]
pub struct PointInPolygonRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Restrict results to places flagged as current. The index also carries
    /// deprecated and superseded records.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub is_current: Vec<i64>,
}

impl PointInPolygonRequest {
    /// Request for current places enclosing `coord`.
    pub fn current(coord: Coordinate) -> Self {
        Self {
            latitude: coord.latitude,
            longitude: coord.longitude,
            is_current: vec![1],
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// A place enclosing the queried coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Who's On First ID.
    #[serde(rename = "wof:id", default, deserialize_with = "string_or_number")]
    pub id: String,
    /// Who's On First ID of the parent place.
    #[serde(rename = "wof:parent_id", default, deserialize_with = "string_or_number")]
    pub parent_id: String,
    /// Display name.
    #[serde(rename = "wof:name", default)]
    pub name: String,
    /// Placetype (`country`, `region`, `locality`, ...).
    #[serde(rename = "wof:placetype", default)]
    pub placetype: String,
}

/// Body of a point-in-polygon response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlacesResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub places: Vec<Place>,
}

/// IDs are strings in the SPR output but some servers emit bare integers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Place>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Place>>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Lookup trait
// ---------------------------------------------------------------------------

/// Async trait for reverse-geocoding backends.
///
/// One call issues exactly one query. Implementations do not retry and do not
/// cache; a failure is returned to the caller, which decides what to do with
/// the photo.
///
/// Implementations are shared across concurrent lookups, so they must be
/// `Send + Sync`.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    /// Return every current place enclosing `coord`. Zero places is not an
    /// error.
    async fn lookup(&self, coord: Coordinate) -> Result<Vec<Place>, LookupError>;
}

#[async_trait]
impl<T: PlaceLookup + ?Sized> PlaceLookup for std::sync::Arc<T> {
    async fn lookup(&self, coord: Coordinate) -> Result<Vec<Place>, LookupError> {
        (**self).lookup(coord).await
    }
}
