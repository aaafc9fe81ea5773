//! Reverse geocoding via a point-in-polygon service.
//!
//! - [`lookup`] -- Trait definition and request/response types.
//! - [`client`] -- HTTP client for a Who's On First spatial server.

pub mod client;
pub mod lookup;

pub use client::PipClient;
pub use lookup::{Coordinate, Place, PlaceLookup, PlacesResponse, PointInPolygonRequest};
