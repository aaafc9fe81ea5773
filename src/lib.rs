//! flickr-pip - Reverse-geocode geotagged Flickr photos
//!
//! Pages of photo search results are pulled from the Flickr API, every
//! geotagged photo is looked up against a point-in-polygon service, and each
//! `(photo, place)` pair is streamed out as a row.
//!
//! This library crate exposes the pipeline for the binary and for
//! integration testing.

pub mod config;
pub mod enrich;
pub mod error;
pub mod page;
pub mod pip;
pub mod sink;
pub mod source;

pub use enrich::{EnrichOptions, Enricher, Mode, RunSummary};
pub use error::{DecodeError, Error, LookupError, Result, SourceError, WriteError};
pub use sink::{CsvSink, JsonLinesSink, OutputFormat, OutputRow, ResultSink};
pub use source::{Page, PageSource, VecSource};
