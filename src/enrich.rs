//! Enrichment orchestration.
//!
//! [`Enricher`] drives a [`PageSource`] to exhaustion. For each page it
//! decodes the photo records, looks every record up against a
//! [`PlaceLookup`], joins the places onto the record and hands the rows to a
//! [`ResultSink`]. The next page is only requested once every row of the
//! current page has been written.
//!
//! Failure policy:
//!
//! - A photo without coordinates, or whose lookup fails or times out, is
//!   skipped and the run continues.
//! - A page that cannot be decoded, a failed write, or a failed page fetch
//!   ends the run with an [`Error`](crate::Error).

use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{LookupError, Result};
use crate::page::{decode_page, DecodedPage, PhotoRecord};
use crate::pip::PlaceLookup;
use crate::sink::{OutputRow, ResultSink};
use crate::source::PageSource;

/// Default per-lookup deadline.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on concurrent lookups within a page.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// How lookups within a page are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// One lookup at a time; each photo's rows are written and flushed as
    /// soon as its lookup returns.
    #[default]
    Sequential,
    /// Up to `max_in_flight` lookups at once; the page's rows are written as
    /// a single batch, in decode order, once all of its lookups are done.
    Concurrent { max_in_flight: usize },
}

/// Orchestrator options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOptions {
    pub mode: Mode,
    pub lookup_timeout: Duration,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Sequential,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub pages: u32,
    /// Records decoded with usable coordinates.
    pub photos: u64,
    /// Entries dropped by the decoder.
    pub skipped: u64,
    pub lookups_failed: u64,
    pub rows: u64,
}

/// Page-by-page enrichment driver.
pub struct Enricher<L> {
    lookup: L,
    options: EnrichOptions,
}

impl<L: PlaceLookup> Enricher<L> {
    pub fn new(lookup: L, options: EnrichOptions) -> Self {
        Self { lookup, options }
    }

    pub fn options(&self) -> &EnrichOptions {
        &self.options
    }

    /// Enrich every page of `source` into `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Source`](crate::Error::Source),
    /// [`Error::Decode`](crate::Error::Decode) or
    /// [`Error::Write`](crate::Error::Write). Lookup failures are logged and
    /// counted in the summary instead.
    pub async fn run(
        &self,
        source: &mut dyn PageSource,
        sink: &dyn ResultSink,
    ) -> Result<RunSummary> {
        info!(
            mode = ?self.options.mode,
            lookup_timeout = ?self.options.lookup_timeout,
            "Starting enrichment run"
        );

        let mut summary = RunSummary::default();

        while let Some(page) = source.next_page().await? {
            let decoded = decode_page(page.number, &page.body)?;

            summary.pages += 1;
            summary.photos += decoded.records.len() as u64;
            summary.skipped += decoded.skipped as u64;

            match self.options.mode {
                Mode::Sequential => self.enrich_sequential(&decoded, sink, &mut summary).await?,
                Mode::Concurrent { max_in_flight } => {
                    self.enrich_concurrent(&decoded, max_in_flight, sink, &mut summary)
                        .await?
                }
            }
        }

        info!(
            pages = summary.pages,
            photos = summary.photos,
            skipped = summary.skipped,
            lookups_failed = summary.lookups_failed,
            rows = summary.rows,
            "Enrichment run complete"
        );

        Ok(summary)
    }

    async fn enrich_sequential(
        &self,
        page: &DecodedPage,
        sink: &dyn ResultSink,
        summary: &mut RunSummary,
    ) -> Result<()> {
        for record in &page.records {
            match self.lookup_record(record).await {
                Ok(rows) => {
                    sink.write_batch(&rows)?;
                    summary.rows += rows.len() as u64;
                }
                Err(e) => {
                    report_failure(page.number, record, &e);
                    summary.lookups_failed += 1;
                }
            }
        }
        Ok(())
    }

    async fn enrich_concurrent(
        &self,
        page: &DecodedPage,
        max_in_flight: usize,
        sink: &dyn ResultSink,
        summary: &mut RunSummary,
    ) -> Result<()> {
        // `buffered` yields in input order regardless of completion order.
        let results: Vec<_> = stream::iter(&page.records)
            .map(|record| self.lookup_record(record))
            .buffered(max_in_flight.max(1))
            .collect()
            .await;

        let mut batch = Vec::new();
        for (record, result) in page.records.iter().zip(results) {
            match result {
                Ok(rows) => batch.extend(rows),
                Err(e) => {
                    report_failure(page.number, record, &e);
                    summary.lookups_failed += 1;
                }
            }
        }

        sink.write_batch(&batch)?;
        summary.rows += batch.len() as u64;
        Ok(())
    }

    async fn lookup_record(
        &self,
        record: &PhotoRecord,
    ) -> std::result::Result<Vec<OutputRow>, LookupError> {
        let deadline = self.options.lookup_timeout;
        let places = tokio::time::timeout(deadline, self.lookup.lookup(record.coordinate))
            .await
            .map_err(|_| LookupError::Timeout(deadline))??;

        debug!(photo_id = record.id, places = places.len(), "Joined places");

        Ok(places
            .iter()
            .map(|place| OutputRow::join(record, place))
            .collect())
    }
}

fn report_failure(page: u32, record: &PhotoRecord, err: &LookupError) {
    warn!(
        page,
        photo_id = record.id,
        latitude = record.coordinate.latitude,
        longitude = record.coordinate.longitude,
        error = %err,
        "Unable to determine location for photo, skipping"
    );
}
