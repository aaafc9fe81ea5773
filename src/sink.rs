//! Tabular output.
//!
//! A [`ResultSink`] receives batches of joined `(photo, place)` rows and
//! serialises them onto an output stream. Sinks own their writer behind a
//! lock that is held for one whole batch, so batches from concurrent callers
//! never interleave, and every batch is flushed before `write_batch` returns.

use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::WriteError;
use crate::page::PhotoRecord;
use crate::pip::Place;

/// CSV header, written once before the first data row.
pub const CSV_HEADER: [&str; 6] = [
    "photo_id",
    "latitude",
    "longitude",
    "whosonfirst_id",
    "whosonfirst_name",
    "whosonfirst_placetype",
];

/// One `(photo, place)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    pub photo_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub place_id: String,
    pub place_name: String,
    pub placetype: String,
}

impl OutputRow {
    pub fn join(record: &PhotoRecord, place: &Place) -> Self {
        Self {
            photo_id: record.id,
            latitude: record.coordinate.latitude,
            longitude: record.coordinate.longitude,
            place_id: place.id.clone(),
            place_name: place.name.clone(),
            placetype: place.placetype.clone(),
        }
    }

    /// CSV fields. Coordinates use the shortest representation that
    /// round-trips to the same `f64`.
    fn csv_record(&self) -> [String; 6] {
        [
            self.photo_id.to_string(),
            self.latitude.to_string(),
            self.longitude.to_string(),
            self.place_id.clone(),
            self.place_name.clone(),
            self.placetype.clone(),
        ]
    }
}

/// Destination for output rows. Safe to share between concurrent writers.
pub trait ResultSink: Send + Sync {
    /// Write `rows` as one atomic, flushed batch. An empty batch writes
    /// nothing.
    fn write_batch(&self, rows: &[OutputRow]) -> Result<(), WriteError>;

    /// Data rows written so far.
    fn rows_written(&self) -> u64;
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

struct CsvState<W: Write> {
    writer: csv::Writer<W>,
    header_written: bool,
}

/// CSV sink with a lazily written header.
pub struct CsvSink<W: Write + Send> {
    state: Mutex<CsvState<W>>,
    rows: AtomicU64,
}

impl<W: Write + Send> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        Self {
            state: Mutex::new(CsvState {
                writer,
                header_written: false,
            }),
            rows: AtomicU64::new(0),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, WriteError> {
        self.state
            .into_inner()
            .writer
            .into_inner()
            .map_err(|e| WriteError::Io(e.into_error()))
    }
}

impl<W: Write + Send> ResultSink for CsvSink<W> {
    fn write_batch(&self, rows: &[OutputRow]) -> Result<(), WriteError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut state = self.state.lock();

        if !state.header_written {
            state.writer.write_record(CSV_HEADER)?;
            state.header_written = true;
        }

        for row in rows {
            state.writer.write_record(row.csv_record())?;
        }
        state.writer.flush()?;

        self.rows.fetch_add(rows.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    fn rows_written(&self) -> u64 {
        self.rows.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// JSON lines
// ---------------------------------------------------------------------------

/// One JSON object per row, no header.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
    rows: AtomicU64,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            rows: AtomicU64::new(0),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> ResultSink for JsonLinesSink<W> {
    fn write_batch(&self, rows: &[OutputRow]) -> Result<(), WriteError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut writer = self.writer.lock();
        for row in rows {
            serde_json::to_writer(&mut *writer, row)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        self.rows.fetch_add(rows.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    fn rows_written(&self) -> u64 {
        self.rows.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Format selection
// ---------------------------------------------------------------------------

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    #[serde(rename = "jsonl")]
    JsonLines,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "jsonl" | "json-lines" | "ndjson" => Ok(Self::JsonLines),
            other => Err(format!("unknown output format '{other}' (expected csv or jsonl)")),
        }
    }
}

/// Build a sink of the given format over `writer`.
pub fn open_sink<W>(format: OutputFormat, writer: W) -> Box<dyn ResultSink>
where
    W: Write + Send + 'static,
{
    match format {
        OutputFormat::Csv => Box::new(CsvSink::new(writer)),
        OutputFormat::JsonLines => Box::new(JsonLinesSink::new(writer)),
    }
}
