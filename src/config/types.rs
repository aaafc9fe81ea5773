use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::enrich::{EnrichOptions, Mode, DEFAULT_MAX_IN_FLIGHT};
use crate::sink::OutputFormat;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub pip: PipConfig,

    #[serde(default)]
    pub flickr: FlickrConfig,

    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PipConfig {
    /// Point-in-polygon endpoint URL
    #[serde(default = "default_pip_endpoint")]
    pub endpoint: String,

    /// HTTP client timeout in seconds (the per-lookup deadline is `run.lookup_timeout_secs`)
    #[serde(default = "default_pip_timeout")]
    pub timeout_secs: u64,
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            endpoint: default_pip_endpoint(),
            timeout_secs: default_pip_timeout(),
        }
    }
}

fn default_pip_endpoint() -> String {
    "http://localhost:8080/api/point-in-polygon".to_string()
}

fn default_pip_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FlickrConfig {
    /// Client URI, e.g. `flickr://api?api_key=...`
    #[serde(default)]
    pub client_uri: Option<String>,

    /// API method parameters passed through verbatim (`method`, `user_id`, `bbox`, ...)
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheduling {
    #[default]
    Sequential,
    Concurrent,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunConfig {
    #[serde(default)]
    pub mode: Scheduling,

    /// Upper bound on concurrent lookups within a page (concurrent mode only)
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Deadline for a single lookup, in seconds
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_secs: u64,

    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: Scheduling::default(),
            max_in_flight: default_max_in_flight(),
            lookup_timeout_secs: default_lookup_timeout(),
            format: OutputFormat::default(),
        }
    }
}

impl RunConfig {
    pub fn enrich_options(&self) -> EnrichOptions {
        let mode = match self.mode {
            Scheduling::Sequential => Mode::Sequential,
            Scheduling::Concurrent => Mode::Concurrent {
                max_in_flight: self.max_in_flight,
            },
        };

        EnrichOptions {
            mode,
            lookup_timeout: Duration::from_secs(self.lookup_timeout_secs),
        }
    }
}

fn default_max_in_flight() -> usize {
    DEFAULT_MAX_IN_FLIGHT
}

fn default_lookup_timeout() -> u64 {
    10
}
