use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use flickr_pip::OutputFormat;

#[derive(Parser)]
#[command(name = "flickr-pip")]
#[command(
    author,
    version,
    about = "Reverse-geocode geotagged Flickr photos against a point-in-polygon service"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search Flickr and write one row per (photo, place) pair
    Run {
        /// Flickr client URI, e.g. flickr://api?api_key={KEY}
        #[arg(long)]
        client_uri: Option<String>,

        /// One or more {KEY}={VALUE} Flickr API parameters
        #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Enrich saved Flickr API responses, one page per file
    Replay {
        /// Page files, processed in the order given
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Look up a single coordinate and print the matching places as JSON
    Lookup {
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,

        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,

        /// Point-in-polygon endpoint URL
        #[arg(long)]
        pip_endpoint: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

/// Lookup and output options shared by `run` and `replay`.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Point-in-polygon endpoint URL
    #[arg(long)]
    pub pip_endpoint: Option<String>,

    /// Look up the photos of each page concurrently
    #[arg(long)]
    pub concurrent: bool,

    /// Maximum concurrent lookups per page (implies --concurrent)
    #[arg(long)]
    pub max_in_flight: Option<usize>,

    /// Per-lookup timeout in seconds
    #[arg(long)]
    pub lookup_timeout: Option<u64>,

    /// Output format: csv or jsonl
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Write rows to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Parse a single `KEY=VALUE` pair. The value may itself contain `=`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{s}'"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn key_val_parsing() {
        assert_eq!(
            parse_key_val("method=flickr.photos.search").unwrap(),
            ("method".to_string(), "flickr.photos.search".to_string())
        );
        assert_eq!(
            parse_key_val("bbox=-122.5,37.6,-122.3,37.8").unwrap().1,
            "-122.5,37.6,-122.3,37.8"
        );
        assert_eq!(parse_key_val("tags=a=b").unwrap().1, "a=b");
        assert_eq!(parse_key_val("has_geo=").unwrap().1, "");
        assert!(parse_key_val("has_geo").is_err());
        assert!(parse_key_val("=1").is_err());
    }

    #[test]
    fn run_collects_repeated_params() {
        let cli = Cli::try_parse_from([
            "flickr-pip",
            "run",
            "--client-uri",
            "flickr://api?api_key=k",
            "--param",
            "method=flickr.photos.search",
            "--param",
            "user_id=me",
            "--concurrent",
            "--format",
            "jsonl",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                client_uri,
                params,
                output,
            } => {
                assert_eq!(client_uri.as_deref(), Some("flickr://api?api_key=k"));
                assert_eq!(params.len(), 2);
                assert_eq!(params[1], ("user_id".to_string(), "me".to_string()));
                assert!(output.concurrent);
                assert_eq!(output.format, Some(OutputFormat::JsonLines));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn lookup_accepts_negative_longitude() {
        let cli = Cli::try_parse_from([
            "flickr-pip",
            "lookup",
            "--latitude",
            "37.6",
            "--longitude",
            "-122.4",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Lookup { longitude, .. } if longitude == -122.4
        ));
    }
}
