mod cli;

use flickr_pip::config::{self, Config, Scheduling};
use flickr_pip::pip::{Coordinate, PipClient, PlaceLookup};
use flickr_pip::sink::open_sink;
use flickr_pip::{Enricher, PageSource, RunSummary, VecSource};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, OutputArgs};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag.
    // Logs go to stderr; stdout carries the output rows.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "flickr_pip=debug,flickr_api=debug".to_string()
        } else {
            "flickr_pip=info,flickr_api=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            client_uri,
            params,
            output,
        } => {
            let config = resolve_config(cli.config.as_deref(), &output)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_search(config, client_uri, params, &output))
        }
        Commands::Replay { files, output } => {
            let config = resolve_config(cli.config.as_deref(), &output)?;
            let mut source = VecSource::from_files(&files).context("Failed to read page files")?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(enrich(&config, &mut source, output.output.as_deref()))
                .map(|_| ())
        }
        Commands::Lookup {
            latitude,
            longitude,
            pip_endpoint,
        } => {
            let output = OutputArgs {
                pip_endpoint,
                ..OutputArgs::default()
            };
            let config = resolve_config(cli.config.as_deref(), &output)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(lookup(&config, Coordinate::new(latitude, longitude)))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("flickr-pip {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Load the config file and apply command-line overrides.
fn resolve_config(config_path: Option<&Path>, args: &OutputArgs) -> Result<Config> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(ref endpoint) = args.pip_endpoint {
        config.pip.endpoint = endpoint.clone();
    }
    if args.concurrent {
        config.run.mode = Scheduling::Concurrent;
    }
    if let Some(max) = args.max_in_flight {
        config.run.mode = Scheduling::Concurrent;
        config.run.max_in_flight = max;
    }
    if let Some(secs) = args.lookup_timeout {
        config.run.lookup_timeout_secs = secs;
    }
    if let Some(format) = args.format {
        config.run.format = format;
    }

    config::validate_config(&config)?;
    Ok(config)
}

async fn run_search(
    config: Config,
    client_uri: Option<String>,
    params: Vec<(String, String)>,
    output: &OutputArgs,
) -> Result<()> {
    let client_uri = client_uri
        .or_else(|| config.flickr.client_uri.clone())
        .context("No Flickr client URI given (use --client-uri or set flickr.client_uri)")?;

    // Command-line parameters override config file parameters.
    let mut merged: BTreeMap<String, String> = config.flickr.params.clone();
    merged.extend(params);
    if !merged.contains_key("method") {
        anyhow::bail!("No Flickr API method given (use --param method=...)");
    }

    let client =
        flickr_api::FlickrClient::from_uri(&client_uri).context("Failed to create API client")?;
    let mut source = flickr_api::Paginator::new(client, merged.into_iter().collect());

    enrich(&config, &mut source, output.output.as_deref()).await?;
    Ok(())
}

async fn enrich(
    config: &Config,
    source: &mut dyn PageSource,
    output: Option<&Path>,
) -> Result<RunSummary> {
    let pip = PipClient::new(&config.pip).context("Failed to create PIP client")?;
    let enricher = Enricher::new(pip, config.run.enrich_options());

    let writer: Box<dyn Write + Send> = match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            Box::new(std::io::BufWriter::new(file))
        }
        None => Box::new(std::io::stdout()),
    };
    let sink = open_sink(config.run.format, writer);

    let summary = enricher
        .run(source, sink.as_ref())
        .await
        .context("Failed to write method results")?;

    Ok(summary)
}

async fn lookup(config: &Config, coord: Coordinate) -> Result<()> {
    let pip = PipClient::new(&config.pip).context("Failed to create PIP client")?;
    let places = pip.lookup(coord).await.with_context(|| {
        format!(
            "Unable to determine location for {},{}",
            coord.latitude, coord.longitude
        )
    })?;

    println!("{}", serde_json::to_string_pretty(&places)?);
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  PIP endpoint: {}", config.pip.endpoint);
            println!("  Mode: {:?}", config.run.mode);
            println!("  Format: {:?}", config.run.format);
            println!(
                "  Client URI: {}",
                if config.flickr.client_uri.is_some() {
                    "set"
                } else {
                    "not set"
                }
            );
            println!("  Parameters: {}", config.flickr.params.len());
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("Default config:");
            println!("  PIP endpoint: {}", config.pip.endpoint);
        }
    }

    Ok(())
}
