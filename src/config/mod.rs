mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./flickr-pip.toml",
        "~/.config/flickr-pip/config.toml",
        "/etc/flickr-pip/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.pip.endpoint.is_empty() {
        anyhow::bail!("PIP endpoint cannot be empty");
    }
    reqwest::Url::parse(&config.pip.endpoint)
        .with_context(|| format!("Invalid PIP endpoint: {}", config.pip.endpoint))?;

    if config.pip.timeout_secs == 0 {
        anyhow::bail!("PIP timeout cannot be 0");
    }

    if config.run.lookup_timeout_secs == 0 {
        anyhow::bail!("Lookup timeout cannot be 0");
    }

    if config.run.max_in_flight == 0 {
        anyhow::bail!("max_in_flight must be at least 1");
    }

    if let Some(uri) = &config.flickr.client_uri {
        flickr_api::ClientUri::parse(uri).context("Invalid Flickr client URI")?;
    }

    if config.flickr.params.contains_key("api_key") {
        tracing::warn!("flickr.params.api_key is ignored, set it in client_uri instead");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::Mode;
    use crate::sink::OutputFormat;
    use std::time::Duration;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.pip.endpoint, "http://localhost:8080/api/point-in-polygon");
        assert_eq!(config.run.mode, Scheduling::Sequential);
        assert_eq!(config.run.format, OutputFormat::Csv);

        let options = config.run.enrich_options();
        assert_eq!(options.mode, Mode::Sequential);
        assert_eq!(options.lookup_timeout, Duration::from_secs(10));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [pip]
            endpoint = "http://pip.internal:9000/api/point-in-polygon"
            timeout_secs = 5

            [flickr]
            client_uri = "flickr://api?api_key=abc"

            [flickr.params]
            method = "flickr.photos.search"
            user_id = "49487266@N07"
            has_geo = "1"
            extras = "geo"

            [run]
            mode = "concurrent"
            max_in_flight = 4
            lookup_timeout_secs = 3
            format = "jsonl"
            "#,
        )
        .unwrap();

        assert!(validate_config(&config).is_ok());
        assert_eq!(config.pip.timeout_secs, 5);
        assert_eq!(config.flickr.params.get("extras").map(String::as_str), Some("geo"));
        assert_eq!(config.run.format, OutputFormat::JsonLines);
        assert_eq!(
            config.run.enrich_options().mode,
            Mode::Concurrent { max_in_flight: 4 }
        );
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: Config = toml::from_str("[run]\nmode = \"concurrent\"\n").unwrap();
        assert_eq!(config.pip, PipConfig::default());
        assert_eq!(config.run.max_in_flight, crate::enrich::DEFAULT_MAX_IN_FLIGHT);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        config.run.max_in_flight = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.pip.endpoint = "not a url".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.run.lookup_timeout_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.flickr.client_uri = Some("flickr://api".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flickr-pip.toml");
        std::fs::write(&path, "[pip]\nendpoint = \"http://127.0.0.1:8080/api/point-in-polygon\"\n").unwrap();

        let config = load_config_or_default(Some(&path)).unwrap();
        assert_eq!(config.pip.endpoint, "http://127.0.0.1:8080/api/point-in-polygon");
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(load_config(Path::new("/nonexistent/flickr-pip.toml")).is_err());
    }

    #[test]
    fn load_unknown_mode_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[run]\nmode = \"parallel\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
