use serde::Deserialize;
use server::config::Config as ServerConfig;
use std::fs::File;

#[derive(Deserialize)]
struct MetricsConfig {
    statsd_host: String,
    statsd_port: u16,
}

#[derive(Deserialize)]
struct CommonConfig {
    metrics: Option<MetricsConfig>,
}

/// Which identity-store backend the process talks to. The production
/// store lives behind the account service; the in-memory store is for
/// development and tests.
#[derive(Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum IdentityStoreConfig {
    #[default]
    Memory,
}

#[derive(Deserialize)]
pub struct Config {
    #[serde(flatten)]
    common: CommonConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub identity_store: IdentityStoreConfig,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        config.server.validate()?;

        Ok(config)
    }

    pub fn statsd(&self) -> Option<(&str, u16)> {
        self.common
            .metrics
            .as_ref()
            .map(|metrics| (metrics.statsd_host.as_str(), metrics.statsd_port))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Validation(#[from] server::config::ValidationError),
}
