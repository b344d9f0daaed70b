mod config;

use clap::Parser;
use config::{Config, IdentityStoreConfig};
use identity::{IdentityStore, MemoryStore};
use metrics_exporter_statsd::StatsdBuilder;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "avatard", about = "Federated avatar service")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, short, default_value = "avatard.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            process::exit(1);
        }
    };

    if let Some((host, port)) = config.statsd() {
        match StatsdBuilder::from(host, port).build(Some("avatard")) {
            Ok(recorder) => {
                if let Err(e) = metrics::set_global_recorder(recorder) {
                    tracing::warn!("failed to install metrics recorder: {e}");
                }
            }
            Err(e) => tracing::warn!("failed to set up statsd exporter: {e}"),
        }
    }

    let store: Arc<dyn IdentityStore> = match config.identity_store {
        IdentityStoreConfig::Memory => Arc::new(MemoryStore::new()),
    };

    tracing::info!(
        host = %config.server.listener.host,
        port = config.server.listener.port,
        "starting avatard"
    );

    if let Err(e) = server::run(config.server, store).await {
        eprintln!("Server error: {e}");
        process::exit(1);
    }
}
