mod config;
mod donkey;
mod hubs;
mod models;
mod output;
mod pipeline;

use std::path::PathBuf;

use tracing::{error, info};

use config::Config;
use donkey::client::{HttpTransport, HubClient};
use output::HubWriter;
use pipeline::Pipeline;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing (structured logging)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("donkey_hubs=info")),
        )
        .init();

    info!("Starting Donkey Republic hub data processing");

    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Config: {} cities, output {} ({:?}), timeout {}s, city delay {}ms",
        config.cities.len(),
        config.output_dir.display(),
        config.output_format,
        config.fetch.request_timeout_secs,
        config.fetch.city_delay_ms
    );

    let transport = match HttpTransport::new(&config.fetch.user_agent, config.fetch.request_timeout()) {
        Ok(t) => t,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let pipeline = Pipeline::new(
        HubClient::new(transport),
        HubWriter::new(&config.output_dir, config.output_format),
        config.fetch.city_delay(),
    );

    match pipeline.run(&config.cities).await {
        Ok(summary) => {
            info!(
                "Total hubs processed: {} ({} of {} cities written)",
                summary.total_hubs, summary.files_written, summary.cities
            );
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Load `config.json` if one exists, otherwise run with the built-in registry.
fn load_config() -> Result<Config, config::ConfigError> {
    match find_config_path() {
        Some(path) => {
            info!("Config file: {}", path.display());
            Config::load(&path)
        }
        None => {
            info!("No config.json found, using built-in city registry");
            Ok(Config::default())
        }
    }
}

/// Find the config.json file (check CWD, then parent directory).
fn find_config_path() -> Option<PathBuf> {
    let candidates = [
        PathBuf::from("config.json"),
        PathBuf::from("../config.json"),
    ];
    candidates.into_iter().find(|path| path.exists())
}
