//! Spendguard main entry point

use clap::Parser;
use spendguard_api::start_server;
use spendguard_config::Config;
use spendguard_core::Store;
use spendguard_fraud::HttpFraudClassifier;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "spendguard")]
#[command(version = "0.1.0")]
#[command(about = "A personal finance tracker with fraud screening", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = Config::load(args.config.clone())?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    )
    .init();

    log::info!(
        "Config loaded: snapshot={}, fraud service={} (enabled: {})",
        config.data.snapshot_file.display(),
        config.fraud.service_url,
        config.fraud.enable
    );

    let store = Arc::new(Store::open(config.data.snapshot_file.clone())?);
    let classifier = Arc::new(HttpFraudClassifier::new(
        &config.fraud.service_url,
        Duration::from_millis(config.fraud.timeout_ms),
    )?);

    let rt = Runtime::new()?;
    rt.block_on(async {
        start_server(config, store, classifier).await;
    });

    Ok(())
}
