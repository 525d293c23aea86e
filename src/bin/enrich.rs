use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use txn_dashboard::config::EnrichConfig;
use txn_dashboard::enrich;
use txn_dashboard::error::Result;
use txn_dashboard::rates::RateClient;

#[tokio::main]
async fn main() {
    let cfg = match EnrichConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: EnrichConfig) -> Result<()> {
    let rates = RateClient::new(&cfg.exchange_api_url, cfg.exchange_api_key.clone())?;
    let summary = enrich::run(&cfg, &rates).await?;

    info!(
        "Enrichment complete: {} rows ({} converted, {} without rate) across {} currencies, {} rate lookups",
        summary.rows,
        summary.converted,
        summary.unconverted,
        summary.currencies,
        rates.cached_codes(),
    );
    if summary.unconverted > 0 {
        warn!("{} rows written with an empty amount_usd", summary.unconverted);
    }
    info!("Processed data saved to {}", cfg.processed_dataset_path);
    Ok(())
}
