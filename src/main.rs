use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use txn_dashboard::api::{router, ApiState};
use txn_dashboard::charts::{self, ChartRenderer};
use txn_dashboard::config::Config;
use txn_dashboard::dataset::Dataset;
use txn_dashboard::error::Result;
use txn_dashboard::rates::RateClient;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
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

async fn run(cfg: Config) -> Result<()> {
    // --- Dataset: loaded once, read-only afterwards ---
    let dataset = Dataset::load(&cfg.dataset_path)?;
    match dataset.date_bounds() {
        Some((lo, hi)) => info!(
            "Loaded {} transactions from {} ({lo} to {hi})",
            dataset.len(),
            cfg.dataset_path
        ),
        None => warn!(
            "Loaded {} transactions from {} but none carry a usable timestamp",
            dataset.len(),
            cfg.dataset_path
        ),
    }

    // --- Chart text ---
    let labels = match charts::register_font(&cfg.chart_font_path) {
        Ok(()) => true,
        Err(e) => {
            warn!("Chart font unavailable, rendering without text: {e}");
            false
        }
    };
    let renderer = ChartRenderer::new(cfg.chart_width, cfg.chart_height, labels);

    // --- Optional conversion endpoint ---
    let rates = match &cfg.exchange_api_key {
        Some(key) => Some(RateClient::new(&cfg.exchange_api_url, key.clone())?),
        None => {
            info!("EXCHANGERATE_API_KEY not set: /convert_to_usd will reject requests");
            None
        }
    };

    // --- HTTP API server ---
    let app = router(ApiState::new(dataset, renderer, rates));
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
