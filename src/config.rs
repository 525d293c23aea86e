use crate::error::{AppError, Result};

pub const EXCHANGE_API_URL: &str = "https://v6.exchangerate-api.com/v6";

/// Every converted amount is expressed in this currency.
pub const REPORTING_CURRENCY: &str = "USD";

pub const DEFAULT_API_PORT: u16 = 6969;
pub const DEFAULT_DATASET_PATH: &str = "processed_data.csv";
pub const DEFAULT_RAW_DATASET_PATH: &str = "synthetic_fraud_data.csv";
pub const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

/// Rate lookup HTTP timeout (seconds). A timeout is treated as a failed lookup.
pub const RATE_LOOKUP_TIMEOUT_SECS: u64 = 30;

/// Enrichment progress is logged once per this many rows.
pub const ENRICH_PROGRESS_EVERY: usize = 10_000;

/// Categories kept per country in the category popularity chart.
pub const TOP_CATEGORIES_PER_COUNTRY: usize = 5;

/// Dashboard service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub dataset_path: String,
    pub api_port: u16,
    pub log_level: String,
    pub chart_width: u32,
    pub chart_height: u32,
    /// TrueType font used for chart text (CHART_FONT_PATH)
    pub chart_font_path: String,
    /// Optional here: without it /convert_to_usd rejects requests.
    pub exchange_api_key: Option<String>,
    pub exchange_api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            dataset_path: var("DATASET_PATH").unwrap_or_else(|| DEFAULT_DATASET_PATH.to_string()),
            api_port: var("API_PORT")
                .unwrap_or_else(|| DEFAULT_API_PORT.to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            chart_width: parse_dimension(&var, "CHART_WIDTH", 1000)?,
            chart_height: parse_dimension(&var, "CHART_HEIGHT", 600)?,
            chart_font_path: var("CHART_FONT_PATH").unwrap_or_else(|| DEFAULT_FONT_PATH.to_string()),
            exchange_api_key: var("EXCHANGERATE_API_KEY").filter(|k| !k.trim().is_empty()),
            exchange_api_url: var("EXCHANGERATE_API_URL")
                .unwrap_or_else(|| EXCHANGE_API_URL.to_string()),
        })
    }
}

/// Enrichment job configuration. The API key is mandatory.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    pub raw_dataset_path: String,
    pub processed_dataset_path: String,
    pub log_level: String,
    pub exchange_api_key: String,
    pub exchange_api_url: String,
}

impl EnrichConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let exchange_api_key = var("EXCHANGERATE_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config(
                    "Exchange rate API key not found in environment variables. Use EXCHANGERATE_API_KEY."
                        .to_string(),
                )
            })?;

        Ok(Self {
            raw_dataset_path: var("RAW_DATASET_PATH")
                .unwrap_or_else(|| DEFAULT_RAW_DATASET_PATH.to_string()),
            processed_dataset_path: var("PROCESSED_DATASET_PATH")
                .unwrap_or_else(|| DEFAULT_DATASET_PATH.to_string()),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            exchange_api_key,
            exchange_api_url: var("EXCHANGERATE_API_URL")
                .unwrap_or_else(|| EXCHANGE_API_URL.to_string()),
        })
    }
}

fn parse_dimension(var: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> Result<u32> {
    match var(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(v) if (100..=4000).contains(&v) => Ok(v),
            _ => Err(AppError::Config(format!("{key} must be a pixel size between 100 and 4000"))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn service_defaults() {
        let cfg = Config::from_lookup(vars(&[])).unwrap();
        assert_eq!(cfg.api_port, 6969);
        assert_eq!(cfg.dataset_path, "processed_data.csv");
        assert_eq!((cfg.chart_width, cfg.chart_height), (1000, 600));
        assert!(cfg.exchange_api_key.is_none());
        assert_eq!(cfg.exchange_api_url, EXCHANGE_API_URL);
    }

    #[test]
    fn service_rejects_bad_port_and_size() {
        assert!(matches!(
            Config::from_lookup(vars(&[("API_PORT", "http")])),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            Config::from_lookup(vars(&[("CHART_WIDTH", "12")])),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn blank_service_key_is_treated_as_unset() {
        let cfg = Config::from_lookup(vars(&[("EXCHANGERATE_API_KEY", "  ")])).unwrap();
        assert!(cfg.exchange_api_key.is_none());
    }

    #[test]
    fn enrich_requires_api_key() {
        let err = EnrichConfig::from_lookup(vars(&[])).unwrap_err();
        assert!(err.to_string().contains("EXCHANGERATE_API_KEY"));

        let cfg = EnrichConfig::from_lookup(vars(&[
            ("EXCHANGERATE_API_KEY", "k123"),
            ("RAW_DATASET_PATH", "raw.csv"),
        ]))
        .unwrap();
        assert_eq!(cfg.exchange_api_key, "k123");
        assert_eq!(cfg.raw_dataset_path, "raw.csv");
        assert_eq!(cfg.processed_dataset_path, "processed_data.csv");
    }
}
