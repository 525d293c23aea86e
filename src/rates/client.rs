use std::collections::HashMap;
use std::time::Duration;

use dashmap::DashMap;
use serde::Deserialize;
use tracing::{debug, warn};

use super::RateLookup;
use crate::config::{RATE_LOOKUP_TIMEOUT_SECS, REPORTING_CURRENCY};
use crate::error::Result;

/// Body of `GET <provider>/<api_key>/latest/<CODE>`.
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    conversion_rates: HashMap<String, f64>,
}

/// Remote exchange-rate client with a per-process memo.
///
/// Every currency code is looked up at most once per client; failures are
/// memoised as `None` so a bad code never triggers a second request.
pub struct RateClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    cache: DashMap<String, Option<f64>>,
}

impl RateClient {
    pub fn new(base_url: &str, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(RATE_LOOKUP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            cache: DashMap::new(),
        })
    }

    /// Number of distinct codes looked up so far (hits and misses).
    pub fn cached_codes(&self) -> usize {
        self.cache.len()
    }

    async fn fetch_usd_rate(&self, code: &str) -> Option<f64> {
        let url = format!("{}/{}/latest/{}", self.base_url, self.api_key, code);

        let resp = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("[RATES] HTTP error for {code}: {e}");
                return None;
            }
        };
        if !resp.status().is_success() {
            warn!("[RATES] {code}: provider returned {}", resp.status());
            return None;
        }

        let body: LatestRatesResponse = match resp.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!("[RATES] {code}: undecodable response: {e}");
                return None;
            }
        };
        if body.result != "success" {
            warn!(
                "[RATES] {code}: error fetching exchange rate: {}",
                body.error_type.as_deref().unwrap_or("Unknown error")
            );
            return None;
        }

        let rate = body.conversion_rates.get(REPORTING_CURRENCY).copied();
        if rate.is_none() {
            warn!("[RATES] {code}: {REPORTING_CURRENCY} rate not found in response");
        }
        rate
    }
}

impl RateLookup for RateClient {
    async fn get_rate(&self, currency: &str) -> Option<f64> {
        let code = normalize_code(currency)?;
        if let Some(hit) = self.cache.get(&code) {
            return *hit;
        }

        debug!("[RATES] cache miss for {code}");
        let rate = self.fetch_usd_rate(&code).await;
        self.cache.insert(code, rate);
        rate
    }
}

/// Upper-cased alphabetic code, or `None` for input that can't be a currency.
pub fn normalize_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(code)
}
