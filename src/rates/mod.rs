//! Exchange-rate lookups into the reporting currency.

pub mod client;

use std::collections::HashMap;

pub use client::{normalize_code, RateClient};

/// Source of "one unit of `currency` in USD" multipliers.
///
/// `None` means the amount could not be converted; callers must not retry.
#[allow(async_fn_in_trait)]
pub trait RateLookup {
    async fn get_rate(&self, currency: &str) -> Option<f64>;
}

/// Fixed table, keyed by upper-case code. Used for offline runs and tests.
impl RateLookup for HashMap<String, f64> {
    async fn get_rate(&self, currency: &str) -> Option<f64> {
        let code = normalize_code(currency)?;
        self.get(&code).copied()
    }
}
