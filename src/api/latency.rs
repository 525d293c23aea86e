//! In-memory histogram of chart request latency.
//! Covers filter, aggregation, rendering and PNG encoding.

use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Shared render latency stats. Values stored in microseconds.
pub struct LatencyStats {
    inner: Mutex<hdrhistogram::Histogram<u64>>,
}

/// Body of `GET /stats/latency`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyResponse {
    pub samples: u64,
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
}

impl LatencyStats {
    /// Tracks 1us to 10 minutes at 3 significant figures.
    pub fn new() -> Self {
        let histogram = hdrhistogram::Histogram::new_with_bounds(1, 600_000_000, 3)
            .expect("valid histogram bounds");
        Self {
            inner: Mutex::new(histogram),
        }
    }

    pub fn record(&self, d: Duration) {
        let us = d.as_micros().clamp(1, 600_000_000) as u64;
        if let Ok(mut h) = self.inner.lock() {
            let _ = h.record(us);
        }
    }

    pub fn len(&self) -> u64 {
        self.inner.lock().map(|h| h.len()).unwrap_or(0)
    }

    pub fn snapshot(&self) -> LatencyResponse {
        let Ok(h) = self.inner.lock() else {
            return LatencyResponse::default();
        };
        if h.len() == 0 {
            return LatencyResponse::default();
        }
        let ms = |q: f64| Some(h.value_at_quantile(q) as f64 / 1_000.0);
        LatencyResponse {
            samples: h.len(),
            p50_ms: ms(0.5),
            p95_ms: ms(0.95),
            p99_ms: ms(0.99),
        }
    }
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new()
    }
}
