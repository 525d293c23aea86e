//! Shared counters for the /health endpoint.
//! Updated by the chart and conversion handlers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Service counters. Handlers write, /health reads.
pub struct HealthState {
    started: Instant,
    dataset_rows: AtomicU64,
    charts_rendered: AtomicU64,
    chart_errors: AtomicU64,
    conversions: AtomicU64,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub dataset_rows: u64,
    pub charts_rendered: u64,
    pub chart_errors: u64,
    pub conversions: u64,
    pub conversion_enabled: bool,
}

impl HealthState {
    pub fn new(dataset_rows: usize) -> Self {
        Self {
            started: Instant::now(),
            dataset_rows: AtomicU64::new(dataset_rows as u64),
            charts_rendered: AtomicU64::new(0),
            chart_errors: AtomicU64::new(0),
            conversions: AtomicU64::new(0),
        }
    }

    pub fn inc_charts_rendered(&self) {
        self.charts_rendered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_chart_errors(&self) {
        self.chart_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_conversions(&self) {
        self.conversions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn charts_rendered(&self) -> u64 {
        self.charts_rendered.load(Ordering::Relaxed)
    }

    pub fn chart_errors(&self) -> u64 {
        self.chart_errors.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self, conversion_enabled: bool) -> HealthResponse {
        HealthResponse {
            status: "ok".to_string(),
            uptime_secs: self.started.elapsed().as_secs(),
            dataset_rows: self.dataset_rows.load(Ordering::Relaxed),
            charts_rendered: self.charts_rendered(),
            chart_errors: self.chart_errors(),
            conversions: self.conversions.load(Ordering::Relaxed),
            conversion_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_snapshot() {
        let h = HealthState::new(42);
        h.inc_charts_rendered();
        h.inc_charts_rendered();
        h.inc_chart_errors();
        let s = h.snapshot(false);
        assert_eq!(s.dataset_rows, 42);
        assert_eq!((s.charts_rendered, s.chart_errors, s.conversions), (2, 1, 0));
        assert!(!s.conversion_enabled);
    }
}
