use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::health::{HealthResponse, HealthState};
use super::latency::{LatencyResponse, LatencyStats};
use crate::charts::{render_chart, to_base64, ChartRenderer};
use crate::config::REPORTING_CURRENCY;
use crate::dataset::{DateRange, Dataset};
use crate::error::{AppError, Result};
use crate::rates::{normalize_code, RateClient, RateLookup};
use crate::types::{
    ChartKind, ConvertRequest, ConvertResponse, DatesRangeResponse, ImageResponse, MessageResponse,
};

#[derive(Clone)]
pub struct ApiState {
    pub dataset: Arc<Dataset>,
    pub renderer: ChartRenderer,
    /// `None` when the service runs without an exchange-rate key.
    pub rates: Option<Arc<RateClient>>,
    pub latency: Arc<LatencyStats>,
    pub health: Arc<HealthState>,
}

impl ApiState {
    pub fn new(dataset: Dataset, renderer: ChartRenderer, rates: Option<RateClient>) -> Self {
        let health = Arc::new(HealthState::new(dataset.len()));
        Self {
            dataset: Arc::new(dataset),
            renderer,
            rates: rates.map(Arc::new),
            latency: Arc::new(LatencyStats::new()),
            health,
        }
    }
}

pub fn router(state: ApiState) -> Router {
    let mut router = Router::new()
        .route("/", get(get_root))
        .route("/dates_range", get(get_dates_range))
        .route("/convert_to_usd", post(convert_to_usd))
        .route("/health", get(get_health))
        .route("/stats/latency", get(get_stats_latency));

    for kind in ChartKind::ALL {
        router = router.route(
            &kind.path(),
            get(
                move |State(state): State<ApiState>,
                      query: std::result::Result<Query<RangeQuery>, QueryRejection>| {
                    get_chart(kind, state, query)
                },
            ),
        );
    }

    router.with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl RangeQuery {
    fn range(&self) -> Result<DateRange> {
        let start = self
            .start_date
            .as_deref()
            .ok_or_else(|| AppError::InvalidDate("start_date is required".to_string()))?;
        let end = self
            .end_date
            .as_deref()
            .ok_or_else(|| AppError::InvalidDate("end_date is required".to_string()))?;
        DateRange::parse(start, end)
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to the Transaction Analysis API".to_string(),
    })
}

async fn get_dates_range(State(state): State<ApiState>) -> Result<Json<DatesRangeResponse>> {
    let (min, max) = state
        .dataset
        .date_bounds()
        .ok_or_else(|| AppError::Dataset("no dated transactions loaded".to_string()))?;
    Ok(Json(DatesRangeResponse {
        min_date: min.format("%Y-%m-%d").to_string(),
        max_date: max.format("%Y-%m-%d").to_string(),
    }))
}

#[instrument(name = "chart", skip_all, fields(chart = %kind))]
async fn get_chart(
    kind: ChartKind,
    state: ApiState,
    query: std::result::Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<ImageResponse>> {
    let range = query
        .map_err(|e| AppError::InvalidDate(e.body_text()))
        .and_then(|Query(q)| q.range())
        .map_err(|e| {
            warn!("[API] {kind}: {e}");
            e
        })?;

    let started = Instant::now();
    let dataset = Arc::clone(&state.dataset);
    let renderer = state.renderer;
    let rendered = tokio::task::spawn_blocking(move || render_chart(kind, &dataset, &range, &renderer))
        .await
        .map_err(|e| AppError::Render(format!("render task failed: {e}")))
        .and_then(|r| r);

    match rendered {
        Ok(png) => {
            let elapsed = started.elapsed();
            state.latency.record(elapsed);
            state.health.inc_charts_rendered();
            debug!("[API] {kind} rendered {} bytes in {elapsed:?}", png.len());
            Ok(Json(ImageResponse { image: to_base64(&png) }))
        }
        Err(e) => {
            state.health.inc_chart_errors();
            warn!("[API] {kind} failed: {e}");
            Err(e)
        }
    }
}

async fn convert_to_usd(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<Json<ConvertResponse>> {
    let Json(req) = payload.map_err(|e| AppError::Conversion(e.body_text()))?;
    let rates = state.rates.as_ref().ok_or_else(|| {
        AppError::Conversion("currency conversion is not configured on this server".to_string())
    })?;

    if !req.amount.is_finite() || req.amount <= 0.0 {
        return Err(AppError::Conversion("amount must be a positive number".to_string()));
    }
    let code = normalize_code(&req.from_currency).ok_or_else(|| {
        AppError::Conversion(format!("'{}' is not a currency code", req.from_currency))
    })?;

    let rate = rates.get_rate(&code).await.ok_or_else(|| {
        AppError::Conversion(format!("failed to fetch {code} to {REPORTING_CURRENCY} exchange rate"))
    })?;
    state.health.inc_conversions();

    Ok(Json(ConvertResponse {
        amount_usd: req.amount * rate,
        rate,
    }))
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(state.health.snapshot(state.rates.is_some()))
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencyResponse> {
    Json(state.latency.snapshot())
}
