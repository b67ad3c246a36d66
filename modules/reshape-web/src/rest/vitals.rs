use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use reshape_common::vitals::{summarize, Metric, Rating, TimeRange, VitalsFilter, VitalsReport};
use reshape_common::ReshapeError;

use super::json_error;
use crate::AppState;

pub const DEFAULT_TIME_RANGE: &str = "24h";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsQuery {
    metric: Option<String>,
    time_range: Option<String>,
}

/// Accepts the raw body so `sendBeacon` posts without a JSON content type still parse.
pub async fn api_vitals_record(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    let report: VitalsReport = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            return json_error(StatusCode::BAD_REQUEST, format!("Invalid vitals payload: {e}"));
        }
    };

    let entry = match report.into_entry(Utc::now()) {
        Ok(entry) => entry,
        Err(ReshapeError::Validation(message)) => return json_error(StatusCode::BAD_REQUEST, message),
        Err(e) => return json_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    if entry.rating == Rating::Poor {
        warn!(
            metric = entry.metric.as_str(),
            value = entry.value,
            url = entry.url.as_deref().unwrap_or(""),
            "Poor web vitals sample"
        );
    }

    match state.vitals.record(entry).await {
        Ok(()) => Json(serde_json::json!({ "success": true })).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to record vitals");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process vitals")
        }
    }
}

pub async fn api_vitals_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VitalsQuery>,
) -> impl IntoResponse {
    let time_range = params
        .time_range
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TIME_RANGE.to_string());

    let metric = match params.metric.as_deref().filter(|m| !m.is_empty()) {
        Some(raw) => match Metric::parse(raw) {
            Some(metric) => Some(metric),
            // Unknown metric names match nothing.
            None => return Json(summarize(&time_range, &[])).into_response(),
        },
        None => None,
    };

    let filter = VitalsFilter {
        metric,
        since: TimeRange::parse(&time_range).map(|r| Utc::now() - r.duration()),
    };

    match state.vitals.query(&filter).await {
        Ok(entries) => Json(summarize(&time_range, &entries)).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to query vitals");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load vitals")
        }
    }
}
