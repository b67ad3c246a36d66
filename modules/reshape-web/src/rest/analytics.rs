use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use reshape_common::crawlers::CRAWLER_PATTERNS;

use super::json_error;
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    user_agent: Option<String>,
    path: Option<String>,
    timestamp: Option<DateTime<Utc>>,
}

pub async fn api_analytics_record(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    let report: AnalyticsReport = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(_) => return json_error(StatusCode::BAD_REQUEST, "Invalid analytics payload"),
    };
    let Some(user_agent) = report.user_agent.filter(|ua| !ua.is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "User agent required");
    };

    let crawler = state.crawlers.detect(&user_agent);
    if let Some(crawler) = &crawler {
        let seen_at = report.timestamp.unwrap_or_else(Utc::now);
        if let Err(e) = state.crawler_stats.record(crawler, seen_at).await {
            warn!(error = %e, "Failed to record crawler visit");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process analytics");
        }
        info!(crawler = %crawler, path = report.path.as_deref().unwrap_or(""), "AI crawler reported");
    }

    Json(serde_json::json!({
        "isAI": crawler.is_some(),
        "crawler": crawler,
        "message": if crawler.is_some() { "AI crawler detected" } else { "Regular visitor" },
    }))
    .into_response()
}

pub async fn api_analytics_summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.crawler_stats.snapshot().await {
        Ok(summary) => Json(serde_json::json!({
            "summary": summary,
            "patterns": CRAWLER_PATTERNS,
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to load crawler stats");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load analytics")
        }
    }
}
