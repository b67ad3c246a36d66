use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::{info, warn};

use reshape_common::ReshapeError;

use super::json_error;
use crate::indexnow::{build_payload, is_valid_key, submit_all};
use crate::AppState;

#[derive(Deserialize)]
pub struct IndexNowRequest {
    #[serde(default)]
    urls: Vec<String>,
}

pub async fn api_indexnow_submit(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    let key = state.config.indexnow_key.as_str();
    if !is_valid_key(key) {
        return json_error(StatusCode::SERVICE_UNAVAILABLE, "IndexNow is not configured");
    }

    let request: IndexNowRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(_) => return json_error(StatusCode::BAD_REQUEST, "Invalid IndexNow payload"),
    };

    let payload = match build_payload(&state.site, key, &request.urls) {
        Ok(p) => p,
        Err(ReshapeError::Validation(message)) => return json_error(StatusCode::BAD_REQUEST, message),
        Err(e) => {
            warn!(error = %e, "Cannot build IndexNow payload");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to submit URLs");
        }
    };

    let results = submit_all(state.indexnow.as_ref(), &payload).await;
    info!(
        urls = payload.url_list.len(),
        accepted = results.iter().filter(|r| r.status.is_some_and(|s| s < 300)).count(),
        "IndexNow submission"
    );

    Json(serde_json::json!({
        "message": "URLs submitted to IndexNow",
        "results": results,
    }))
    .into_response()
}

pub async fn api_indexnow_usage(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "IndexNow API endpoint",
        "usage": format!("POST /api/indexnow with {{ \"urls\": [\"{}/...\"] }}", state.site.base_url()),
    }))
}

/// Ownership proof requested by search engines at `/{key}.txt`.
pub async fn indexnow_key_file(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.config.indexnow_key.clone(),
    )
}
