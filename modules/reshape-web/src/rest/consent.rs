use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Deserialize;

use reshape_common::cookies::{consent_cookie, parse_cookie, CONSENT_COOKIE};

use super::json_error;

pub const CONSENT_PREFERENCES: [&str; 2] = ["essential", "all"];

#[derive(Deserialize)]
pub struct ConsentRequest {
    preference: String,
}

pub async fn api_consent_get(headers: HeaderMap) -> impl IntoResponse {
    let consent = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|c| parse_cookie(c, CONSENT_COOKIE))
        .filter(|v| !v.is_empty());
    Json(serde_json::json!({ "consent": consent }))
}

pub async fn api_consent_set(body: axum::body::Bytes) -> impl IntoResponse {
    let request: ConsentRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(_) => return json_error(StatusCode::BAD_REQUEST, "Invalid consent payload"),
    };
    if !CONSENT_PREFERENCES.contains(&request.preference.as_str()) {
        return json_error(
            StatusCode::BAD_REQUEST,
            "preference must be \"essential\" or \"all\"",
        );
    }

    let cookie = consent_cookie(&request.preference, !cfg!(debug_assertions));
    (
        [(header::SET_COOKIE, cookie.to_string())],
        Json(serde_json::json!({ "success": true })),
    )
        .into_response()
}
