pub mod analytics;
pub mod consent;
pub mod indexnow;
pub mod vitals;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

pub(crate) fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}
