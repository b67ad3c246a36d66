#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    extract::connect_info::MockConnectInfo,
    http::{header, Request, Response},
    Router,
};
use tower::ServiceExt;

use reshape_common::{Config, LocaleSettings};
use reshape_web::indexnow::{IndexNowError, IndexNowPayload, IndexNowSubmitter};
use reshape_web::{app, AppState};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";
pub const INDEXNOW_KEY: &str = "a1b2c3d4e5f6a7b8";

pub fn test_config() -> Config {
    Config {
        web_host: "127.0.0.1".to_string(),
        web_port: 0,
        site_url: "https://reshape.clinic".to_string(),
        locales: LocaleSettings::default(),
        admin_username: ADMIN_USER.to_string(),
        admin_password: ADMIN_PASSWORD.to_string(),
        session_secret: "integration-test-secret".to_string(),
        indexnow_key: INDEXNOW_KEY.to_string(),
        vitals_capacity: 1000,
    }
}

/// Records every submission and answers with a fixed status.
#[derive(Default)]
pub struct RecordingIndexNow {
    pub submissions: Mutex<Vec<(String, IndexNowPayload)>>,
}

#[async_trait]
impl IndexNowSubmitter for RecordingIndexNow {
    async fn submit(&self, endpoint: &str, payload: &IndexNowPayload) -> Result<u16, IndexNowError> {
        self.submissions
            .lock()
            .unwrap()
            .push((endpoint.to_string(), payload.clone()));
        Ok(200)
    }
}

pub fn router_with(state: AppState) -> Router {
    app(Arc::new(state)).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))))
}

pub fn test_router() -> Router {
    router_with(AppState::new(test_config()).unwrap())
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    send(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(router: &Router, uri: &str, body: &str) -> Response<Body> {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

pub fn header_value<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
