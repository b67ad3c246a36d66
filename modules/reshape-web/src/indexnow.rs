//! IndexNow submission: notify search engines that URLs changed.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use reshape_common::{ReshapeError, Site};

pub const INDEXNOW_ENDPOINTS: [&str; 3] = [
    "https://www.bing.com/indexnow",
    "https://yandex.com/indexnow",
    "https://api.indexnow.org/indexnow",
];

#[derive(Debug, Error)]
pub enum IndexNowError {
    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for IndexNowError {
    fn from(err: reqwest::Error) -> Self {
        IndexNowError::Network(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexNowPayload {
    pub host: String,
    pub key: String,
    pub key_location: String,
    pub url_list: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointResult {
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Posts a payload to one IndexNow endpoint and reports the HTTP status.
#[async_trait]
pub trait IndexNowSubmitter: Send + Sync {
    async fn submit(&self, endpoint: &str, payload: &IndexNowPayload) -> Result<u16, IndexNowError>;
}

pub struct HttpIndexNow {
    client: reqwest::Client,
}

impl HttpIndexNow {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }
}

impl Default for HttpIndexNow {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndexNowSubmitter for HttpIndexNow {
    async fn submit(&self, endpoint: &str, payload: &IndexNowPayload) -> Result<u16, IndexNowError> {
        let resp = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;
        Ok(resp.status().as_u16())
    }
}

/// IndexNow keys are 8 to 128 characters of `a-z`, `A-Z`, `0-9` and `-`.
pub fn is_valid_key(key: &str) -> bool {
    (8..=128).contains(&key.len()) && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Validate the submitted URLs against the site host and build the payload.
pub fn build_payload(site: &Site, key: &str, urls: &[String]) -> Result<IndexNowPayload, ReshapeError> {
    if urls.is_empty() {
        return Err(ReshapeError::Validation("No URLs provided".to_string()));
    }
    let host = site
        .host()
        .ok_or_else(|| ReshapeError::Config(format!("site URL '{}' has no host", site.base_url())))?;

    for raw in urls {
        let parsed = url::Url::parse(raw)
            .map_err(|_| ReshapeError::Validation(format!("Invalid URL: {raw}")))?;
        if parsed.host_str() != Some(host.as_str()) {
            return Err(ReshapeError::Validation(format!("URL is not on {host}: {raw}")));
        }
    }

    Ok(IndexNowPayload {
        key_location: format!("{}/{key}.txt", site.base_url()),
        host,
        key: key.to_string(),
        url_list: urls.to_vec(),
    })
}

/// Submit to every endpoint concurrently. One failing endpoint does not affect the others.
pub async fn submit_all(submitter: &dyn IndexNowSubmitter, payload: &IndexNowPayload) -> Vec<EndpointResult> {
    let submissions = INDEXNOW_ENDPOINTS
        .iter()
        .map(|endpoint| async move {
            match submitter.submit(endpoint, payload).await {
                Ok(status) => EndpointResult {
                    endpoint: endpoint.to_string(),
                    status: Some(status),
                    error: None,
                },
                Err(e) => EndpointResult {
                    endpoint: endpoint.to_string(),
                    status: None,
                    error: Some(e.to_string()),
                },
            }
        });
    futures::future::join_all(submissions).await
}
