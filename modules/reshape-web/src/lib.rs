use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::{header, HeaderValue},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::set_header::SetResponseHeaderLayer;

use reshape_common::crawlers::{CrawlerDetector, CrawlerStatsStore, MemoryCrawlerStats};
use reshape_common::vitals::{MemoryVitalsStore, VitalsStore};
use reshape_common::{Config, LocaleSettings, RoutingRules, Site, Translations};

pub mod auth;
pub mod indexnow;
pub mod middleware;
pub mod pages;
pub mod rest;
pub mod seo;
pub mod templates;

use auth::{IdentityProvider, StaticCredentials};
use indexnow::{HttpIndexNow, IndexNowSubmitter};

pub struct AppState {
    pub config: Config,
    pub site: Site,
    pub locales: LocaleSettings,
    pub routing: RoutingRules,
    pub translations: Translations,
    pub crawlers: CrawlerDetector,
    pub vitals: Arc<dyn VitalsStore>,
    pub crawler_stats: Arc<dyn CrawlerStatsStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub indexnow: Arc<dyn IndexNowSubmitter>,
    pub rate_limiter: Mutex<HashMap<IpAddr, Vec<Instant>>>,
}

impl AppState {
    /// State with in-memory stores, credentials from config and the HTTP IndexNow client.
    pub fn new(config: Config) -> reshape_common::Result<Self> {
        let translations = Translations::load(&config.locales)?;
        Ok(Self {
            site: Site::new(&config.site_url),
            locales: config.locales.clone(),
            routing: RoutingRules::default(),
            translations,
            crawlers: CrawlerDetector::new(),
            vitals: Arc::new(MemoryVitalsStore::new(config.vitals_capacity)),
            crawler_stats: Arc::new(MemoryCrawlerStats::new()),
            identity: Arc::new(StaticCredentials::from_config(&config)),
            indexnow: Arc::new(HttpIndexNow::new()),
            rate_limiter: Mutex::new(HashMap::new()),
            config,
        })
    }

    pub fn with_vitals_store(mut self, store: Arc<dyn VitalsStore>) -> Self {
        self.vitals = store;
        self
    }

    pub fn with_crawler_stats(mut self, store: Arc<dyn CrawlerStatsStore>) -> Self {
        self.crawler_stats = store;
        self
    }

    pub fn with_identity_provider(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_indexnow(mut self, submitter: Arc<dyn IndexNowSubmitter>) -> Self {
        self.indexnow = submitter;
        self
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        // Health check
        .route("/api/health", get(|| async { "ok" }))
        // SEO
        .route("/robots.txt", get(seo::robots_txt))
        .route("/sitemap.xml", get(seo::sitemap_xml))
        // REST API
        .route("/api/vitals", get(rest::vitals::api_vitals_summary).post(rest::vitals::api_vitals_record))
        .route("/api/consent", get(rest::consent::api_consent_get).post(rest::consent::api_consent_set))
        .route("/api/analytics", get(rest::analytics::api_analytics_summary).post(rest::analytics::api_analytics_record))
        .route("/api/indexnow", get(rest::indexnow::api_indexnow_usage).post(rest::indexnow::api_indexnow_submit))
        // Localized pages
        .route("/{locale}", get(pages::home))
        .route("/{locale}/services", get(pages::services))
        .route("/{locale}/contact", get(pages::contact))
        .route("/{locale}/privacy", get(pages::privacy))
        .route("/{locale}/terms", get(pages::terms))
        // Admin
        .route("/{locale}/admin", get(pages::admin::dashboard))
        .route("/{locale}/admin/login", get(pages::admin::login_page).post(pages::admin::login_submit))
        .route("/{locale}/admin/logout", post(pages::admin::logout));

    if indexnow::is_valid_key(&state.config.indexnow_key) {
        router = router.route(
            &format!("/{}.txt", state.config.indexnow_key),
            get(rest::indexnow::indexnow_key_file),
        );
    }

    router
        .fallback(pages::not_found)
        .layer(from_fn_with_state(state.clone(), middleware::locale_guard))
        .layer(from_fn_with_state(state.clone(), middleware::crawler_monitor))
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        // Logging layer: method + path + status + latency only (no query params, no IP)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
