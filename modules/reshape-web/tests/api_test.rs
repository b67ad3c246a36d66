mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use reshape_common::vitals::MemoryVitalsStore;
use reshape_web::AppState;

use common::{
    body_json, body_string, get, header_value, post_json, router_with, send, test_config, test_router,
    RecordingIndexNow, INDEXNOW_KEY,
};

#[tokio::test]
async fn vitals_are_recorded_and_summarized() {
    let router = test_router();

    for (metric, value) in [("LCP", 1200.0), ("LCP", 3000.0), ("LCP", 5000.0), ("CLS", 0.02)] {
        let body = format!(r#"{{"metric":"{metric}","value":{value},"url":"/en"}}"#);
        let response = post_json(&router, "/api/vitals", &body).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({ "success": true }));
    }

    let summary = body_json(get(&router, "/api/vitals").await).await;
    assert_eq!(summary["timeRange"], "24h");
    assert_eq!(summary["totalEntries"], 4);
    assert_eq!(summary["metrics"]["LCP"]["count"], 3);
    assert_eq!(summary["metrics"]["LCP"]["median"], 3000.0);
    assert_eq!(summary["metrics"]["LCP"]["ratings"]["good"], 1);
    assert_eq!(summary["metrics"]["LCP"]["ratings"]["needsImprovement"], 1);
    assert_eq!(summary["metrics"]["LCP"]["ratings"]["poor"], 1);
    assert_eq!(summary["recentEntries"][0]["metric"], "CLS");

    let only_cls = body_json(get(&router, "/api/vitals?metric=CLS&timeRange=1h").await).await;
    assert_eq!(only_cls["timeRange"], "1h");
    assert_eq!(only_cls["totalEntries"], 1);
    assert!(only_cls["metrics"].get("LCP").is_none());
}

#[tokio::test]
async fn vitals_buffer_is_bounded() {
    let state = AppState::new(test_config())
        .unwrap()
        .with_vitals_store(Arc::new(MemoryVitalsStore::new(2)));
    let router = router_with(state);

    for value in [100.0, 200.0, 300.0] {
        let body = format!(r#"{{"metric":"TTFB","value":{value}}}"#);
        post_json(&router, "/api/vitals", &body).await;
    }

    let summary = body_json(get(&router, "/api/vitals?timeRange=all").await).await;
    assert_eq!(summary["totalEntries"], 2);
    assert_eq!(summary["recentEntries"][0]["value"], 300.0);
    assert_eq!(summary["recentEntries"][1]["value"], 200.0);
}

#[tokio::test]
async fn malformed_vitals_are_rejected() {
    let router = test_router();
    let response = post_json(&router, "/api/vitals", "{not json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(&router, "/api/vitals", r#"{"metric":"LCP","value":-5}"#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn consent_roundtrip() {
    let router = test_router();

    let none = body_json(get(&router, "/api/consent").await).await;
    assert_eq!(none, serde_json::json!({ "consent": null }));

    let response = post_json(&router, "/api/consent", r#"{"preference":"essential"}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = header_value(&response, "set-cookie").unwrap().to_string();
    assert!(cookie.starts_with("cookie-consent=essential; Path=/; HttpOnly; SameSite=Lax; Max-Age=15552000"));

    let response = send(
        &router,
        Request::builder()
            .uri("/api/consent")
            .header(header::COOKIE, "cookie-consent=essential")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(body_json(response).await, serde_json::json!({ "consent": "essential" }));
}

#[tokio::test]
async fn consent_rejects_unknown_preference() {
    let router = test_router();
    let response = post_json(&router, "/api/consent", r#"{"preference":"marketing"}"#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn analytics_detects_and_counts_crawlers() {
    let router = test_router();

    let response = post_json(
        &router,
        "/api/analytics",
        r#"{"userAgent":"Mozilla/5.0 (compatible; GPTBot/1.2)","path":"/en"}"#,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["isAI"], true);
    assert_eq!(body["crawler"], "GPTBot");
    assert_eq!(body["message"], "AI crawler detected");

    let human = body_json(
        post_json(&router, "/api/analytics", r#"{"userAgent":"Mozilla/5.0 Firefox/128.0"}"#).await,
    )
    .await;
    assert_eq!(human["isAI"], false);
    assert_eq!(human["message"], "Regular visitor");

    let summary = body_json(get(&router, "/api/analytics").await).await;
    assert_eq!(summary["summary"]["totalCrawlers"], 1);
    assert_eq!(summary["summary"]["totalVisits"], 1);
    assert_eq!(summary["summary"]["crawlers"]["GPTBot"]["count"], 1);
    assert_eq!(summary["patterns"].as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn analytics_requires_user_agent() {
    let router = test_router();
    let response = post_json(&router, "/api/analytics", r#"{"path":"/en"}"#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn crawler_page_visits_are_monitored() {
    let router = test_router();
    send(
        &router,
        Request::builder()
            .uri("/en/services")
            .header(header::USER_AGENT, "Mozilla/5.0 (compatible; PerplexityBot/1.0)")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    // API calls are not counted as page visits.
    send(
        &router,
        Request::builder()
            .uri("/api/health")
            .header(header::USER_AGENT, "CCBot/2.0")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    let summary = body_json(get(&router, "/api/analytics").await).await;
    assert_eq!(summary["summary"]["totalVisits"], 1);
    assert_eq!(summary["summary"]["crawlers"]["PerplexityBot"]["count"], 1);
}

#[tokio::test]
async fn indexnow_submits_to_every_endpoint() {
    let recorder = Arc::new(RecordingIndexNow::default());
    let state = AppState::new(test_config()).unwrap().with_indexnow(recorder.clone());
    let router = router_with(state);

    let response = post_json(
        &router,
        "/api/indexnow",
        r#"{"urls":["https://reshape.clinic/en/services","https://reshape.clinic/fr/services"]}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
    assert_eq!(body["results"][0]["status"], 200);

    let submissions = recorder.submissions.lock().unwrap();
    assert_eq!(submissions.len(), 3);
    let (_, payload) = &submissions[0];
    assert_eq!(payload.host, "reshape.clinic");
    assert_eq!(payload.key, INDEXNOW_KEY);
    assert_eq!(payload.url_list.len(), 2);
}

#[tokio::test]
async fn indexnow_validates_urls() {
    let recorder = Arc::new(RecordingIndexNow::default());
    let state = AppState::new(test_config()).unwrap().with_indexnow(recorder.clone());
    let router = router_with(state);

    let empty = post_json(&router, "/api/indexnow", r#"{"urls":[]}"#).await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let foreign = post_json(&router, "/api/indexnow", r#"{"urls":["https://example.com/"]}"#).await;
    assert_eq!(foreign.status(), StatusCode::BAD_REQUEST);

    assert!(recorder.submissions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn indexnow_unavailable_without_key() {
    let mut config = test_config();
    config.indexnow_key = String::new();
    let router = router_with(AppState::new(config).unwrap());

    let response = post_json(&router, "/api/indexnow", r#"{"urls":["https://reshape.clinic/en"]}"#).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn indexnow_key_file_is_served() {
    let router = test_router();
    let response = get(&router, &format!("/{INDEXNOW_KEY}.txt")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, INDEXNOW_KEY);
}

#[tokio::test]
async fn robots_and_sitemap() {
    let router = test_router();

    let robots = get(&router, "/robots.txt").await;
    assert_eq!(robots.status(), StatusCode::OK);
    assert!(header_value(&robots, "content-type").unwrap().starts_with("text/plain"));
    assert!(body_string(robots).await.contains("Sitemap: https://reshape.clinic/sitemap.xml"));

    let sitemap = get(&router, "/sitemap.xml").await;
    assert_eq!(sitemap.status(), StatusCode::OK);
    let xml = body_string(sitemap).await;
    assert!(xml.contains("<loc>https://reshape.clinic/zh/terms</loc>"));
}

#[tokio::test]
async fn pages_carry_seo_head() {
    let router = test_router();
    let html = body_string(get(&router, "/es/services").await).await;

    assert!(html.contains(r#"<link rel="canonical" href="https://reshape.clinic/es/services">"#));
    assert!(html.contains(r#"<link rel="alternate" hreflang="x-default" href="https://reshape.clinic/en/services">"#));
    assert!(html.contains(r#"<link rel="alternate" hreflang="ar" href="https://reshape.clinic/ar/services">"#));
    assert!(html.contains(r#"<script type="application/ld+json">"#));
    assert!(html.contains("BreadcrumbList"));
}

#[tokio::test]
async fn services_page_carries_faq() {
    let router = test_router();
    let html = body_string(get(&router, "/en/services").await).await;

    assert!(html.contains(r#""@type":"FAQPage""#));
    assert!(html.contains("<summary>Do I need a referral?</summary>"));
    assert!(html.contains(r#""name":"Do I need a referral?""#));

    let home = body_string(get(&router, "/en").await).await;
    assert!(!home.contains("FAQPage"));
}

#[tokio::test]
async fn vitals_metric_filter_is_exact() {
    let router = test_router();
    post_json(&router, "/api/vitals", r#"{"metric":"LCP","value":1800}"#).await;

    let lower = body_json(get(&router, "/api/vitals?metric=lcp").await).await;
    assert_eq!(lower["totalEntries"], 0);

    let upper = body_json(get(&router, "/api/vitals?metric=LCP").await).await;
    assert_eq!(upper["totalEntries"], 1);
}
