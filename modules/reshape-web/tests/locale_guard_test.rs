mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};

use common::{body_string, get, header_value, send, test_router};

fn request(uri: &str) -> axum::http::request::Builder {
    Request::builder().uri(uri)
}

#[tokio::test]
async fn root_redirects_using_accept_language() {
    let router = test_router();
    let response = send(
        &router,
        request("/")
            .header(header::ACCEPT_LANGUAGE, "de-DE,fr-FR;q=0.9,en;q=0.8")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(header_value(&response, "location"), Some("/fr"));
    assert_eq!(header_value(&response, "x-redirect-count"), Some("1"));
    assert_eq!(
        header_value(&response, "set-cookie"),
        Some("locale=fr; Path=/; SameSite=Lax; Max-Age=31536000")
    );
}

#[tokio::test]
async fn cookie_wins_over_accept_language() {
    let router = test_router();
    let response = send(
        &router,
        request("/contact")
            .header(header::COOKIE, "locale=ar")
            .header(header::ACCEPT_LANGUAGE, "fr")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(header_value(&response, "location"), Some("/ar/contact"));
}

#[tokio::test]
async fn default_locale_when_no_hints() {
    let router = test_router();
    let response = get(&router, "/services?utm_source=news&ref=home&fbclid=abc").await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(header_value(&response, "location"), Some("/en/services?ref=home"));
}

#[tokio::test]
async fn repeated_locale_segments_are_collapsed_without_cookie() {
    let router = test_router();
    let response = get(&router, "/en/fr/contact?x=1").await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(header_value(&response, "location"), Some("/en/contact?x=1"));
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn marketing_params_stripped_from_localized_url() {
    let router = test_router();
    let response = get(&router, "/fr/contact?gclid=123").await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(header_value(&response, "location"), Some("/fr/contact"));
    assert_eq!(
        header_value(&response, "set-cookie"),
        Some("locale=fr; Path=/; SameSite=Lax; Max-Age=31536000")
    );
}

#[tokio::test]
async fn localized_page_sets_missing_cookie() {
    let router = test_router();
    let response = get(&router, "/fr/contact").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, "set-cookie"),
        Some("locale=fr; Path=/; SameSite=Lax; Max-Age=31536000")
    );
    let html = body_string(response).await;
    assert!(html.contains(r#"<html lang="fr" dir="ltr">"#));
    assert!(html.contains("Nous contacter"));
}

#[tokio::test]
async fn matching_cookie_is_not_rewritten() {
    let router = test_router();
    let response = send(
        &router,
        request("/fr/contact")
            .header(header::COOKIE, "locale=fr")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn mismatched_cookie_follows_url() {
    let router = test_router();
    let response = send(
        &router,
        request("/ru")
            .header(header::COOKIE, "locale=en")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, "set-cookie"),
        Some("locale=ru; Path=/; SameSite=Lax; Max-Age=31536000")
    );
}

#[tokio::test]
async fn hop_count_increments() {
    let router = test_router();
    let response = send(
        &router,
        request("/privacy")
            .header("x-redirect-count", "2")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(header_value(&response, "x-redirect-count"), Some("3"));
}

#[tokio::test]
async fn loop_breaker_passes_request_through() {
    let router = test_router();
    let response = send(
        &router,
        request("/privacy")
            .header("x-redirect-count", "3")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(header::LOCATION).is_none());
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn loop_breaker_still_serves_localized_pages() {
    let router = test_router();
    let response = send(
        &router,
        request("/es/privacy")
            .header("x-redirect-count", "5")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn excluded_paths_are_untouched() {
    let router = test_router();

    let health = get(&router, "/api/health").await;
    assert_eq!(health.status(), StatusCode::OK);
    assert!(health.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_string(health).await, "ok");

    let asset = get(&router, "/logo.png").await;
    assert_eq!(asset.status(), StatusCode::NOT_FOUND);
    assert!(asset.headers().get(header::LOCATION).is_none());

    let next = get(&router, "/_next/static/chunk").await;
    assert!(next.headers().get(header::LOCATION).is_none());
}

#[tokio::test]
async fn arabic_pages_render_right_to_left() {
    let router = test_router();
    let response = get(&router, "/ar").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains(r#"<html lang="ar" dir="rtl">"#));
}

#[tokio::test]
async fn unknown_localized_path_renders_localized_404() {
    let router = test_router();
    let response = get(&router, "/fr/nowhere").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_string(response).await;
    assert!(html.contains(r#"<html lang="fr""#));
    assert!(html.contains("Page introuvable"));
}

#[tokio::test]
async fn unsupported_locale_segment_is_treated_as_a_path() {
    let router = test_router();
    let response = get(&router, "/de/services").await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(header_value(&response, "location"), Some("/en/de/services"));
}

#[tokio::test]
async fn untidy_locale_paths_settle_on_canonical_form() {
    let router = test_router();
    for (path, target) in [
        ("/en/", "/en"),
        ("/fr/contact/", "/fr/contact"),
        ("/en//services", "/en/services"),
    ] {
        let response = get(&router, path).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
        assert_eq!(header_value(&response, "location"), Some(target), "{path}");
        let hop = header_value(&response, "x-redirect-count").unwrap().to_string();

        let followed = send(
            &router,
            request(target)
                .header("x-redirect-count", hop)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(followed.status(), StatusCode::OK, "{target}");
    }
}

#[tokio::test]
async fn first_supported_accept_language_entry_wins() {
    let router = test_router();
    let response = send(
        &router,
        request("/terms")
            .header(header::ACCEPT_LANGUAGE, "it,en;q=0.5,fr;q=0.9")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(header_value(&response, "location"), Some("/en/terms"));
}
