use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{debug, info, warn};

use reshape_common::cookies::{locale_cookie, parse_cookie};
use reshape_common::locale::{Locale, LOCALE_COOKIE};
use reshape_common::routing::HOP_HEADER;
use reshape_common::{resolve, RequestContext, Resolution};

use crate::AppState;

/// Locale chosen by [`locale_guard`] for the current request. When the guard passed
/// the request through, the leading path segment is used if it names a supported
/// locale; otherwise extraction fails with 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLocale(pub Locale);

impl FromRequestParts<Arc<AppState>> for ResolvedLocale {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(resolved) = parts.extensions.get::<ResolvedLocale>() {
            return Ok(*resolved);
        }
        parts
            .uri
            .path()
            .split('/')
            .find(|s| !s.is_empty())
            .and_then(|segment| state.locales.parse(segment))
            .map(ResolvedLocale)
            .ok_or(StatusCode::NOT_FOUND)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: impl header::AsHeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Collect the routing inputs from an inbound request.
pub fn request_context(req: &Request) -> RequestContext {
    let headers = req.headers();
    RequestContext {
        path: req.uri().path().to_string(),
        query: req.uri().query().map(str::to_string),
        fragment: None,
        locale_cookie: header_str(headers, header::COOKIE)
            .and_then(|c| parse_cookie(c, LOCALE_COOKIE))
            .map(str::to_string),
        accept_language: header_str(headers, header::ACCEPT_LANGUAGE).map(str::to_string),
        hop_count: header_str(headers, HOP_HEADER)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0),
    }
}

fn append_locale_cookie(headers: &mut HeaderMap, locale: Locale) {
    match HeaderValue::from_str(&locale_cookie(locale).to_string()) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => warn!(error = %e, locale = %locale, "Invalid locale cookie header"),
    }
}

fn redirect_response(location: &str, locale: Option<Locale>, hop_count: u32) -> Option<Response> {
    let location = HeaderValue::from_str(location).ok()?;
    let mut response = StatusCode::TEMPORARY_REDIRECT.into_response();
    let headers = response.headers_mut();
    headers.insert(header::LOCATION, location);
    headers.insert(HOP_HEADER, HeaderValue::from(hop_count));
    if let Some(locale) = locale {
        append_locale_cookie(headers, locale);
    }
    Some(response)
}

/// Enforce `/{locale}/...` URLs: redirect when the locale is missing, repeated, or
/// the query carries marketing parameters; keep the locale cookie in sync.
pub async fn locale_guard(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = request_context(&req);

    match resolve(&ctx, &state.locales, &state.routing) {
        Resolution::PassThrough => next.run(req).await,
        Resolution::Proceed { locale, set_cookie } => {
            req.extensions_mut().insert(ResolvedLocale(locale));
            let mut response = next.run(req).await;
            if set_cookie {
                append_locale_cookie(response.headers_mut(), locale);
            }
            response
        }
        Resolution::Redirect {
            location,
            locale,
            hop_count,
        } => match redirect_response(&location, locale, hop_count) {
            Some(response) => {
                debug!(from = %ctx.path, to = %location, hop_count, "Locale redirect");
                response
            }
            None => {
                warn!(location = %location, "Unrepresentable redirect target, passing through");
                next.run(req).await
            }
        },
    }
}

/// Record crawler visits to non-API paths. Never alters the response.
pub async fn crawler_monitor(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let crawler = if path.starts_with("/api") {
        None
    } else {
        header_str(req.headers(), header::USER_AGENT).and_then(|ua| state.crawlers.detect(ua))
    };

    if let Some(crawler) = crawler {
        info!(crawler = %crawler, path = %path, "AI crawler visit");
        if let Err(e) = state.crawler_stats.record(&crawler, Utc::now()).await {
            warn!(error = %e, crawler = %crawler, "Failed to record crawler visit");
        }
    }

    next.run(req).await
}
