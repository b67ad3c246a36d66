use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use reshape_common::cookies::parse_cookie;
use reshape_common::crawlers::CrawlerSummary;
use reshape_common::vitals::{summarize, VitalsFilter};

use crate::auth::{self, AdminSession, AUTH_RATE_LIMIT_PER_HOUR, SESSION_COOKIE};
use crate::middleware::ResolvedLocale;
use crate::rest::vitals::DEFAULT_TIME_RANGE;
use crate::templates::{render_dashboard, render_login};
use crate::AppState;

/// Rate-limiter map size above which idle entries are pruned.
const RATE_LIMITER_PRUNE_THRESHOLD: usize = 1000;

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// --- Auth pages (no AdminSession required) ---

pub async fn login_page(
    State(state): State<Arc<AppState>>,
    ResolvedLocale(locale): ResolvedLocale,
    headers: HeaderMap,
) -> Response {
    let signed_in = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|c| parse_cookie(c, SESSION_COOKIE))
        .is_some_and(|value| auth::session_is_valid(value, state.config.session_secret()));
    if signed_in {
        return Redirect::to(&format!("/{locale}/admin")).into_response();
    }
    Html(render_login(locale, None)).into_response()
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    ResolvedLocale(locale): ResolvedLocale,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Form(form): Form<LoginForm>,
) -> Response {
    // Rate limit auth attempts
    {
        let mut limiter = state.rate_limiter.lock().await;
        let now = Instant::now();
        if limiter.len() > RATE_LIMITER_PRUNE_THRESHOLD {
            auth::prune_rate_limiter(&mut *limiter, now);
        }
        let entries = limiter.entry(addr.ip()).or_default();
        if !auth::check_rate_limit(entries, now, AUTH_RATE_LIMIT_PER_HOUR) {
            warn!(ip = %addr.ip(), "Admin login rate limited");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Html(render_login(locale, Some("Too many attempts. Try again later."))),
            )
                .into_response();
        }
    }

    let username = form.username.trim();
    match state.identity.authenticate(username, &form.password).await {
        Some(user) => {
            info!(user = %user, "Admin signed in");
            let cookie = auth::session_cookie(&user, state.config.session_secret());
            (
                StatusCode::SEE_OTHER,
                [
                    (header::LOCATION, format!("/{locale}/admin")),
                    (header::SET_COOKIE, cookie),
                ],
            )
                .into_response()
        }
        None => {
            warn!(user = %username, "Admin sign-in failed");
            (
                StatusCode::UNAUTHORIZED,
                Html(render_login(locale, Some("Invalid username or password."))),
            )
                .into_response()
        }
    }
}

pub async fn logout(ResolvedLocale(locale): ResolvedLocale) -> Response {
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, format!("/{locale}/admin/login")),
            (header::SET_COOKIE, auth::clear_session_cookie()),
        ],
    )
        .into_response()
}

// --- Protected admin pages (AdminSession required) ---

pub async fn dashboard(
    session: AdminSession,
    State(state): State<Arc<AppState>>,
    ResolvedLocale(locale): ResolvedLocale,
) -> Response {
    let since = reshape_common::vitals::TimeRange::Day.duration();
    let filter = VitalsFilter {
        metric: None,
        since: Some(chrono::Utc::now() - since),
    };
    let vitals = match state.vitals.query(&filter).await {
        Ok(entries) => summarize(DEFAULT_TIME_RANGE, &entries),
        Err(e) => {
            warn!(error = %e, "Failed to load vitals for dashboard");
            summarize(DEFAULT_TIME_RANGE, &[])
        }
    };
    let crawlers = match state.crawler_stats.snapshot().await {
        Ok(summary) => summary,
        Err(e) => {
            warn!(error = %e, "Failed to load crawler stats for dashboard");
            CrawlerSummary::default()
        }
    };

    Html(render_dashboard(locale, &session.username, &vitals, &crawlers)).into_response()
}
