use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use reshape_common::cookies::{parse_cookie, SetCookie};
use reshape_common::Config;

use crate::middleware::ResolvedLocale;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "reshape_session";
const SESSION_DURATION_SECS: i64 = 7 * 24 * 3600; // 7 days

/// Max login attempts per IP per hour.
pub const AUTH_RATE_LIMIT_PER_HOUR: usize = 10;
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(3600);

/// Verifies admin credentials. Returns the canonical user name on success.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Option<String>;
}

/// A single admin account taken from configuration.
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.admin_username, &config.admin_password)
    }
}

#[async_trait]
impl IdentityProvider for StaticCredentials {
    async fn authenticate(&self, username: &str, password: &str) -> Option<String> {
        // Evaluate both comparisons so timing does not reveal which one failed.
        let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        (user_ok & pass_ok & !self.password.is_empty()).then(|| self.username.clone())
    }
}

/// Authenticated admin session. Extract this in handlers that require auth.
/// If the session cookie is missing or invalid, returns a redirect to the login page.
pub struct AdminSession {
    pub username: String,
}

impl FromRequestParts<Arc<AppState>> for AdminSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let cookie_header = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if let Some(value) = parse_cookie(cookie_header, SESSION_COOKIE) {
            if let Some(username) = verify_session(value, state.config.session_secret()) {
                return Ok(AdminSession { username });
            }
        }

        let locale = parts
            .extensions
            .get::<ResolvedLocale>()
            .map(|l| l.0)
            .unwrap_or_else(|| state.locales.default_locale());
        Err(Redirect::to(&format!("/{locale}/admin/login")).into_response())
    }
}

/// Create a signed session cookie value: `username|expiry|signature`
pub fn create_session(username: &str, secret: &str) -> String {
    let expiry = chrono::Utc::now().timestamp() + SESSION_DURATION_SECS;
    let payload = format!("{username}|{expiry}");
    let sig = sign(&payload, secret);
    format!("{payload}|{sig}")
}

/// Build the Set-Cookie header value.
/// In release builds, adds `Secure` flag to prevent transmission over HTTP.
pub fn session_cookie(username: &str, secret: &str) -> String {
    SetCookie {
        name: SESSION_COOKIE,
        value: create_session(username, secret),
        path: "/",
        max_age: SESSION_DURATION_SECS,
        http_only: true,
        secure: !cfg!(debug_assertions),
    }
    .to_string()
}

/// Build a Set-Cookie header that clears the session.
pub fn clear_session_cookie() -> String {
    SetCookie::cleared(SESSION_COOKIE, "/", true).to_string()
}

pub fn session_is_valid(value: &str, secret: &str) -> bool {
    verify_session(value, secret).is_some()
}

/// Verify a session cookie value. Returns the user name if valid.
fn verify_session(value: &str, secret: &str) -> Option<String> {
    // The user name may itself contain `|`; the last two fields are fixed.
    let mut parts = value.rsplitn(3, '|');
    let sig = parts.next()?;
    let expiry_str = parts.next()?;
    let username = parts.next()?;

    let payload = format!("{username}|{expiry_str}");
    let expected_sig = sign(&payload, secret);
    if !constant_time_eq(sig.as_bytes(), expected_sig.as_bytes()) {
        return None;
    }

    let expiry: i64 = expiry_str.parse().ok()?;
    if chrono::Utc::now().timestamp() > expiry {
        return None;
    }

    Some(username.to_string())
}

fn sign(payload: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison to prevent timing attacks.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Check rate limit for an IP. Returns true if the request is allowed, false if rate-limited.
/// Prunes expired entries and records the new request if allowed.
pub fn check_rate_limit(entries: &mut Vec<Instant>, now: Instant, max_per_hour: usize) -> bool {
    let cutoff = now.checked_sub(RATE_LIMIT_WINDOW);
    entries.retain(|t| cutoff.map_or(true, |c| *t > c));
    if entries.len() >= max_per_hour {
        return false;
    }
    entries.push(now);
    true
}

/// Drop keys whose most recent attempt is older than the rate-limit window.
pub fn prune_rate_limiter<K: Eq + Hash>(limiter: &mut HashMap<K, Vec<Instant>>, now: Instant) {
    let Some(cutoff) = now.checked_sub(RATE_LIMIT_WINDOW) else {
        return;
    };
    limiter.retain(|_, entries| entries.iter().any(|t| *t > cutoff));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_session() {
        let secret = "test-secret-key";
        let cookie_value = create_session("admin", secret);
        assert_eq!(verify_session(&cookie_value, secret), Some("admin".to_string()));
    }

    #[test]
    fn rejects_tampered_session() {
        let secret = "test-secret-key";
        let cookie_value = create_session("editor", secret);
        let tampered = cookie_value.replacen("editor", "admin", 1);
        assert_eq!(verify_session(&tampered, secret), None);
    }

    #[test]
    fn rejects_wrong_secret() {
        let cookie_value = create_session("admin", "secret-a");
        assert_eq!(verify_session(&cookie_value, "secret-b"), None);
    }

    #[test]
    fn rejects_expired_session() {
        let secret = "test-secret";
        let expiry = chrono::Utc::now().timestamp() - 100;
        let payload = format!("admin|{expiry}");
        let sig = sign(&payload, secret);
        let value = format!("{payload}|{sig}");
        assert_eq!(verify_session(&value, secret), None);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(verify_session("no-separators", "s"), None);
        assert_eq!(verify_session("a|b", "s"), None);
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("admin", "s");
        assert!(cookie.starts_with("reshape_session=admin|"));
        assert!(cookie.contains("; Path=/; HttpOnly; SameSite=Lax; Max-Age=604800"));
        assert_eq!(
            clear_session_cookie(),
            "reshape_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        );
    }

    #[tokio::test]
    async fn static_credentials() {
        let creds = StaticCredentials::new("admin", "hunter2");
        assert_eq!(creds.authenticate("admin", "hunter2").await, Some("admin".to_string()));
        assert_eq!(creds.authenticate("admin", "hunter3").await, None);
        assert_eq!(creds.authenticate("root", "hunter2").await, None);
        assert_eq!(StaticCredentials::new("admin", "").authenticate("admin", "").await, None);
    }

    #[test]
    fn rate_limit_window() {
        let now = Instant::now();
        let mut entries = Vec::new();
        for _ in 0..3 {
            assert!(check_rate_limit(&mut entries, now, 3));
        }
        assert!(!check_rate_limit(&mut entries, now, 3));
        assert!(check_rate_limit(&mut entries, now + Duration::from_secs(3601), 3));
    }

    #[test]
    fn pruning_drops_idle_clients_only() {
        let start = Instant::now();
        let now = start + Duration::from_secs(2 * 3600);
        let mut limiter: HashMap<u32, Vec<Instant>> = HashMap::new();
        for ip in 0..1500 {
            limiter.insert(ip, vec![start]);
        }
        limiter.insert(9000, vec![start, now - Duration::from_secs(60)]);
        limiter.insert(9001, Vec::new());

        prune_rate_limiter(&mut limiter, now);

        assert_eq!(limiter.len(), 1);
        assert!(limiter.contains_key(&9000));
    }
}
