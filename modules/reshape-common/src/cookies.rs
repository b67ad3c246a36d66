use std::fmt;

use crate::locale::{Locale, LOCALE_COOKIE, LOCALE_COOKIE_MAX_AGE_SECS};

pub const CONSENT_COOKIE: &str = "cookie-consent";
/// 180 days.
pub const CONSENT_COOKIE_MAX_AGE_SECS: i64 = 180 * 24 * 3600;

/// Parse a specific cookie from the Cookie header string.
pub fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    for part in header.split(';') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix(name) {
            if let Some(value) = value.strip_prefix('=') {
                return Some(value.trim());
            }
        }
    }
    None
}

/// A `Set-Cookie` header value. Always `SameSite=Lax`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: &'static str,
    pub value: String,
    pub path: &'static str,
    pub max_age: i64,
    pub http_only: bool,
    pub secure: bool,
}

impl SetCookie {
    /// Expire the cookie immediately.
    pub fn cleared(name: &'static str, path: &'static str, http_only: bool) -> Self {
        Self {
            name,
            value: String::new(),
            path,
            max_age: 0,
            http_only,
            secure: false,
        }
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}; Path={}", self.name, self.value, self.path)?;
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        write!(f, "; SameSite=Lax; Max-Age={}", self.max_age)?;
        if self.secure {
            f.write_str("; Secure")?;
        }
        Ok(())
    }
}

/// The locale cookie is readable by client code, so no `HttpOnly`.
pub fn locale_cookie(locale: Locale) -> SetCookie {
    SetCookie {
        name: LOCALE_COOKIE,
        value: locale.code().to_string(),
        path: "/",
        max_age: LOCALE_COOKIE_MAX_AGE_SECS,
        http_only: false,
        secure: false,
    }
}

pub fn consent_cookie(preference: &str, secure: bool) -> SetCookie {
    SetCookie {
        name: CONSENT_COOKIE,
        value: preference.to_string(),
        path: "/",
        max_age: CONSENT_COOKIE_MAX_AGE_SECS,
        http_only: true,
        secure,
    }
}
