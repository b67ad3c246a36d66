//! Locale resolution and redirect guard.
//!
//! Decides, for every inbound request, whether the URL the browser holds is already
//! `/{locale}/{rest}` with a single locale segment and no marketing parameters. When
//! it is not, the request is redirected to the corrected URL. Precedence for the
//! effective locale is URL, then cookie, then `Accept-Language`, then the default.
//!
//! The module is framework-agnostic: callers build a [`RequestContext`] and apply the
//! returned [`Resolution`].

use tracing::error;

use crate::locale::{Locale, LocaleSettings};
use crate::marketing::{has_marketing_params, strip_marketing_params};

/// Request/response header carrying the number of corrective redirects so far.
pub const HOP_HEADER: &str = "x-redirect-count";

/// Requests arriving with more hops than this are passed through untouched.
pub const HOP_LIMIT: u32 = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: Option<String>,
    /// Raw fragment without the leading `#`. Browsers do not send it, but a
    /// caller holding a full URL may.
    pub fragment: Option<String>,
    /// Raw value of the locale cookie, if any.
    pub locale_cookie: Option<String>,
    pub accept_language: Option<String>,
    pub hop_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No locale logic applies: excluded path, or the loop breaker fired.
    PassThrough,
    /// Serve the request. The locale cookie must be written when `set_cookie` is true.
    Proceed { locale: Locale, set_cookie: bool },
    /// Redirect to `location`. When `locale` is set the locale cookie is written too.
    /// `hop_count` is the value for the outgoing hop header.
    Redirect {
        location: String,
        locale: Option<Locale>,
        hop_count: u32,
    },
}

impl Resolution {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Resolution::Redirect { .. })
    }
}

/// Paths that never go through locale logic.
#[derive(Debug, Clone)]
pub struct RoutingRules {
    pub excluded_prefixes: Vec<String>,
}

impl Default for RoutingRules {
    fn default() -> Self {
        Self {
            excluded_prefixes: vec!["/_next".into(), "/api".into(), "/fonts".into()],
        }
    }
}

impl RoutingRules {
    /// Internal and asset paths: an excluded prefix, or anything containing a dot.
    pub fn is_excluded(&self, path: &str) -> bool {
        path.contains('.')
            || self
                .excluded_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Collapse runs of `/` and strip one trailing slash. The root path stays `/`.
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    if !path.starts_with('/') {
        out.push('/');
    }
    let mut previous_slash = false;
    for c in path.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(c);
    }
    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

/// First `Accept-Language` entry, in header order, naming a supported locale.
/// Malformed entries and `q=0` are ignored; other q-values do not reorder.
pub fn negotiate_accept_language(header: &str, settings: &LocaleSettings) -> Option<Locale> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let tag = pieces.next().unwrap_or("").trim();
        if tag.is_empty() || tag == "*" {
            return None;
        }
        let mut q = Some(1.0_f32);
        for param in pieces {
            if let Some(value) = param.trim().strip_prefix("q=") {
                q = value
                    .trim()
                    .parse::<f32>()
                    .ok()
                    .filter(|v| v.is_finite() && (0.0..=1.0).contains(v));
            }
        }
        match q {
            Some(q) if q > 0.0 => settings.parse_primary_subtag(tag),
            _ => None,
        }
    })
}

/// Cookie, then header, then the configured default.
fn fallback_locale(ctx: &RequestContext, settings: &LocaleSettings) -> Locale {
    if let Some(locale) = ctx.locale_cookie.as_deref().and_then(|v| settings.parse(v)) {
        return locale;
    }
    if let Some(locale) = ctx
        .accept_language
        .as_deref()
        .and_then(|h| negotiate_accept_language(h, settings))
    {
        return locale;
    }
    settings.default_locale()
}

fn with_query_and_fragment(mut location: String, query: Option<&str>, fragment: Option<&str>) -> String {
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        location.push('?');
        location.push_str(query);
    }
    if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
        location.push('#');
        location.push_str(fragment);
    }
    location
}

/// Decide what to do with one request. Never fails: every branch ends in a
/// pass-through, a proceed, or a redirect.
pub fn resolve(ctx: &RequestContext, settings: &LocaleSettings, rules: &RoutingRules) -> Resolution {
    if rules.is_excluded(&ctx.path) {
        return Resolution::PassThrough;
    }

    if ctx.hop_count > HOP_LIMIT {
        error!(
            path = %ctx.path,
            hop_count = ctx.hop_count,
            "Redirect loop detected, passing request through"
        );
        return Resolution::PassThrough;
    }

    let next_hop = ctx.hop_count + 1;
    let normalized = normalize_path(&ctx.path);
    let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
    let query = ctx.query.as_deref();
    let fragment = ctx.fragment.as_deref();
    let has_tracking = query.is_some_and(has_marketing_params);

    let locale_segments = segments
        .iter()
        .filter(|s| settings.parse(s).is_some())
        .count();

    if segments.len() > 1 && locale_segments > 1 {
        let first = segments
            .iter()
            .find(|s| settings.parse(s).is_some())
            .copied()
            .unwrap_or_default();
        let mut cleaned = vec![first];
        cleaned.extend(segments.iter().filter(|s| settings.parse(s).is_none()));
        let location = with_query_and_fragment(format!("/{}", cleaned.join("/")), query, fragment);
        return Resolution::Redirect {
            location,
            locale: None,
            hop_count: next_hop,
        };
    }

    if let Some(url_locale) = segments.first().and_then(|s| settings.parse(s)) {
        if has_tracking || normalized != ctx.path {
            let cleaned = if has_tracking {
                query.and_then(strip_marketing_params)
            } else {
                query.map(str::to_string)
            };
            let location = with_query_and_fragment(normalized, cleaned.as_deref(), fragment);
            return Resolution::Redirect {
                location,
                locale: Some(url_locale),
                hop_count: next_hop,
            };
        }

        let set_cookie = ctx.locale_cookie.as_deref() != Some(url_locale.code());
        return Resolution::Proceed {
            locale: url_locale,
            set_cookie,
        };
    }

    let locale = fallback_locale(ctx, settings);
    let rest = if normalized == "/" { "" } else { normalized.as_str() };
    let cleaned = if has_tracking {
        query.and_then(strip_marketing_params)
    } else {
        query.map(str::to_string)
    };
    let location = with_query_and_fragment(format!("/{}{rest}", locale.code()), cleaned.as_deref(), fragment);
    Resolution::Redirect {
        location,
        locale: Some(locale),
        hop_count: next_hop,
    }
}
