use reshape_common::crawlers::CrawlerSummary;
use reshape_common::vitals::VitalsSummary;
use reshape_common::{Locale, LocaleSettings, Messages};

use crate::seo::{AlternateLink, PageKind};

/// Everything that goes into `<head>` plus the document attributes.
pub struct PageHead {
    pub locale: Locale,
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub alternates: Vec<AlternateLink>,
    pub structured_data: serde_json::Value,
}

const NAV_PAGES: [PageKind; 3] = [PageKind::Home, PageKind::Services, PageKind::Contact];

pub fn build_page(head: &PageHead, m: &Messages<'_>, settings: &LocaleSettings, path: &str, content: &str) -> String {
    let alternates: String = head
        .alternates
        .iter()
        .map(|link| {
            format!(
                r#"<link rel="alternate" hreflang="{}" href="{}">"#,
                html_escape(&link.hreflang),
                html_escape(&link.href)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}" dir="{dir}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<meta name="description" content="{description}">
<link rel="canonical" href="{canonical}">
{alternates}
{json_ld}
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#fafafa;}}
.header{{padding:16px 24px;display:flex;align-items:center;justify-content:space-between;border-bottom:1px solid #e0e0e0;}}
.header a{{color:#1a1a1a;text-decoration:none;margin-inline-start:20px;font-size:14px;}}
.languages a{{font-size:12px;color:#888;margin-inline-start:8px;}}
.container{{max-width:960px;margin:0 auto;padding:48px 24px;}}
.container h1{{font-size:36px;font-weight:300;margin-bottom:16px;}}
.container p{{color:#555;line-height:1.6;margin-bottom:12px;}}
.cta{{display:inline-block;padding:10px 20px;background:#1a1a1a;color:#fff;text-decoration:none;border-radius:4px;}}
.footer{{padding:24px;font-size:12px;color:#888;border-top:1px solid #e0e0e0;}}
.cookie-banner{{position:fixed;bottom:0;left:0;right:0;background:#fff;border-top:1px solid #ddd;padding:12px 24px;display:flex;gap:12px;align-items:center;font-size:13px;}}
</style>
</head>
<body>
{nav}
<main>{content}</main>
{footer}
{banner}
</body>
</html>"#,
        lang = head.locale.code(),
        dir = head.locale.direction().as_str(),
        title = html_escape(&head.title),
        description = html_escape(&head.description),
        canonical = html_escape(&head.canonical),
        json_ld = if head.structured_data.is_null() {
            String::new()
        } else {
            format!(
                r#"<script type="application/ld+json">{}</script>"#,
                json_ld(&head.structured_data)
            )
        },
        nav = render_nav(m, settings, path),
        footer = render_footer(m),
        banner = render_cookie_banner(m),
    )
}

/// JSON for an inline script element. `</` is escaped so the payload cannot close the tag.
pub fn json_ld(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}

fn render_nav(m: &Messages<'_>, settings: &LocaleSettings, path: &str) -> String {
    let locale = m.locale;
    let links: String = NAV_PAGES
        .iter()
        .map(|page| {
            format!(
                r#"<a href="/{}{}">{}</a>"#,
                locale.code(),
                page.path(),
                html_escape(m.get(page.nav_key()))
            )
        })
        .collect();

    let languages: String = settings
        .supported()
        .iter()
        .filter(|l| **l != locale)
        .map(|l| {
            format!(
                r#"<a href="/{code}{path}" hreflang="{code}" lang="{code}">{name}</a>"#,
                code = l.code(),
                path = html_escape(path),
                name = html_escape(l.native_name()),
            )
        })
        .collect();

    format!(
        r#"<header class="header"><a href="/{code}"><strong>{site}</strong></a><nav>{links}</nav><div class="languages" aria-label="{label}">{languages}</div></header>"#,
        code = locale.code(),
        site = html_escape(m.get("site_name")),
        label = html_escape(m.get("nav_language")),
    )
}

fn render_footer(m: &Messages<'_>) -> String {
    let code = m.locale.code();
    let year = chrono::Utc::now().format("%Y").to_string();
    format!(
        r#"<footer class="footer"><p>{street}, {city} {zip}</p><p>{phone} · {email}</p><p><a href="/{code}/privacy">{privacy}</a> · <a href="/{code}/terms">{terms}</a></p><p>{copyright}</p></footer>"#,
        street = html_escape(m.get("address_street")),
        city = html_escape(m.get("address_city")),
        zip = html_escape(m.get("address_zip")),
        phone = html_escape(m.get("site_phone")),
        email = html_escape(m.get("site_email")),
        privacy = html_escape(m.get("nav_privacy")),
        terms = html_escape(m.get("nav_terms")),
        copyright = html_escape(&m.format("site_copyright", &[("year", &year)])),
    )
}

/// Consent banner. Choices post to `/api/consent`; the banner hides itself once a
/// preference is stored.
fn render_cookie_banner(m: &Messages<'_>) -> String {
    format!(
        r#"<div class="cookie-banner" id="cookie-consent" hidden>
<span>{text} <a href="/{code}/privacy">{privacy}</a></span>
<button type="button" data-consent="essential">{essential}</button>
<button type="button" data-consent="all">{accept}</button>
</div>
<script>
(function(){{
  var banner=document.getElementById('cookie-consent');
  fetch('/api/consent').then(function(r){{return r.json();}}).then(function(d){{ if(!d.consent) banner.hidden=false; }});
  banner.querySelectorAll('button').forEach(function(b){{
    b.addEventListener('click',function(){{
      fetch('/api/consent',{{method:'POST',headers:{{'Content-Type':'application/json'}},body:JSON.stringify({{preference:b.dataset.consent}})}})
        .then(function(){{ banner.hidden=true; }});
    }});
  }});
}})();
</script>"#,
        text = html_escape(m.get("cookie_consent_text")),
        code = m.locale.code(),
        privacy = html_escape(m.get("cookie_consent_privacy")),
        essential = html_escape(m.get("cookie_consent_essential")),
        accept = html_escape(m.get("cookie_consent_accept")),
    )
}

fn admin_page(locale: Locale, title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}" dir="{dir}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="robots" content="noindex, nofollow">
<title>{title} | Reshape Admin</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#fafafa;}}
.container{{max-width:960px;margin:0 auto;padding:24px;}}
.card{{background:#fff;border:1px solid #e0e0e0;border-radius:8px;padding:16px;margin-bottom:16px;}}
.error{{background:#fce4ec;color:#c62828;padding:8px 12px;border-radius:4px;margin-bottom:12px;font-size:13px;}}
table{{width:100%;border-collapse:collapse;font-size:13px;}}
th,td{{text-align:start;padding:6px 8px;border-bottom:1px solid #eee;}}
input{{display:block;width:100%;padding:8px;margin-bottom:12px;border:1px solid #ccc;border-radius:4px;}}
button{{padding:8px 16px;background:#1a1a1a;color:#fff;border:none;border-radius:4px;cursor:pointer;}}
</style>
</head>
<body><div class="container">{content}</div></body>
</html>"#,
        lang = locale.code(),
        dir = locale.direction().as_str(),
        title = html_escape(title),
    )
}

pub fn render_login(locale: Locale, error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<div class="error">{}</div>"#, html_escape(e)))
        .unwrap_or_default();
    let content = format!(
        r#"<div class="card" style="max-width:360px;margin:80px auto;">
<h2 style="margin-bottom:12px;">Admin Login</h2>
{error}
<form method="POST" action="/{code}/admin/login">
<label for="username">Username</label>
<input type="text" name="username" id="username" required autofocus>
<label for="password">Password</label>
<input type="password" name="password" id="password" required>
<button type="submit">Sign in</button>
</form>
</div>"#,
        code = locale.code(),
    );
    admin_page(locale, "Login", &content)
}

pub fn render_dashboard(
    locale: Locale,
    username: &str,
    vitals: &VitalsSummary,
    crawlers: &CrawlerSummary,
) -> String {
    let mut metric_rows = String::new();
    for (metric, s) in &vitals.metrics {
        metric_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{} / {} / {}</td></tr>",
            metric.as_str(),
            s.count,
            s.average,
            s.median,
            s.p75,
            s.p95,
            s.ratings.good,
            s.ratings.needs_improvement,
            s.ratings.poor,
        ));
    }
    if metric_rows.is_empty() {
        metric_rows.push_str(r#"<tr><td colspan="7" style="color:#888;">No samples yet.</td></tr>"#);
    }

    let mut crawler_rows = String::new();
    for (name, stat) in &crawlers.crawlers {
        crawler_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            html_escape(name),
            stat.count,
            stat.last_seen.format("%Y-%m-%d %H:%M UTC"),
        ));
    }
    if crawler_rows.is_empty() {
        crawler_rows.push_str(r#"<tr><td colspan="3" style="color:#888;">No crawler visits recorded.</td></tr>"#);
    }

    let content = format!(
        r#"<div style="display:flex;justify-content:space-between;align-items:center;margin-bottom:16px;">
<h2>Dashboard</h2>
<form method="POST" action="/{code}/admin/logout"><span style="font-size:13px;color:#888;margin-inline-end:12px;">{user}</span><button type="submit">Log out</button></form>
</div>
<div class="card">
<h3 style="margin-bottom:8px;">Web Vitals ({range}, {total} samples)</h3>
<table><thead><tr><th>Metric</th><th>Count</th><th>Avg</th><th>Median</th><th>p75</th><th>p95</th><th>Good / NI / Poor</th></tr></thead><tbody>{metric_rows}</tbody></table>
</div>
<div class="card">
<h3 style="margin-bottom:8px;">AI crawlers ({crawler_count} crawlers, {visits} visits)</h3>
<table><thead><tr><th>Crawler</th><th>Visits</th><th>Last seen</th></tr></thead><tbody>{crawler_rows}</tbody></table>
</div>"#,
        code = locale.code(),
        user = html_escape(username),
        range = html_escape(&vitals.time_range),
        total = vitals.total_entries,
        crawler_count = crawlers.total_crawlers,
        visits = crawlers.total_visits,
    );
    admin_page(locale, "Dashboard", &content)
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
