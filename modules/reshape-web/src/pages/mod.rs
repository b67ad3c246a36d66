pub mod admin;

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};

use reshape_common::site::meta_title;
use reshape_common::{Locale, Messages};

use crate::middleware::ResolvedLocale;
use crate::seo::{alternate_links, faq_items, structured_data, Breadcrumb, FaqItem, PageKind};
use crate::templates::{build_page, html_escape, PageHead};
use crate::AppState;

/// Full HTML document for one of the public pages.
fn render(state: &AppState, locale: Locale, page: PageKind, content: impl FnOnce(&Messages<'_>) -> String) -> Html<String> {
    let m = state.translations.messages(locale);
    let site = &state.site;

    let breadcrumbs = match page {
        PageKind::Home => Vec::new(),
        other => vec![
            Breadcrumb {
                name: m.get("nav_home").to_string(),
                url: site.absolute_url("", Some(locale)),
            },
            Breadcrumb {
                name: m.get(other.nav_key()).to_string(),
                url: site.absolute_url(other.path(), Some(locale)),
            },
        ],
    };

    let (title, description) = match page {
        PageKind::Home => (meta_title(Some(m.get("site_tagline"))), m.get("site_description")),
        PageKind::Services => (meta_title(Some(m.get("services_title"))), m.get("site_description")),
        PageKind::Contact => (meta_title(Some(m.get("contact_hero_title"))), m.get("contact_hero_subtitle")),
        PageKind::Privacy => (meta_title(Some(m.get("privacy_title"))), m.get("privacy_intro")),
        PageKind::Terms => (meta_title(Some(m.get("terms_title"))), m.get("terms_intro")),
    };

    let faq = match page {
        PageKind::Services => faq_items(&m),
        _ => Vec::new(),
    };

    let head = PageHead {
        locale,
        title,
        description: description.to_string(),
        canonical: site.canonical_url(page.path(), locale),
        alternates: alternate_links(site, &state.locales, page.path()),
        structured_data: structured_data(site, &state.locales, &m, page, &breadcrumbs, &faq),
    };

    Html(build_page(&head, &m, &state.locales, page.path(), &content(&m)))
}

fn faq_section(m: &Messages<'_>, items: &[FaqItem]) -> String {
    let entries: String = items
        .iter()
        .map(|item| {
            format!(
                "<details><summary>{}</summary><p>{}</p></details>",
                html_escape(&item.question),
                html_escape(&item.answer)
            )
        })
        .collect();
    format!(
        r#"<section class="container faq"><h2>{}</h2>{entries}</section>"#,
        html_escape(m.get("faq_title"))
    )
}

fn service_cards(m: &Messages<'_>) -> String {
    [
        ("services_regenerative_title", "services_regenerative_desc"),
        ("services_aesthetic_title", "services_aesthetic_desc"),
        ("services_longevity_title", "services_longevity_desc"),
    ]
    .iter()
    .map(|(title, desc)| {
        format!(
            "<article><h2>{}</h2><p>{}</p></article>",
            html_escape(m.get(title)),
            html_escape(m.get(desc))
        )
    })
    .collect()
}

pub async fn home(State(state): State<Arc<AppState>>, ResolvedLocale(locale): ResolvedLocale) -> impl IntoResponse {
    render(&state, locale, PageKind::Home, |m| {
        format!(
            r#"<section class="container"><h1>{title} <em>{accent}</em></h1><p>{subtitle}</p><a class="cta" href="/{code}/contact">{cta}</a></section>
<section class="container">{services}</section>"#,
            title = html_escape(m.get("home_hero_title")),
            accent = html_escape(m.get("home_hero_title_accent")),
            subtitle = html_escape(m.get("home_hero_subtitle")),
            code = locale.code(),
            cta = html_escape(m.get("home_hero_cta")),
            services = service_cards(m),
        )
    })
}

pub async fn services(State(state): State<Arc<AppState>>, ResolvedLocale(locale): ResolvedLocale) -> impl IntoResponse {
    render(&state, locale, PageKind::Services, |m| {
        format!(
            r#"<section class="container"><h1>{}</h1>{}</section>
{}"#,
            html_escape(m.get("services_title")),
            service_cards(m),
            faq_section(m, &faq_items(m))
        )
    })
}

pub async fn contact(State(state): State<Arc<AppState>>, ResolvedLocale(locale): ResolvedLocale) -> impl IntoResponse {
    render(&state, locale, PageKind::Contact, |m| {
        let phone = m.get("site_phone");
        let tel: String = phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        format!(
            r#"<section class="container"><h1>{title}</h1><p>{subtitle}</p>
<h2>{visit}</h2><address>{street}<br>{city} {zip}<br>{country}</address>
<h2>{call}</h2><p><a href="tel:{tel}">{phone}</a></p>
<h2>{email_title}</h2><p><a href="mailto:{email}">{email}</a></p></section>"#,
            title = html_escape(m.get("contact_hero_title")),
            subtitle = html_escape(m.get("contact_hero_subtitle")),
            visit = html_escape(m.get("contact_visit_title")),
            street = html_escape(m.get("address_street")),
            city = html_escape(m.get("address_city")),
            zip = html_escape(m.get("address_zip")),
            country = html_escape(m.get("address_country")),
            call = html_escape(m.get("contact_call_title")),
            phone = html_escape(phone),
            email_title = html_escape(m.get("contact_email_title")),
            email = html_escape(m.get("site_email")),
        )
    })
}

pub async fn privacy(State(state): State<Arc<AppState>>, ResolvedLocale(locale): ResolvedLocale) -> impl IntoResponse {
    render(&state, locale, PageKind::Privacy, |m| {
        format!(
            r#"<section class="container"><h1>{}</h1><p>{}</p></section>"#,
            html_escape(m.get("privacy_title")),
            html_escape(m.get("privacy_intro"))
        )
    })
}

pub async fn terms(State(state): State<Arc<AppState>>, ResolvedLocale(locale): ResolvedLocale) -> impl IntoResponse {
    render(&state, locale, PageKind::Terms, |m| {
        format!(
            r#"<section class="container"><h1>{}</h1><p>{}</p></section>"#,
            html_escape(m.get("terms_title")),
            html_escape(m.get("terms_intro"))
        )
    })
}

/// Localized 404 for anything no route claims. Uses the guard's locale when one was
/// resolved, otherwise the default.
pub async fn not_found(State(state): State<Arc<AppState>>, req: Request) -> impl IntoResponse {
    let locale = req
        .extensions()
        .get::<ResolvedLocale>()
        .map(|l| l.0)
        .unwrap_or_else(|| state.locales.default_locale());
    let m = state.translations.messages(locale);

    let head = PageHead {
        locale,
        title: meta_title(Some(m.get("not_found_title"))),
        description: m.get("not_found_body").to_string(),
        canonical: state.site.canonical_url("", locale),
        alternates: Vec::new(),
        structured_data: serde_json::Value::Null,
    };
    let content = format!(
        r#"<section class="container"><h1>404</h1><h2>{}</h2><p>{}</p><a class="cta" href="/{}">{}</a></section>"#,
        html_escape(m.get("not_found_title")),
        html_escape(m.get("not_found_body")),
        locale.code(),
        html_escape(m.get("not_found_back")),
    );

    (
        StatusCode::NOT_FOUND,
        Html(build_page(&head, &m, &state.locales, "", &content)),
    )
}
