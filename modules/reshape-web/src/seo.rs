//! Search-engine output: hreflang alternates, JSON-LD, robots.txt and sitemap.xml.

use std::sync::Arc;

use axum::{extract::State, http::header, response::IntoResponse};
use serde_json::{json, Value};

use reshape_common::site::{PUBLIC_ROUTES, SITE_INFO};
use reshape_common::{LocaleSettings, Messages, Site};

use crate::templates::html_escape;
use crate::AppState;

/// User agents explicitly welcomed in robots.txt.
pub const AI_CRAWLER_ALLOWLIST: &[&str] = &[
    "Google-Extended",
    "GPTBot",
    "CCBot",
    "anthropic-ai",
    "Claude-Web",
    "bingbot",
    "PerplexityBot",
    "FacebookBot",
    "Applebot",
    "Bytespider",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Home,
    Services,
    Contact,
    Privacy,
    Terms,
}

impl PageKind {
    /// Path below the locale prefix; empty for the home page.
    pub fn path(self) -> &'static str {
        match self {
            PageKind::Home => "",
            PageKind::Services => "/services",
            PageKind::Contact => "/contact",
            PageKind::Privacy => "/privacy",
            PageKind::Terms => "/terms",
        }
    }

    pub fn title_key(self) -> &'static str {
        match self {
            PageKind::Home => "site_name",
            PageKind::Services => "services_title",
            PageKind::Contact => "contact_hero_title",
            PageKind::Privacy => "privacy_title",
            PageKind::Terms => "terms_title",
        }
    }

    pub fn nav_key(self) -> &'static str {
        match self {
            PageKind::Home => "nav_home",
            PageKind::Services => "nav_services",
            PageKind::Contact => "nav_contact",
            PageKind::Privacy => "nav_privacy",
            PageKind::Terms => "nav_terms",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternateLink {
    pub hreflang: String,
    pub href: String,
}

/// One link per supported locale plus `x-default` pointing at the default locale.
pub fn alternate_links(site: &Site, settings: &LocaleSettings, path: &str) -> Vec<AlternateLink> {
    let mut links: Vec<AlternateLink> = settings
        .supported()
        .iter()
        .map(|locale| AlternateLink {
            hreflang: locale.code().to_string(),
            href: site.absolute_url(path, Some(*locale)),
        })
        .collect();
    links.push(AlternateLink {
        hreflang: "x-default".to_string(),
        href: site.absolute_url(path, Some(settings.default_locale())),
    });
    links
}

pub struct Breadcrumb {
    pub name: String,
    pub url: String,
}

pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

/// (question key, answer key) for the services page FAQ.
pub const SERVICES_FAQ: [(&str, &str); 3] = [
    ("faq_1_question", "faq_1_answer"),
    ("faq_2_question", "faq_2_answer"),
    ("faq_3_question", "faq_3_answer"),
];

pub fn faq_items(m: &Messages<'_>) -> Vec<FaqItem> {
    SERVICES_FAQ
        .iter()
        .map(|(q, a)| FaqItem {
            question: m.get(q).to_string(),
            answer: m.get(a).to_string(),
        })
        .collect()
}

fn postal_address(m: &Messages<'_>) -> Value {
    json!({
        "@type": "PostalAddress",
        "streetAddress": m.get("address_street"),
        "addressLocality": m.get("address_city"),
        "postalCode": m.get("address_zip"),
        "addressCountry": m.get("address_country"),
    })
}

/// (title key, description key, procedure type)
const PROCEDURES: [(&str, &str, &str); 3] = [
    (
        "services_regenerative_title",
        "services_regenerative_desc",
        "Non-Surgical Regenerative Treatment",
    ),
    (
        "services_aesthetic_title",
        "services_aesthetic_desc",
        "Minimally Invasive Aesthetic Surgery",
    ),
    (
        "services_longevity_title",
        "services_longevity_desc",
        "Preventive Health Program",
    ),
];

/// schema.org graph for a page: Organization, MedicalClinic, WebSite and WebPage,
/// plus BreadcrumbList, FAQPage and Service when applicable.
pub fn structured_data(
    site: &Site,
    settings: &LocaleSettings,
    m: &Messages<'_>,
    page: PageKind,
    breadcrumbs: &[Breadcrumb],
    faq: &[FaqItem],
) -> Value {
    let base = site.base_url();
    let locale = m.locale;
    let languages: Vec<&str> = settings.supported().iter().map(|l| l.english_name()).collect();

    let mut graph = vec![
        json!({
            "@type": "Organization",
            "@id": format!("{base}/#organization"),
            "name": m.get("site_name"),
            "alternateName": SITE_INFO.brand_name,
            "url": base,
            "logo": {
                "@type": "ImageObject",
                "url": site.absolute_url("/logo.png", None),
                "width": 512,
                "height": 512,
            },
            "contactPoint": {
                "@type": "ContactPoint",
                "telephone": m.get("site_phone"),
                "contactType": "customer service",
                "availableLanguage": languages,
                "areaServed": "GB",
            },
            "sameAs": SITE_INFO.social_profiles,
        }),
        json!({
            "@type": "MedicalClinic",
            "@id": format!("{base}/#medicalclinic"),
            "name": m.get("site_name"),
            "description": m.get("site_description"),
            "url": site.absolute_url("", Some(locale)),
            "telephone": m.get("site_phone"),
            "email": m.get("site_email"),
            "address": postal_address(m),
            "geo": {
                "@type": "GeoCoordinates",
                "latitude": SITE_INFO.latitude,
                "longitude": SITE_INFO.longitude,
            },
            "openingHoursSpecification": [
                {
                    "@type": "OpeningHoursSpecification",
                    "dayOfWeek": ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"],
                    "opens": "09:00",
                    "closes": "18:00",
                },
                {
                    "@type": "OpeningHoursSpecification",
                    "dayOfWeek": "Saturday",
                    "opens": "10:00",
                    "closes": "16:00",
                },
            ],
            "medicalSpecialty": ["PlasticSurgery", "Dermatology", "RegenerativeMedicine"],
            "availableService": PROCEDURES
                .iter()
                .map(|(title, desc, kind)| json!({
                    "@type": "MedicalProcedure",
                    "name": m.get(title),
                    "description": m.get(desc),
                    "procedureType": { "@type": "MedicalProcedureType", "name": kind },
                }))
                .collect::<Vec<_>>(),
            "potentialAction": {
                "@type": "ReserveAction",
                "target": {
                    "@type": "EntryPoint",
                    "urlTemplate": site.absolute_url("/contact", Some(locale)),
                },
            },
        }),
        json!({
            "@type": "WebSite",
            "@id": format!("{base}/#website"),
            "url": base,
            "name": m.get("site_name"),
            "description": m.get("site_description"),
            "publisher": { "@id": format!("{base}/#organization") },
            "inLanguage": locale.code(),
            "potentialAction": {
                "@type": "SearchAction",
                "target": {
                    "@type": "EntryPoint",
                    "urlTemplate": format!("{base}/search?q={{search_term_string}}"),
                },
                "query-input": "required name=search_term_string",
            },
        }),
    ];

    if !breadcrumbs.is_empty() {
        graph.push(json!({
            "@type": "BreadcrumbList",
            "itemListElement": breadcrumbs
                .iter()
                .enumerate()
                .map(|(i, crumb)| json!({
                    "@type": "ListItem",
                    "position": i + 1,
                    "name": crumb.name,
                    "item": crumb.url,
                }))
                .collect::<Vec<_>>(),
        }));
    }

    if !faq.is_empty() {
        graph.push(json!({
            "@type": "FAQPage",
            "mainEntity": faq
                .iter()
                .map(|item| json!({
                    "@type": "Question",
                    "name": item.question,
                    "acceptedAnswer": { "@type": "Answer", "text": item.answer },
                }))
                .collect::<Vec<_>>(),
        }));
    }

    let page_url = site.absolute_url(page.path(), Some(locale));
    let page_name = match page {
        PageKind::Home => m.get("site_name").to_string(),
        other => format!("{} - {}", m.get(other.title_key()), m.get("site_name")),
    };
    graph.push(json!({
        "@type": "WebPage",
        "@id": format!("{page_url}#webpage"),
        "url": page_url,
        "name": page_name,
        "isPartOf": { "@id": format!("{base}/#website") },
        "about": { "@id": format!("{base}/#medicalclinic") },
        "inLanguage": locale.code(),
    }));

    if page == PageKind::Services {
        graph.push(json!({
            "@type": "Service",
            "serviceType": "Medical and Aesthetic Treatments",
            "provider": { "@id": format!("{base}/#medicalclinic") },
            "areaServed": { "@type": "City", "name": SITE_INFO.address.city },
            "hasOfferCatalog": {
                "@type": "OfferCatalog",
                "name": "Medical Services",
                "itemListElement": PROCEDURES
                    .iter()
                    .map(|(title, desc, _)| json!({
                        "@type": "Offer",
                        "itemOffered": {
                            "@type": "Service",
                            "name": m.get(title),
                            "description": m.get(desc),
                        },
                    }))
                    .collect::<Vec<_>>(),
            },
        }));
    }

    json!({
        "@context": "https://schema.org",
        "@graph": graph,
    })
}

pub fn robots(site: &Site) -> String {
    let base = site.base_url();
    let mut out = String::from(
        "User-Agent: *\nAllow: /\nDisallow: /api/\nDisallow: /_next/\nDisallow: /static/\nCrawl-delay: 1\n\n",
    );
    for agent in AI_CRAWLER_ALLOWLIST {
        out.push_str(&format!("User-Agent: {agent}\n"));
    }
    out.push_str("Allow: /\n\n");
    out.push_str(&format!("Host: {base}\nSitemap: {base}/sitemap.xml\n"));
    out
}

pub fn sitemap(site: &Site, settings: &LocaleSettings) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" xmlns:xhtml=\"http://www.w3.org/1999/xhtml\">\n",
    );
    for route in PUBLIC_ROUTES {
        let alternates: String = alternate_links(site, settings, route.path)
            .iter()
            .map(|link| {
                format!(
                    "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\"/>\n",
                    link.hreflang,
                    html_escape(&link.href)
                )
            })
            .collect();
        let lastmod = route
            .last_modified_date()
            .map(|d| format!("    <lastmod>{}</lastmod>\n", d.format("%Y-%m-%d")))
            .unwrap_or_default();

        for locale in settings.supported() {
            out.push_str(&format!(
                "  <url>\n    <loc>{loc}</loc>\n{alternates}{lastmod}    <changefreq>{freq}</changefreq>\n    <priority>{priority:.1}</priority>\n  </url>\n",
                loc = html_escape(&site.absolute_url(route.path, Some(*locale))),
                freq = route.change_frequency.as_str(),
                priority = route.priority,
            ));
        }
    }
    out.push_str("</urlset>\n");
    out
}

pub async fn robots_txt(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        robots(&state.site),
    )
}

pub async fn sitemap_xml(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        sitemap(&state.site, &state.locales),
    )
}
