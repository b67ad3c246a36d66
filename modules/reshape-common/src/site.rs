use chrono::NaiveDate;

use crate::locale::Locale;

pub struct PostalAddress {
    pub street: &'static str,
    pub city: &'static str,
    pub zip: &'static str,
    pub country: &'static str,
}

/// Static facts about the clinic.
pub struct SiteInfo {
    pub name: &'static str,
    pub legal_name: &'static str,
    pub brand_name: &'static str,
    pub tagline: &'static str,
    pub description: &'static str,
    pub domain: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub address: PostalAddress,
    pub latitude: f64,
    pub longitude: f64,
    pub social_profiles: &'static [&'static str],
}

pub const SITE_INFO: SiteInfo = SiteInfo {
    name: "Reshape",
    legal_name: "Reshape Clinic",
    brand_name: "Reshape Medical Clinic",
    tagline: "Medical Excellence Through Precision",
    description: "Where science meets transformation. Medical precision, aesthetic excellence, and authentic transformation through evidence-based treatments.",
    domain: "reshape.clinic",
    email: "media@reshape.clinic",
    phone: "+44 (0)7909 843543",
    address: PostalAddress {
        street: "20 Fitzroy Square",
        city: "London",
        zip: "W1T 6EJ",
        country: "UK",
    },
    latitude: 51.5194,
    longitude: -0.1436,
    social_profiles: &[
        "https://twitter.com/reshapeclinic",
        "https://instagram.com/reshapeclinic",
        "https://linkedin.com/company/reshape-clinic",
        "https://facebook.com/reshapeclinic",
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFrequency {
    Weekly,
    Monthly,
}

impl ChangeFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
        }
    }
}

/// A public, indexable page. `path` is relative to the locale prefix; the home page is `""`.
pub struct PublicRoute {
    pub path: &'static str,
    pub last_modified: (i32, u32, u32),
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

impl PublicRoute {
    pub fn last_modified_date(&self) -> Option<NaiveDate> {
        let (y, m, d) = self.last_modified;
        NaiveDate::from_ymd_opt(y, m, d)
    }
}

pub const PUBLIC_ROUTES: &[PublicRoute] = &[
    PublicRoute {
        path: "",
        last_modified: (2025, 6, 17),
        change_frequency: ChangeFrequency::Weekly,
        priority: 1.0,
    },
    PublicRoute {
        path: "/services",
        last_modified: (2025, 6, 15),
        change_frequency: ChangeFrequency::Monthly,
        priority: 0.9,
    },
    PublicRoute {
        path: "/contact",
        last_modified: (2025, 6, 15),
        change_frequency: ChangeFrequency::Monthly,
        priority: 0.8,
    },
    PublicRoute {
        path: "/privacy",
        last_modified: (2025, 6, 10),
        change_frequency: ChangeFrequency::Monthly,
        priority: 0.8,
    },
    PublicRoute {
        path: "/terms",
        last_modified: (2025, 6, 10),
        change_frequency: ChangeFrequency::Monthly,
        priority: 0.8,
    },
];

/// URL builder rooted at the public base URL.
#[derive(Debug, Clone)]
pub struct Site {
    base_url: String,
}

impl Site {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Host part of the base URL, used to validate IndexNow submissions.
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }

    /// Absolute URL for `path`, prefixed with `/{locale}` when a locale is given.
    /// Duplicate slashes collapse and the result never ends with a slash.
    pub fn absolute_url(&self, path: &str, locale: Option<Locale>) -> String {
        let mut out = self.base_url.clone();
        if let Some(locale) = locale {
            out.push('/');
            out.push_str(locale.code());
        }
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            out.push('/');
            out.push_str(segment);
        }
        out
    }

    pub fn canonical_url(&self, path: &str, locale: Locale) -> String {
        self.absolute_url(path, Some(locale))
    }
}

/// `"{page} | Reshape"`, or just the site name.
pub fn meta_title(page: Option<&str>) -> String {
    match page {
        Some(page) if !page.is_empty() => format!("{page} | {}", SITE_INFO.name),
        _ => SITE_INFO.name.to_string(),
    }
}
