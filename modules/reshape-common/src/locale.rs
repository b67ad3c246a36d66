use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReshapeError, Result};

/// Name of the cookie that caches the last resolved locale.
pub const LOCALE_COOKIE: &str = "locale";

/// One year.
pub const LOCALE_COOKIE_MAX_AGE_SECS: i64 = 365 * 24 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Fr,
    Es,
    Zh,
    Ru,
    Ar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

impl Locale {
    pub const ALL: [Locale; 6] = [
        Locale::En,
        Locale::Fr,
        Locale::Es,
        Locale::Zh,
        Locale::Ru,
        Locale::Ar,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
            Locale::Es => "es",
            Locale::Zh => "zh",
            Locale::Ru => "ru",
            Locale::Ar => "ar",
        }
    }

    /// Exact, case-sensitive match against the known codes.
    pub fn from_code(code: &str) -> Option<Locale> {
        Locale::ALL.into_iter().find(|l| l.code() == code)
    }

    pub fn direction(self) -> TextDirection {
        match self {
            Locale::Ar => TextDirection::Rtl,
            _ => TextDirection::Ltr,
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Fr => "French",
            Locale::Es => "Spanish",
            Locale::Zh => "Chinese",
            Locale::Ru => "Russian",
            Locale::Ar => "Arabic",
        }
    }

    pub fn native_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Fr => "Français",
            Locale::Es => "Español",
            Locale::Zh => "中文",
            Locale::Ru => "Русский",
            Locale::Ar => "العربية",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The supported locale set and its default. Built once at startup.
#[derive(Debug, Clone)]
pub struct LocaleSettings {
    supported: Vec<Locale>,
    default: Locale,
}

impl LocaleSettings {
    pub fn new(supported: Vec<Locale>, default: Locale) -> Result<Self> {
        if supported.is_empty() {
            return Err(ReshapeError::Config(
                "at least one locale must be supported".to_string(),
            ));
        }
        if !supported.contains(&default) {
            return Err(ReshapeError::Config(format!(
                "default locale '{default}' is not in the supported set"
            )));
        }
        let mut deduped = Vec::with_capacity(supported.len());
        for locale in supported {
            if !deduped.contains(&locale) {
                deduped.push(locale);
            }
        }
        Ok(Self {
            supported: deduped,
            default,
        })
    }

    /// Parse a comma-separated code list such as `en,fr,ar`.
    pub fn from_codes(codes: &str, default: &str) -> Result<Self> {
        let mut supported = Vec::new();
        for code in codes.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            let locale = Locale::from_code(code)
                .ok_or_else(|| ReshapeError::Config(format!("unknown locale '{code}'")))?;
            supported.push(locale);
        }
        let default = Locale::from_code(default.trim())
            .ok_or_else(|| ReshapeError::Config(format!("unknown default locale '{default}'")))?;
        Self::new(supported, default)
    }

    pub fn supported(&self) -> &[Locale] {
        &self.supported
    }

    pub fn default_locale(&self) -> Locale {
        self.default
    }

    pub fn is_supported(&self, locale: Locale) -> bool {
        self.supported.contains(&locale)
    }

    /// A URL segment or cookie value naming a supported locale.
    pub fn parse(&self, value: &str) -> Option<Locale> {
        Locale::from_code(value).filter(|l| self.is_supported(*l))
    }

    /// Primary subtag of a language tag, compared case-insensitively (`fr-FR` -> `fr`).
    pub fn parse_primary_subtag(&self, tag: &str) -> Option<Locale> {
        let primary = tag.split('-').next()?.trim().to_ascii_lowercase();
        self.parse(&primary)
    }
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            supported: Locale::ALL.to_vec(),
            default: Locale::En,
        }
    }
}
