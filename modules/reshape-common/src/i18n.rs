use std::collections::HashMap;

use crate::error::{ReshapeError, Result};
use crate::locale::{Locale, LocaleSettings};

type Bundle = HashMap<String, String>;

fn bundle_source(locale: Locale) -> &'static str {
    match locale {
        Locale::En => include_str!("../locales/en.json"),
        Locale::Fr => include_str!("../locales/fr.json"),
        Locale::Es => include_str!("../locales/es.json"),
        Locale::Zh => include_str!("../locales/zh.json"),
        Locale::Ru => include_str!("../locales/ru.json"),
        Locale::Ar => include_str!("../locales/ar.json"),
    }
}

/// Message bundles for every supported locale, parsed once at startup.
/// Lookups fall back to the default locale, then English, then the key itself.
#[derive(Debug, Clone)]
pub struct Translations {
    bundles: HashMap<Locale, Bundle>,
    default: Locale,
}

impl Translations {
    pub fn load(settings: &LocaleSettings) -> Result<Self> {
        let mut bundles = HashMap::new();
        let mut wanted = settings.supported().to_vec();
        if !wanted.contains(&Locale::En) {
            wanted.push(Locale::En);
        }
        for locale in wanted {
            let bundle: Bundle = serde_json::from_str(bundle_source(locale)).map_err(|e| {
                ReshapeError::Config(format!("invalid message bundle for '{locale}': {e}"))
            })?;
            bundles.insert(locale, bundle);
        }
        Ok(Self {
            bundles,
            default: settings.default_locale(),
        })
    }

    pub fn messages(&self, locale: Locale) -> Messages<'_> {
        Messages {
            locale,
            chain: [locale, self.default, Locale::En]
                .iter()
                .filter_map(|l| self.bundles.get(l))
                .collect(),
        }
    }
}

/// Messages for one locale with the fallback chain applied.
pub struct Messages<'a> {
    pub locale: Locale,
    chain: Vec<&'a Bundle>,
}

impl<'a> Messages<'a> {
    pub fn get<'k>(&'k self, key: &'k str) -> &'k str {
        self.chain
            .iter()
            .find_map(|bundle| bundle.get(key))
            .map(String::as_str)
            .unwrap_or(key)
    }

    /// Look up `key` and replace `{name}` placeholders.
    pub fn format(&self, key: &str, values: &[(&str, &str)]) -> String {
        let mut text = self.get(key).to_string();
        for (name, value) in values {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}
