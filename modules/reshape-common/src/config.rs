use std::env;

use crate::locale::LocaleSettings;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Public site
    pub site_url: String,
    pub locales: LocaleSettings,

    // Admin
    pub admin_username: String,
    pub admin_password: String,
    pub session_secret: String,

    // IndexNow (empty disables submission)
    pub indexnow_key: String,

    // Web Vitals buffer
    pub vitals_capacity: usize,
}

pub const DEFAULT_SITE_URL: &str = "https://reshape.clinic";
pub const DEFAULT_VITALS_CAPACITY: usize = 1000;

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing or malformed.
    pub fn from_env() -> Self {
        let locales = LocaleSettings::from_codes(
            &env::var("LOCALES").unwrap_or_else(|_| "en,fr,es,zh,ru,ar".to_string()),
            &env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en".to_string()),
        )
        .unwrap_or_else(|e| panic!("invalid locale configuration: {e}"));

        Self {
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
            site_url: env::var("SITE_URL")
                .unwrap_or_else(|_| DEFAULT_SITE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            locales,
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: required_env("ADMIN_PASSWORD"),
            session_secret: env::var("SESSION_SECRET").unwrap_or_default(),
            indexnow_key: env::var("INDEXNOW_KEY").unwrap_or_default(),
            vitals_capacity: env::var("VITALS_CAPACITY")
                .ok()
                .map(|v| v.parse().expect("VITALS_CAPACITY must be a number"))
                .unwrap_or(DEFAULT_VITALS_CAPACITY),
        }
    }

    /// Return the session signing secret. Prefers SESSION_SECRET;
    /// falls back to admin_password (for dev compatibility).
    pub fn session_secret(&self) -> &str {
        if self.session_secret.is_empty() {
            &self.admin_password
        } else {
            &self.session_secret
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
