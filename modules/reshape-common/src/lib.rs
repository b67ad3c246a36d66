pub mod config;
pub mod cookies;
pub mod crawlers;
pub mod error;
pub mod i18n;
pub mod locale;
pub mod marketing;
pub mod routing;
pub mod site;
pub mod vitals;

pub use config::Config;
pub use error::{ReshapeError, Result};
pub use i18n::{Messages, Translations};
pub use locale::{Locale, LocaleSettings, TextDirection};
pub use routing::{resolve, RequestContext, Resolution, RoutingRules};
pub use site::{Site, SITE_INFO};
