//! Per-request language resolution without URL prefixes.
//!
//! Each request's language comes from the session, then the language cookie,
//! then `Accept-Language`, then the configured default. Changes made while
//! handling a request are written back to session and cookie.

pub mod app;
pub mod checks;
pub mod config;
pub mod cookie;
pub mod error;
pub mod i18n;
pub mod middleware;
pub mod redirect;
pub mod session;
pub mod views;

pub use app::{build_app, AppState};
pub use config::{Config, CookiePolicy, LocaleConfig, SameSite};
pub use error::ChangeLanguageError;
pub use i18n::{LanguageContext, LanguageResolver, LanguageSource, SupportedLanguages};
pub use middleware::{locale_middleware, LocaleState};
