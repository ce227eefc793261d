use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use crate::i18n::{QualityPolicy, SupportedLanguages};
use crate::session::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};

/// One year, in seconds.
pub const DEFAULT_COOKIE_AGE: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,

    // Sessions
    pub sessions_enabled: bool,
    pub session_cookie_name: String,
    /// Idle lifetime of a stored session, in seconds
    pub session_ttl_secs: u64,
    /// Stored sessions kept before evicting the least recently used (0 = no cap)
    pub session_max_entries: usize,

    // Language policy
    pub locale: LocaleConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            sessions_enabled: std::env::var("SESSIONS_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            session_cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "sessionid".to_string()),
            session_ttl_secs: std::env::var("SESSION_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SESSION_TTL.as_secs()),
            session_max_entries: std::env::var("SESSION_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_SESSIONS),

            locale: LocaleConfig::from_env()?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

    /// Parse a configured value. An empty value means "omit the attribute".
    pub fn parse_setting(raw: &str) -> Result<Option<SameSite>> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "strict" => Ok(Some(SameSite::Strict)),
            "lax" => Ok(Some(SameSite::Lax)),
            "none" => Ok(Some(SameSite::None)),
            other => Err(anyhow!("Unsupported SameSite value: '{}'", other)),
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of the language persistence cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub name: String,
    /// `None` produces a browser-session cookie.
    pub max_age: Option<u64>,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            name: "language".to_string(),
            max_age: Some(DEFAULT_COOKIE_AGE),
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: false,
            same_site: Some(SameSite::Lax),
        }
    }
}

impl CookiePolicy {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            name: std::env::var("LOCALE_COOKIE_NAME").unwrap_or(defaults.name),
            max_age: match std::env::var("LOCALE_COOKIE_AGE") {
                Ok(v) if v.trim().is_empty() => None,
                Ok(v) => v.trim().parse().ok().or(defaults.max_age),
                Err(_) => defaults.max_age,
            },
            path: std::env::var("LOCALE_COOKIE_PATH").unwrap_or(defaults.path),
            domain: std::env::var("LOCALE_COOKIE_DOMAIN")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            secure: std::env::var("LOCALE_COOKIE_SECURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.secure),
            http_only: std::env::var("LOCALE_COOKIE_HTTPONLY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.http_only),
            same_site: match std::env::var("LOCALE_COOKIE_SAMESITE") {
                Ok(v) => SameSite::parse_setting(&v).context("Invalid LOCALE_COOKIE_SAMESITE")?,
                Err(_) => defaults.same_site,
            },
        })
    }
}

/// Language resolution policy, assembled once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    pub languages: Arc<SupportedLanguages>,
    pub default_language: String,
    pub cookie: CookiePolicy,
    /// Session key holding the persisted language code.
    pub session_key: String,
    pub quality_policy: QualityPolicy,
}

impl LocaleConfig {
    pub fn new(languages: SupportedLanguages, default_language: impl Into<String>) -> Self {
        Self {
            languages: Arc::new(languages),
            default_language: default_language.into(),
            cookie: CookiePolicy::default(),
            session_key: "language".to_string(),
            quality_policy: QualityPolicy::Permissive,
        }
    }

    pub fn with_cookie(mut self, cookie: CookiePolicy) -> Self {
        self.cookie = cookie;
        self
    }

    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    pub fn with_quality_policy(mut self, policy: QualityPolicy) -> Self {
        self.quality_policy = policy;
        self
    }

    pub fn from_env() -> Result<Self> {
        let raw_languages =
            std::env::var("LOCALE_LANGUAGES").unwrap_or_else(|_| "en:English".to_string());
        let languages = SupportedLanguages::parse_list(&raw_languages)
            .map_err(|e| anyhow!(e))
            .context("Invalid LOCALE_LANGUAGES")?;

        let strict = std::env::var("LOCALE_STRICT_QUALITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);

        Ok(Self::new(
            languages,
            std::env::var("LOCALE_DEFAULT_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
        )
        .with_cookie(CookiePolicy::from_env()?)
        .with_session_key(
            std::env::var("LOCALE_SESSION_KEY").unwrap_or_else(|_| "language".to_string()),
        )
        .with_quality_policy(if strict {
            QualityPolicy::Strict
        } else {
            QualityPolicy::Permissive
        }))
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn is_valid(&self, code: &str) -> bool {
        self.languages.is_valid(code)
    }

    pub fn language_display_name(&self, code: &str) -> Option<&str> {
        self.languages.display_name(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const LOCALE_VARS: &[&str] = &[
        "LOCALE_LANGUAGES",
        "LOCALE_DEFAULT_LANGUAGE",
        "LOCALE_COOKIE_NAME",
        "LOCALE_COOKIE_AGE",
        "LOCALE_COOKIE_PATH",
        "LOCALE_COOKIE_DOMAIN",
        "LOCALE_COOKIE_SECURE",
        "LOCALE_COOKIE_HTTPONLY",
        "LOCALE_COOKIE_SAMESITE",
        "LOCALE_SESSION_KEY",
        "LOCALE_STRICT_QUALITY",
        "HOST",
        "PORT",
        "SESSIONS_ENABLED",
        "SESSION_COOKIE_NAME",
        "SESSION_TTL",
        "SESSION_MAX_ENTRIES",
    ];

    fn clear_env() {
        for var in LOCALE_VARS {
            std::env::remove_var(var);
        }
    }

    // ==================== Default Tests ====================

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = Config::from_env().expect("Should load defaults");

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.sessions_enabled);
        assert_eq!(config.session_cookie_name, "sessionid");
        assert_eq!(config.session_ttl_secs, 1_209_600);
        assert_eq!(config.session_max_entries, 10_000);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");

        let locale = &config.locale;
        assert_eq!(locale.languages.choices(), vec![("en", "English")]);
        assert_eq!(locale.default_language(), "en");
        assert_eq!(locale.session_key, "language");
        assert_eq!(locale.quality_policy, QualityPolicy::Permissive);
        assert_eq!(locale.cookie, CookiePolicy::default());
    }

    #[test]
    fn test_cookie_policy_default() {
        let policy = CookiePolicy::default();
        assert_eq!(policy.name, "language");
        assert_eq!(policy.max_age, Some(31_536_000));
        assert_eq!(policy.path, "/");
        assert_eq!(policy.domain, None);
        assert!(!policy.secure);
        assert!(!policy.http_only);
        assert_eq!(policy.same_site, Some(SameSite::Lax));
    }

    // ==================== Override Tests ====================

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("LOCALE_LANGUAGES", "ko:Korean,en:English,ja:Japanese");
        std::env::set_var("LOCALE_DEFAULT_LANGUAGE", "ko");
        std::env::set_var("LOCALE_COOKIE_NAME", "lang");
        std::env::set_var("LOCALE_COOKIE_AGE", "600");
        std::env::set_var("LOCALE_COOKIE_PATH", "/app");
        std::env::set_var("LOCALE_COOKIE_DOMAIN", "example.com");
        std::env::set_var("LOCALE_COOKIE_SECURE", "true");
        std::env::set_var("LOCALE_COOKIE_HTTPONLY", "true");
        std::env::set_var("LOCALE_COOKIE_SAMESITE", "strict");
        std::env::set_var("LOCALE_SESSION_KEY", "_lang");
        std::env::set_var("LOCALE_STRICT_QUALITY", "true");
        std::env::set_var("PORT", "9000");
        std::env::set_var("SESSIONS_ENABLED", "false");
        std::env::set_var("SESSION_TTL", "3600");
        std::env::set_var("SESSION_MAX_ENTRIES", "50");

        let config = Config::from_env().expect("Should load overrides");
        clear_env();

        assert_eq!(config.port, 9000);
        assert!(!config.sessions_enabled);
        assert_eq!(config.session_ttl_secs, 3600);
        assert_eq!(config.session_max_entries, 50);

        let locale = config.locale;
        assert_eq!(locale.languages.len(), 3);
        assert_eq!(locale.default_language(), "ko");
        assert_eq!(locale.session_key, "_lang");
        assert_eq!(locale.quality_policy, QualityPolicy::Strict);
        assert_eq!(
            locale.cookie,
            CookiePolicy {
                name: "lang".to_string(),
                max_age: Some(600),
                path: "/app".to_string(),
                domain: Some("example.com".to_string()),
                secure: true,
                http_only: true,
                same_site: Some(SameSite::Strict),
            }
        );
    }

    #[test]
    #[serial]
    fn test_unparsable_numbers_fall_back_to_defaults() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");
        std::env::set_var("LOCALE_COOKIE_AGE", "forever");
        std::env::set_var("LOCALE_COOKIE_SECURE", "maybe");

        let config = Config::from_env().expect("Should load");
        clear_env();

        assert_eq!(config.port, 8080);
        assert_eq!(config.locale.cookie.max_age, Some(DEFAULT_COOKIE_AGE));
        assert!(!config.locale.cookie.secure);
    }

    #[test]
    #[serial]
    fn test_empty_cookie_age_means_session_cookie() {
        clear_env();
        std::env::set_var("LOCALE_COOKIE_AGE", "");
        std::env::set_var("LOCALE_COOKIE_SAMESITE", "");

        let policy = CookiePolicy::from_env().expect("Should load");
        clear_env();

        assert_eq!(policy.max_age, None);
        assert_eq!(policy.same_site, None);
    }

    // ==================== Error Tests ====================

    #[test]
    #[serial]
    fn test_invalid_same_site_is_an_error() {
        clear_env();
        std::env::set_var("LOCALE_COOKIE_SAMESITE", "sometimes");

        let result = LocaleConfig::from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("LOCALE_COOKIE_SAMESITE"));
    }

    #[test]
    #[serial]
    fn test_invalid_language_list_is_an_error() {
        clear_env();
        std::env::set_var("LOCALE_LANGUAGES", "en:English,:Broken");

        let result = LocaleConfig::from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("LOCALE_LANGUAGES"));
    }

    // ==================== Builder Tests ====================

    #[test]
    fn test_builder_methods() {
        let config = LocaleConfig::new(
            SupportedLanguages::from_pairs([("ko", "Korean"), ("en", "English")]),
            "en",
        )
        .with_session_key("lang")
        .with_quality_policy(QualityPolicy::Strict);

        assert_eq!(config.session_key, "lang");
        assert_eq!(config.quality_policy, QualityPolicy::Strict);
        assert!(config.is_valid("ko"));
        assert!(!config.is_valid("KO"));
        assert_eq!(config.language_display_name("ko"), Some("Korean"));
        assert_eq!(config.language_display_name("fr"), None);
    }

    #[test]
    fn test_same_site_parse_setting() {
        assert_eq!(SameSite::parse_setting("Lax").unwrap(), Some(SameSite::Lax));
        assert_eq!(SameSite::parse_setting(" NONE ").unwrap(), Some(SameSite::None));
        assert_eq!(SameSite::parse_setting("").unwrap(), None);
        assert!(SameSite::parse_setting("loose").is_err());
        assert_eq!(SameSite::Strict.to_string(), "Strict");
    }
}
