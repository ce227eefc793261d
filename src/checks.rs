//! Startup checks for the language configuration.

use std::fmt;

use crate::config::{LocaleConfig, SameSite};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A single problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub id: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl ConfigIssue {
    fn error(id: &'static str, message: impl Into<String>) -> Self {
        Self {
            id,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(id: &'static str, message: impl Into<String>) -> Self {
        Self {
            id,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.message)
    }
}

/// Check the language configuration. An empty result means it is sound.
pub fn check_locale_config(config: &LocaleConfig) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if config.languages.is_empty() {
        issues.push(ConfigIssue::error(
            "locale.E001",
            "No supported languages are configured (LOCALE_LANGUAGES is empty)",
        ));
    }

    for code in config.languages.duplicate_codes() {
        issues.push(ConfigIssue::error(
            "locale.E002",
            format!("Language code \"{}\" is listed more than once", code),
        ));
    }

    if config.cookie.name.trim().is_empty() {
        issues.push(ConfigIssue::error(
            "locale.E003",
            "The language cookie name is empty",
        ));
    }

    if !config.languages.is_empty() && !config.is_valid(&config.default_language) {
        issues.push(ConfigIssue::warning(
            "locale.W001",
            format!(
                "Default language \"{}\" is not in the supported languages",
                config.default_language
            ),
        ));
    }

    if config.cookie.same_site == Some(SameSite::None) && !config.cookie.secure {
        issues.push(ConfigIssue::warning(
            "locale.W002",
            "SameSite=None cookies are rejected by browsers unless Secure is set",
        ));
    }

    issues
}
