//! Language resolution: session > cookie > Accept-Language > default.
//!
//! Resolution is a pure function of its inputs. Stored values that are not
//! supported codes are treated as absent and never raise an error.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::LocaleConfig;
use crate::i18n::{best_match, QualityPolicy, SupportedLanguages};

/// Where a resolved language came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageSource {
    Session,
    Cookie,
    Header,
    Default,
}

impl LanguageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageSource::Session => "session",
            LanguageSource::Cookie => "cookie",
            LanguageSource::Header => "header",
            LanguageSource::Default => "default",
        }
    }
}

impl fmt::Display for LanguageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The raw preference signals carried by one request. Every field is optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageSignals<'a> {
    pub session: Option<&'a str>,
    pub cookie: Option<&'a str>,
    pub accept_language: Option<&'a str>,
}

/// The language chosen for a request, with the signal that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub code: String,
    pub source: LanguageSource,
}

/// Resolve the active language from the request signals.
///
/// The default is returned as-is; it is not checked against `supported`.
pub fn resolve(
    signals: &LanguageSignals<'_>,
    supported: &SupportedLanguages,
    default_language: &str,
    policy: QualityPolicy,
) -> Resolution {
    let stored = [
        (signals.session, LanguageSource::Session),
        (signals.cookie, LanguageSource::Cookie),
    ];
    for (value, source) in stored {
        if let Some(code) = value.filter(|code| supported.is_valid(code)) {
            return Resolution {
                code: code.to_string(),
                source,
            };
        }
    }

    if let Some(code) = signals
        .accept_language
        .and_then(|header| best_match(header, supported, policy))
    {
        return Resolution {
            code: code.to_string(),
            source: LanguageSource::Header,
        };
    }

    Resolution {
        code: default_language.to_string(),
        source: LanguageSource::Default,
    }
}

/// Resolver bound to an immutable configuration snapshot.
#[derive(Debug, Clone)]
pub struct LanguageResolver {
    config: Arc<LocaleConfig>,
}

impl LanguageResolver {
    pub fn new(config: Arc<LocaleConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocaleConfig {
        &self.config
    }

    pub fn resolve(&self, signals: &LanguageSignals<'_>) -> Resolution {
        resolve(
            signals,
            &self.config.languages,
            &self.config.default_language,
            self.config.quality_policy,
        )
    }

    pub fn is_valid(&self, code: &str) -> bool {
        self.config.is_valid(code)
    }

    pub fn language_display_name(&self, code: &str) -> Option<&str> {
        self.config.language_display_name(code)
    }
}
