//! Supported languages: the closed set of codes the application may activate.
//!
//! The list is assembled once from configuration and shared read-only across
//! requests. Codes are opaque strings compared exactly; no case or region
//! normalization happens here.

use std::collections::HashSet;

/// A single configured language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedLanguage {
    /// Language code as configured (e.g., "ko", "en", "zh-hans")
    pub code: String,

    /// Human-readable name (e.g., "Korean", "English")
    pub name: String,
}

impl SupportedLanguage {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Ordered list of supported languages.
///
/// Order is preserved from configuration so that selectors and choice lists
/// render in the order the operator wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportedLanguages {
    languages: Vec<SupportedLanguage>,
}

impl SupportedLanguages {
    pub fn new(languages: Vec<SupportedLanguage>) -> Self {
        Self { languages }
    }

    /// Build from `(code, name)` pairs.
    pub fn from_pairs<C, N>(pairs: impl IntoIterator<Item = (C, N)>) -> Self
    where
        C: Into<String>,
        N: Into<String>,
    {
        Self {
            languages: pairs
                .into_iter()
                .map(|(code, name)| SupportedLanguage::new(code, name))
                .collect(),
        }
    }

    /// Parse the `code:Name,code:Name` form used by `LOCALE_LANGUAGES`.
    ///
    /// A bare `code` without a name uses the code as its name. Empty items
    /// are skipped; an item with an empty code is an error.
    pub fn parse_list(raw: &str) -> Result<Self, String> {
        let mut languages = Vec::new();
        for item in raw.split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let (code, name) = match item.split_once(':') {
                Some((code, name)) => (code.trim(), name.trim()),
                None => (item, item),
            };
            if code.is_empty() {
                return Err(format!("language entry '{}' has an empty code", item));
            }
            let name = if name.is_empty() { code } else { name };
            languages.push(SupportedLanguage::new(code, name));
        }
        Ok(Self { languages })
    }

    /// Get a language by its exact code.
    pub fn get_by_code(&self, code: &str) -> Option<&SupportedLanguage> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Exact, case-sensitive membership test.
    pub fn is_valid(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    /// Display name for a code, if supported.
    pub fn display_name(&self, code: &str) -> Option<&str> {
        self.get_by_code(code).map(|lang| lang.name.as_str())
    }

    /// `(code, name)` pairs in configured order, for selectors and form choices.
    pub fn choices(&self) -> Vec<(&str, &str)> {
        self.languages
            .iter()
            .map(|lang| (lang.code.as_str(), lang.name.as_str()))
            .collect()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(|lang| lang.code.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SupportedLanguage> {
        self.languages.iter()
    }

    pub fn first(&self) -> Option<&SupportedLanguage> {
        self.languages.first()
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// Codes that appear more than once, in first-repeat order.
    pub fn duplicate_codes(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for code in self.codes() {
            if !seen.insert(code) && !duplicates.contains(&code) {
                duplicates.push(code);
            }
        }
        duplicates
    }
}
