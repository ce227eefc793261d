//! Per-request active language.
//!
//! `LanguageContext` is the request's "current language", carried in request
//! extensions instead of thread-local or process-wide state. Clones share the
//! same slot, so the interceptor observes changes made by downstream handlers.

use std::sync::{Arc, Mutex, PoisonError};

use crate::i18n::SupportedLanguages;

#[derive(Debug, Clone)]
pub struct LanguageContext {
    supported: Arc<SupportedLanguages>,
    current: Arc<Mutex<String>>,
}

impl LanguageContext {
    /// Create a context whose active language is `initial`.
    ///
    /// `initial` is trusted as-is: it is either a resolved supported code or
    /// the configured default.
    pub fn new(supported: Arc<SupportedLanguages>, initial: impl Into<String>) -> Self {
        Self {
            supported,
            current: Arc::new(Mutex::new(initial.into())),
        }
    }

    /// The language currently active for this request.
    pub fn current(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Switch the active language.
    ///
    /// Returns `false` and leaves the context untouched when `code` is not a
    /// supported language.
    pub fn activate(&self, code: &str) -> bool {
        if !self.supported.is_valid(code) {
            return false;
        }
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = code.to_string();
        true
    }

    pub fn is_valid(&self, code: &str) -> bool {
        self.supported.is_valid(code)
    }

    pub fn display_name(&self, code: &str) -> Option<&str> {
        self.supported.display_name(code)
    }

    /// Display name of the active language, if it is a supported one.
    pub fn current_display_name(&self) -> Option<String> {
        self.display_name(&self.current()).map(str::to_string)
    }

    pub fn supported(&self) -> &SupportedLanguages {
        &self.supported
    }
}
