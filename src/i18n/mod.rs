//! Language resolution core.
//!
//! Decides which language a request runs in without putting the language in
//! the URL path.
//!
//! # Architecture
//!
//! - `registry`: the configured, ordered set of supported languages
//! - `negotiation`: Accept-Language parsing and matching with region fallback
//! - `resolver`: the session > cookie > header > default precedence chain
//! - `language`: the per-request active language handle
//! - `metrics`: counters for which signal decided each request
//!
//! # Example
//!
//! ```
//! use noprefix_locale::i18n::{resolve, LanguageSignals, LanguageSource, QualityPolicy, SupportedLanguages};
//!
//! let supported = SupportedLanguages::from_pairs([("ko", "Korean"), ("en", "English")]);
//! let signals = LanguageSignals {
//!     accept_language: Some("ko-KR,ko;q=0.9,en-US;q=0.8"),
//!     ..Default::default()
//! };
//!
//! let resolution = resolve(&signals, &supported, "en", QualityPolicy::Permissive);
//! assert_eq!(resolution.code, "ko");
//! assert_eq!(resolution.source, LanguageSource::Header);
//! ```

mod language;
mod metrics;
mod negotiation;
mod registry;
mod resolver;

pub use language::LanguageContext;
pub use metrics::{MetricsReport, ResolutionMetrics};
pub use negotiation::{
    best_match, negotiate, parse_accept_language, parse_accept_language_with, Candidate,
    QualityPolicy,
};
pub use registry::{SupportedLanguage, SupportedLanguages};
pub use resolver::{resolve, LanguageResolver, LanguageSignals, LanguageSource, Resolution};
