//! Language resolution metrics.
//!
//! Counts which signal decided each request's language, how often the
//! interceptor persisted a change, and how many change requests were refused.
//! One instance is shared by the application state; there is no global.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::i18n::LanguageSource;

#[derive(Debug, Default)]
pub struct ResolutionMetrics {
    /// Requests resolved from the session value
    from_session: AtomicUsize,

    /// Requests resolved from the persistence cookie
    from_cookie: AtomicUsize,

    /// Requests resolved by Accept-Language negotiation
    from_header: AtomicUsize,

    /// Requests that fell back to the default language
    from_default: AtomicUsize,

    /// Responses that wrote the language to session and/or cookie
    persistence_writes: AtomicUsize,

    /// Change-language requests with an unsupported code or a bad body
    rejected_changes: AtomicUsize,
}

impl ResolutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one resolution by its source.
    pub fn record_resolution(&self, source: LanguageSource) {
        let counter = match source {
            LanguageSource::Session => &self.from_session,
            LanguageSource::Cookie => &self.from_cookie,
            LanguageSource::Header => &self.from_header,
            LanguageSource::Default => &self.from_default,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a response that wrote the language back to session or cookie.
    pub fn record_persistence_write(&self) {
        self.persistence_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a change request refused for a bad code or body.
    pub fn record_rejected_change(&self) {
        self.rejected_changes.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of resolutions decided by `source`.
    pub fn resolutions(&self, source: LanguageSource) -> usize {
        match source {
            LanguageSource::Session => self.from_session.load(Ordering::Relaxed),
            LanguageSource::Cookie => self.from_cookie.load(Ordering::Relaxed),
            LanguageSource::Header => self.from_header.load(Ordering::Relaxed),
            LanguageSource::Default => self.from_default.load(Ordering::Relaxed),
        }
    }

    /// Number of persistence writes so far.
    pub fn persistence_writes(&self) -> usize {
        self.persistence_writes.load(Ordering::Relaxed)
    }

    /// Number of rejected change requests so far.
    pub fn rejected_changes(&self) -> usize {
        self.rejected_changes.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let from_session = self.resolutions(LanguageSource::Session);
        let from_cookie = self.resolutions(LanguageSource::Cookie);
        let from_header = self.resolutions(LanguageSource::Header);
        let from_default = self.resolutions(LanguageSource::Default);
        let total = from_session + from_cookie + from_header + from_default;

        let fallback_rate = if total > 0 {
            (from_default as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            total_resolutions: total,
            from_session,
            from_cookie,
            from_header,
            from_default,
            fallback_rate,
            persistence_writes: self.persistence_writes(),
            rejected_changes: self.rejected_changes(),
        }
    }
}

/// Snapshot of the resolution counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub total_resolutions: usize,
    pub from_session: usize,
    pub from_cookie: usize,
    pub from_header: usize,
    pub from_default: usize,

    /// Share of resolutions that ended at the default language (0-100)
    pub fallback_rate: f64,

    pub persistence_writes: usize,
    pub rejected_changes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Counter Tests ====================

    #[test]
    fn test_record_resolution_per_source() {
        let metrics = ResolutionMetrics::new();
        metrics.record_resolution(LanguageSource::Session);
        metrics.record_resolution(LanguageSource::Session);
        metrics.record_resolution(LanguageSource::Cookie);
        metrics.record_resolution(LanguageSource::Header);

        assert_eq!(metrics.resolutions(LanguageSource::Session), 2);
        assert_eq!(metrics.resolutions(LanguageSource::Cookie), 1);
        assert_eq!(metrics.resolutions(LanguageSource::Header), 1);
        assert_eq!(metrics.resolutions(LanguageSource::Default), 0);
    }

    #[test]
    fn test_record_writes_and_rejections() {
        let metrics = ResolutionMetrics::new();
        metrics.record_persistence_write();
        metrics.record_rejected_change();
        metrics.record_rejected_change();

        assert_eq!(metrics.persistence_writes(), 1);
        assert_eq!(metrics.rejected_changes(), 2);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let report = ResolutionMetrics::new().report();
        assert_eq!(report.total_resolutions, 0);
        assert_eq!(report.fallback_rate, 0.0);
    }

    #[test]
    fn test_report_fallback_rate() {
        let metrics = ResolutionMetrics::new();
        metrics.record_resolution(LanguageSource::Default);
        metrics.record_resolution(LanguageSource::Header);
        metrics.record_resolution(LanguageSource::Header);
        metrics.record_resolution(LanguageSource::Session);

        let report = metrics.report();
        assert_eq!(report.total_resolutions, 4);
        assert_eq!(report.from_default, 1);
        assert_eq!(report.from_header, 2);
        assert!((report.fallback_rate - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_serialization() {
        let metrics = ResolutionMetrics::new();
        metrics.record_resolution(LanguageSource::Cookie);
        let json = serde_json::to_value(metrics.report()).expect("Should serialize");

        assert_eq!(json["total_resolutions"], 1);
        assert_eq!(json["from_cookie"], 1);
        assert_eq!(json["persistence_writes"], 0);
    }
}
