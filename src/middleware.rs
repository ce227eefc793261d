//! Request interceptor.
//!
//! Before the handler runs, the request language is resolved and exposed as a
//! [`LanguageContext`] extension. After the handler, the (possibly changed)
//! active language is compared with what the client already had stored and
//! written back to session and cookie only when it differs.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{debug, info, warn};

use crate::config::LocaleConfig;
use crate::cookie::{get_cookie, SetCookie};
use crate::i18n::{LanguageContext, LanguageResolver, LanguageSignals, Resolution, ResolutionMetrics};
use crate::session::Session;

/// The raw `Accept-Language` header, if present and readable.
pub fn accept_language_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
}

/// Shared, read-only state of the interceptor.
#[derive(Clone)]
pub struct LocaleState {
    resolver: LanguageResolver,
    metrics: Arc<ResolutionMetrics>,
}

/// A request between resolution and persistence.
#[derive(Debug)]
pub struct ResolvedRequest {
    pub context: LanguageContext,
    pub resolution: Resolution,
    session: Option<Session>,
    /// What the client already has stored: the session value when a session
    /// is attached, otherwise the cookie value.
    stored: Option<String>,
}

impl LocaleState {
    pub fn new(config: Arc<LocaleConfig>) -> Self {
        Self::with_metrics(config, Arc::new(ResolutionMetrics::new()))
    }

    pub fn with_metrics(config: Arc<LocaleConfig>, metrics: Arc<ResolutionMetrics>) -> Self {
        Self {
            resolver: LanguageResolver::new(config),
            metrics,
        }
    }

    pub fn config(&self) -> &LocaleConfig {
        self.resolver.config()
    }

    pub fn resolver(&self) -> &LanguageResolver {
        &self.resolver
    }

    pub fn metrics(&self) -> &Arc<ResolutionMetrics> {
        &self.metrics
    }

    /// Resolve the request language, activate it, and attach the context to
    /// the request. Returns the active code.
    pub fn resolve_and_activate(&self, request: &mut Request) -> String {
        self.begin(request).context.current()
    }

    /// Resolve and attach the language context, keeping what is needed to
    /// decide persistence once the handler has run.
    pub fn begin(&self, request: &mut Request) -> ResolvedRequest {
        let config = self.config();
        let session = request.extensions().get::<Session>().cloned();
        let session_value = session
            .as_ref()
            .and_then(|session| session.get(&config.session_key));
        let cookie_value = get_cookie(request.headers(), &config.cookie.name).map(str::to_string);

        let resolution = self.resolver.resolve(&LanguageSignals {
            session: session_value.as_deref(),
            cookie: cookie_value.as_deref(),
            accept_language: accept_language_header(request.headers()),
        });
        self.metrics.record_resolution(resolution.source);
        debug!(
            "Resolved language {} from {} for {}",
            resolution.code,
            resolution.source,
            request.uri().path()
        );

        let context = LanguageContext::new(config.languages.clone(), resolution.code.clone());
        request.extensions_mut().insert(context.clone());

        let stored = if session.is_some() {
            session_value
        } else {
            cookie_value
        };

        ResolvedRequest {
            context,
            resolution,
            session,
            stored,
        }
    }

    /// Persist the post-handling language if it changed, and label the response.
    pub fn finish(&self, resolved: &ResolvedRequest, response: &mut Response) {
        let current = resolved.context.current();

        if resolved.stored.as_deref() != Some(current.as_str()) {
            self.persist(resolved, &current, response);
        }

        let headers = response.headers_mut();
        if !headers.contains_key(header::CONTENT_LANGUAGE) {
            if let Ok(value) = HeaderValue::from_str(&current) {
                headers.insert(header::CONTENT_LANGUAGE, value);
            }
        }
        headers.append(header::VARY, HeaderValue::from_static("Accept-Language, Cookie"));
    }

    fn persist(&self, resolved: &ResolvedRequest, current: &str, response: &mut Response) {
        let config = self.config();

        if let Some(session) = &resolved.session {
            session.insert(config.session_key.as_str(), current);
        }

        let cookie = SetCookie::from_policy(&config.cookie, current).to_string();
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => {
                warn!("Could not encode language cookie for {}: {}", current, e);
                return;
            }
        }

        self.metrics.record_persistence_write();
        info!(
            "Persisted language {} (previously {:?}, session: {})",
            current,
            resolved.stored,
            resolved.session.is_some()
        );
    }
}

/// Axum middleware wrapping [`LocaleState::begin`] and [`LocaleState::finish`].
///
/// Install it inside the session layer so the [`Session`] extension is
/// visible; without one, only the cookie is used.
pub async fn locale_middleware(
    State(locale): State<LocaleState>,
    mut request: Request,
    next: Next,
) -> Response {
    let resolved = locale.begin(&mut request);
    let mut response = next.run(request).await;
    locale.finish(&resolved, &mut response);
    response
}
