//! Router assembly and the demo pages.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{FromRef, State},
    middleware,
    routing::get,
    Extension, Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::config::{Config, LocaleConfig};
use crate::i18n::{LanguageContext, MetricsReport};
use crate::middleware::{locale_middleware, LocaleState};
use crate::session::{session_middleware, MemorySessionStore, SessionLayerState, SessionStore};
use crate::views;

#[derive(Clone)]
pub struct AppState {
    pub locale: LocaleState,
    /// `None` runs without sessions; the cookie is then the only store.
    pub sessions: Option<SessionLayerState>,
}

impl AppState {
    pub fn new(locale: Arc<LocaleConfig>) -> Self {
        Self {
            locale: LocaleState::new(locale),
            sessions: None,
        }
    }

    pub fn with_sessions(mut self, store: Arc<dyn SessionStore>, cookie_name: impl Into<String>) -> Self {
        self.sessions = Some(SessionLayerState::new(store, cookie_name));
        self
    }

    /// State for the demo server, with in-memory sessions when enabled.
    pub fn from_config(config: &Config) -> Self {
        let state = Self::new(Arc::new(config.locale.clone()));
        if config.sessions_enabled {
            let store = MemorySessionStore::with_limits(
                Duration::from_secs(config.session_ttl_secs),
                config.session_max_entries,
            );
            state.with_sessions(Arc::new(store), config.session_cookie_name.clone())
        } else {
            state
        }
    }
}

impl FromRef<AppState> for LocaleState {
    fn from_ref(state: &AppState) -> Self {
        state.locale.clone()
    }
}

/// Build the full application router.
///
/// Layer order, outermost first: trace, session, locale. The locale layer
/// must sit inside the session layer to see the request's session.
pub fn build_app(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(home))
        .route("/about/", get(about))
        .route("/api/data/", get(api_data))
        .route("/i18n/metrics", get(metrics))
        .merge(views::routes())
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.locale.clone(),
            locale_middleware,
        ));

    if let Some(sessions) = state.sessions {
        app = app.layer(middleware::from_fn_with_state(sessions, session_middleware));
    }

    app.layer(
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
            )
        }),
    )
}

fn page(title: &str, language: &LanguageContext) -> String {
    let code = language.current();
    let name = language
        .current_display_name()
        .unwrap_or_else(|| code.clone());
    format!("{} | language: {} ({})", title, code, name)
}

async fn home(Extension(language): Extension<LanguageContext>) -> String {
    page("Home", &language)
}

async fn about(Extension(language): Extension<LanguageContext>) -> String {
    page("About", &language)
}

async fn api_data(Extension(language): Extension<LanguageContext>) -> Json<Value> {
    Json(json!({
        "data": "test",
        "language": language.current(),
    }))
}

async fn metrics(State(locale): State<LocaleState>) -> Json<MetricsReport> {
    Json(locale.metrics().report())
}
