//! Change-language endpoints.
//!
//! - `GET|POST /i18n/set-language/:code/` switches language and redirects.
//!   It never fails: an unsupported code is ignored and the redirect still
//!   happens.
//! - `POST /i18n/set-language-ajax/` takes `{"language": ..., "next": ...}`
//!   and answers with a JSON success or failure payload.
//!
//! Persistence is left to the interceptor, which sees the new active
//! language after the handler returns.

use axum::{
    body::Bytes,
    extract::{FromRef, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::ChangeLanguageError;
use crate::i18n::LanguageContext;
use crate::middleware::LocaleState;
use crate::redirect::{redirect_target, referer, request_host, FALLBACK_REDIRECT};

/// Router with both change-language endpoints.
pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    LocaleState: FromRef<S>,
{
    Router::new()
        .route(
            "/i18n/set-language/:code/",
            get(change_language).post(change_language),
        )
        .route("/i18n/set-language-ajax/", post(set_language_ajax))
}

#[derive(Debug, Default, Deserialize)]
pub struct NextParams {
    pub next: Option<String>,
}

/// Body of the JSON variant.
///
/// Fields are kept as raw JSON so a non-string `language` is reported as an
/// invalid code rather than a malformed body.
#[derive(Debug, Deserialize)]
pub struct SetLanguageRequest {
    pub language: Option<Value>,
    pub next: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetLanguageResponse {
    pub success: bool,
    pub language: String,
    pub redirect: String,
}

pub async fn change_language(
    Path(code): Path<String>,
    State(locale): State<LocaleState>,
    Extension(language): Extension<LanguageContext>,
    headers: HeaderMap,
    query: Option<Query<NextParams>>,
    form: Option<Form<NextParams>>,
) -> Response {
    if language.activate(&code) {
        info!("Language changed to {}", code);
    } else {
        locale.metrics().record_rejected_change();
        warn!("Ignoring change to unsupported language {:?}", code);
    }

    let next = form
        .and_then(|Form(params)| params.next)
        .or_else(|| query.and_then(|Query(params)| params.next));
    let target = redirect_target(next.as_deref(), referer(&headers), request_host(&headers));

    found(&target)
}

pub async fn set_language_ajax(
    State(locale): State<LocaleState>,
    Extension(language): Extension<LanguageContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SetLanguageResponse>, ChangeLanguageError> {
    let result = apply_language_request(&language, &headers, &body);
    if let Err(e) = &result {
        locale.metrics().record_rejected_change();
        warn!("Rejected language change request: {}", e);
    }
    result.map(Json)
}

fn apply_language_request(
    language: &LanguageContext,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<SetLanguageResponse, ChangeLanguageError> {
    let request: SetLanguageRequest = serde_json::from_slice(body)
        .map_err(|e| ChangeLanguageError::MalformedBody(e.to_string()))?;

    let code = match request.language {
        Some(value) if !is_blank(&value) => value,
        _ => return Err(ChangeLanguageError::MissingLanguage),
    };
    let code = match code {
        Value::String(code) => code,
        other => return Err(ChangeLanguageError::InvalidLanguage(other.to_string())),
    };

    if !language.activate(&code) {
        return Err(ChangeLanguageError::InvalidLanguage(code));
    }
    info!("Language changed to {} via JSON request", code);

    let next = request.next.as_ref().and_then(Value::as_str);
    Ok(SetLanguageResponse {
        success: true,
        redirect: redirect_target(next, referer(headers), request_host(headers)),
        language: code,
    })
}

/// Null, `false`, zero and empty strings, arrays or objects count as no value.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn found(target: &str) -> Response {
    let location = HeaderValue::from_str(target)
        .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_REDIRECT));
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
