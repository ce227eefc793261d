use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures of the JSON change-language endpoint.
///
/// Each becomes a `400 Bad Request` with `{"success": false, "error": ...}`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChangeLanguageError {
    #[error("No language specified")]
    MissingLanguage,

    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),

    #[error("Invalid JSON data: {0}")]
    MalformedBody(String),
}

impl ChangeLanguageError {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for ChangeLanguageError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(json!({
                "success": false,
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}
