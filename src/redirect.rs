//! Redirect targets after a language change.
//!
//! A target is followed only when it stays on the requesting host:
//! `next` if safe, otherwise the `Referer` if safe, otherwise `/`.

use axum::http::{header, HeaderMap};
use url::Url;

pub const FALLBACK_REDIRECT: &str = "/";

/// Whether `target` may be used as a redirect for a request to `host`.
///
/// Relative references are allowed unless they are scheme-relative
/// (`//evil.example`) or use backslash tricks browsers normalise to `//`.
/// Absolute URLs must be `http`/`https` and name exactly `host` (including
/// the port, compared case-insensitively).
pub fn is_safe_redirect(target: &str, host: Option<&str>) -> bool {
    let target = target.trim();
    if target.is_empty() || target.chars().any(char::is_control) {
        return false;
    }
    if target.starts_with("//") || target.starts_with('\\') || target.starts_with("/\\") {
        return false;
    }

    match Url::parse(target) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                return false;
            }
            let Some(host) = host else {
                return false;
            };
            let Some(target_host) = url.host_str() else {
                return false;
            };
            let authority = match url.port() {
                Some(port) => format!("{}:{}", target_host, port),
                None => target_host.to_string(),
            };
            authority.eq_ignore_ascii_case(host.trim())
        }
        // Anything that isn't an absolute URL is a path relative to this host.
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

/// Pick where to send the client after a language change.
pub fn redirect_target(next: Option<&str>, referer: Option<&str>, host: Option<&str>) -> String {
    [next, referer]
        .into_iter()
        .flatten()
        .find(|candidate| is_safe_redirect(candidate, host))
        .map(|candidate| candidate.trim().to_string())
        .unwrap_or_else(|| FALLBACK_REDIRECT.to_string())
}

/// The request's `Host` header.
pub fn request_host(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::HOST).and_then(|v| v.to_str().ok())
}

/// The request's `Referer` header.
pub fn referer(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::REFERER).and_then(|v| v.to_str().ok())
}
