//! Minimal cookie handling: reading one value from the `Cookie` header and
//! rendering a `Set-Cookie` header value.

use std::fmt;

use axum::http::{header, HeaderMap};

use crate::config::{CookiePolicy, SameSite};

/// Find a cookie by name across all `Cookie` headers.
///
/// Values wrapped in double quotes are returned without the quotes.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|raw| parse_cookie(raw, name))
}

/// Parse a specific cookie from a `Cookie` header string.
pub fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        if key.trim() != name {
            return None;
        }
        let value = value.trim();
        Some(
            value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value),
        )
    })
}

/// A `Set-Cookie` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie<'a> {
    pub name: &'a str,
    pub value: &'a str,
    pub max_age: Option<u64>,
    pub path: Option<&'a str>,
    pub domain: Option<&'a str>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl<'a> SetCookie<'a> {
    /// Cookie carrying `value` with every attribute taken from `policy`.
    pub fn from_policy(policy: &'a CookiePolicy, value: &'a str) -> Self {
        Self {
            name: &policy.name,
            value,
            max_age: policy.max_age,
            path: Some(policy.path.as_str()).filter(|path| !path.is_empty()),
            domain: policy.domain.as_deref(),
            secure: policy.secure,
            http_only: policy.http_only,
            same_site: policy.same_site,
        }
    }
}

impl fmt::Display for SetCookie<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age)?;
        }
        if let Some(path) = self.path {
            write!(f, "; Path={}", path)?;
        }
        if let Some(domain) = self.domain {
            write!(f, "; Domain={}", domain)?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if let Some(same_site) = self.same_site {
            write!(f, "; SameSite={}", same_site)?;
        }
        Ok(())
    }
}
