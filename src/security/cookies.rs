// ABOUTME: HTTP cookie helpers for the browser session id
// ABOUTME: HttpOnly, SameSite=Lax session cookie with a config-driven Secure flag
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

//! Session cookie utilities
//!
//! The cookie only carries an opaque session id; the access token stays on
//! the server in the session table.

use axum::http::{header, HeaderMap, HeaderValue};
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "portal_session";

/// Cookie security configuration
#[derive(Debug, Clone)]
pub struct SecureCookieConfig {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Max-Age in seconds
    pub max_age_secs: i64,
    /// `HttpOnly` flag (prevents JavaScript access)
    pub http_only: bool,
    /// Secure flag (HTTPS only)
    pub secure: bool,
    /// `SameSite` policy
    pub same_site: SameSitePolicy,
    /// Cookie path
    pub path: String,
}

/// `SameSite` cookie policy
#[derive(Debug, Clone, Copy)]
pub enum SameSitePolicy {
    /// Strict: Cookie only sent in first-party context
    Strict,
    /// Lax: Cookie sent on top-level navigation
    Lax,
}

impl SecureCookieConfig {
    /// `HttpOnly`, `SameSite=Lax` cookie on `/`
    #[must_use]
    pub fn new(name: &str, value: String, max_age_secs: i64, secure: bool) -> Self {
        Self {
            name: name.to_owned(),
            value,
            max_age_secs,
            http_only: true,
            secure,
            same_site: SameSitePolicy::Lax,
            path: "/".to_owned(),
        }
    }

    /// Build the Set-Cookie header value
    #[must_use]
    pub fn build(&self) -> String {
        use std::fmt::Write;
        let mut cookie = format!("{}={}", self.name, self.value);

        let _ = write!(cookie, "; Max-Age={}", self.max_age_secs);
        let _ = write!(cookie, "; Path={}", self.path);

        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }

        match self.same_site {
            SameSitePolicy::Strict => cookie.push_str("; SameSite=Strict"),
            SameSitePolicy::Lax => cookie.push_str("; SameSite=Lax"),
        }

        cookie
    }
}

/// Set the session cookie
pub fn set_session_cookie(headers: &mut HeaderMap, session_id: Uuid, max_age_secs: i64, secure: bool) {
    let cookie = SecureCookieConfig::new(SESSION_COOKIE, session_id.to_string(), max_age_secs, secure);

    if let Ok(header_value) = HeaderValue::from_str(&cookie.build()) {
        headers.insert(header::SET_COOKIE, header_value);
    }
}

/// Expire the session cookie
pub fn clear_session_cookie(headers: &mut HeaderMap, secure: bool) {
    let cookie = SecureCookieConfig::new(SESSION_COOKIE, String::new(), 0, secure);

    if let Ok(header_value) = HeaderValue::from_str(&cookie.build()) {
        headers.insert(header::SET_COOKIE, header_value);
    }
}

/// Extract cookie value from request headers
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            (name.trim() == cookie_name).then(|| value.trim().to_owned())
        })
}

/// Session id from the request's session cookie
#[must_use]
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    get_cookie_value(headers, SESSION_COOKIE).and_then(|raw| Uuid::parse_str(&raw).ok())
}
