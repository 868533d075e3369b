//! Session cookie header helpers.

use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::SecurityConfig;

pub fn session_cookie(security: &SecurityConfig, token: &str) -> String {
    build(security, token, security.session_ttl_secs)
}

/// Same attributes as the session cookie so the browser replaces it
pub fn clear_cookie(security: &SecurityConfig) -> String {
    build(security, "", 0)
}

fn build(security: &SecurityConfig, value: &str, max_age: u64) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        security.cookie_name, value, max_age
    );
    if security.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn set_cookie_header(cookie: String) -> Option<(header::HeaderName, HeaderValue)> {
    HeaderValue::from_str(&cookie)
        .ok()
        .map(|value| (header::SET_COOKIE, value))
}

/// Finds `name` across all `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
