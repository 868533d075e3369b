//! Meeting-platform webhook: shared-secret header check plus the URL
//! validation handshake (HMAC-SHA256 over the challenge token).

use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;

pub const SECRET_HEADER: &str = "x-zoom-webhook-secret";
pub const URL_VALIDATION_EVENT: &str = "endpoint.url_validation";

/// Signing key for the handshake when no secret is configured
pub const UNCONFIGURED_SIGNING_KEY: &str = "placeholder";

type HmacSha256 = Hmac<Sha256>;

/// Both sides must be present and non-empty
pub fn is_verified(configured: Option<&str>, presented: Option<&str>) -> bool {
    match (configured, presented) {
        (Some(expected), Some(actual)) if !expected.is_empty() && !actual.is_empty() => {
            constant_time_eq(expected.as_bytes(), actual.as_bytes())
        }
        _ => false,
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub fn encrypt_token(secret: &str, plain_token: &str) -> String {
    // HMAC accepts keys of any length, including empty
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(plain_token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Builds the response body for an incoming webhook event
pub fn respond(body: &Value, secret: Option<&str>, verified: bool) -> Value {
    let event = body.get("event").and_then(Value::as_str);

    if event == Some(URL_VALIDATION_EVENT) {
        let plain_token = body
            .pointer("/payload/plainToken")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let key = secret.filter(|s| !s.is_empty()).unwrap_or(UNCONFIGURED_SIGNING_KEY);
        return json!({
            "plainToken": plain_token,
            "encryptedToken": encrypt_token(key, plain_token),
            "verified": verified,
        });
    }

    json!({
        "message": "Webhook received",
        "event": event,
        "verified": verified,
    })
}
