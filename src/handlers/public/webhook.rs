// handlers/public/webhook.rs - POST /api/v1/zoom/webhook

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::Value;

use crate::middleware::ApiJson;
use crate::services::meeting_webhook::{is_verified, respond, SECRET_HEADER};
use crate::state::AppState;

/**
 * POST /api/v1/zoom/webhook - Meeting-platform event sink
 *
 * The platform expects the handshake fields at the top level of the body,
 * so this handler answers without the `{success, data}` envelope.
 */
pub async fn zoom_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<Value>,
) -> Json<Value> {
    let secret = state.config.integrations.zoom_webhook_secret.as_deref();
    let presented = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    let verified = is_verified(secret, presented);

    let event = body.get("event").and_then(Value::as_str).unwrap_or("<none>");
    tracing::info!("Meeting webhook {} (verified: {})", event, verified);
    Json(respond(&body, secret, verified))
}
