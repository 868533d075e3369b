// handlers/public/auth.rs - POST /api/v1/auth/login, POST /api/v1/auth/logout

use axum::{extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::auth::cookie::{clear_cookie, session_cookie, set_cookie_header};
use crate::auth::{verify_password, AuthError};
use crate::database::models::normalize_email;
use crate::error::ApiError;
use crate::handlers::input::present;
use crate::middleware::{ApiJson, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/**
 * POST /api/v1/auth/login - Exchange email + password for a session cookie
 *
 * Unknown email and wrong password are indistinguishable (401). The body
 * carries the user so the client can route on `role` and
 * `mustChangePassword` without a second round trip.
 */
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(email), Some(password)) = (present(body.email), body.password.filter(|p| !p.is_empty())) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };
    let email = normalize_email(&email);

    let Some(credentials) = state.store.find_credentials_by_email(&email).await? else {
        tracing::warn!("Login failed for {}: unknown email", email);
        return Err(AuthError::InvalidCredentials.into());
    };
    if !verify_password(&password, &credentials.password_hash) {
        tracing::warn!("Login failed for {}: wrong password", email);
        return Err(AuthError::InvalidCredentials.into());
    }

    let user = credentials.user;
    let token = state.sessions.issue(&user)?;
    let cookie = set_cookie_header(session_cookie(&state.config.security, &token))
        .ok_or_else(|| ApiError::internal_server_error("Failed to build session cookie"))?;

    tracing::info!("Login succeeded for {} ({})", user.email, user.role);
    Ok((
        [cookie],
        ApiResponse::success(json!({
            "message": "Login successful",
            "user": user,
        })),
    ))
}

/// POST /api/v1/auth/logout - Expire the session cookie
pub async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let cookie = set_cookie_header(clear_cookie(&state.config.security))
        .ok_or_else(|| ApiError::internal_server_error("Failed to build session cookie"))?;
    Ok(([cookie], ApiResponse::success(json!({ "message": "Logout successful" }))))
}
