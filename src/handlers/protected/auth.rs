// handlers/protected/auth.rs - profile and self-service password change
//
// Both routes are reachable while a forced password change is pending.

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{hash_password, validate_new_password, verify_password, AuthError, CurrentUser};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/v1/auth/profile - The caller as currently stored
pub async fn profile(user: CurrentUser) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "user": user.0 })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/**
 * POST /api/v1/auth/change-password - Replace the caller's password
 *
 * The current password is required unless the account carries the
 * forced-change flag (first login after an admin-issued temporary password).
 * The new password must differ from the stored one. Success clears the flag.
 */
pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Value> {
    let new_password = body.new_password.unwrap_or_default();
    validate_new_password(&new_password)?;

    let credentials = state
        .store
        .find_credentials(user.id)
        .await?
        .ok_or(AuthError::Unauthenticated)?;

    if !user.must_change_password {
        let current = body
            .current_password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::bad_request("Current password is required"))?;
        if !verify_password(&current, &credentials.password_hash) {
            return Err(ApiError::bad_request("Current password is incorrect"));
        }
    }

    if verify_password(&new_password, &credentials.password_hash) {
        return Err(ApiError::bad_request(
            "New password must be different from the current password",
        ));
    }

    let hash = hash_password(&new_password)?;
    if !state.store.set_password(user.id, hash, false).await? {
        return Err(AuthError::Unauthenticated.into());
    }
    let refreshed = state
        .store
        .find_user(user.id)
        .await?
        .ok_or(AuthError::Unauthenticated)?;

    tracing::info!("Password changed for user {}", user.id);
    Ok(ApiResponse::success(json!({
        "message": "Password updated",
        "user": refreshed,
    })))
}
