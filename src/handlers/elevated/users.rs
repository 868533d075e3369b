// handlers/elevated/users.rs - /api/v1/admin/users

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{generate_temporary_password, hash_password, CurrentUser};
use crate::database::models::{normalize_email, NewUser, Role, User, UserUpdate};
use crate::error::ApiError;
use crate::handlers::input::present;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::state::AppState;

const CREDENTIAL_NOTE: &str =
    "Share this temporary password securely. It is shown only once and must be changed at first login.";

/// One-time credential hand-off; never persisted in plaintext
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedCredentials {
    pub email: String,
    pub temporary_password: String,
    pub note: &'static str,
}

impl IssuedCredentials {
    fn new(email: &str, temporary_password: String) -> Self {
        Self {
            email: email.to_string(),
            temporary_password,
            note: CREDENTIAL_NOTE,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub reset_password: bool,
}

fn parse_role(role: Option<&str>) -> Option<Role> {
    role.and_then(|r| r.trim().parse().ok())
}

fn guard_super_admin(caller: &CurrentUser, touches_super_admin: bool) -> Result<(), ApiError> {
    if touches_super_admin && caller.role != Role::SuperAdmin {
        return Err(ApiError::forbidden("Only a super admin can manage super admin accounts"));
    }
    Ok(())
}

async fn find_target(state: &AppState, user_id: i64) -> Result<User, ApiError> {
    state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// GET /api/v1/admin/users - All accounts, newest first
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Value> {
    let users = state.store.list_users().await?;
    Ok(ApiResponse::success(json!({ "users": users })))
}

/**
 * POST /api/v1/admin/users - Create an admin, teacher or student
 *
 * The password is generated here and returned once under `credentials`;
 * the account must change it before doing anything else. Super-admin
 * accounts are created from the operator CLI only.
 */
pub async fn create_user(
    State(state): State<AppState>,
    caller: CurrentUser,
    ApiJson(body): ApiJson<UserRequest>,
) -> ApiResult<Value> {
    let (Some(name), Some(email)) = (present(body.name), present(body.email)) else {
        return Err(ApiError::bad_request("name and email are required"));
    };
    let role = parse_role(body.role.as_deref())
        .filter(|role| *role != Role::SuperAdmin)
        .ok_or_else(|| ApiError::bad_request("role must be admin, teacher, or student"))?;

    let temporary_password = generate_temporary_password();
    let user = state
        .store
        .create_user(NewUser {
            name,
            email: normalize_email(&email),
            role,
            password_hash: hash_password(&temporary_password)?,
            must_change_password: true,
        })
        .await?;

    tracing::info!("Admin {} created {} account {}", caller.id, user.role, user.id);
    let credentials = IssuedCredentials::new(&user.email, temporary_password);
    Ok(ApiResponse::created(json!({
        "message": "User created",
        "user": user,
        "credentials": credentials,
    })))
}

/// PUT /api/v1/admin/users/:userId - Edit profile and role; `resetPassword`
/// issues a fresh temporary password and sets the forced-change flag
pub async fn update_user(
    State(state): State<AppState>,
    caller: CurrentUser,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(body): ApiJson<UserRequest>,
) -> ApiResult<Value> {
    let (Some(name), Some(email)) = (present(body.name), present(body.email)) else {
        return Err(ApiError::bad_request("name and email are required"));
    };
    let role = parse_role(body.role.as_deref()).ok_or_else(|| {
        ApiError::bad_request("role must be super_admin, admin, teacher, or student")
    })?;

    let target = find_target(&state, user_id).await?;
    guard_super_admin(
        &caller,
        target.role == Role::SuperAdmin || role == Role::SuperAdmin,
    )?;

    let temporary_password = body.reset_password.then(generate_temporary_password);
    let password_reset = temporary_password
        .as_deref()
        .map(hash_password)
        .transpose()?;

    let user = state
        .store
        .update_user(
            user_id,
            UserUpdate {
                name,
                email: normalize_email(&email),
                role,
                password_reset,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(
        "Admin {} updated user {} (password reset: {})",
        caller.id,
        user.id,
        temporary_password.is_some()
    );
    let credentials = temporary_password.map(|password| IssuedCredentials::new(&user.email, password));
    Ok(ApiResponse::success(json!({
        "message": "User updated",
        "user": user,
        "credentials": credentials,
    })))
}

/// DELETE /api/v1/admin/users/:userId - Self-deletion is refused
pub async fn delete_user(
    State(state): State<AppState>,
    caller: CurrentUser,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Value> {
    if caller.id == user_id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }

    let target = find_target(&state, user_id).await?;
    guard_super_admin(&caller, target.role == Role::SuperAdmin)?;

    if !state.store.delete_user(user_id).await? {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!("Admin {} deleted user {}", caller.id, user_id);
    Ok(ApiResponse::success(json!({ "message": "User deleted" })))
}
