// handlers/elevated/content.rs - home-page editing

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::input::present;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::services::content::{
    apply_section, load_home, normalize, section_view, with_logo, Section, HOME_CONTENT_KEY,
};
use crate::state::AppState;

/// GET /api/v1/content/admin/home - Editable document plus its last editor
pub async fn admin_home(State(state): State<AppState>) -> ApiResult<Value> {
    let stored = load_home(state.store.as_ref()).await?;
    Ok(ApiResponse::success(json!({
        "content": normalize(&stored.content),
        "updatedAt": stored.updated_at,
        "updatedBy": stored.updated_by,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SectionRequest {
    pub payload: Option<Value>,
}

/**
 * PUT /api/v1/content/admin/home/:sectionId - Replace one section
 *
 * `branding` edits `appMeta.title` / `appMeta.logoUrl`; every other editable
 * section replaces its whole subtree. Concurrent editors: last write wins.
 */
pub async fn update_section(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(section_id): ApiPath<String>,
    ApiJson(body): ApiJson<SectionRequest>,
) -> ApiResult<Value> {
    let payload = body
        .payload
        .filter(|p| p.is_object() || p.is_array())
        .ok_or_else(|| ApiError::bad_request("Payload must be an object"))?;
    let section: Section = section_id.parse()?;

    let current = load_home(state.store.as_ref()).await?;
    let next = apply_section(&current.content, section, payload)?;
    let saved = state.store.save_content(HOME_CONTENT_KEY, next, user.id).await?;

    tracing::info!("User {} updated home section {}", user.id, section.id());
    Ok(ApiResponse::success(json!({
        "message": "Section updated",
        "sectionId": section.id(),
        "section": section_view(&saved.content, section),
        "content": saved.content,
        "updatedAt": saved.updated_at,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoRequest {
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub data_base64: Option<String>,
}

/// POST /api/v1/content/admin/home/logo - Store an image under `/uploads`
/// and point `appMeta.logoUrl` at it
pub async fn upload_logo(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(body): ApiJson<LogoRequest>,
) -> ApiResult<Value> {
    let (Some(file_name), Some(mime_type), Some(data)) = (
        present(body.file_name),
        present(body.mime_type),
        present(body.data_base64),
    ) else {
        return Err(ApiError::bad_request(
            "fileName, mimeType and dataBase64 are required",
        ));
    };

    let logo_url = state.uploads.save_image(&mime_type, &data).await?;
    let current = load_home(state.store.as_ref()).await?;
    let saved = state
        .store
        .save_content(HOME_CONTENT_KEY, with_logo(&current.content, &logo_url), user.id)
        .await?;

    tracing::info!("User {} uploaded logo {} as {}", user.id, file_name, logo_url);
    Ok(ApiResponse::success(json!({
        "message": "Logo uploaded",
        "logoUrl": logo_url,
        "content": saved.content,
        "updatedAt": saved.updated_at,
    })))
}
