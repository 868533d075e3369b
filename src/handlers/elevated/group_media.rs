// handlers/elevated/group_media.rs - group live sessions and recordings
//
// Sessions and recordings are addressed by (groupId, id); an id that exists
// under another group is a 404.

use axum::extract::State;
use serde_json::{json, Value};

use crate::database::models::{NewLiveSession, NewRecording, RecordingUpdate, Scope};
use crate::error::ApiError;
use crate::handlers::input::{present, RecordingRequest, SessionRequest};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::state::AppState;

async fn ensure_group(state: &AppState, group_id: i64) -> Result<(), ApiError> {
    match state.store.find_group(group_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found("Group not found")),
    }
}

/// POST /api/v1/admin/groups/:groupId/live-sessions - Schedule and notify members
pub async fn create_session(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
    ApiJson(body): ApiJson<SessionRequest>,
) -> ApiResult<Value> {
    let fields = body.into_fields()?;
    ensure_group(&state, group_id).await?;

    let scheduled = state
        .store
        .schedule_live_session(NewLiveSession {
            scope: Scope::group(group_id),
            topic: fields.topic,
            join_url: fields.join_url,
            start_time: fields.start_time,
        })
        .await?;

    tracing::info!(
        "Scheduled group session {} for group {}; notified {} members",
        scheduled.session.id,
        group_id,
        scheduled.notified
    );
    Ok(ApiResponse::created(json!({
        "message": "Group live session created",
        "session": scheduled.session,
        "notifiedCount": scheduled.notified,
    })))
}

/// PUT /api/v1/admin/groups/:groupId/live-sessions/:sessionId
pub async fn update_session(
    State(state): State<AppState>,
    ApiPath((group_id, session_id)): ApiPath<(i64, i64)>,
    ApiJson(body): ApiJson<SessionRequest>,
) -> ApiResult<Value> {
    let fields = body.into_fields()?;
    let session = state
        .store
        .update_live_session(Scope::group(group_id), session_id, fields)
        .await?
        .ok_or_else(|| ApiError::not_found("Group live session not found"))?;

    Ok(ApiResponse::success(json!({
        "message": "Group live session updated",
        "session": session,
    })))
}

/// DELETE /api/v1/admin/groups/:groupId/live-sessions/:sessionId
pub async fn delete_session(
    State(state): State<AppState>,
    ApiPath((group_id, session_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Value> {
    if !state
        .store
        .delete_live_session(Scope::group(group_id), session_id)
        .await?
    {
        return Err(ApiError::not_found("Group live session not found"));
    }
    Ok(ApiResponse::success(json!({ "message": "Group live session deleted" })))
}

/// POST /api/v1/admin/groups/:groupId/recordings
pub async fn create_recording(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
    ApiJson(body): ApiJson<RecordingRequest>,
) -> ApiResult<Value> {
    let (Some(title), Some(source_url)) = (present(body.title), present(body.source_video_url)) else {
        return Err(ApiError::bad_request("title and sourceVideoUrl are required"));
    };
    ensure_group(&state, group_id).await?;

    let video = state.video.upload_from_url(&source_url, &title).await?;
    let recording = state
        .store
        .create_recording(NewRecording {
            scope: Scope::group(group_id),
            title,
            video_id: video.video_id,
            embed_url: video.embed_url,
        })
        .await?;

    tracing::info!("Attached recording {} to group {}", recording.id, group_id);
    Ok(ApiResponse::created(json!({
        "message": "Group recording created",
        "recording": recording,
    })))
}

/// PUT /api/v1/admin/groups/:groupId/recordings/:recordingId - Rename, and
/// re-upload only when `sourceVideoUrl` is given
pub async fn update_recording(
    State(state): State<AppState>,
    ApiPath((group_id, recording_id)): ApiPath<(i64, i64)>,
    ApiJson(body): ApiJson<RecordingRequest>,
) -> ApiResult<Value> {
    let Some(title) = present(body.title) else {
        return Err(ApiError::bad_request("title is required"));
    };
    let scope = Scope::group(group_id);
    if state.store.find_recording(scope, recording_id).await?.is_none() {
        return Err(ApiError::not_found("Group recording not found"));
    }

    let video = match present(body.source_video_url) {
        Some(source_url) => {
            let uploaded = state.video.upload_from_url(&source_url, &title).await?;
            Some((uploaded.video_id, uploaded.embed_url))
        }
        None => None,
    };

    let recording = state
        .store
        .update_recording(scope, recording_id, RecordingUpdate { title, video })
        .await?
        .ok_or_else(|| ApiError::not_found("Group recording not found"))?;

    Ok(ApiResponse::success(json!({
        "message": "Group recording updated",
        "recording": recording,
    })))
}

/// DELETE /api/v1/admin/groups/:groupId/recordings/:recordingId
pub async fn delete_recording(
    State(state): State<AppState>,
    ApiPath((group_id, recording_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Value> {
    if !state
        .store
        .delete_recording(Scope::group(group_id), recording_id)
        .await?
    {
        return Err(ApiError::not_found("Group recording not found"));
    }
    Ok(ApiResponse::success(json!({ "message": "Group recording deleted" })))
}
