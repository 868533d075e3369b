// handlers/elevated/groups.rs - /api/v1/admin/groups

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::CurrentUser;
use crate::database::models::{
    LiveSession, MemberSelection, NewGroup, Recording, ScopeKind, StudentGroup,
};
use crate::error::ApiError;
use crate::handlers::input::{integer_ids, present, required};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    #[serde(flatten)]
    pub group: StudentGroup,
    pub student_count: i64,
    pub sessions: Vec<LiveSession>,
    pub recordings: Vec<Recording>,
}

/// GET /api/v1/admin/groups - Groups with member counts, classes and recordings
pub async fn list_groups(State(state): State<AppState>) -> ApiResult<Value> {
    let summaries = state.store.list_groups().await?;
    let ids: Vec<i64> = summaries.iter().map(|s| s.group.id).collect();

    let mut sessions: HashMap<i64, Vec<LiveSession>> = HashMap::new();
    for session in state.store.list_live_sessions(ScopeKind::Group, &ids).await? {
        sessions.entry(session.scope.id).or_default().push(session);
    }
    let mut recordings: HashMap<i64, Vec<Recording>> = HashMap::new();
    for recording in state.store.list_recordings(ScopeKind::Group, &ids).await? {
        recordings.entry(recording.scope.id).or_default().push(recording);
    }

    let groups: Vec<GroupView> = summaries
        .into_iter()
        .map(|summary| {
            let id = summary.group.id;
            GroupView {
                group: summary.group,
                student_count: summary.student_count,
                sessions: sessions.remove(&id).unwrap_or_default(),
                recordings: recordings.remove(&id).unwrap_or_default(),
            }
        })
        .collect();

    Ok(ApiResponse::success(json!({ "groups": groups })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub include_all_students: bool,
}

/// POST /api/v1/admin/groups - Optionally seeded with every current student
pub async fn create_group(
    State(state): State<AppState>,
    caller: CurrentUser,
    ApiJson(body): ApiJson<GroupRequest>,
) -> ApiResult<Value> {
    let name = required(body.name, "Group name is required")?;

    let group = state
        .store
        .create_group(NewGroup {
            name,
            description: present(body.description),
            created_by: caller.id,
            include_all_students: body.include_all_students,
        })
        .await?;

    tracing::info!("Admin {} created group {}", caller.id, group.id);
    Ok(ApiResponse::created(json!({
        "message": "Group created",
        "group": group,
        "includeAllStudents": body.include_all_students,
    })))
}

/// PUT /api/v1/admin/groups/:groupId
pub async fn update_group(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
    ApiJson(body): ApiJson<GroupRequest>,
) -> ApiResult<Value> {
    let name = required(body.name, "Group name is required")?;

    let group = state
        .store
        .update_group(group_id, name, present(body.description))
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    Ok(ApiResponse::success(json!({
        "message": "Group updated",
        "group": group,
    })))
}

/// DELETE /api/v1/admin/groups/:groupId - Memberships, classes and recordings go with it
pub async fn delete_group(
    State(state): State<AppState>,
    caller: CurrentUser,
    ApiPath(group_id): ApiPath<i64>,
) -> ApiResult<Value> {
    if !state.store.delete_group(group_id).await? {
        return Err(ApiError::not_found("Group not found"));
    }
    tracing::info!("Admin {} deleted group {}", caller.id, group_id);
    Ok(ApiResponse::success(json!({ "message": "Group deleted" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStudentsRequest {
    pub student_ids: Option<Vec<Value>>,
    #[serde(default)]
    pub include_all_students: bool,
}

/**
 * POST /api/v1/admin/groups/:groupId/students - Add members
 *
 * Insert-if-absent: re-adding a member is a no-op. Ids that are not
 * students are ignored; if none remain the request is rejected.
 */
pub async fn add_students(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
    ApiJson(body): ApiJson<AddStudentsRequest>,
) -> ApiResult<Value> {
    if state.store.find_group(group_id).await?.is_none() {
        return Err(ApiError::not_found("Group not found"));
    }

    if body.include_all_students {
        let added = state
            .store
            .add_group_members(group_id, MemberSelection::AllStudents)
            .await?;
        return Ok(ApiResponse::success(json!({
            "message": "All students added to group",
            "addedCount": added,
        })));
    }

    let requested = body.student_ids.unwrap_or_default();
    if requested.is_empty() {
        return Err(ApiError::bad_request(
            "studentIds is required when includeAllStudents is false",
        ));
    }
    let ids = integer_ids(&requested);
    if ids.is_empty() {
        return Err(ApiError::bad_request("studentIds must contain valid integer IDs"));
    }

    let added = state
        .store
        .add_group_members(group_id, MemberSelection::Students(ids))
        .await?;
    if added == 0 {
        return Err(ApiError::bad_request("No valid student IDs found"));
    }

    tracing::info!("Added {} students to group {}", added, group_id);
    Ok(ApiResponse::success(json!({
        "message": "Students added to group",
        "addedCount": added,
    })))
}
