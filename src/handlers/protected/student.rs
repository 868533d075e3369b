// handlers/protected/student.rs - student portal, homework submission,
// notification read receipts

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::CurrentUser;
use crate::database::models::{CourseFilter, ScopeKind};
use crate::error::ApiError;
use crate::handlers::input::required;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::services::dashboards::{lecture_entries, merge_schedule, schedule_entries, StudentTaskView};
use crate::state::AppState;

const PORTAL_NOTIFICATION_LIMIT: i64 = 50;

/**
 * GET /api/v1/student/portal - Everything a student's home screen shows
 *
 * `schedule` merges course and group classes (most recent start first,
 * undated last); `previousLectures` lists course then group recordings.
 */
pub async fn portal(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Value> {
    let tasks: Vec<StudentTaskView> = state
        .store
        .list_student_assignments(user.id)
        .await?
        .into_iter()
        .map(StudentTaskView::from)
        .collect();

    let courses = state
        .store
        .list_courses(CourseFilter::EnrolledStudent(user.id))
        .await?;
    let course_ids: Vec<i64> = courses.iter().map(|c| c.course.id).collect();
    let course_titles: HashMap<i64, String> = courses
        .into_iter()
        .map(|c| (c.course.id, c.course.title))
        .collect();

    let groups = state.store.list_student_groups(user.id).await?;
    let group_ids: Vec<i64> = groups.iter().map(|g| g.id).collect();
    let group_names: HashMap<i64, String> = groups.into_iter().map(|g| (g.id, g.name)).collect();

    let schedule = merge_schedule(
        schedule_entries(
            state.store.list_live_sessions(ScopeKind::Course, &course_ids).await?,
            &course_titles,
        ),
        schedule_entries(
            state.store.list_live_sessions(ScopeKind::Group, &group_ids).await?,
            &group_names,
        ),
    );

    let mut previous_lectures = lecture_entries(
        state.store.list_recordings(ScopeKind::Course, &course_ids).await?,
        &course_titles,
    );
    previous_lectures.extend(lecture_entries(
        state.store.list_recordings(ScopeKind::Group, &group_ids).await?,
        &group_names,
    ));

    let notifications = state
        .store
        .list_notifications(user.id, PORTAL_NOTIFICATION_LIMIT)
        .await?;

    Ok(ApiResponse::success(json!({
        "tasks": tasks,
        "schedule": schedule,
        "previousLectures": previous_lectures,
        "notifications": notifications,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub submission_text: Option<String>,
}

/// POST /api/v1/student/tasks/:assignmentId/submit - Submit or resubmit;
/// a resubmission overwrites the text and timestamp
pub async fn submit_task(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(assignment_id): ApiPath<i64>,
    ApiJson(body): ApiJson<SubmitRequest>,
) -> ApiResult<Value> {
    let text = required(body.submission_text, "submissionText is required")?;

    let assignment = state
        .store
        .submit_assignment(assignment_id, user.id, text)
        .await?
        .ok_or_else(|| ApiError::not_found("Assignment not found"))?;

    tracing::info!("Student {} submitted assignment {}", user.id, assignment_id);
    Ok(ApiResponse::success(json!({
        "message": "Homework submitted",
        "assignment": assignment,
    })))
}

/// PUT /api/v1/student/notifications/:notificationId/read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(notification_id): ApiPath<i64>,
) -> ApiResult<Value> {
    if !state.store.mark_notification_read(notification_id, user.id).await? {
        return Err(ApiError::not_found("Notification not found"));
    }
    Ok(ApiResponse::success(json!({ "message": "Notification marked as read" })))
}
