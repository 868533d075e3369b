// handlers/protected/courses.rs - course catalogue, enrollment and course media

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::CurrentUser;
use crate::database::models::{
    Course, CourseFilter, CourseListing, LiveSession, NewCourse, NewLiveSession, NewRecording,
    Recording, Role, Scope, ScopeKind,
};
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::input::{present, RecordingRequest, SessionRequest};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::state::AppState;

/// Loads a course the caller may manage. Admin-tier users manage every
/// course; teachers only their own.
pub async fn managed_course(
    store: &dyn Store,
    user: &CurrentUser,
    course_id: i64,
    denied: &str,
) -> Result<Course, ApiError> {
    let course = store
        .find_course(course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    if user.role == Role::Teacher && course.teacher_id != user.id {
        return Err(ApiError::forbidden(denied));
    }
    Ok(course)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub teacher_id: Option<i64>,
}

/// POST /api/v1/courses - Create a course owned by an existing teacher
pub async fn create_course(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateCourseRequest>,
) -> ApiResult<Value> {
    let (Some(title), Some(description)) = (present(body.title), present(body.description)) else {
        return Err(ApiError::bad_request("Title and description are required"));
    };
    let teacher_id = body
        .teacher_id
        .ok_or_else(|| ApiError::bad_request("teacherId must be an integer"))?;

    let is_teacher = state
        .store
        .find_user(teacher_id)
        .await?
        .is_some_and(|u| u.role == Role::Teacher);
    if !is_teacher {
        return Err(ApiError::bad_request("teacherId must belong to a teacher"));
    }

    let course = state
        .store
        .create_course(NewCourse {
            title,
            description,
            teacher_id,
        })
        .await?;

    tracing::info!("Created course {} for teacher {}", course.id, teacher_id);
    Ok(ApiResponse::created(json!({
        "message": "Course created",
        "course": course,
    })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    #[serde(flatten)]
    pub listing: CourseListing,
    pub live_sessions: Vec<LiveSession>,
    pub recordings: Vec<Recording>,
}

/// GET /api/v1/courses/my - Taught courses for teachers, enrolled courses for
/// students, everything for admins
pub async fn my_courses(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Value> {
    let filter = match user.role {
        Role::Teacher => CourseFilter::TaughtBy(user.id),
        Role::Student => CourseFilter::EnrolledStudent(user.id),
        Role::Admin | Role::SuperAdmin => CourseFilter::All,
    };

    let listings = state.store.list_courses(filter).await?;
    let ids: Vec<i64> = listings.iter().map(|l| l.course.id).collect();

    let mut sessions: HashMap<i64, Vec<LiveSession>> = HashMap::new();
    for session in state.store.list_live_sessions(ScopeKind::Course, &ids).await? {
        sessions.entry(session.scope.id).or_default().push(session);
    }
    let mut recordings: HashMap<i64, Vec<Recording>> = HashMap::new();
    for recording in state.store.list_recordings(ScopeKind::Course, &ids).await? {
        recordings.entry(recording.scope.id).or_default().push(recording);
    }

    let courses: Vec<CourseView> = listings
        .into_iter()
        .map(|listing| {
            let id = listing.course.id;
            CourseView {
                listing,
                live_sessions: sessions.remove(&id).unwrap_or_default(),
                recordings: recordings.remove(&id).unwrap_or_default(),
            }
        })
        .collect();

    Ok(ApiResponse::success(json!({ "courses": courses })))
}

/// POST /api/v1/courses/:courseId/enroll - Idempotent self-enrollment
pub async fn enroll(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(course_id): ApiPath<i64>,
) -> ApiResult<Value> {
    if state.store.find_course(course_id).await?.is_none() {
        return Err(ApiError::not_found("Course not found"));
    }
    state.store.enroll_student(course_id, user.id).await?;

    tracing::info!("Student {} enrolled in course {}", user.id, course_id);
    Ok(ApiResponse::success(json!({ "message": "Enrolled successfully" })))
}

/**
 * POST /api/v1/courses/:courseId/live-sessions - Schedule a course class
 *
 * Every currently enrolled student receives a `live_class` notification,
 * written together with the session.
 */
pub async fn create_live_session(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(course_id): ApiPath<i64>,
    ApiJson(body): ApiJson<SessionRequest>,
) -> ApiResult<Value> {
    let fields = body.into_fields()?;
    let course = managed_course(
        state.store.as_ref(),
        &user,
        course_id,
        "You can only schedule classes for your own courses",
    )
    .await?;

    let scheduled = state
        .store
        .schedule_live_session(NewLiveSession {
            scope: Scope::course(course.id),
            topic: fields.topic,
            join_url: fields.join_url,
            start_time: fields.start_time,
        })
        .await?;

    tracing::info!(
        "Scheduled live session {} for course {}; notified {} students",
        scheduled.session.id,
        course.id,
        scheduled.notified
    );
    Ok(ApiResponse::created(json!({
        "message": "Live session scheduled",
        "liveSession": scheduled.session,
        "notifiedCount": scheduled.notified,
    })))
}

/// POST /api/v1/courses/:courseId/recordings - Pull a lecture into the video host
pub async fn create_recording(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(course_id): ApiPath<i64>,
    ApiJson(body): ApiJson<RecordingRequest>,
) -> ApiResult<Value> {
    let (Some(title), Some(source_url)) = (present(body.title), present(body.source_video_url)) else {
        return Err(ApiError::bad_request("title and sourceVideoUrl are required"));
    };
    let course = managed_course(
        state.store.as_ref(),
        &user,
        course_id,
        "You can only upload recordings for your own courses",
    )
    .await?;

    let video = state.video.upload_from_url(&source_url, &title).await?;
    let recording = state
        .store
        .create_recording(NewRecording {
            scope: Scope::course(course.id),
            title,
            video_id: video.video_id,
            embed_url: video.embed_url,
        })
        .await?;

    tracing::info!("Attached recording {} to course {}", recording.id, course.id);
    Ok(ApiResponse::created(json!({
        "message": "Recording uploaded",
        "recording": recording,
    })))
}
