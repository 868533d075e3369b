// handlers/protected/teacher.rs - teacher dashboard and homework authoring

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::CurrentUser;
use crate::database::models::{CourseFilter, HomeworkTask, NewHomeworkTask, Role, ScopeKind};
use crate::error::ApiError;
use crate::handlers::input::{integer_ids, present};
use crate::handlers::protected::courses::managed_course;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::services::dashboards::{
    lecture_entries, schedule_entries, teacher_stats, SubmissionView, TaskView,
};
use crate::services::dates::parse_due_date;
use crate::state::AppState;

/**
 * GET /api/v1/teacher/dashboard - Courses, tasks, submissions and timetable
 *
 * Teachers see their own courses; admin-tier callers see every course.
 * With no courses every list is empty and every stat is zero.
 */
pub async fn dashboard(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Value> {
    let filter = if user.role == Role::Teacher {
        CourseFilter::TaughtBy(user.id)
    } else {
        CourseFilter::All
    };

    let courses = state.store.list_courses(filter).await?;
    let ids: Vec<i64> = courses.iter().map(|c| c.course.id).collect();
    let titles: HashMap<i64, String> = courses
        .iter()
        .map(|c| (c.course.id, c.course.title.clone()))
        .collect();

    let (summaries, submission_rows, sessions, recordings) = futures::try_join!(
        state.store.list_task_summaries(&ids),
        state.store.list_submissions(&ids),
        state.store.list_live_sessions(ScopeKind::Course, &ids),
        state.store.list_recordings(ScopeKind::Course, &ids),
    )?;

    let tasks: Vec<TaskView> = summaries.into_iter().map(TaskView::from).collect();
    let submissions: Vec<SubmissionView> = submission_rows.into_iter().map(SubmissionView::from).collect();
    let schedule = schedule_entries(sessions, &titles);
    let previous_lectures = lecture_entries(recordings, &titles);

    let stats = teacher_stats(courses.len(), &tasks, &submissions, schedule.len());

    Ok(ApiResponse::success(json!({
        "stats": stats,
        "courses": courses,
        "tasks": tasks,
        "submissions": submissions,
        "schedule": schedule,
        "previousLectures": previous_lectures,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub subject: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub student_ids: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignedTaskView {
    #[serde(flatten)]
    task: HomeworkTask,
    assigned_count: usize,
}

/**
 * POST /api/v1/teacher/courses/:courseId/tasks - Author homework
 *
 * Targets the explicit `studentIds` (filtered to enrolled students) or, when
 * omitted, every enrolled student. Each target gets one pending assignment
 * and one `homework` notification.
 */
pub async fn create_task(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(course_id): ApiPath<i64>,
    ApiJson(body): ApiJson<CreateTaskRequest>,
) -> ApiResult<Value> {
    let (Some(subject), Some(title)) = (present(body.subject), present(body.title)) else {
        return Err(ApiError::bad_request("subject and title are required"));
    };
    let due_date = parse_due_date(body.due_date.as_deref()).map_err(ApiError::bad_request)?;

    let course = managed_course(
        state.store.as_ref(),
        &user,
        course_id,
        "You can only assign tasks for your own courses",
    )
    .await?;

    let student_ids = match body.student_ids {
        Some(values) if !values.is_empty() => {
            let ids = integer_ids(&values);
            if ids.is_empty() {
                return Err(ApiError::bad_request("studentIds must contain integer values"));
            }
            Some(ids)
        }
        _ => None,
    };

    // admins author on behalf of the course's teacher
    let teacher_id = if user.role == Role::Teacher {
        user.id
    } else {
        course.teacher_id
    };

    let assigned = state
        .store
        .assign_homework(NewHomeworkTask {
            course_id: course.id,
            course_title: course.title,
            teacher_id,
            subject,
            title,
            description: present(body.description),
            due_date,
            student_ids,
        })
        .await?;

    tracing::info!(
        "Homework {} created for course {}; assigned to {} students",
        assigned.task.id,
        course.id,
        assigned.assigned
    );
    Ok(ApiResponse::created(json!({
        "message": "Homework assigned",
        "task": AssignedTaskView {
            task: assigned.task,
            assigned_count: assigned.assigned,
        },
    })))
}
