use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Submitted,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown assignment status: {0}")]
pub struct UnknownStatus(pub String);

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Submitted => "submitted",
        }
    }
}

impl FromStr for AssignmentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AssignmentStatus::Pending),
            "submitted" => Ok(AssignmentStatus::Submitted),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for AssignmentStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkTask {
    pub id: i64,
    pub course_id: i64,
    pub teacher_id: i64,
    pub subject: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkAssignment {
    pub id: i64,
    pub task_id: i64,
    pub student_id: i64,
    #[sqlx(try_from = "String")]
    pub status: AssignmentStatus,
    pub submission_text: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHomeworkTask {
    pub course_id: i64,
    pub course_title: String,
    pub teacher_id: i64,
    pub subject: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    /// Explicit subset of students; `None` targets every enrolled student
    pub student_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone)]
pub struct AssignedTask {
    pub task: HomeworkTask,
    pub assigned: usize,
}

/// Task with per-status assignment counts, for the teacher dashboard
#[derive(Debug, Clone, FromRow)]
pub struct TaskSummary {
    #[sqlx(flatten)]
    pub task: HomeworkTask,
    pub course_title: String,
    pub assigned_count: i64,
    pub submitted_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct SubmissionRow {
    pub assignment_id: i64,
    pub task_id: i64,
    #[sqlx(try_from = "String")]
    pub status: AssignmentStatus,
    pub submission_text: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub task_title: String,
    pub subject: String,
    pub course_title: String,
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct StudentAssignment {
    pub assignment_id: i64,
    #[sqlx(try_from = "String")]
    pub status: AssignmentStatus,
    pub submission_text: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub task_id: i64,
    pub subject: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub task_created_at: DateTime<Utc>,
    pub course_id: i64,
    pub course_title: String,
    pub teacher_name: String,
}
