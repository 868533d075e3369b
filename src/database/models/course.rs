use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub teacher_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Course joined with its teacher's display name
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CourseListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub course: Course,
    pub teacher_name: String,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub teacher_id: i64,
}

#[derive(Debug, Clone, Copy)]
pub enum CourseFilter {
    All,
    TaughtBy(i64),
    EnrolledStudent(i64),
}
