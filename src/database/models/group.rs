use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudentGroup {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct GroupSummary {
    #[sqlx(flatten)]
    pub group: StudentGroup,
    pub student_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
    pub created_by: i64,
    pub include_all_students: bool,
}

/// Which students to add to a group
#[derive(Debug, Clone)]
pub enum MemberSelection {
    AllStudents,
    Students(Vec<i64>),
}
