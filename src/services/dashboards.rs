//! Read models for the teacher dashboard and the student portal.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::database::models::{
    AssignmentStatus, LiveSession, Recording, ScopeKind, StudentAssignment, SubmissionRow,
    TaskSummary,
};

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherStats {
    pub total_courses: usize,
    pub total_tasks: usize,
    pub pending_submissions: i64,
    pub submitted_assignments: usize,
    pub scheduled_classes: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: i64,
    pub course_id: i64,
    pub course_title: String,
    pub subject: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub assigned_count: i64,
    pub submitted_count: i64,
    pub pending_count: i64,
}

impl From<TaskSummary> for TaskView {
    fn from(summary: TaskSummary) -> Self {
        let task = summary.task;
        Self {
            id: task.id,
            course_id: task.course_id,
            course_title: summary.course_title,
            subject: task.subject,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            created_at: task.created_at,
            assigned_count: summary.assigned_count,
            submitted_count: summary.submitted_count,
            pending_count: summary.assigned_count - summary.submitted_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
    pub assignment_id: i64,
    pub task_id: i64,
    pub task_title: String,
    pub subject: String,
    pub course_title: String,
    pub status: AssignmentStatus,
    pub submission_text: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub student: StudentRef,
}

impl From<SubmissionRow> for SubmissionView {
    fn from(row: SubmissionRow) -> Self {
        Self {
            assignment_id: row.assignment_id,
            task_id: row.task_id,
            task_title: row.task_title,
            subject: row.subject,
            course_title: row.course_title,
            status: row.status,
            submission_text: row.submission_text,
            submitted_at: row.submitted_at,
            student: StudentRef {
                id: row.student_id,
                name: row.student_name,
                email: row.student_email,
            },
        }
    }
}

/// A class on someone's timetable; `subject` is the course title or group name
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: String,
    pub source: &'static str,
    pub owner_id: i64,
    pub topic: String,
    pub start_time: Option<DateTime<Utc>>,
    pub join_url: String,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureEntry {
    pub id: String,
    pub source: &'static str,
    pub owner_id: i64,
    pub title: String,
    pub video_id: String,
    pub embed_url: String,
    pub subject: String,
}

fn source_label(kind: ScopeKind) -> &'static str {
    match kind {
        ScopeKind::Course => "course",
        ScopeKind::Group => "group",
    }
}

/// Ids are prefixed with their source so course and group rows never collide
pub fn schedule_entries(sessions: Vec<LiveSession>, names: &HashMap<i64, String>) -> Vec<ScheduleEntry> {
    sessions
        .into_iter()
        .map(|session| {
            let source = source_label(session.scope.kind);
            ScheduleEntry {
                id: format!("{}-{}", source, session.id),
                source,
                owner_id: session.scope.id,
                subject: names.get(&session.scope.id).cloned().unwrap_or_default(),
                topic: session.topic,
                start_time: session.start_time,
                join_url: session.join_url,
            }
        })
        .collect()
}

pub fn lecture_entries(recordings: Vec<Recording>, names: &HashMap<i64, String>) -> Vec<LectureEntry> {
    recordings
        .into_iter()
        .map(|recording| {
            let source = source_label(recording.scope.kind);
            LectureEntry {
                id: format!("{}-{}", source, recording.id),
                source,
                owner_id: recording.scope.id,
                subject: names.get(&recording.scope.id).cloned().unwrap_or_default(),
                title: recording.title,
                video_id: recording.video_id,
                embed_url: recording.embed_url,
            }
        })
        .collect()
}

/// Most recent start first; unscheduled entries sink to the bottom
pub fn merge_schedule(mut course: Vec<ScheduleEntry>, group: Vec<ScheduleEntry>) -> Vec<ScheduleEntry> {
    course.extend(group);
    // stable sort keeps course entries ahead of group entries on ties
    course.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    course
}

pub fn teacher_stats(
    course_count: usize,
    tasks: &[TaskView],
    submissions: &[SubmissionView],
    scheduled_classes: usize,
) -> TeacherStats {
    TeacherStats {
        total_courses: course_count,
        total_tasks: tasks.len(),
        pending_submissions: tasks.iter().map(|t| t.pending_count).sum(),
        submitted_assignments: submissions
            .iter()
            .filter(|s| s.status == AssignmentStatus::Submitted)
            .count(),
        scheduled_classes,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentTaskView {
    pub assignment_id: i64,
    pub task_id: i64,
    pub status: AssignmentStatus,
    pub submission_text: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub subject: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub course_id: i64,
    pub course_title: String,
    pub teacher_name: String,
}

impl From<StudentAssignment> for StudentTaskView {
    fn from(row: StudentAssignment) -> Self {
        Self {
            assignment_id: row.assignment_id,
            task_id: row.task_id,
            status: row.status,
            submission_text: row.submission_text,
            submitted_at: row.submitted_at,
            subject: row.subject,
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            course_id: row.course_id,
            course_title: row.course_title,
            teacher_name: row.teacher_name,
        }
    }
}
