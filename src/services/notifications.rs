//! Notification fan-out: turns one schedulable event into one row per recipient.

use serde_json::{json, Value};
use std::collections::HashSet;

use crate::database::models::{HomeworkTask, LiveSession, NewNotification, ScopeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Homework,
    LiveClass,
    GroupLiveClass,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Homework => "homework",
            NotificationKind::LiveClass => "live_class",
            NotificationKind::GroupLiveClass => "group_live_class",
        }
    }
}

/// Everything about a notification except its recipient
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub payload: Value,
}

/// One notification per distinct recipient, in first-seen order
pub fn fan_out(recipients: &[i64], draft: &NotificationDraft) -> Vec<NewNotification> {
    let mut seen = HashSet::with_capacity(recipients.len());
    recipients
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .map(|user_id| NewNotification {
            user_id,
            kind: draft.kind.as_str().to_string(),
            title: draft.title.clone(),
            message: draft.message.clone(),
            payload: Some(draft.payload.clone()),
        })
        .collect()
}

pub fn live_session_notice(session: &LiveSession) -> NotificationDraft {
    match session.scope.kind {
        ScopeKind::Course => course_session_notice(session),
        ScopeKind::Group => group_session_notice(session),
    }
}

pub fn course_session_notice(session: &LiveSession) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationKind::LiveClass,
        title: format!("Live class scheduled: {}", session.topic),
        message: "Your class is scheduled. Join using the provided meeting link.".to_string(),
        payload: json!({
            "courseId": session.scope.id,
            "liveSessionId": session.id,
            "joinUrl": session.join_url,
            "startTime": session.start_time,
        }),
    }
}

pub fn group_session_notice(session: &LiveSession) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationKind::GroupLiveClass,
        title: format!("Group class scheduled: {}", session.topic),
        message: "A group live class has been scheduled.".to_string(),
        payload: json!({
            "groupId": session.scope.id,
            "sessionId": session.id,
            "joinUrl": session.join_url,
            "startTime": session.start_time,
        }),
    }
}

pub fn homework_notice(task: &HomeworkTask, course_title: &str) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationKind::Homework,
        title: format!("New homework: {}", task.title),
        message: format!("New homework assigned in {}", course_title),
        payload: json!({
            "taskId": task.id,
            "courseId": task.course_id,
            "dueDate": task.due_date,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Scope;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn session(scope: Scope) -> LiveSession {
        LiveSession {
            id: 11,
            scope,
            topic: "Algebra".into(),
            join_url: "https://meet.example/1".into(),
            start_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fan_out_dedupes_in_first_seen_order() {
        let draft = course_session_notice(&session(Scope::course(1)));
        let rows = fan_out(&[5, 3, 5, 9, 3], &draft);
        let ids: Vec<i64> = rows.iter().map(|n| n.user_id).collect();
        assert_eq!(ids, vec![5, 3, 9]);
        assert!(rows.iter().all(|n| n.kind == "live_class"));
    }

    #[test]
    fn fan_out_to_nobody_is_empty() {
        let draft = group_session_notice(&session(Scope::group(2)));
        assert!(fan_out(&[], &draft).is_empty());
    }

    #[test]
    fn group_notice_references_session() {
        let draft = live_session_notice(&session(Scope::group(2)));
        assert_eq!(draft.kind, NotificationKind::GroupLiveClass);
        assert_eq!(draft.title, "Group class scheduled: Algebra");
        assert_eq!(draft.payload["groupId"], json!(2));
        assert_eq!(draft.payload["sessionId"], json!(11));
        assert_eq!(draft.payload["joinUrl"], json!("https://meet.example/1"));
    }

    #[test]
    fn homework_notice_carries_due_date() {
        let task = HomeworkTask {
            id: 4,
            course_id: 1,
            teacher_id: 2,
            subject: "Maths".into(),
            title: "Fractions".into(),
            description: None,
            due_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            created_at: Utc::now(),
        };
        let draft = homework_notice(&task, "Year 7 Maths");
        assert_eq!(draft.title, "New homework: Fractions");
        assert_eq!(draft.message, "New homework assigned in Year 7 Maths");
        assert_eq!(draft.payload["dueDate"], json!("2024-06-01"));
        assert_eq!(draft.payload["taskId"], json!(4));
    }
}
