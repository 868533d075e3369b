use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use sqlx::FromRow;

/// Whether a live session or recording hangs off a course or a student group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Course,
    Group,
}

impl ScopeKind {
    pub fn sessions_table(&self) -> &'static str {
        match self {
            ScopeKind::Course => "live_sessions",
            ScopeKind::Group => "group_live_sessions",
        }
    }

    pub fn recordings_table(&self) -> &'static str {
        match self {
            ScopeKind::Course => "recordings",
            ScopeKind::Group => "group_recordings",
        }
    }

    pub fn owner_column(&self) -> &'static str {
        match self {
            ScopeKind::Course => "course_id",
            ScopeKind::Group => "group_id",
        }
    }

    fn owner_key(&self) -> &'static str {
        match self {
            ScopeKind::Course => "courseId",
            ScopeKind::Group => "groupId",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope {
    pub kind: ScopeKind,
    pub id: i64,
}

impl Scope {
    pub fn course(id: i64) -> Self {
        Self { kind: ScopeKind::Course, id }
    }

    pub fn group(id: i64) -> Self {
        Self { kind: ScopeKind::Group, id }
    }
}

// Flattened into its parent as either `courseId` or `groupId`
impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.kind.owner_key(), &self.id)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSession {
    pub id: i64,
    #[serde(flatten)]
    pub scope: Scope,
    pub topic: String,
    pub join_url: String,
    pub start_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub id: i64,
    #[serde(flatten)]
    pub scope: Scope,
    pub title: String,
    pub video_id: String,
    pub embed_url: String,
    pub created_at: DateTime<Utc>,
}

/// Row shape shared by both session tables; `owner_id` is aliased in SQL
#[derive(Debug, FromRow)]
pub struct SessionRow {
    pub id: i64,
    pub owner_id: i64,
    pub topic: String,
    pub join_url: String,
    pub start_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SessionRow {
    pub fn into_session(self, kind: ScopeKind) -> LiveSession {
        LiveSession {
            id: self.id,
            scope: Scope { kind, id: self.owner_id },
            topic: self.topic,
            join_url: self.join_url,
            start_time: self.start_time,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct RecordingRow {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub video_id: String,
    pub embed_url: String,
    pub created_at: DateTime<Utc>,
}

impl RecordingRow {
    pub fn into_recording(self, kind: ScopeKind) -> Recording {
        Recording {
            id: self.id,
            scope: Scope { kind, id: self.owner_id },
            title: self.title,
            video_id: self.video_id,
            embed_url: self.embed_url,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewLiveSession {
    pub scope: Scope,
    pub topic: String,
    pub join_url: String,
    pub start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct LiveSessionUpdate {
    pub topic: String,
    pub join_url: String,
    pub start_time: Option<DateTime<Utc>>,
}

/// A freshly created session and how many recipients were notified
#[derive(Debug, Clone)]
pub struct ScheduledSession {
    pub session: LiveSession,
    pub notified: usize,
}

#[derive(Debug, Clone)]
pub struct NewRecording {
    pub scope: Scope,
    pub title: String,
    pub video_id: String,
    pub embed_url: String,
}

#[derive(Debug, Clone)]
pub struct RecordingUpdate {
    pub title: String,
    /// Replacement (video id, embed url) after a re-upload
    pub video: Option<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn session_serializes_owner_key_by_scope() {
        let session = LiveSession {
            id: 7,
            scope: Scope::group(3),
            topic: "Algebra".into(),
            join_url: "https://meet.example/1".into(),
            start_time: None,
            created_at: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
        };
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["groupId"], json!(3));
        assert!(value.get("courseId").is_none());
        assert_eq!(value["joinUrl"], json!("https://meet.example/1"));
    }
}
