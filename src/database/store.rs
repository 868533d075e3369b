//! Persistence seams. Handlers only see these traits; `PgStore` backs them
//! in production and `MemoryStore` in tests and `memory://` demos.

use async_trait::async_trait;
use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    AssignedTask, Course, CourseFilter, CourseListing, GroupSummary, HomeworkAssignment,
    LiveSession, LiveSessionUpdate, MemberSelection, NewCourse, NewGroup, NewHomeworkTask,
    NewLiveSession, NewRecording, NewUser, Notification, Recording, RecordingUpdate,
    ScheduledSession, Scope, ScopeKind, SiteContent, StudentAssignment, StudentGroup,
    SubmissionRow, TaskSummary, User, UserCredentials, UserUpdate,
};

pub type StoreResult<T> = Result<T, DatabaseError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>>;
    async fn find_credentials(&self, id: i64) -> StoreResult<Option<UserCredentials>>;
    /// Expects an already normalized email
    async fn find_credentials_by_email(&self, email: &str) -> StoreResult<Option<UserCredentials>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    /// Fails with `DatabaseError::Conflict` when the email is taken
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn update_user(&self, id: i64, update: UserUpdate) -> StoreResult<Option<User>>;
    async fn set_password(&self, id: i64, password_hash: String, must_change: bool) -> StoreResult<bool>;
    async fn delete_user(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn list_groups(&self) -> StoreResult<Vec<GroupSummary>>;
    async fn find_group(&self, id: i64) -> StoreResult<Option<StudentGroup>>;
    async fn create_group(&self, group: NewGroup) -> StoreResult<StudentGroup>;
    async fn update_group(
        &self,
        id: i64,
        name: String,
        description: Option<String>,
    ) -> StoreResult<Option<StudentGroup>>;
    async fn delete_group(&self, id: i64) -> StoreResult<bool>;
    /// Insert-if-absent; returns how many of the selected ids are real students
    async fn add_group_members(&self, group_id: i64, selection: MemberSelection) -> StoreResult<usize>;
    async fn list_student_groups(&self, student_id: i64) -> StoreResult<Vec<StudentGroup>>;
}

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn create_course(&self, course: NewCourse) -> StoreResult<Course>;
    async fn find_course(&self, id: i64) -> StoreResult<Option<Course>>;
    async fn list_courses(&self, filter: CourseFilter) -> StoreResult<Vec<CourseListing>>;
    /// Idempotent: re-enrolling is a no-op
    async fn enroll_student(&self, course_id: i64, student_id: i64) -> StoreResult<()>;
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Creates the session and one notification per current member/enrollee
    async fn schedule_live_session(&self, session: NewLiveSession) -> StoreResult<ScheduledSession>;
    async fn find_live_session(&self, scope: Scope, id: i64) -> StoreResult<Option<LiveSession>>;
    async fn update_live_session(
        &self,
        scope: Scope,
        id: i64,
        update: LiveSessionUpdate,
    ) -> StoreResult<Option<LiveSession>>;
    async fn delete_live_session(&self, scope: Scope, id: i64) -> StoreResult<bool>;
    /// Most recent start first, undated last
    async fn list_live_sessions(&self, kind: ScopeKind, owner_ids: &[i64]) -> StoreResult<Vec<LiveSession>>;

    async fn create_recording(&self, recording: NewRecording) -> StoreResult<Recording>;
    async fn find_recording(&self, scope: Scope, id: i64) -> StoreResult<Option<Recording>>;
    async fn update_recording(
        &self,
        scope: Scope,
        id: i64,
        update: RecordingUpdate,
    ) -> StoreResult<Option<Recording>>;
    async fn delete_recording(&self, scope: Scope, id: i64) -> StoreResult<bool>;
    /// Newest first
    async fn list_recordings(&self, kind: ScopeKind, owner_ids: &[i64]) -> StoreResult<Vec<Recording>>;
}

#[async_trait]
pub trait HomeworkStore: Send + Sync {
    /// Creates the task, its assignments and one notification per target
    async fn assign_homework(&self, task: NewHomeworkTask) -> StoreResult<AssignedTask>;
    async fn list_task_summaries(&self, course_ids: &[i64]) -> StoreResult<Vec<TaskSummary>>;
    async fn list_submissions(&self, course_ids: &[i64]) -> StoreResult<Vec<SubmissionRow>>;
    async fn list_student_assignments(&self, student_id: i64) -> StoreResult<Vec<StudentAssignment>>;
    /// `None` when the assignment does not exist or is addressed to someone else
    async fn submit_assignment(
        &self,
        assignment_id: i64,
        student_id: i64,
        submission_text: String,
    ) -> StoreResult<Option<HomeworkAssignment>>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn list_notifications(&self, user_id: i64, limit: i64) -> StoreResult<Vec<Notification>>;
    async fn mark_notification_read(&self, id: i64, user_id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn load_content(&self, key: &str) -> StoreResult<Option<SiteContent>>;
    /// Inserts `content` unless the key already exists; returns the stored row
    async fn seed_content(&self, key: &str, content: Value) -> StoreResult<SiteContent>;
    /// Upsert, last writer wins
    async fn save_content(&self, key: &str, content: Value, updated_by: i64) -> StoreResult<SiteContent>;
}

#[async_trait]
pub trait Store:
    UserStore + GroupStore + CourseStore + ScheduleStore + HomeworkStore + NotificationStore + ContentStore
{
    async fn ping(&self) -> StoreResult<()>;
}
