//! In-process store selected with `DATABASE_URL=memory://`. Each trait method
//! takes the state lock once, so multi-row writes are all-or-nothing here too.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    AssignedTask, AssignmentStatus, Course, CourseFilter, CourseListing, GroupSummary,
    HomeworkAssignment, HomeworkTask, LiveSession, LiveSessionUpdate, MemberSelection, NewCourse,
    NewGroup, NewHomeworkTask, NewLiveSession, NewNotification, NewRecording, NewUser, Notification,
    Recording, RecordingUpdate, Role, ScheduledSession, Scope, ScopeKind, SiteContent,
    StudentAssignment, StudentGroup, SubmissionRow, TaskSummary, User, UserCredentials, UserUpdate,
};
use crate::database::store::{
    ContentStore, CourseStore, GroupStore, HomeworkStore, NotificationStore, ScheduleStore, Store,
    StoreResult, UserStore,
};
use crate::services::notifications::{fan_out, homework_notice, live_session_notice};

const DUPLICATE_EMAIL: &str = "Email already exists";

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    sequences: HashMap<&'static str, i64>,
    users: BTreeMap<i64, UserCredentials>,
    groups: BTreeMap<i64, StudentGroup>,
    /// (group_id, student_id) in join order
    members: Vec<(i64, i64)>,
    courses: BTreeMap<i64, Course>,
    /// (course_id, student_id) in enrollment order
    enrollments: Vec<(i64, i64)>,
    sessions: Vec<LiveSession>,
    recordings: Vec<Recording>,
    tasks: BTreeMap<i64, HomeworkTask>,
    assignments: BTreeMap<i64, HomeworkAssignment>,
    notifications: Vec<Notification>,
    contents: HashMap<String, SiteContent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryState {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let id = self.sequences.entry(table).or_insert(0);
        *id += 1;
        *id
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|c| c.user.email == email && Some(c.user.id) != except)
    }

    fn is_student(&self, id: i64) -> bool {
        self.users
            .get(&id)
            .map(|c| c.user.role == Role::Student)
            .unwrap_or(false)
    }

    fn audience(&self, scope: Scope) -> Vec<i64> {
        match scope.kind {
            ScopeKind::Course => self
                .enrollments
                .iter()
                .filter(|(course_id, _)| *course_id == scope.id)
                .map(|(_, student_id)| *student_id)
                .collect(),
            ScopeKind::Group => self
                .members
                .iter()
                .filter(|(group_id, _)| *group_id == scope.id)
                .map(|(_, student_id)| *student_id)
                .collect(),
        }
    }

    fn push_notifications(&mut self, rows: Vec<NewNotification>) -> usize {
        let count = rows.len();
        for row in rows {
            let id = self.next_id("notifications");
            self.notifications.push(Notification {
                id,
                user_id: row.user_id,
                kind: row.kind,
                title: row.title,
                message: row.message,
                is_read: false,
                payload: row.payload,
                created_at: Utc::now(),
            });
        }
        count
    }

    fn add_members(&mut self, group_id: i64, selection: &MemberSelection) -> usize {
        let mut seen = HashSet::new();
        let students: Vec<i64> = match selection {
            MemberSelection::AllStudents => self
                .users
                .values()
                .filter(|c| c.user.role == Role::Student)
                .map(|c| c.user.id)
                .collect(),
            MemberSelection::Students(ids) => ids
                .iter()
                .copied()
                .filter(|id| self.is_student(*id) && seen.insert(*id))
                .collect(),
        };
        for student_id in &students {
            if !self.members.contains(&(group_id, *student_id)) {
                self.members.push((group_id, *student_id));
            }
        }
        students.len()
    }

    // Mirrors the ON DELETE CASCADE chain of the relational schema
    fn remove_course(&mut self, course_id: i64) {
        self.courses.remove(&course_id);
        self.enrollments.retain(|(c, _)| *c != course_id);
        self.sessions.retain(|s| s.scope != Scope::course(course_id));
        self.recordings.retain(|r| r.scope != Scope::course(course_id));
        let task_ids: Vec<i64> = self
            .tasks
            .values()
            .filter(|t| t.course_id == course_id)
            .map(|t| t.id)
            .collect();
        for task_id in task_ids {
            self.remove_task(task_id);
        }
    }

    fn remove_task(&mut self, task_id: i64) {
        self.tasks.remove(&task_id);
        self.assignments.retain(|_, a| a.task_id != task_id);
    }

    fn remove_group(&mut self, group_id: i64) {
        self.groups.remove(&group_id);
        self.members.retain(|(g, _)| *g != group_id);
        self.sessions.retain(|s| s.scope != Scope::group(group_id));
        self.recordings.retain(|r| r.scope != Scope::group(group_id));
    }

    fn listing(&self, course: &Course) -> CourseListing {
        let teacher_name = self
            .users
            .get(&course.teacher_id)
            .map(|c| c.user.name.clone())
            .unwrap_or_default();
        CourseListing { course: course.clone(), teacher_name }
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).map(|c| c.user.clone()))
    }

    async fn find_credentials(&self, id: i64) -> StoreResult<Option<UserCredentials>> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_credentials_by_email(&self, email: &str) -> StoreResult<Option<UserCredentials>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|c| c.user.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().map(|c| c.user.clone()).collect();
        newest_first(&mut users, |u| (u.created_at, u.id));
        Ok(users)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.state.write().await;
        if state.email_taken(&user.email, None) {
            return Err(DatabaseError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
        let id = state.next_id("users");
        let created = User {
            id,
            name: user.name,
            email: user.email,
            role: user.role,
            must_change_password: user.must_change_password,
            created_at: Utc::now(),
        };
        state.users.insert(
            id,
            UserCredentials { user: created.clone(), password_hash: user.password_hash },
        );
        Ok(created)
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> StoreResult<Option<User>> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&id) {
            return Ok(None);
        }
        if state.email_taken(&update.email, Some(id)) {
            return Err(DatabaseError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
        let Some(record) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        record.user.name = update.name;
        record.user.email = update.email;
        record.user.role = update.role;
        if let Some(hash) = update.password_reset {
            record.password_hash = hash;
            record.user.must_change_password = true;
        }
        Ok(Some(record.user.clone()))
    }

    async fn set_password(&self, id: i64, password_hash: String, must_change: bool) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.users.get_mut(&id) {
            Some(record) => {
                record.password_hash = password_hash;
                record.user.must_change_password = must_change;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        let taught: Vec<i64> = state
            .courses
            .values()
            .filter(|c| c.teacher_id == id)
            .map(|c| c.id)
            .collect();
        for course_id in taught {
            state.remove_course(course_id);
        }
        let authored: Vec<i64> = state
            .tasks
            .values()
            .filter(|t| t.teacher_id == id)
            .map(|t| t.id)
            .collect();
        for task_id in authored {
            state.remove_task(task_id);
        }
        state.members.retain(|(_, s)| *s != id);
        state.enrollments.retain(|(_, s)| *s != id);
        state.assignments.retain(|_, a| a.student_id != id);
        state.notifications.retain(|n| n.user_id != id);
        for content in state.contents.values_mut() {
            if content.updated_by == Some(id) {
                content.updated_by = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn list_groups(&self) -> StoreResult<Vec<GroupSummary>> {
        let state = self.state.read().await;
        let mut groups: Vec<GroupSummary> = state
            .groups
            .values()
            .map(|group| GroupSummary {
                group: group.clone(),
                student_count: state.members.iter().filter(|(g, _)| *g == group.id).count() as i64,
            })
            .collect();
        newest_first(&mut groups, |g| (g.group.created_at, g.group.id));
        Ok(groups)
    }

    async fn find_group(&self, id: i64) -> StoreResult<Option<StudentGroup>> {
        let state = self.state.read().await;
        Ok(state.groups.get(&id).cloned())
    }

    async fn create_group(&self, group: NewGroup) -> StoreResult<StudentGroup> {
        let mut state = self.state.write().await;
        let id = state.next_id("student_groups");
        let created = StudentGroup {
            id,
            name: group.name,
            description: group.description,
            created_at: Utc::now(),
        };
        state.groups.insert(id, created.clone());
        if group.include_all_students {
            state.add_members(id, &MemberSelection::AllStudents);
        }
        Ok(created)
    }

    async fn update_group(
        &self,
        id: i64,
        name: String,
        description: Option<String>,
    ) -> StoreResult<Option<StudentGroup>> {
        let mut state = self.state.write().await;
        Ok(state.groups.get_mut(&id).map(|group| {
            group.name = name;
            group.description = description;
            group.clone()
        }))
    }

    async fn delete_group(&self, id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&id) {
            return Ok(false);
        }
        state.remove_group(id);
        Ok(true)
    }

    async fn add_group_members(&self, group_id: i64, selection: MemberSelection) -> StoreResult<usize> {
        let mut state = self.state.write().await;
        Ok(state.add_members(group_id, &selection))
    }

    async fn list_student_groups(&self, student_id: i64) -> StoreResult<Vec<StudentGroup>> {
        let state = self.state.read().await;
        let mut groups: Vec<StudentGroup> = state
            .members
            .iter()
            .filter(|(_, s)| *s == student_id)
            .filter_map(|(g, _)| state.groups.get(g).cloned())
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn create_course(&self, course: NewCourse) -> StoreResult<Course> {
        let mut state = self.state.write().await;
        let id = state.next_id("courses");
        let created = Course {
            id,
            title: course.title,
            description: course.description,
            teacher_id: course.teacher_id,
            created_at: Utc::now(),
        };
        state.courses.insert(id, created.clone());
        Ok(created)
    }

    async fn find_course(&self, id: i64) -> StoreResult<Option<Course>> {
        let state = self.state.read().await;
        Ok(state.courses.get(&id).cloned())
    }

    async fn list_courses(&self, filter: CourseFilter) -> StoreResult<Vec<CourseListing>> {
        let state = self.state.read().await;
        let mut courses: Vec<CourseListing> = state
            .courses
            .values()
            .filter(|course| match filter {
                CourseFilter::All => true,
                CourseFilter::TaughtBy(teacher_id) => course.teacher_id == teacher_id,
                CourseFilter::EnrolledStudent(student_id) => {
                    state.enrollments.contains(&(course.id, student_id))
                }
            })
            .map(|course| state.listing(course))
            .collect();
        newest_first(&mut courses, |c| (c.course.created_at, c.course.id));
        Ok(courses)
    }

    async fn enroll_student(&self, course_id: i64, student_id: i64) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if !state.enrollments.contains(&(course_id, student_id)) {
            state.enrollments.push((course_id, student_id));
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn schedule_live_session(&self, session: NewLiveSession) -> StoreResult<ScheduledSession> {
        let mut state = self.state.write().await;
        let id = state.next_id(session.scope.kind.sessions_table());
        let created = LiveSession {
            id,
            scope: session.scope,
            topic: session.topic,
            join_url: session.join_url,
            start_time: session.start_time,
            created_at: Utc::now(),
        };
        state.sessions.push(created.clone());

        let recipients = state.audience(created.scope);
        let notified = state.push_notifications(fan_out(&recipients, &live_session_notice(&created)));
        Ok(ScheduledSession { session: created, notified })
    }

    async fn find_live_session(&self, scope: Scope, id: i64) -> StoreResult<Option<LiveSession>> {
        let state = self.state.read().await;
        Ok(state
            .sessions
            .iter()
            .find(|s| s.scope == scope && s.id == id)
            .cloned())
    }

    async fn update_live_session(
        &self,
        scope: Scope,
        id: i64,
        update: LiveSessionUpdate,
    ) -> StoreResult<Option<LiveSession>> {
        let mut state = self.state.write().await;
        Ok(state
            .sessions
            .iter_mut()
            .find(|s| s.scope == scope && s.id == id)
            .map(|session| {
                session.topic = update.topic;
                session.join_url = update.join_url;
                session.start_time = update.start_time;
                session.clone()
            }))
    }

    async fn delete_live_session(&self, scope: Scope, id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|s| !(s.scope == scope && s.id == id));
        Ok(state.sessions.len() < before)
    }

    async fn list_live_sessions(&self, kind: ScopeKind, owner_ids: &[i64]) -> StoreResult<Vec<LiveSession>> {
        let state = self.state.read().await;
        let mut sessions: Vec<LiveSession> = state
            .sessions
            .iter()
            .filter(|s| s.scope.kind == kind && owner_ids.contains(&s.scope.id))
            .cloned()
            .collect();
        // DESC NULLS LAST on start time: `None < Some` so the reversed compare puts undated last
        sessions.sort_by(|a, b| {
            b.start_time
                .cmp(&a.start_time)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(sessions)
    }

    async fn create_recording(&self, recording: NewRecording) -> StoreResult<Recording> {
        let mut state = self.state.write().await;
        let id = state.next_id(recording.scope.kind.recordings_table());
        let created = Recording {
            id,
            scope: recording.scope,
            title: recording.title,
            video_id: recording.video_id,
            embed_url: recording.embed_url,
            created_at: Utc::now(),
        };
        state.recordings.push(created.clone());
        Ok(created)
    }

    async fn find_recording(&self, scope: Scope, id: i64) -> StoreResult<Option<Recording>> {
        let state = self.state.read().await;
        Ok(state
            .recordings
            .iter()
            .find(|r| r.scope == scope && r.id == id)
            .cloned())
    }

    async fn update_recording(
        &self,
        scope: Scope,
        id: i64,
        update: RecordingUpdate,
    ) -> StoreResult<Option<Recording>> {
        let mut state = self.state.write().await;
        Ok(state
            .recordings
            .iter_mut()
            .find(|r| r.scope == scope && r.id == id)
            .map(|recording| {
                recording.title = update.title;
                if let Some((video_id, embed_url)) = update.video {
                    recording.video_id = video_id;
                    recording.embed_url = embed_url;
                }
                recording.clone()
            }))
    }

    async fn delete_recording(&self, scope: Scope, id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.recordings.len();
        state.recordings.retain(|r| !(r.scope == scope && r.id == id));
        Ok(state.recordings.len() < before)
    }

    async fn list_recordings(&self, kind: ScopeKind, owner_ids: &[i64]) -> StoreResult<Vec<Recording>> {
        let state = self.state.read().await;
        let mut recordings: Vec<Recording> = state
            .recordings
            .iter()
            .filter(|r| r.scope.kind == kind && owner_ids.contains(&r.scope.id))
            .cloned()
            .collect();
        newest_first(&mut recordings, |r| (r.created_at, r.id));
        Ok(recordings)
    }
}

#[async_trait]
impl HomeworkStore for MemoryStore {
    async fn assign_homework(&self, task: NewHomeworkTask) -> StoreResult<AssignedTask> {
        let mut state = self.state.write().await;
        let id = state.next_id("homework_tasks");
        let created = HomeworkTask {
            id,
            course_id: task.course_id,
            teacher_id: task.teacher_id,
            subject: task.subject,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            created_at: Utc::now(),
        };
        state.tasks.insert(id, created.clone());

        let enrolled = state.audience(Scope::course(task.course_id));
        let targets: Vec<i64> = match task.student_ids {
            Some(requested) => {
                let mut seen = HashSet::new();
                requested
                    .into_iter()
                    .filter(|id| enrolled.contains(id) && seen.insert(*id))
                    .collect()
            }
            None => enrolled,
        };

        for student_id in &targets {
            let assignment_id = state.next_id("homework_assignments");
            state.assignments.insert(
                assignment_id,
                HomeworkAssignment {
                    id: assignment_id,
                    task_id: id,
                    student_id: *student_id,
                    status: AssignmentStatus::Pending,
                    submission_text: None,
                    submitted_at: None,
                    created_at: Utc::now(),
                },
            );
        }

        state.push_notifications(fan_out(&targets, &homework_notice(&created, &task.course_title)));
        Ok(AssignedTask { task: created, assigned: targets.len() })
    }

    async fn list_task_summaries(&self, course_ids: &[i64]) -> StoreResult<Vec<TaskSummary>> {
        let state = self.state.read().await;
        let mut summaries: Vec<TaskSummary> = state
            .tasks
            .values()
            .filter(|t| course_ids.contains(&t.course_id))
            .map(|task| {
                let assignments = state.assignments.values().filter(|a| a.task_id == task.id);
                let (assigned, submitted) = assignments.fold((0, 0), |(n, s), a| {
                    (n + 1, s + i64::from(a.status == AssignmentStatus::Submitted))
                });
                TaskSummary {
                    task: task.clone(),
                    course_title: state
                        .courses
                        .get(&task.course_id)
                        .map(|c| c.title.clone())
                        .unwrap_or_default(),
                    assigned_count: assigned,
                    submitted_count: submitted,
                }
            })
            .collect();
        newest_first(&mut summaries, |s| (s.task.created_at, s.task.id));
        Ok(summaries)
    }

    async fn list_submissions(&self, course_ids: &[i64]) -> StoreResult<Vec<SubmissionRow>> {
        let state = self.state.read().await;
        let mut rows: Vec<(DateTime<Utc>, SubmissionRow)> = state
            .assignments
            .values()
            .filter_map(|a| {
                let task = state.tasks.get(&a.task_id)?;
                if !course_ids.contains(&task.course_id) {
                    return None;
                }
                let course = state.courses.get(&task.course_id)?;
                let student = state.users.get(&a.student_id)?;
                Some((
                    a.created_at,
                    SubmissionRow {
                        assignment_id: a.id,
                        task_id: task.id,
                        status: a.status,
                        submission_text: a.submission_text.clone(),
                        submitted_at: a.submitted_at,
                        task_title: task.title.clone(),
                        subject: task.subject.clone(),
                        course_title: course.title.clone(),
                        student_id: student.user.id,
                        student_name: student.user.name.clone(),
                        student_email: student.user.email.clone(),
                    },
                ))
            })
            .collect();
        rows.sort_by(|(a_created, a), (b_created, b)| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| b_created.cmp(a_created))
                .then_with(|| b.assignment_id.cmp(&a.assignment_id))
        });
        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }

    async fn list_student_assignments(&self, student_id: i64) -> StoreResult<Vec<StudentAssignment>> {
        let state = self.state.read().await;
        let mut rows: Vec<StudentAssignment> = state
            .assignments
            .values()
            .filter(|a| a.student_id == student_id)
            .filter_map(|a| {
                let task = state.tasks.get(&a.task_id)?;
                let course = state.courses.get(&task.course_id)?;
                let teacher = state.users.get(&task.teacher_id)?;
                Some(StudentAssignment {
                    assignment_id: a.id,
                    status: a.status,
                    submission_text: a.submission_text.clone(),
                    submitted_at: a.submitted_at,
                    task_id: task.id,
                    subject: task.subject.clone(),
                    title: task.title.clone(),
                    description: task.description.clone(),
                    due_date: task.due_date,
                    task_created_at: task.created_at,
                    course_id: course.id,
                    course_title: course.title.clone(),
                    teacher_name: teacher.user.name.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            (a.due_date.is_none(), a.due_date)
                .cmp(&(b.due_date.is_none(), b.due_date))
                .then_with(|| b.task_created_at.cmp(&a.task_created_at))
                .then_with(|| b.assignment_id.cmp(&a.assignment_id))
        });
        Ok(rows)
    }

    async fn submit_assignment(
        &self,
        assignment_id: i64,
        student_id: i64,
        submission_text: String,
    ) -> StoreResult<Option<HomeworkAssignment>> {
        let mut state = self.state.write().await;
        Ok(state
            .assignments
            .get_mut(&assignment_id)
            .filter(|a| a.student_id == student_id)
            .map(|assignment| {
                assignment.status = AssignmentStatus::Submitted;
                assignment.submission_text = Some(submission_text);
                assignment.submitted_at = Some(Utc::now());
                assignment.clone()
            }))
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn list_notifications(&self, user_id: i64, limit: i64) -> StoreResult<Vec<Notification>> {
        let state = self.state.read().await;
        let mut rows: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut rows, |n| (n.created_at, n.id));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn mark_notification_read(&self, id: i64, user_id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            Some(notification) => {
                notification.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn load_content(&self, key: &str) -> StoreResult<Option<SiteContent>> {
        let state = self.state.read().await;
        Ok(state.contents.get(key).cloned())
    }

    async fn seed_content(&self, key: &str, content: Value) -> StoreResult<SiteContent> {
        let mut state = self.state.write().await;
        let row = state.contents.entry(key.to_string()).or_insert_with(|| SiteContent {
            content_key: key.to_string(),
            content,
            updated_by: None,
            updated_at: Utc::now(),
        });
        Ok(row.clone())
    }

    async fn save_content(&self, key: &str, content: Value, updated_by: i64) -> StoreResult<SiteContent> {
        let mut state = self.state.write().await;
        let row = SiteContent {
            content_key: key.to_string(),
            content,
            updated_by: Some(updated_by),
            updated_at: Utc::now(),
        };
        state.contents.insert(key.to_string(), row.clone());
        Ok(row)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user(store: &MemoryStore, email: &str, role: Role) -> User {
        store
            .create_user(NewUser {
                name: email.to_string(),
                email: email.to_string(),
                role,
                password_hash: "hash".to_string(),
                must_change_password: false,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        user(&store, "a@x.com", Role::Teacher).await;
        let err = store
            .create_user(NewUser {
                name: "Other".into(),
                email: "a@x.com".into(),
                role: Role::Student,
                password_hash: "hash".into(),
                must_change_password: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn group_session_notifies_each_member_once() {
        let store = MemoryStore::new();
        let admin = user(&store, "admin@x.com", Role::Admin).await;
        let s1 = user(&store, "s1@x.com", Role::Student).await;
        let s2 = user(&store, "s2@x.com", Role::Student).await;
        let group = store
            .create_group(NewGroup {
                name: "Evening".into(),
                description: None,
                created_by: admin.id,
                include_all_students: false,
            })
            .await
            .unwrap();

        let added = store
            .add_group_members(group.id, MemberSelection::Students(vec![s1.id, s2.id, s1.id, admin.id]))
            .await
            .unwrap();
        assert_eq!(added, 2);
        // re-adding is a no-op
        store
            .add_group_members(group.id, MemberSelection::Students(vec![s1.id]))
            .await
            .unwrap();

        let scheduled = store
            .schedule_live_session(NewLiveSession {
                scope: Scope::group(group.id),
                topic: "Revision".into(),
                join_url: "https://meet.example/2".into(),
                start_time: None,
            })
            .await
            .unwrap();
        assert_eq!(scheduled.notified, 2);

        for student in [&s1, &s2] {
            let rows = store.list_notifications(student.id, 50).await.unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].kind, "group_live_class");
            assert_eq!(rows[0].payload.as_ref().unwrap()["sessionId"], scheduled.session.id);
        }
    }

    #[tokio::test]
    async fn deleting_a_teacher_cascades_to_courses() {
        let store = MemoryStore::new();
        let teacher = user(&store, "t@x.com", Role::Teacher).await;
        let course = store
            .create_course(NewCourse {
                title: "Physics".into(),
                description: "Intro".into(),
                teacher_id: teacher.id,
            })
            .await
            .unwrap();
        assert!(store.delete_user(teacher.id).await.unwrap());
        assert!(store.find_course(course.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn undated_sessions_sort_last() {
        let store = MemoryStore::new();
        let teacher = user(&store, "t@x.com", Role::Teacher).await;
        let course = store
            .create_course(NewCourse {
                title: "Physics".into(),
                description: "Intro".into(),
                teacher_id: teacher.id,
            })
            .await
            .unwrap();
        for (topic, start) in [("undated", None), ("dated", Some(Utc::now()))] {
            store
                .schedule_live_session(NewLiveSession {
                    scope: Scope::course(course.id),
                    topic: topic.into(),
                    join_url: "https://meet.example/3".into(),
                    start_time: start,
                })
                .await
                .unwrap();
        }
        let sessions = store.list_live_sessions(ScopeKind::Course, &[course.id]).await.unwrap();
        let topics: Vec<&str> = sessions.iter().map(|s| s.topic.as_str()).collect();
        assert_eq!(topics, vec!["dated", "undated"]);
    }
}
