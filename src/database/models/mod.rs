pub mod content;
pub mod course;
pub mod group;
pub mod homework;
pub mod notification;
pub mod schedule;
pub mod user;

pub use content::SiteContent;
pub use course::{Course, CourseFilter, CourseListing, NewCourse};
pub use group::{GroupSummary, MemberSelection, NewGroup, StudentGroup};
pub use homework::{
    AssignedTask, AssignmentStatus, HomeworkAssignment, HomeworkTask, NewHomeworkTask,
    StudentAssignment, SubmissionRow, TaskSummary,
};
pub use notification::{NewNotification, Notification};
pub use schedule::{
    LiveSession, LiveSessionUpdate, NewLiveSession, NewRecording, Recording, RecordingRow,
    RecordingUpdate, ScheduledSession, Scope, ScopeKind, SessionRow,
};
pub use user::{normalize_email, NewUser, Role, User, UserCredentials, UserUpdate};
