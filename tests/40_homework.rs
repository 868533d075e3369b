mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::TestApp;
use tuition_api::database::models::Role;
use tuition_api::database::NotificationStore;

struct Classroom {
    admin: String,
    teacher_id: i64,
    teacher: String,
    course_id: i64,
    students: Vec<(i64, String)>,
}

/// One course with two enrolled students and one student who is not enrolled
async fn classroom(app: &TestApp) -> Result<Classroom> {
    let (_, admin) = app.signed_in(Role::Admin, "admin@school.test").await?;
    let (teacher, teacher_cookie) = app.signed_in(Role::Teacher, "teacher@school.test").await?;
    let res = app
        .post(
            "/api/v1/courses",
            Some(&admin),
            json!({ "title": "Biology", "description": "Cells", "teacherId": teacher.id }),
        )
        .await?;
    let course_id = res.data()["course"]["id"].as_i64().unwrap_or_default();

    let mut students = Vec::new();
    for email in ["s1@school.test", "s2@school.test", "s3@school.test"] {
        let (student, cookie) = app.signed_in(Role::Student, email).await?;
        students.push((student.id, cookie));
    }
    for (_, cookie) in &students[..2] {
        let res = app
            .send(Method::POST, &format!("/api/v1/courses/{}/enroll", course_id), Some(cookie), None)
            .await?;
        assert_eq!(res.status, StatusCode::OK);
    }

    Ok(Classroom {
        admin,
        teacher_id: teacher.id,
        teacher: teacher_cookie,
        course_id,
        students,
    })
}

fn task_url(course_id: i64) -> String {
    format!("/api/v1/teacher/courses/{}/tasks", course_id)
}

async fn first_assignment(app: &TestApp, cookie: &str) -> Result<Value> {
    let res = app.get("/api/v1/student/portal", Some(cookie)).await?;
    Ok(res.data()["tasks"][0].clone())
}

#[tokio::test]
async fn task_targets_every_enrolled_student() -> Result<()> {
    let app = TestApp::new();
    let room = classroom(&app).await?;

    let res = app
        .post(
            &task_url(room.course_id),
            Some(&room.teacher),
            json!({ "subject": "Biology", "title": "Label a cell", "dueDate": "2024-06-01" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["message"], "Homework assigned");
    assert_eq!(res.data()["task"]["assignedCount"], 2);
    assert_eq!(res.data()["task"]["dueDate"], "2024-06-01");
    assert_eq!(res.data()["task"]["teacherId"], room.teacher_id);

    for (student_id, cookie) in &room.students[..2] {
        let task = first_assignment(&app, cookie).await?;
        assert_eq!(task["status"], "pending");
        assert_eq!(task["courseTitle"], "Biology");
        let notifications = app.store.list_notifications(*student_id, 50).await?;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, "homework");
    }

    let (outsider, cookie) = &room.students[2];
    assert!(first_assignment(&app, cookie).await?.is_null());
    assert!(app.store.list_notifications(*outsider, 50).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn explicit_targets_are_limited_to_enrolled_students() -> Result<()> {
    let app = TestApp::new();
    let room = classroom(&app).await?;
    let (first, _) = room.students[0];
    let (outsider, _) = room.students[2];

    let res = app
        .post(
            &task_url(room.course_id),
            Some(&room.teacher),
            json!({ "subject": "Biology", "title": "Extension", "studentIds": [first, first.to_string(), outsider] }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["task"]["assignedCount"], 1);
    Ok(())
}

#[tokio::test]
async fn task_input_is_validated() -> Result<()> {
    let app = TestApp::new();
    let room = classroom(&app).await?;
    let url = task_url(room.course_id);

    let res = app.post(&url, Some(&room.teacher), json!({ "subject": "Biology" })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "subject and title are required");

    let res = app
        .post(&url, Some(&room.teacher), json!({ "subject": "Biology", "title": "T", "dueDate": "soon" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post(&url, Some(&room.teacher), json!({ "subject": "Biology", "title": "T", "studentIds": ["a", "b"] }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "studentIds must contain integer values");

    let res = app
        .post(&task_url(999), Some(&room.teacher), json!({ "subject": "Biology", "title": "T" }))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let (_, other) = app.signed_in(Role::Teacher, "other@school.test").await?;
    let res = app.post(&url, Some(&other), json!({ "subject": "Biology", "title": "T" })).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "You can only assign tasks for your own courses");
    Ok(())
}

#[tokio::test]
async fn admin_authors_on_behalf_of_course_teacher() -> Result<()> {
    let app = TestApp::new();
    let room = classroom(&app).await?;

    let res = app
        .post(&task_url(room.course_id), Some(&room.admin), json!({ "subject": "Biology", "title": "Admin set" }))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["task"]["teacherId"], room.teacher_id);
    Ok(())
}

#[tokio::test]
async fn submission_and_resubmission() -> Result<()> {
    let app = TestApp::new();
    let room = classroom(&app).await?;
    app.post(&task_url(room.course_id), Some(&room.teacher), json!({ "subject": "Biology", "title": "Essay" }))
        .await?;

    let (_, cookie) = &room.students[0];
    let (_, other_cookie) = &room.students[1];
    let assignment_id = first_assignment(&app, cookie).await?["assignmentId"]
        .as_i64()
        .unwrap_or_default();
    let url = format!("/api/v1/student/tasks/{}/submit", assignment_id);

    let res = app.post(&url, Some(cookie), json!({ "submissionText": "   " })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "submissionText is required");

    let res = app.post(&url, Some(other_cookie), json!({ "submissionText": "not mine" })).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Assignment not found");

    let res = app.post(&url, Some(cookie), json!({ "submissionText": "first draft" })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["message"], "Homework submitted");
    assert_eq!(res.data()["assignment"]["status"], "submitted");

    let res = app.post(&url, Some(cookie), json!({ "submissionText": "final draft" })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["assignment"]["submissionText"], "final draft");

    let task = first_assignment(&app, cookie).await?;
    assert_eq!(task["submissionText"], "final draft");
    Ok(())
}

#[tokio::test]
async fn dashboard_counts_tasks_and_submissions() -> Result<()> {
    let app = TestApp::new();
    let room = classroom(&app).await?;
    app.post(&task_url(room.course_id), Some(&room.teacher), json!({ "subject": "Biology", "title": "Essay" }))
        .await?;
    app.post(
        &format!("/api/v1/courses/{}/live-sessions", room.course_id),
        Some(&room.teacher),
        json!({ "topic": "Mitosis", "joinUrl": "https://meet.example/b" }),
    )
    .await?;

    let (_, cookie) = &room.students[0];
    let assignment_id = first_assignment(&app, cookie).await?["assignmentId"]
        .as_i64()
        .unwrap_or_default();
    app.post(
        &format!("/api/v1/student/tasks/{}/submit", assignment_id),
        Some(cookie),
        json!({ "submissionText": "done" }),
    )
    .await?;

    let res = app.get("/api/v1/teacher/dashboard", Some(&room.teacher)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let stats = &res.data()["stats"];
    assert_eq!(stats["totalCourses"], 1);
    assert_eq!(stats["totalTasks"], 1);
    assert_eq!(stats["pendingSubmissions"], 1);
    assert_eq!(stats["submittedAssignments"], 1);
    assert_eq!(stats["scheduledClasses"], 1);

    let task = &res.data()["tasks"][0];
    assert_eq!(task["assignedCount"], 2);
    assert_eq!(task["submittedCount"], 1);
    assert_eq!(res.data()["submissions"].as_array().map(Vec::len), Some(2));
    assert_eq!(res.data()["schedule"][0]["id"], "course-1");
    Ok(())
}

#[tokio::test]
async fn dashboard_without_courses_is_all_zero() -> Result<()> {
    let app = TestApp::new();
    let (_, teacher) = app.signed_in(Role::Teacher, "new@school.test").await?;

    let res = app.get("/api/v1/teacher/dashboard", Some(&teacher)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.data()["stats"],
        json!({
            "totalCourses": 0,
            "totalTasks": 0,
            "pendingSubmissions": 0,
            "submittedAssignments": 0,
            "scheduledClasses": 0,
        })
    );
    for key in ["courses", "tasks", "submissions", "schedule", "previousLectures"] {
        assert_eq!(res.data()[key], json!([]), "{}", key);
    }
    Ok(())
}

#[tokio::test]
async fn notifications_are_marked_read_by_their_owner_only() -> Result<()> {
    let app = TestApp::new();
    let room = classroom(&app).await?;
    app.post(&task_url(room.course_id), Some(&room.teacher), json!({ "subject": "Biology", "title": "Quiz" }))
        .await?;

    let (student_id, cookie) = &room.students[0];
    let (_, other_cookie) = &room.students[1];
    let notification_id = app.store.list_notifications(*student_id, 50).await?[0].id;
    let url = format!("/api/v1/student/notifications/{}/read", notification_id);

    let res = app.send(Method::PUT, &url, Some(other_cookie), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Notification not found");

    let res = app.send(Method::PUT, &url, Some(cookie), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["message"], "Notification marked as read");

    let res = app.get("/api/v1/student/portal", Some(cookie)).await?;
    assert_eq!(res.data()["notifications"][0]["isRead"], true);
    assert_eq!(res.data()["notifications"][0]["type"], "homework");
    Ok(())
}
