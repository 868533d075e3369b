mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;
use tuition_api::database::models::Role;

#[tokio::test]
async fn created_user_logs_in_with_issued_password() -> Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.signed_in(Role::Admin, "admin@school.test").await?;

    let res = app
        .post(
            "/api/v1/admin/users",
            Some(&admin),
            json!({ "name": "Tina Teacher", "email": "Tina@School.test", "role": "teacher" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["message"], "User created");
    assert_eq!(res.data()["user"]["email"], "tina@school.test");
    assert_eq!(res.data()["user"]["mustChangePassword"], true);

    let credentials = &res.data()["credentials"];
    assert_eq!(credentials["email"], "tina@school.test");
    let temporary = credentials["temporaryPassword"].as_str().unwrap_or_default().to_string();
    assert_eq!(temporary.len(), 12);

    let cookie = app.login("tina@school.test", &temporary).await?;
    let res = app.get("/api/v1/teacher/dashboard", Some(&cookie)).await?;
    assert_eq!(res.code(), "PASSWORD_CHANGE_REQUIRED");
    Ok(())
}

#[tokio::test]
async fn duplicate_email_conflicts_case_insensitively() -> Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.signed_in(Role::Admin, "admin@school.test").await?;
    app.seed_user("Sam", "sam@school.test", Role::Student, false).await?;

    let res = app
        .post(
            "/api/v1/admin/users",
            Some(&admin),
            json!({ "name": "Other Sam", "email": "SAM@school.test", "role": "student" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn create_rejects_missing_fields_and_bad_roles() -> Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.signed_in(Role::SuperAdmin, "root@school.test").await?;

    let res = app
        .post("/api/v1/admin/users", Some(&admin), json!({ "email": "x@school.test", "role": "student" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "name and email are required");

    for role in ["super_admin", "principal", ""] {
        let res = app
            .post(
                "/api/v1/admin/users",
                Some(&admin),
                json!({ "name": "X", "email": "x@school.test", "role": role }),
            )
            .await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "role {:?}", role);
        assert_eq!(res.body["message"], "role must be admin, teacher, or student");
    }
    Ok(())
}

#[tokio::test]
async fn update_with_reset_issues_new_credentials() -> Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.signed_in(Role::Admin, "admin@school.test").await?;
    let student = app.seed_user("Sam", "sam@school.test", Role::Student, false).await?;
    let url = format!("/api/v1/admin/users/{}", student.id);

    let res = app
        .put(&url, Some(&admin), json!({ "name": "Samuel", "email": "sam@school.test", "role": "student" }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["user"]["name"], "Samuel");
    assert!(res.data()["credentials"].is_null());
    assert_eq!(res.data()["user"]["mustChangePassword"], false);

    let res = app
        .put(
            &url,
            Some(&admin),
            json!({ "name": "Samuel", "email": "sam@school.test", "role": "student", "resetPassword": true }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["user"]["mustChangePassword"], true);
    let temporary = res.data()["credentials"]["temporaryPassword"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    assert!(app.login("sam@school.test", common::PASSWORD).await.is_err());
    assert!(app.login("sam@school.test", &temporary).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn update_and_delete_missing_user_is_404() -> Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.signed_in(Role::Admin, "admin@school.test").await?;

    let res = app
        .put("/api/v1/admin/users/999", Some(&admin), json!({ "name": "N", "email": "n@school.test", "role": "student" }))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "User not found");

    let res = app.delete("/api/v1/admin/users/999", Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn only_super_admin_manages_super_admins() -> Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.signed_in(Role::Admin, "admin@school.test").await?;
    let (_, root) = app.signed_in(Role::SuperAdmin, "root@school.test").await?;
    let other_root = app.seed_user("Root Two", "root2@school.test", Role::SuperAdmin, false).await?;
    let teacher = app.seed_user("Tess", "tess@school.test", Role::Teacher, false).await?;

    let res = app.delete(&format!("/api/v1/admin/users/{}", other_root.id), Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "Only a super admin can manage super admin accounts");

    let promote = json!({ "name": "Tess", "email": "tess@school.test", "role": "super_admin" });
    let url = format!("/api/v1/admin/users/{}", teacher.id);
    let res = app.put(&url, Some(&admin), promote.clone()).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.put(&url, Some(&root), promote).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["user"]["role"], "super_admin");

    let res = app.delete(&format!("/api/v1/admin/users/{}", other_root.id), Some(&root)).await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn self_delete_is_refused() -> Result<()> {
    let app = TestApp::new();
    let (admin, cookie) = app.signed_in(Role::Admin, "admin@school.test").await?;

    let res = app.delete(&format!("/api/v1/admin/users/{}", admin.id), Some(&cookie)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "You cannot delete your own account");
    Ok(())
}

#[tokio::test]
async fn delete_removes_user_and_list_is_newest_first() -> Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.signed_in(Role::Admin, "admin@school.test").await?;
    let first = app.seed_user("First", "first@school.test", Role::Student, false).await?;
    let second = app.seed_user("Second", "second@school.test", Role::Teacher, false).await?;

    let res = app.get("/api/v1/admin/users", Some(&admin)).await?;
    let ids: Vec<i64> = res.data()["users"]
        .as_array()
        .map(|users| users.iter().filter_map(|u| u["id"].as_i64()).collect())
        .unwrap_or_default();
    assert_eq!(ids.first().copied(), Some(second.id));
    assert_eq!(ids.len(), 3);

    let res = app.delete(&format!("/api/v1/admin/users/{}", first.id), Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["message"], "User deleted");

    let res = app.get("/api/v1/admin/users", Some(&admin)).await?;
    assert_eq!(res.data()["users"].as_array().map(Vec::len), Some(2));
    Ok(())
}
