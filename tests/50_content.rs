mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;
use tuition_api::database::models::Role;

const PNG_BASE64: &str = "iVBORw0KGgo=";

#[tokio::test]
async fn public_home_seeds_default_content() -> Result<()> {
    let app = TestApp::new();
    let res = app.get("/api/v1/content/home", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    let content = &res.data()["content"];
    assert_eq!(content["appMeta"]["title"], "Tuition Centre");
    assert!(content["hero"].is_object());
    assert!(content["faq"].is_array());
    assert!(res.data()["updatedAt"].is_string());
    Ok(())
}

#[tokio::test]
async fn section_update_leaves_siblings_untouched() -> Result<()> {
    let app = TestApp::new();
    let (admin_user, admin) = app.signed_in(Role::Admin, "admin@school.test").await?;
    let before = app.get("/api/v1/content/home", None).await?.data()["content"].clone();

    let faq = json!([{ "question": "Is there a trial?", "answer": "Yes, one week." }]);
    let res = app
        .put("/api/v1/content/admin/home/faq", Some(&admin), json!({ "payload": faq }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["message"], "Section updated");
    assert_eq!(res.data()["sectionId"], "faq");
    assert_eq!(res.data()["section"], faq);

    let after = app.get("/api/v1/content/home", None).await?.data()["content"].clone();
    assert_eq!(after["faq"], faq);
    assert_eq!(after["hero"], before["hero"]);
    assert_eq!(after["appMeta"], before["appMeta"]);

    let res = app.get("/api/v1/content/admin/home", Some(&admin)).await?;
    assert_eq!(res.data()["updatedBy"], admin_user.id);
    Ok(())
}

#[tokio::test]
async fn branding_edits_app_meta() -> Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.signed_in(Role::SuperAdmin, "root@school.test").await?;
    let url = "/api/v1/content/admin/home/branding";

    let res = app.put(url, Some(&admin), json!({ "payload": { "title": "  " } })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Brand title is required");

    let res = app
        .put(url, Some(&admin), json!({ "payload": { "title": "Bright Minds", "logoUrl": "https://cdn.example/l.png" } }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["section"]["title"], "Bright Minds");
    assert_eq!(res.data()["content"]["appMeta"]["logoUrl"], "https://cdn.example/l.png");
    Ok(())
}

#[tokio::test]
async fn unknown_section_and_bad_payload_are_rejected() -> Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.signed_in(Role::Admin, "admin@school.test").await?;

    let res = app
        .put("/api/v1/content/admin/home/pricing", Some(&admin), json!({ "payload": {} }))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .put("/api/v1/content/admin/home/hero", Some(&admin), json!({ "payload": "plain text" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Payload must be an object");

    let res = app.put("/api/v1/content/admin/home/hero", Some(&admin), json!({})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn payload_is_checked_before_section_id() -> Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.signed_in(Role::Admin, "admin@school.test").await?;

    let res = app.put("/api/v1/content/admin/home/pricing", Some(&admin), json!({})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Payload must be an object");

    let res = app
        .put("/api/v1/content/admin/home/pricing", Some(&admin), json!({ "payload": 7 }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .put("/api/v1/content/admin/home/pricing", Some(&admin), json!({ "payload": [] }))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Unknown sectionId");
    Ok(())
}

#[tokio::test]
async fn editing_is_admin_only() -> Result<()> {
    let app = TestApp::new();
    let (_, teacher) = app.signed_in(Role::Teacher, "teacher@school.test").await?;

    let res = app.get("/api/v1/content/admin/home", Some(&teacher)).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = app
        .put("/api/v1/content/admin/home/faq", Some(&teacher), json!({ "payload": [] }))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn logo_upload_is_stored_and_served() -> Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.signed_in(Role::Admin, "admin@school.test").await?;

    let res = app
        .post(
            "/api/v1/content/admin/home/logo",
            Some(&admin),
            json!({ "fileName": "logo.png", "mimeType": "image/png", "dataBase64": PNG_BASE64 }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    let logo_url = res.data()["logoUrl"].as_str().unwrap_or_default().to_string();
    assert!(logo_url.starts_with("http://api.test/uploads/"), "{}", logo_url);
    assert!(logo_url.ends_with(".png"));
    assert_eq!(res.data()["content"]["appMeta"]["logoUrl"], logo_url.as_str());

    let file_name = logo_url.rsplit('/').next().unwrap_or_default();
    assert!(app.uploads.path().join(file_name).is_file());

    let served = app.get(&format!("/uploads/{}", file_name), None).await?;
    assert_eq!(served.status, StatusCode::OK);

    let home = app.get("/api/v1/content/home", None).await?;
    assert_eq!(home.data()["content"]["appMeta"]["logoUrl"], logo_url.as_str());
    Ok(())
}

#[tokio::test]
async fn logo_upload_validation() -> Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.signed_in(Role::Admin, "admin@school.test").await?;
    let url = "/api/v1/content/admin/home/logo";

    let res = app.post(url, Some(&admin), json!({ "fileName": "logo.png", "mimeType": "image/png" })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "fileName, mimeType and dataBase64 are required");

    let res = app
        .post(url, Some(&admin), json!({ "fileName": "a.gif", "mimeType": "image/gif", "dataBase64": PNG_BASE64 }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Unsupported image type");

    let res = app
        .post(url, Some(&admin), json!({ "fileName": "a.png", "mimeType": "image/png", "dataBase64": "%%%" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    assert_eq!(std::fs::read_dir(app.uploads.path())?.count(), 0);
    Ok(())
}
