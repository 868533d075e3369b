mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;

use common::{TestApp, WEBHOOK_SECRET};

const URL: &str = "/api/v1/zoom/webhook";

fn expected_token(plain: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes())?;
    mac.update(plain.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

async fn deliver(app: &TestApp, secret: Option<&str>, body: Value) -> Result<common::Response> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(URL)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(secret) = secret {
        builder = builder.header("x-zoom-webhook-secret", secret);
    }
    app.dispatch(builder.body(Body::from(serde_json::to_vec(&body)?))?).await
}

#[tokio::test]
async fn url_validation_answers_with_hmac() -> Result<()> {
    let app = TestApp::new();
    let body = json!({ "event": "endpoint.url_validation", "payload": { "plainToken": "abc123" } });

    let res = deliver(&app, Some(WEBHOOK_SECRET), body).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["plainToken"], "abc123");
    assert_eq!(res.body["encryptedToken"], expected_token("abc123")?);
    assert_eq!(res.body["verified"], true);
    assert!(res.body.get("success").is_none());
    Ok(())
}

#[tokio::test]
async fn other_events_are_acknowledged() -> Result<()> {
    let app = TestApp::new();
    let body = json!({ "event": "meeting.started", "payload": {} });

    let res = deliver(&app, Some(WEBHOOK_SECRET), body.clone()).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Webhook received");
    assert_eq!(res.body["event"], "meeting.started");
    assert_eq!(res.body["verified"], true);

    let res = deliver(&app, Some("wrong"), body.clone()).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["verified"], false);

    let res = deliver(&app, None, body).await?;
    assert_eq!(res.body["verified"], false);
    Ok(())
}

#[tokio::test]
async fn webhook_needs_no_session() -> Result<()> {
    let app = TestApp::new();
    let res = deliver(&app, None, json!({})).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["event"].is_null());
    Ok(())
}
