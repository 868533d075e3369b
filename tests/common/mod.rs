#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use tuition_api::auth::hash_password;
use tuition_api::config::AppConfig;
use tuition_api::database::models::{NewUser, Role, User};
use tuition_api::database::{MemoryStore, Store, UserStore};
use tuition_api::services::video::{embed_url, UploadedVideo, VideoError, VideoHost};
use tuition_api::{app, AppState};

pub const PASSWORD: &str = "correct-horse-1";
pub const WEBHOOK_SECRET: &str = "zoom-shared-secret";

/// Video host double: hands out sequential ids, or fails (or panics) on demand
#[derive(Default)]
pub struct FakeVideoHost {
    pub fail: AtomicBool,
    pub panic: AtomicBool,
    pub uploads: AtomicUsize,
}

#[async_trait]
impl VideoHost for FakeVideoHost {
    async fn upload_from_url(&self, _source_url: &str, _title: &str) -> Result<UploadedVideo, VideoError> {
        if self.panic.load(Ordering::SeqCst) {
            panic!("video host double asked to panic");
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(VideoError::Upstream("host unavailable".to_string()));
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        let video_id = format!("9000{}", n);
        Ok(UploadedVideo {
            embed_url: embed_url(&video_id),
            video_id,
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub video: Arc<FakeVideoHost>,
    pub uploads: TempDir,
}

pub struct Response {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

impl Response {
    /// Payload inside the success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}

fn shared_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(PASSWORD).expect("hash test password"))
        .clone()
}

pub fn test_config(uploads: &TempDir) -> AppConfig {
    let uploads_dir = uploads.path().display().to_string();
    AppConfig::from_lookup(|key| {
        let value = match key {
            "DATABASE_URL" => "memory://",
            "JWT_SECRET" => "integration-test-secret",
            "PUBLIC_BASE_URL" => "http://api.test",
            "ZOOM_WEBHOOK_SECRET" => WEBHOOK_SECRET,
            "VIMEO_ACCESS_TOKEN" => "unused",
            "UPLOADS_DIR" => uploads_dir.as_str(),
            _ => return None,
        };
        Some(value.to_string())
    })
    .expect("test config")
}

impl TestApp {
    pub fn new() -> Self {
        let uploads = TempDir::new().expect("temp uploads dir");
        let store = Arc::new(MemoryStore::new());
        let video = Arc::new(FakeVideoHost::default());
        let state = AppState::new(
            test_config(&uploads),
            store.clone() as Arc<dyn Store>,
            video.clone(),
        );
        Self {
            router: app(state),
            store,
            video,
            uploads,
        }
    }

    /// Inserts a user straight into the store with the shared test password
    pub async fn seed_user(&self, name: &str, email: &str, role: Role, must_change: bool) -> Result<User> {
        Ok(self
            .store
            .create_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                role,
                password_hash: shared_hash(),
                must_change_password: must_change,
            })
            .await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .send(Method::POST, "/api/v1/auth/login", None, Some(serde_json::json!({
                "email": email,
                "password": password,
            })))
            .await?;
        anyhow::ensure!(res.status == StatusCode::OK, "login failed: {} {}", res.status, res.body);
        let cookie = res.set_cookie.context("login set no cookie")?;
        Ok(cookie.split(';').next().unwrap_or_default().to_string())
    }

    /// Seeds a user of `role` and returns it with a session cookie
    pub async fn signed_in(&self, role: Role, email: &str) -> Result<(User, String)> {
        let user = self.seed_user(email, email, role, false).await?;
        let cookie = self.login(email, PASSWORD).await?;
        Ok((user, cookie))
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Result<Response> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        self.dispatch(request).await
    }

    pub async fn dispatch(&self, request: Request<Body>) -> Result<Response> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        Ok(Response {
            status,
            set_cookie,
            body,
        })
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Result<Response> {
        self.send(Method::GET, uri, cookie, None).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> Result<Response> {
        self.send(Method::POST, uri, cookie, Some(body)).await
    }

    pub async fn put(&self, uri: &str, cookie: Option<&str>, body: Value) -> Result<Response> {
        self.send(Method::PUT, uri, cookie, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> Result<Response> {
        self.send(Method::DELETE, uri, cookie, None).await
    }
}
