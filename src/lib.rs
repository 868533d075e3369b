pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

use std::any::Any;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{enforce_access, ApiResponse, ApiResult};

pub use crate::state::AppState;

/// Full application router. Every `/api/v1` route passes through
/// `enforce_access`; `/`, `/health` and `/uploads` sit outside it.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api_routes(state.clone()))
        .nest_service("/uploads", ServeDir::new(state.uploads.dir()))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Renders a handler panic as the standard 500 envelope
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = err.downcast_ref::<String>() {
        msg.as_str()
    } else if let Some(msg) = err.downcast_ref::<&str>() {
        msg
    } else {
        "unknown panic"
    };
    tracing::error!("Request handler panicked: {}", detail);
    ApiError::internal_server_error("An error occurred while processing your request").into_response()
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // auth
        .route("/api/v1/auth/login", post(public::auth::login))
        .route("/api/v1/auth/logout", post(public::auth::logout))
        .route("/api/v1/auth/profile", get(protected::auth::profile))
        .route("/api/v1/auth/change-password", post(protected::auth::change_password))
        // admin users
        .route(
            "/api/v1/admin/users",
            get(elevated::users::list_users).post(elevated::users::create_user),
        )
        .route(
            "/api/v1/admin/users/:userId",
            put(elevated::users::update_user).delete(elevated::users::delete_user),
        )
        // admin groups
        .route(
            "/api/v1/admin/groups",
            get(elevated::groups::list_groups).post(elevated::groups::create_group),
        )
        .route(
            "/api/v1/admin/groups/:groupId",
            put(elevated::groups::update_group).delete(elevated::groups::delete_group),
        )
        .route("/api/v1/admin/groups/:groupId/students", post(elevated::groups::add_students))
        .route(
            "/api/v1/admin/groups/:groupId/live-sessions",
            post(elevated::group_media::create_session),
        )
        .route(
            "/api/v1/admin/groups/:groupId/live-sessions/:sessionId",
            put(elevated::group_media::update_session).delete(elevated::group_media::delete_session),
        )
        .route(
            "/api/v1/admin/groups/:groupId/recordings",
            post(elevated::group_media::create_recording),
        )
        .route(
            "/api/v1/admin/groups/:groupId/recordings/:recordingId",
            put(elevated::group_media::update_recording)
                .delete(elevated::group_media::delete_recording),
        )
        // courses
        .route("/api/v1/courses", post(protected::courses::create_course))
        .route("/api/v1/courses/my", get(protected::courses::my_courses))
        .route("/api/v1/courses/:courseId/enroll", post(protected::courses::enroll))
        .route(
            "/api/v1/courses/:courseId/live-sessions",
            post(protected::courses::create_live_session),
        )
        .route(
            "/api/v1/courses/:courseId/recordings",
            post(protected::courses::create_recording),
        )
        // teacher portal
        .route("/api/v1/teacher/dashboard", get(protected::teacher::dashboard))
        .route(
            "/api/v1/teacher/courses/:courseId/tasks",
            post(protected::teacher::create_task),
        )
        // student portal
        .route("/api/v1/student/portal", get(protected::student::portal))
        .route(
            "/api/v1/student/tasks/:assignmentId/submit",
            post(protected::student::submit_task),
        )
        .route(
            "/api/v1/student/notifications/:notificationId/read",
            put(protected::student::mark_notification_read),
        )
        // content
        .route("/api/v1/content/home", get(public::content::home))
        .route("/api/v1/content/admin/home", get(elevated::content::admin_home))
        .route(
            "/api/v1/content/admin/home/logo",
            post(elevated::content::upload_logo),
        )
        .route(
            "/api/v1/content/admin/home/:sectionId",
            put(elevated::content::update_section),
        )
        // meeting platform
        .route("/api/v1/zoom/webhook", post(public::webhook::zoom_webhook))
        .route_layer(from_fn_with_state(state, enforce_access))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match HeaderValue::from_str(&config.server.frontend_url) {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!("FRONTEND_URL {:?} is not a valid origin; CORS disabled", config.server.frontend_url);
            cors
        }
    }
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Tuition API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Role-based portals for admins, teachers and students",
            "endpoints": {
                "health": "/health (public)",
                "auth": "/api/v1/auth/* (login/logout public; profile, change-password signed in)",
                "admin": "/api/v1/admin/users, /api/v1/admin/groups (admin)",
                "courses": "/api/v1/courses[/my|/:courseId/...] (signed in, per role)",
                "teacher": "/api/v1/teacher/* (teacher, admin)",
                "student": "/api/v1/student/* (student)",
                "content": "/api/v1/content/home (public), /api/v1/content/admin/* (admin)",
                "webhook": "/api/v1/zoom/webhook (public)",
                "uploads": "/uploads/* (public)"
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    match state.store.ping().await {
        Ok(()) => Ok(ApiResponse::success(json!({
            "status": "ok",
            "database": "connected",
            "timestamp": chrono::Utc::now(),
        }))),
        Err(err) => {
            tracing::error!("Health check failed: {}", err);
            Err(ApiError::service_unavailable("Database unavailable"))
        }
    }
}
