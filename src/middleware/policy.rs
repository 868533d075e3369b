//! Declarative route policy enforced by a single middleware.
//!
//! Every routed `(method, path)` under the API prefix must appear in
//! [`ROUTE_POLICIES`]; anything missing is refused. For authenticated routes
//! the checks run in a fixed order: session (401), forced password change
//! (403 `PASSWORD_CHANGE_REQUIRED`), then role (403 `FORBIDDEN`).

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::AuthError;
use crate::database::models::Role;
use crate::error::ApiError;
use crate::middleware::auth::session_token;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Access {
    Public,
    Authenticated {
        roles: &'static [Role],
        /// Reachable while a forced password change is pending
        password_exempt: bool,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct RoutePolicy {
    pub method: &'static str,
    pub path: &'static str,
    pub access: Access,
}

pub const API_PREFIX: &str = "/api/v1";

const EVERYONE: &[Role] = &Role::ALL;
const ADMINS: &[Role] = &[Role::SuperAdmin, Role::Admin];
const STAFF: &[Role] = &[Role::SuperAdmin, Role::Admin, Role::Teacher];
const STUDENTS: &[Role] = &[Role::Student];

const fn public(method: &'static str, path: &'static str) -> RoutePolicy {
    RoutePolicy { method, path, access: Access::Public }
}

const fn allow(method: &'static str, path: &'static str, roles: &'static [Role]) -> RoutePolicy {
    RoutePolicy {
        method,
        path,
        access: Access::Authenticated { roles, password_exempt: false },
    }
}

const fn exempt(method: &'static str, path: &'static str, roles: &'static [Role]) -> RoutePolicy {
    RoutePolicy {
        method,
        path,
        access: Access::Authenticated { roles, password_exempt: true },
    }
}

pub static ROUTE_POLICIES: &[RoutePolicy] = &[
    // auth
    public("POST", "/api/v1/auth/login"),
    public("POST", "/api/v1/auth/logout"),
    exempt("GET", "/api/v1/auth/profile", EVERYONE),
    exempt("POST", "/api/v1/auth/change-password", EVERYONE),
    // admin users
    allow("GET", "/api/v1/admin/users", ADMINS),
    allow("POST", "/api/v1/admin/users", ADMINS),
    allow("PUT", "/api/v1/admin/users/:userId", ADMINS),
    allow("DELETE", "/api/v1/admin/users/:userId", ADMINS),
    // admin groups
    allow("GET", "/api/v1/admin/groups", ADMINS),
    allow("POST", "/api/v1/admin/groups", ADMINS),
    allow("PUT", "/api/v1/admin/groups/:groupId", ADMINS),
    allow("DELETE", "/api/v1/admin/groups/:groupId", ADMINS),
    allow("POST", "/api/v1/admin/groups/:groupId/students", ADMINS),
    allow("POST", "/api/v1/admin/groups/:groupId/live-sessions", ADMINS),
    allow("PUT", "/api/v1/admin/groups/:groupId/live-sessions/:sessionId", ADMINS),
    allow("DELETE", "/api/v1/admin/groups/:groupId/live-sessions/:sessionId", ADMINS),
    allow("POST", "/api/v1/admin/groups/:groupId/recordings", ADMINS),
    allow("PUT", "/api/v1/admin/groups/:groupId/recordings/:recordingId", ADMINS),
    allow("DELETE", "/api/v1/admin/groups/:groupId/recordings/:recordingId", ADMINS),
    // courses
    allow("POST", "/api/v1/courses", ADMINS),
    allow("GET", "/api/v1/courses/my", EVERYONE),
    allow("POST", "/api/v1/courses/:courseId/enroll", STUDENTS),
    allow("POST", "/api/v1/courses/:courseId/live-sessions", STAFF),
    allow("POST", "/api/v1/courses/:courseId/recordings", STAFF),
    // teacher portal
    allow("GET", "/api/v1/teacher/dashboard", STAFF),
    allow("POST", "/api/v1/teacher/courses/:courseId/tasks", STAFF),
    // student portal
    allow("GET", "/api/v1/student/portal", STUDENTS),
    allow("POST", "/api/v1/student/tasks/:assignmentId/submit", STUDENTS),
    allow("PUT", "/api/v1/student/notifications/:notificationId/read", STUDENTS),
    // content
    public("GET", "/api/v1/content/home"),
    allow("GET", "/api/v1/content/admin/home", ADMINS),
    allow("PUT", "/api/v1/content/admin/home/:sectionId", ADMINS),
    allow("POST", "/api/v1/content/admin/home/logo", ADMINS),
    // meeting platform
    public("POST", "/api/v1/zoom/webhook"),
];

pub fn policy_for(method: &str, path: &str) -> Option<Access> {
    ROUTE_POLICIES
        .iter()
        .find(|p| p.method == method && p.path == path)
        .map(|p| p.access)
}

/// Installed with `route_layer` so only matched routes reach it
pub async fn enforce_access(
    State(state): State<AppState>,
    matched: Option<MatchedPath>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let method = request.method().as_str().to_string();
    let access = matched
        .as_ref()
        .and_then(|path| policy_for(&method, path.as_str()));

    let Some(access) = access else {
        tracing::warn!(
            "No access policy for {} {}",
            method,
            matched.as_ref().map(|p| p.as_str()).unwrap_or("<unmatched>")
        );
        return Err(ApiError::forbidden("Access denied"));
    };

    if let Access::Authenticated { roles, password_exempt } = access {
        let token = session_token(request.headers(), &state.config.security.cookie_name)
            .ok_or(AuthError::Unauthenticated)?;
        let user = state.identity.resolve(&token).await?;

        if user.must_change_password && !password_exempt {
            return Err(ApiError::password_change_required());
        }
        if !roles.contains(&user.role) {
            return Err(ApiError::forbidden("You do not have access to this resource"));
        }
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}
