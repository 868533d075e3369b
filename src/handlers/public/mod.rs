// handlers/public/mod.rs - Public handlers (no session required)
//
// Login/logout, the public home-page document and the meeting-platform
// webhook. Each route is still listed in ROUTE_POLICIES as `Access::Public`.

pub mod auth;
pub mod content;
pub mod webhook;
