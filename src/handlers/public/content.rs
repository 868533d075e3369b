// handlers/public/content.rs - GET /api/v1/content/home

use axum::extract::State;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::content::{load_home, normalize};
use crate::state::AppState;

/// GET /api/v1/content/home - Home-page document, seeded on first read
pub async fn home(State(state): State<AppState>) -> ApiResult<Value> {
    let stored = load_home(state.store.as_ref()).await?;
    Ok(ApiResponse::success(json!({
        "content": normalize(&stored.content),
        "updatedAt": stored.updated_at,
    })))
}
