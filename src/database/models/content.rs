use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct SiteContent {
    pub content_key: String,
    #[sqlx(rename = "content_json")]
    pub content: Value,
    pub updated_by: Option<i64>,
    pub updated_at: DateTime<Utc>,
}
