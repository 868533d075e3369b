use async_trait::async_trait;
use serde_json::Value;

use super::PgStore;
use crate::database::models::SiteContent;
use crate::database::store::{ContentStore, StoreResult};

#[async_trait]
impl ContentStore for PgStore {
    async fn load_content(&self, key: &str) -> StoreResult<Option<SiteContent>> {
        let row = sqlx::query_as::<_, SiteContent>(
            "SELECT content_key, content_json, updated_by, updated_at FROM site_contents WHERE content_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn seed_content(&self, key: &str, content: Value) -> StoreResult<SiteContent> {
        sqlx::query(
            "INSERT INTO site_contents (content_key, content_json) VALUES ($1, $2)
             ON CONFLICT (content_key) DO NOTHING",
        )
        .bind(key)
        .bind(&content)
        .execute(&self.pool)
        .await?;

        // A concurrent writer may have won the insert; return whatever is stored
        let row = sqlx::query_as::<_, SiteContent>(
            "SELECT content_key, content_json, updated_by, updated_at FROM site_contents WHERE content_key = $1",
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn save_content(&self, key: &str, content: Value, updated_by: i64) -> StoreResult<SiteContent> {
        let row = sqlx::query_as::<_, SiteContent>(
            "INSERT INTO site_contents (content_key, content_json, updated_by, updated_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT (content_key)
             DO UPDATE SET content_json = EXCLUDED.content_json,
                           updated_by = EXCLUDED.updated_by,
                           updated_at = NOW()
             RETURNING content_key, content_json, updated_by, updated_at",
        )
        .bind(key)
        .bind(&content)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
