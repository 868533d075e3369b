use async_trait::async_trait;

use super::PgStore;
use crate::database::models::Notification;
use crate::database::store::{NotificationStore, StoreResult};

#[async_trait]
impl NotificationStore for PgStore {
    async fn list_notifications(&self, user_id: i64, limit: i64) -> StoreResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            "SELECT id, user_id, type, title, message, is_read, data_json, created_at
             FROM notifications
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn mark_notification_read(&self, id: i64, user_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
