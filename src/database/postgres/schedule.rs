use async_trait::async_trait;

use super::{audience, insert_notifications, PgStore};
use crate::database::models::{
    LiveSession, LiveSessionUpdate, NewLiveSession, NewRecording, Recording, RecordingRow,
    RecordingUpdate, ScheduledSession, Scope, ScopeKind, SessionRow,
};
use crate::database::store::{ScheduleStore, StoreResult};
use crate::services::notifications::{fan_out, live_session_notice};

// Table and column names below come from `ScopeKind`, never from input
fn session_columns(kind: ScopeKind) -> String {
    format!("id, {} AS owner_id, topic, join_url, start_time, created_at", kind.owner_column())
}

fn recording_columns(kind: ScopeKind) -> String {
    format!("id, {} AS owner_id, title, video_id, embed_url, created_at", kind.owner_column())
}

#[async_trait]
impl ScheduleStore for PgStore {
    async fn schedule_live_session(&self, session: NewLiveSession) -> StoreResult<ScheduledSession> {
        let kind = session.scope.kind;
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO {table} ({owner}, topic, join_url, start_time) VALUES ($1, $2, $3, $4) RETURNING {cols}",
            table = kind.sessions_table(),
            owner = kind.owner_column(),
            cols = session_columns(kind),
        );
        let created = sqlx::query_as::<_, SessionRow>(&sql)
            .bind(session.scope.id)
            .bind(&session.topic)
            .bind(&session.join_url)
            .bind(session.start_time)
            .fetch_one(&mut *tx)
            .await?
            .into_session(kind);

        let recipients = audience(&mut tx, kind, session.scope.id).await?;
        let rows = fan_out(&recipients, &live_session_notice(&created));
        let notified = insert_notifications(&mut tx, &rows).await?;

        tx.commit().await?;
        Ok(ScheduledSession { session: created, notified })
    }

    async fn find_live_session(&self, scope: Scope, id: i64) -> StoreResult<Option<LiveSession>> {
        let sql = format!(
            "SELECT {cols} FROM {table} WHERE id = $1 AND {owner} = $2",
            cols = session_columns(scope.kind),
            table = scope.kind.sessions_table(),
            owner = scope.kind.owner_column(),
        );
        let row = sqlx::query_as::<_, SessionRow>(&sql)
            .bind(id)
            .bind(scope.id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.into_session(scope.kind)))
    }

    async fn update_live_session(
        &self,
        scope: Scope,
        id: i64,
        update: LiveSessionUpdate,
    ) -> StoreResult<Option<LiveSession>> {
        let sql = format!(
            "UPDATE {table} SET topic = $3, join_url = $4, start_time = $5
             WHERE id = $1 AND {owner} = $2 RETURNING {cols}",
            table = scope.kind.sessions_table(),
            owner = scope.kind.owner_column(),
            cols = session_columns(scope.kind),
        );
        let row = sqlx::query_as::<_, SessionRow>(&sql)
            .bind(id)
            .bind(scope.id)
            .bind(&update.topic)
            .bind(&update.join_url)
            .bind(update.start_time)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.into_session(scope.kind)))
    }

    async fn delete_live_session(&self, scope: Scope, id: i64) -> StoreResult<bool> {
        let sql = format!(
            "DELETE FROM {table} WHERE id = $1 AND {owner} = $2",
            table = scope.kind.sessions_table(),
            owner = scope.kind.owner_column(),
        );
        let result = sqlx::query(&sql).bind(id).bind(scope.id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_live_sessions(&self, kind: ScopeKind, owner_ids: &[i64]) -> StoreResult<Vec<LiveSession>> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {cols} FROM {table} WHERE {owner} = ANY($1)
             ORDER BY start_time DESC NULLS LAST, created_at DESC, id DESC",
            cols = session_columns(kind),
            table = kind.sessions_table(),
            owner = kind.owner_column(),
        );
        let rows = sqlx::query_as::<_, SessionRow>(&sql)
            .bind(owner_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.into_session(kind)).collect())
    }

    async fn create_recording(&self, recording: NewRecording) -> StoreResult<Recording> {
        let kind = recording.scope.kind;
        let sql = format!(
            "INSERT INTO {table} ({owner}, title, video_id, embed_url) VALUES ($1, $2, $3, $4) RETURNING {cols}",
            table = kind.recordings_table(),
            owner = kind.owner_column(),
            cols = recording_columns(kind),
        );
        let row = sqlx::query_as::<_, RecordingRow>(&sql)
            .bind(recording.scope.id)
            .bind(&recording.title)
            .bind(&recording.video_id)
            .bind(&recording.embed_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into_recording(kind))
    }

    async fn find_recording(&self, scope: Scope, id: i64) -> StoreResult<Option<Recording>> {
        let sql = format!(
            "SELECT {cols} FROM {table} WHERE id = $1 AND {owner} = $2",
            cols = recording_columns(scope.kind),
            table = scope.kind.recordings_table(),
            owner = scope.kind.owner_column(),
        );
        let row = sqlx::query_as::<_, RecordingRow>(&sql)
            .bind(id)
            .bind(scope.id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.into_recording(scope.kind)))
    }

    async fn update_recording(
        &self,
        scope: Scope,
        id: i64,
        update: RecordingUpdate,
    ) -> StoreResult<Option<Recording>> {
        let (video_id, embed_url) = match update.video {
            Some((video_id, embed_url)) => (Some(video_id), Some(embed_url)),
            None => (None, None),
        };
        let sql = format!(
            "UPDATE {table}
             SET title = $3, video_id = COALESCE($4, video_id), embed_url = COALESCE($5, embed_url)
             WHERE id = $1 AND {owner} = $2 RETURNING {cols}",
            table = scope.kind.recordings_table(),
            owner = scope.kind.owner_column(),
            cols = recording_columns(scope.kind),
        );
        let row = sqlx::query_as::<_, RecordingRow>(&sql)
            .bind(id)
            .bind(scope.id)
            .bind(&update.title)
            .bind(video_id)
            .bind(embed_url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.into_recording(scope.kind)))
    }

    async fn delete_recording(&self, scope: Scope, id: i64) -> StoreResult<bool> {
        let sql = format!(
            "DELETE FROM {table} WHERE id = $1 AND {owner} = $2",
            table = scope.kind.recordings_table(),
            owner = scope.kind.owner_column(),
        );
        let result = sqlx::query(&sql).bind(id).bind(scope.id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_recordings(&self, kind: ScopeKind, owner_ids: &[i64]) -> StoreResult<Vec<Recording>> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {cols} FROM {table} WHERE {owner} = ANY($1) ORDER BY created_at DESC, id DESC",
            cols = recording_columns(kind),
            table = kind.recordings_table(),
            owner = kind.owner_column(),
        );
        let rows = sqlx::query_as::<_, RecordingRow>(&sql)
            .bind(owner_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.into_recording(kind)).collect())
    }
}
