//! Postgres-backed implementation of the store traits.

mod content;
mod courses;
mod groups;
mod homework;
mod notifications;
mod schedule;
mod users;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{NewNotification, ScopeKind};
use crate::database::store::{Store, StoreResult};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Current members of a course (enrollees) or group, in join order
async fn audience(conn: &mut PgConnection, kind: ScopeKind, owner_id: i64) -> Result<Vec<i64>, DatabaseError> {
    let sql = match kind {
        ScopeKind::Course => "SELECT student_id FROM enrollments WHERE course_id = $1 ORDER BY created_at, student_id",
        ScopeKind::Group => "SELECT student_id FROM group_members WHERE group_id = $1 ORDER BY created_at, student_id",
    };
    let ids = sqlx::query_scalar::<_, i64>(sql)
        .bind(owner_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(ids)
}

/// Inserts fan-out rows on the caller's connection so they share its transaction
async fn insert_notifications(conn: &mut PgConnection, rows: &[NewNotification]) -> Result<usize, DatabaseError> {
    for row in rows {
        sqlx::query(
            "INSERT INTO notifications (user_id, type, title, message, data_json) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(row.user_id)
        .bind(&row.kind)
        .bind(&row.title)
        .bind(&row.message)
        .bind(&row.payload)
        .execute(&mut *conn)
        .await?;
    }
    Ok(rows.len())
}
