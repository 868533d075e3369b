use async_trait::async_trait;
use sqlx::PgConnection;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{GroupSummary, MemberSelection, NewGroup, StudentGroup};
use crate::database::store::{GroupStore, StoreResult};

/// Resolves a selection to ids of existing students, preserving request order
async fn select_students(
    conn: &mut PgConnection,
    selection: &MemberSelection,
) -> Result<Vec<i64>, DatabaseError> {
    let ids = match selection {
        MemberSelection::AllStudents => {
            sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE role = 'student' ORDER BY id")
                .fetch_all(&mut *conn)
                .await?
        }
        MemberSelection::Students(requested) => {
            let valid = sqlx::query_scalar::<_, i64>(
                "SELECT id FROM users WHERE role = 'student' AND id = ANY($1)",
            )
            .bind(requested)
            .fetch_all(&mut *conn)
            .await?;
            let mut ids: Vec<i64> = requested.iter().copied().filter(|id| valid.contains(id)).collect();
            let mut seen = std::collections::HashSet::new();
            ids.retain(|id| seen.insert(*id));
            ids
        }
    };
    Ok(ids)
}

async fn insert_members(conn: &mut PgConnection, group_id: i64, student_ids: &[i64]) -> Result<(), DatabaseError> {
    if student_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO group_members (group_id, student_id)
         SELECT $1, UNNEST($2::BIGINT[])
         ON CONFLICT (group_id, student_id) DO NOTHING",
    )
    .bind(group_id)
    .bind(student_ids)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl GroupStore for PgStore {
    async fn list_groups(&self) -> StoreResult<Vec<GroupSummary>> {
        let groups = sqlx::query_as::<_, GroupSummary>(
            "SELECT g.id, g.name, g.description, g.created_at, COUNT(gm.student_id) AS student_count
             FROM student_groups g
             LEFT JOIN group_members gm ON gm.group_id = g.id
             GROUP BY g.id
             ORDER BY g.created_at DESC, g.id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn find_group(&self, id: i64) -> StoreResult<Option<StudentGroup>> {
        let group = sqlx::query_as::<_, StudentGroup>(
            "SELECT id, name, description, created_at FROM student_groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(group)
    }

    async fn create_group(&self, group: NewGroup) -> StoreResult<StudentGroup> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, StudentGroup>(
            "INSERT INTO student_groups (name, description, created_by)
             VALUES ($1, $2, $3)
             RETURNING id, name, description, created_at",
        )
        .bind(&group.name)
        .bind(&group.description)
        .bind(group.created_by)
        .fetch_one(&mut *tx)
        .await?;

        if group.include_all_students {
            let students = select_students(&mut tx, &MemberSelection::AllStudents).await?;
            insert_members(&mut tx, created.id, &students).await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn update_group(
        &self,
        id: i64,
        name: String,
        description: Option<String>,
    ) -> StoreResult<Option<StudentGroup>> {
        let group = sqlx::query_as::<_, StudentGroup>(
            "UPDATE student_groups SET name = $2, description = $3 WHERE id = $1
             RETURNING id, name, description, created_at",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;
        Ok(group)
    }

    async fn delete_group(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM student_groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_group_members(&self, group_id: i64, selection: MemberSelection) -> StoreResult<usize> {
        let mut tx = self.pool.begin().await?;
        let students = select_students(&mut tx, &selection).await?;
        insert_members(&mut tx, group_id, &students).await?;
        tx.commit().await?;
        Ok(students.len())
    }

    async fn list_student_groups(&self, student_id: i64) -> StoreResult<Vec<StudentGroup>> {
        let groups = sqlx::query_as::<_, StudentGroup>(
            "SELECT g.id, g.name, g.description, g.created_at
             FROM student_groups g
             JOIN group_members gm ON gm.group_id = g.id
             WHERE gm.student_id = $1
             ORDER BY g.name",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }
}
