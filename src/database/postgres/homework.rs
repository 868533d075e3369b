use async_trait::async_trait;
use std::collections::HashSet;

use super::{audience, insert_notifications, PgStore};
use crate::database::models::{
    AssignedTask, HomeworkAssignment, HomeworkTask, NewHomeworkTask, ScopeKind, StudentAssignment,
    SubmissionRow, TaskSummary,
};
use crate::database::store::{HomeworkStore, StoreResult};
use crate::services::notifications::{fan_out, homework_notice};

#[async_trait]
impl HomeworkStore for PgStore {
    async fn assign_homework(&self, task: NewHomeworkTask) -> StoreResult<AssignedTask> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, HomeworkTask>(
            "INSERT INTO homework_tasks (course_id, teacher_id, subject, title, description, due_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, course_id, teacher_id, subject, title, description, due_date, created_at",
        )
        .bind(task.course_id)
        .bind(task.teacher_id)
        .bind(&task.subject)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date)
        .fetch_one(&mut *tx)
        .await?;

        let enrolled = audience(&mut tx, ScopeKind::Course, task.course_id).await?;
        let targets: Vec<i64> = match &task.student_ids {
            Some(requested) => {
                let enrolled: HashSet<i64> = enrolled.into_iter().collect();
                let mut seen = HashSet::new();
                requested
                    .iter()
                    .copied()
                    .filter(|id| enrolled.contains(id) && seen.insert(*id))
                    .collect()
            }
            None => enrolled,
        };

        for student_id in &targets {
            sqlx::query(
                "INSERT INTO homework_assignments (task_id, student_id) VALUES ($1, $2)
                 ON CONFLICT (task_id, student_id) DO NOTHING",
            )
            .bind(created.id)
            .bind(student_id)
            .execute(&mut *tx)
            .await?;
        }

        let rows = fan_out(&targets, &homework_notice(&created, &task.course_title));
        insert_notifications(&mut tx, &rows).await?;

        tx.commit().await?;
        Ok(AssignedTask { task: created, assigned: targets.len() })
    }

    async fn list_task_summaries(&self, course_ids: &[i64]) -> StoreResult<Vec<TaskSummary>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, TaskSummary>(
            "SELECT ht.id, ht.course_id, ht.teacher_id, ht.subject, ht.title, ht.description,
                    ht.due_date, ht.created_at,
                    c.title AS course_title,
                    COUNT(ha.id) AS assigned_count,
                    COUNT(ha.id) FILTER (WHERE ha.status = 'submitted') AS submitted_count
             FROM homework_tasks ht
             JOIN courses c ON c.id = ht.course_id
             LEFT JOIN homework_assignments ha ON ha.task_id = ht.id
             WHERE ht.course_id = ANY($1)
             GROUP BY ht.id, c.title
             ORDER BY ht.created_at DESC, ht.id DESC",
        )
        .bind(course_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_submissions(&self, course_ids: &[i64]) -> StoreResult<Vec<SubmissionRow>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, SubmissionRow>(
            "SELECT ha.id AS assignment_id, ha.task_id, ha.status, ha.submission_text, ha.submitted_at,
                    ht.title AS task_title, ht.subject, c.title AS course_title,
                    u.id AS student_id, u.name AS student_name, u.email AS student_email
             FROM homework_assignments ha
             JOIN homework_tasks ht ON ht.id = ha.task_id
             JOIN courses c ON c.id = ht.course_id
             JOIN users u ON u.id = ha.student_id
             WHERE ht.course_id = ANY($1)
             ORDER BY ha.submitted_at DESC NULLS LAST, ha.created_at DESC, ha.id DESC",
        )
        .bind(course_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_student_assignments(&self, student_id: i64) -> StoreResult<Vec<StudentAssignment>> {
        let rows = sqlx::query_as::<_, StudentAssignment>(
            "SELECT ha.id AS assignment_id, ha.status, ha.submission_text, ha.submitted_at,
                    ht.id AS task_id, ht.subject, ht.title, ht.description, ht.due_date,
                    ht.created_at AS task_created_at,
                    c.id AS course_id, c.title AS course_title, u.name AS teacher_name
             FROM homework_assignments ha
             JOIN homework_tasks ht ON ht.id = ha.task_id
             JOIN courses c ON c.id = ht.course_id
             JOIN users u ON u.id = ht.teacher_id
             WHERE ha.student_id = $1
             ORDER BY ht.due_date ASC NULLS LAST, ht.created_at DESC, ha.id DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn submit_assignment(
        &self,
        assignment_id: i64,
        student_id: i64,
        submission_text: String,
    ) -> StoreResult<Option<HomeworkAssignment>> {
        let row = sqlx::query_as::<_, HomeworkAssignment>(
            "UPDATE homework_assignments
             SET status = 'submitted', submission_text = $3, submitted_at = NOW()
             WHERE id = $1 AND student_id = $2
             RETURNING id, task_id, student_id, status, submission_text, submitted_at, created_at",
        )
        .bind(assignment_id)
        .bind(student_id)
        .bind(submission_text)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
