use async_trait::async_trait;

use super::PgStore;
use crate::database::models::{Course, CourseFilter, CourseListing, NewCourse};
use crate::database::store::{CourseStore, StoreResult};

#[async_trait]
impl CourseStore for PgStore {
    async fn create_course(&self, course: NewCourse) -> StoreResult<Course> {
        let created = sqlx::query_as::<_, Course>(
            "INSERT INTO courses (title, description, teacher_id)
             VALUES ($1, $2, $3)
             RETURNING id, title, description, teacher_id, created_at",
        )
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.teacher_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_course(&self, id: i64) -> StoreResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(
            "SELECT id, title, description, teacher_id, created_at FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(course)
    }

    async fn list_courses(&self, filter: CourseFilter) -> StoreResult<Vec<CourseListing>> {
        const SELECT: &str = "SELECT c.id, c.title, c.description, c.teacher_id, c.created_at, u.name AS teacher_name
             FROM courses c
             JOIN users u ON u.id = c.teacher_id";
        const ORDER: &str = "ORDER BY c.created_at DESC, c.id DESC";

        let query = match filter {
            CourseFilter::All => format!("{SELECT} {ORDER}"),
            CourseFilter::TaughtBy(_) => format!("{SELECT} WHERE c.teacher_id = $1 {ORDER}"),
            CourseFilter::EnrolledStudent(_) => format!(
                "{SELECT} JOIN enrollments e ON e.course_id = c.id WHERE e.student_id = $1 {ORDER}"
            ),
        };

        let mut q = sqlx::query_as::<_, CourseListing>(&query);
        match filter {
            CourseFilter::All => {}
            CourseFilter::TaughtBy(id) | CourseFilter::EnrolledStudent(id) => q = q.bind(id),
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    async fn enroll_student(&self, course_id: i64, student_id: i64) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO enrollments (student_id, course_id) VALUES ($1, $2)
             ON CONFLICT (student_id, course_id) DO NOTHING",
        )
        .bind(student_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
