use async_trait::async_trait;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, User, UserCredentials, UserUpdate};
use crate::database::store::{StoreResult, UserStore};

const DUPLICATE_EMAIL: &str = "Email already exists";

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, must_change_password, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_credentials(&self, id: i64) -> StoreResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, name, email, role, must_change_password, created_at, password_hash
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_credentials_by_email(&self, email: &str) -> StoreResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, name, email, role, must_change_password, created_at, password_hash
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, must_change_password, created_at
             FROM users ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash, role, must_change_password)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, email, role, must_change_password, created_at",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.must_change_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, DUPLICATE_EMAIL))
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users
             SET name = $2,
                 email = $3,
                 role = $4,
                 password_hash = COALESCE($5::TEXT, password_hash),
                 must_change_password = CASE WHEN $5::TEXT IS NULL THEN must_change_password ELSE TRUE END,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING id, name, email, role, must_change_password, created_at",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(update.role.as_str())
        .bind(&update.password_reset)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, DUPLICATE_EMAIL))
    }

    async fn set_password(&self, id: i64, password_hash: String, must_change: bool) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, must_change_password = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .bind(must_change)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
