use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use super::Database;
use crate::models::{NewUser, User, UserSummary};
use crate::store::UserStore;

#[async_trait]
impl UserStore for Database {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(user)
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(self.get_pool())
        .await?;

        Ok(user)
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>("SELECT id, full_name FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(self.get_pool())
            .await?;

        Ok(users)
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>("SELECT id, full_name FROM users ORDER BY full_name")
            .fetch_all(self.get_pool())
            .await?;

        Ok(users)
    }
}
