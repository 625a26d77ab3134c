use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Database;
use crate::models::{Activity, ActivityFilter, ActivityInput, Page, Paginated};
use crate::store::ActivityStore;

const LIST_FILTER: &str = r#"
    ($1::uuid IS NULL OR client_id = $1)
    AND ($2::uuid IS NULL OR project_id = $2)
    AND ($3::activity_type IS NULL OR activity_type = $3)
"#;

#[async_trait]
impl ActivityStore for Database {
    async fn create_activity(&self, created_by: Uuid, input: &ActivityInput) -> Result<Activity> {
        let activity = sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities (activity_type, title, description, duration, start_time, end_time,
                                    location, contact_email, participants, client_id, project_id,
                                    task_id, status, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(input.kind)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.duration)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.location)
        .bind(&input.contact_email)
        .bind(&input.participants)
        .bind(input.client_id)
        .bind(input.project_id)
        .bind(input.task_id)
        .bind(input.status)
        .bind(&input.notes)
        .bind(created_by)
        .fetch_one(self.get_pool())
        .await?;

        Ok(activity)
    }

    async fn get_activity(&self, id: Uuid) -> Result<Option<Activity>> {
        let activity = sqlx::query_as::<_, Activity>("SELECT * FROM activities WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(activity)
    }

    async fn update_activity(&self, id: Uuid, input: &ActivityInput) -> Result<Option<Activity>> {
        let activity = sqlx::query_as::<_, Activity>(
            r#"
            UPDATE activities
            SET activity_type = $1, title = $2, description = $3, duration = $4, start_time = $5,
                end_time = $6, location = $7, contact_email = $8, participants = $9, client_id = $10,
                project_id = $11, task_id = $12, status = $13, notes = $14
            WHERE id = $15
            RETURNING *
            "#,
        )
        .bind(input.kind)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.duration)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.location)
        .bind(&input.contact_email)
        .bind(&input.participants)
        .bind(input.client_id)
        .bind(input.project_id)
        .bind(input.task_id)
        .bind(input.status)
        .bind(&input.notes)
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(activity)
    }

    async fn delete_activity(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_activities(&self, filter: &ActivityFilter, page: Page) -> Result<Paginated<Activity>> {
        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM activities WHERE {LIST_FILTER}"))
            .bind(filter.client_id)
            .bind(filter.project_id)
            .bind(filter.kind)
            .fetch_one(self.get_pool())
            .await?;

        let activities = sqlx::query_as::<_, Activity>(&format!(
            "SELECT * FROM activities WHERE {LIST_FILTER} ORDER BY start_time DESC LIMIT $4 OFFSET $5"
        ))
        .bind(filter.client_id)
        .bind(filter.project_id)
        .bind(filter.kind)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.get_pool())
        .await?;

        Ok(Paginated::new(activities, total, page))
    }

    async fn activities_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities WHERE start_time >= $1 AND start_time < $2 ORDER BY start_time ASC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.get_pool())
        .await?;

        Ok(activities)
    }
}
