use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Database;
use crate::models::{Page, Paginated, TimeLog, TimeLogFilter, TimeLogInput, TimerStart};
use crate::store::TimeLogStore;

const LIST_FILTER: &str = r#"
    user_id = $1
    AND ($2::uuid IS NULL OR project_id = $2)
    AND ($3::uuid IS NULL OR client_id = $3)
"#;

#[async_trait]
impl TimeLogStore for Database {
    async fn create_time_log(&self, user_id: Uuid, input: &TimeLogInput) -> Result<TimeLog> {
        let log = sqlx::query_as::<_, TimeLog>(
            r#"
            INSERT INTO time_logs (user_id, project_id, task_id, client_id, category, description, date,
                                   start_time, end_time, duration, billable, bill_rate, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(input.project_id)
        .bind(input.task_id)
        .bind(input.client_id)
        .bind(input.category)
        .bind(&input.description)
        .bind(input.date)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.duration)
        .bind(input.billable)
        .bind(input.bill_rate)
        .bind(&input.tags)
        .fetch_one(self.get_pool())
        .await?;

        Ok(log)
    }

    async fn get_time_log(&self, id: Uuid) -> Result<Option<TimeLog>> {
        let log = sqlx::query_as::<_, TimeLog>("SELECT * FROM time_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(log)
    }

    async fn update_time_log(&self, id: Uuid, input: &TimeLogInput) -> Result<Option<TimeLog>> {
        let log = sqlx::query_as::<_, TimeLog>(
            r#"
            UPDATE time_logs
            SET project_id = $1, task_id = $2, client_id = $3, category = $4, description = $5,
                date = $6, start_time = $7, end_time = $8, duration = $9, billable = $10,
                bill_rate = $11, tags = $12
            WHERE id = $13
            RETURNING *
            "#,
        )
        .bind(input.project_id)
        .bind(input.task_id)
        .bind(input.client_id)
        .bind(input.category)
        .bind(&input.description)
        .bind(input.date)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.duration)
        .bind(input.billable)
        .bind(input.bill_rate)
        .bind(&input.tags)
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(log)
    }

    async fn delete_time_log(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM time_logs WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_time_logs(&self, user_id: Uuid, filter: &TimeLogFilter, page: Page) -> Result<Paginated<TimeLog>> {
        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM time_logs WHERE {LIST_FILTER}"))
            .bind(user_id)
            .bind(filter.project_id)
            .bind(filter.client_id)
            .fetch_one(self.get_pool())
            .await?;

        let logs = sqlx::query_as::<_, TimeLog>(&format!(
            "SELECT * FROM time_logs WHERE {LIST_FILTER} ORDER BY date DESC, created_at DESC LIMIT $4 OFFSET $5"
        ))
        .bind(user_id)
        .bind(filter.project_id)
        .bind(filter.client_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.get_pool())
        .await?;

        Ok(Paginated::new(logs, total, page))
    }

    async fn start_timer(&self, user_id: Uuid, timer: &TimerStart, at: DateTime<Utc>) -> Result<Option<TimeLog>> {
        let log = sqlx::query_as::<_, TimeLog>(
            r#"
            INSERT INTO time_logs (user_id, project_id, task_id, client_id, category, description, date,
                                   start_time, duration, billable, bill_rate)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9, $10)
            ON CONFLICT (user_id) WHERE start_time IS NOT NULL AND end_time IS NULL DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(timer.project_id)
        .bind(timer.task_id)
        .bind(timer.client_id)
        .bind(timer.category)
        .bind(&timer.description)
        .bind(at.date_naive())
        .bind(at)
        .bind(timer.billable)
        .bind(timer.bill_rate)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(log)
    }

    async fn running_timer(&self, user_id: Uuid) -> Result<Option<TimeLog>> {
        let log = sqlx::query_as::<_, TimeLog>(
            r#"
            SELECT * FROM time_logs
            WHERE user_id = $1 AND start_time IS NOT NULL AND end_time IS NULL
            ORDER BY start_time DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(log)
    }

    async fn finish_timer(&self, id: Uuid, end: DateTime<Utc>, duration: f64) -> Result<Option<TimeLog>> {
        let log = sqlx::query_as::<_, TimeLog>(
            r#"
            UPDATE time_logs
            SET end_time = $1, duration = $2
            WHERE id = $3 AND start_time IS NOT NULL AND end_time IS NULL
            RETURNING *
            "#,
        )
        .bind(end)
        .bind(duration)
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(log)
    }
}
