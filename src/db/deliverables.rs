use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Database;
use crate::models::{Deliverable, DeliverableInput, DeliverableStatus};
use crate::store::DeliverableStore;

#[async_trait]
impl DeliverableStore for Database {
    async fn create_deliverable(&self, created_by: Uuid, input: &DeliverableInput) -> Result<Deliverable> {
        let deliverable = sqlx::query_as::<_, Deliverable>(
            r#"
            INSERT INTO deliverables (project_id, task_id, name, deliverable_type, description, file_url,
                                      file_key, file_size, mime_type, version, status, tags, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(input.project_id)
        .bind(input.task_id)
        .bind(&input.name)
        .bind(input.kind)
        .bind(&input.description)
        .bind(&input.file_url)
        .bind(&input.file_key)
        .bind(input.file_size)
        .bind(&input.mime_type)
        .bind(input.version)
        .bind(input.status)
        .bind(&input.tags)
        .bind(created_by)
        .fetch_one(self.get_pool())
        .await?;

        Ok(deliverable)
    }

    async fn get_deliverable(&self, id: Uuid) -> Result<Option<Deliverable>> {
        let deliverable = sqlx::query_as::<_, Deliverable>("SELECT * FROM deliverables WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(deliverable)
    }

    async fn update_deliverable(&self, id: Uuid, input: &DeliverableInput) -> Result<Option<Deliverable>> {
        let deliverable = sqlx::query_as::<_, Deliverable>(
            r#"
            UPDATE deliverables
            SET task_id = $1, name = $2, deliverable_type = $3, description = $4, file_url = $5,
                file_key = $6, file_size = $7, mime_type = $8, version = $9, status = $10, tags = $11,
                approved_by = CASE WHEN status = $10 THEN approved_by END,
                approved_at = CASE WHEN status = $10 THEN approved_at END,
                updated_at = now()
            WHERE id = $12
            RETURNING *
            "#,
        )
        .bind(input.task_id)
        .bind(&input.name)
        .bind(input.kind)
        .bind(&input.description)
        .bind(&input.file_url)
        .bind(&input.file_key)
        .bind(input.file_size)
        .bind(&input.mime_type)
        .bind(input.version)
        .bind(input.status)
        .bind(&input.tags)
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(deliverable)
    }

    async fn set_deliverable_status(
        &self,
        id: Uuid,
        status: DeliverableStatus,
        approved_by: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<Option<Deliverable>> {
        let deliverable = sqlx::query_as::<_, Deliverable>(
            r#"
            UPDATE deliverables
            SET status = $1, approved_by = $2, approved_at = CASE WHEN $2::uuid IS NULL THEN NULL ELSE $3 END,
                updated_at = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(approved_by)
        .bind(at)
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(deliverable)
    }

    async fn delete_deliverable(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM deliverables WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_deliverables(&self, project_id: Uuid) -> Result<Vec<Deliverable>> {
        let deliverables = sqlx::query_as::<_, Deliverable>(
            "SELECT * FROM deliverables WHERE project_id = $1 ORDER BY updated_at DESC",
        )
        .bind(project_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(deliverables)
    }
}
