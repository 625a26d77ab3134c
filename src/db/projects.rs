use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Database;
use crate::models::{Project, ProjectFilter, ProjectInput};
use crate::store::ProjectStore;

#[async_trait]
impl ProjectStore for Database {
    async fn create_project(&self, owner_id: Uuid, input: &ProjectInput, stages: &[String]) -> Result<Project> {
        // The project and its columns are created together or not at all
        let mut tx = self.pool.begin().await?;

        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, status, owner_id, client_id, project_type, address, start_date,
                                  estimated_end_date, actual_end_date, total_area, planned_cost,
                                  architectural_style, construction_type, number_of_floors, parking_spots,
                                  has_basement, has_garage, environmental_license_required, visibility)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.status)
        .bind(owner_id)
        .bind(input.client_id)
        .bind(&input.project_type)
        .bind(&input.address)
        .bind(input.start_date)
        .bind(input.estimated_end_date)
        .bind(input.actual_end_date)
        .bind(input.total_area)
        .bind(input.planned_cost)
        .bind(input.architectural_style)
        .bind(input.construction_type)
        .bind(input.number_of_floors)
        .bind(input.parking_spots)
        .bind(input.has_basement)
        .bind(input.has_garage)
        .bind(input.environmental_license_required)
        .bind(input.visibility)
        .fetch_one(&mut *tx)
        .await?;

        for (order, name) in stages.iter().enumerate() {
            sqlx::query("INSERT INTO stages (project_id, name, sort_order) VALUES ($1, $2, $3)")
                .bind(project.id)
                .bind(name)
                .bind(i32::try_from(order)?)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(project)
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(project)
    }

    async fn update_project(&self, id: Uuid, input: &ProjectInput) -> Result<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = $1, status = $2, client_id = $3, project_type = $4, address = $5,
                start_date = $6, estimated_end_date = $7, actual_end_date = $8, total_area = $9,
                planned_cost = $10, architectural_style = $11, construction_type = $12,
                number_of_floors = $13, parking_spots = $14, has_basement = $15, has_garage = $16,
                environmental_license_required = $17, visibility = $18, updated_at = now()
            WHERE id = $19 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.status)
        .bind(input.client_id)
        .bind(&input.project_type)
        .bind(&input.address)
        .bind(input.start_date)
        .bind(input.estimated_end_date)
        .bind(input.actual_end_date)
        .bind(input.total_area)
        .bind(input.planned_cost)
        .bind(input.architectural_style)
        .bind(input.construction_type)
        .bind(input.number_of_floors)
        .bind(input.parking_spots)
        .bind(input.has_basement)
        .bind(input.has_garage)
        .bind(input.environmental_license_required)
        .bind(input.visibility)
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(project)
    }

    async fn soft_delete_project(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = $1, updated_at = $1 WHERE id = $2 AND deleted_at IS NULL",
        )
        .bind(at)
        .bind(id)
        .execute(self.get_pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT * FROM projects
            WHERE deleted_at IS NULL
              AND ($1::uuid IS NULL OR client_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY updated_at DESC
            "#,
        )
        .bind(filter.client_id)
        .bind(&filter.status)
        .fetch_all(self.get_pool())
        .await?;

        Ok(projects)
    }
}
