use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::Database;
use crate::models::{NewTask, Stage, StageOrder, Task, TaskMove};
use crate::store::BoardStore;

#[async_trait]
impl BoardStore for Database {
    async fn list_stages(&self, project_id: Uuid) -> Result<Vec<Stage>> {
        let stages = sqlx::query_as::<_, Stage>(
            "SELECT * FROM stages WHERE project_id = $1 ORDER BY sort_order ASC, created_at ASC",
        )
        .bind(project_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(stages)
    }

    async fn get_stage(&self, id: Uuid) -> Result<Option<Stage>> {
        let stage = sqlx::query_as::<_, Stage>("SELECT * FROM stages WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(stage)
    }

    async fn create_stage(&self, project_id: Uuid, name: &str) -> Result<Stage> {
        let stage = sqlx::query_as::<_, Stage>(
            r#"
            INSERT INTO stages (project_id, name, sort_order)
            VALUES ($1, $2, (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM stages WHERE project_id = $1))
            RETURNING *
            "#,
        )
        .bind(project_id)
        .bind(name)
        .fetch_one(self.get_pool())
        .await?;

        Ok(stage)
    }

    async fn rename_stage(&self, id: Uuid, name: &str) -> Result<Option<Stage>> {
        let stage = sqlx::query_as::<_, Stage>("UPDATE stages SET name = $1 WHERE id = $2 RETURNING *")
            .bind(name)
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(stage)
    }

    async fn reorder_stages(&self, project_id: Uuid, updates: &[StageOrder]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for update in updates {
            let result = sqlx::query("UPDATE stages SET sort_order = $1 WHERE id = $2 AND project_id = $3")
                .bind(update.order)
                .bind(update.id)
                .bind(project_id)
                .execute(&mut *tx)
                .await?;

            // Dropping the transaction without commit rolls back earlier rows
            if result.rows_affected() != 1 {
                bail!("stage {} does not belong to project {project_id}", update.id);
            }
        }

        tx.commit().await?;

        Ok(())
    }

    async fn list_tasks(&self, project_id: Uuid) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE project_id = $1 ORDER BY stage_id, position ASC, created_at ASC",
        )
        .bind(project_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(tasks)
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(task)
    }

    async fn insert_task(&self, task: &NewTask) -> Result<Task> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, stage_id, title, description, priority, position,
                               assignee_id, due_date, tags, historico)
            VALUES ($1, $2, $3, $4, $5,
                    (SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE stage_id = $2),
                    $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(task.project_id)
        .bind(task.stage_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority)
        .bind(task.assignee_id)
        .bind(task.due_date)
        .bind(&task.tags)
        .bind(Json(&task.history))
        .fetch_one(self.get_pool())
        .await?;

        Ok(task)
    }

    async fn save_task(&self, task: &Task) -> Result<Task> {
        let saved = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET stage_id = $1, title = $2, description = $3, priority = $4, position = $5,
                assignee_id = $6, due_date = $7, tags = $8, historico = $9, updated_at = now()
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(task.stage_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority)
        .bind(task.position)
        .bind(task.assignee_id)
        .bind(task.due_date)
        .bind(&task.tags)
        .bind(&task.historico)
        .bind(task.id)
        .fetch_one(self.get_pool())
        .await?;

        Ok(saved)
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn reorder_tasks(&self, project_id: Uuid, moves: &[TaskMove]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for task_move in moves {
            let result = sqlx::query(
                r#"
                UPDATE tasks
                SET stage_id = $1, position = $2, historico = COALESCE($3, historico), updated_at = now()
                WHERE id = $4 AND project_id = $5
                  AND EXISTS (SELECT 1 FROM stages WHERE id = $1 AND project_id = $5)
                "#,
            )
            .bind(task_move.stage_id)
            .bind(task_move.position)
            .bind(task_move.history.as_ref().map(Json))
            .bind(task_move.id)
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() != 1 {
                bail!("task {} cannot be placed in stage {}", task_move.id, task_move.stage_id);
            }
        }

        tx.commit().await?;

        Ok(())
    }
}
