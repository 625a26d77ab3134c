use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A Kanban column of a project.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Stage {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOrder {
    pub id: Uuid,
    pub order: i32,
}
