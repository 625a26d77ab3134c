//! Aggregate rows returned by the reporting queries.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::TimeLogCategory;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize)]
pub struct CategoryHours {
    pub category: TimeLogCategory,
    pub hours: f64,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize)]
pub struct DayHours {
    pub date: NaiveDate,
    pub hours: f64,
}

/// Hours grouped by a named entity (project or client). Both are null for
/// logs that reference no entity.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize)]
pub struct NamedHours {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub hours: f64,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize)]
pub struct UserHours {
    pub user_id: Uuid,
    pub name: String,
    pub total_hours: f64,
    pub billable_hours: f64,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize)]
pub struct UrgentProject {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub estimated_end_date: NaiveDate,
    pub client_name: Option<String>,
}
