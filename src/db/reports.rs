use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::Database;
use crate::models::{
    CategoryHours, ClientStatus, DayHours, NamedHours, StatusCount, UrgentProject, UserHours,
    CLOSED_PROJECT_STATUSES,
};
use crate::reports::DateRange;
use crate::store::ReportStore;

/// Shared `WHERE` for per-user rollups: `$1` user (nullable), `$2..=$3` dates.
const LOG_SCOPE: &str = "($1::uuid IS NULL OR l.user_id = $1) AND l.date BETWEEN $2 AND $3";

fn closed_statuses() -> Vec<String> {
    CLOSED_PROJECT_STATUSES.iter().map(|s| s.to_string()).collect()
}

#[async_trait]
impl ReportStore for Database {
    async fn sum_hours(&self, user_id: Option<Uuid>, range: DateRange, billable_only: bool) -> Result<f64> {
        let hours: f64 = sqlx::query_scalar(&format!(
            "SELECT COALESCE(SUM(l.duration), 0)::float8 FROM time_logs l WHERE {LOG_SCOPE} AND (NOT $4 OR l.billable)"
        ))
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .bind(billable_only)
        .fetch_one(self.get_pool())
        .await?;

        Ok(hours)
    }

    async fn billable_value(
        &self,
        user_id: Option<Uuid>,
        range: DateRange,
        project_ids: &[Uuid],
        default_rate: f64,
    ) -> Result<f64> {
        let value: f64 = sqlx::query_scalar(&format!(
            r#"
            SELECT COALESCE(SUM(l.duration * COALESCE(l.bill_rate, $5)), 0)::float8
            FROM time_logs l
            WHERE {LOG_SCOPE} AND l.billable
              AND (cardinality($4::uuid[]) = 0 OR l.project_id = ANY($4))
            "#
        ))
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .bind(project_ids)
        .bind(default_rate)
        .fetch_one(self.get_pool())
        .await?;

        Ok(value)
    }

    async fn hours_by_category(&self, user_id: Option<Uuid>, range: DateRange) -> Result<Vec<CategoryHours>> {
        let rows = sqlx::query_as::<_, CategoryHours>(&format!(
            r#"
            SELECT l.category, COALESCE(SUM(l.duration), 0)::float8 AS hours
            FROM time_logs l
            WHERE {LOG_SCOPE}
            GROUP BY l.category
            ORDER BY hours DESC
            "#
        ))
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(self.get_pool())
        .await?;

        Ok(rows)
    }

    async fn hours_by_day(&self, user_id: Option<Uuid>, range: DateRange) -> Result<Vec<DayHours>> {
        let rows = sqlx::query_as::<_, DayHours>(&format!(
            r#"
            SELECT l.date, COALESCE(SUM(l.duration), 0)::float8 AS hours
            FROM time_logs l
            WHERE {LOG_SCOPE}
            GROUP BY l.date
            ORDER BY l.date ASC
            "#
        ))
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(self.get_pool())
        .await?;

        Ok(rows)
    }

    async fn hours_by_project(
        &self,
        user_id: Option<Uuid>,
        range: DateRange,
        limit: Option<i64>,
    ) -> Result<Vec<NamedHours>> {
        let rows = sqlx::query_as::<_, NamedHours>(&format!(
            r#"
            SELECT l.project_id AS id, p.name, COALESCE(SUM(l.duration), 0)::float8 AS hours
            FROM time_logs l
            LEFT JOIN projects p ON p.id = l.project_id
            WHERE {LOG_SCOPE}
            GROUP BY l.project_id, p.name
            ORDER BY hours DESC
            LIMIT $4
            "#
        ))
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .bind(limit)
        .fetch_all(self.get_pool())
        .await?;

        Ok(rows)
    }

    async fn hours_by_client(&self, user_id: Option<Uuid>, range: DateRange) -> Result<Vec<NamedHours>> {
        let rows = sqlx::query_as::<_, NamedHours>(&format!(
            r#"
            SELECT l.client_id AS id, c.name, COALESCE(SUM(l.duration), 0)::float8 AS hours
            FROM time_logs l
            LEFT JOIN clients c ON c.id = l.client_id
            WHERE {LOG_SCOPE}
            GROUP BY l.client_id, c.name
            ORDER BY hours DESC
            "#
        ))
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(self.get_pool())
        .await?;

        Ok(rows)
    }

    async fn hours_by_user(&self, range: DateRange, project_ids: &[Uuid]) -> Result<Vec<UserHours>> {
        let rows = sqlx::query_as::<_, UserHours>(
            r#"
            SELECT l.user_id, u.full_name AS name,
                   COALESCE(SUM(l.duration), 0)::float8 AS total_hours,
                   COALESCE(SUM(l.duration) FILTER (WHERE l.billable), 0)::float8 AS billable_hours
            FROM time_logs l
            JOIN users u ON u.id = l.user_id
            WHERE l.date BETWEEN $1 AND $2
              AND (cardinality($3::uuid[]) = 0 OR l.project_id = ANY($3))
            GROUP BY l.user_id, u.full_name
            ORDER BY total_hours DESC
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .bind(project_ids)
        .fetch_all(self.get_pool())
        .await?;

        Ok(rows)
    }

    async fn count_new_clients(&self, range: DateRange) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM clients WHERE deleted_at IS NULL AND created_at >= $1 AND created_at < $2",
        )
        .bind(range.start_at())
        .bind(range.end_at())
        .fetch_one(self.get_pool())
        .await?;

        Ok(count)
    }

    async fn count_active_projects(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM projects WHERE deleted_at IS NULL AND status <> ALL($1)",
        )
        .bind(closed_statuses())
        .fetch_one(self.get_pool())
        .await?;

        Ok(count)
    }

    async fn count_active_clients(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE deleted_at IS NULL AND status <> $1")
            .bind(ClientStatus::Inactive)
            .fetch_one(self.get_pool())
            .await?;

        Ok(count)
    }

    async fn urgent_projects(&self, today: NaiveDate, limit: i64) -> Result<Vec<UrgentProject>> {
        let rows = sqlx::query_as::<_, UrgentProject>(
            r#"
            SELECT p.id, p.name, p.status, p.estimated_end_date, c.name AS client_name
            FROM projects p
            LEFT JOIN clients c ON c.id = p.client_id
            WHERE p.deleted_at IS NULL
              AND p.estimated_end_date >= $1
              AND p.status <> ALL($2)
            ORDER BY p.estimated_end_date ASC
            LIMIT $3
            "#,
        )
        .bind(today)
        .bind(closed_statuses())
        .bind(limit)
        .fetch_all(self.get_pool())
        .await?;

        Ok(rows)
    }

    async fn project_status_distribution(&self) -> Result<Vec<StatusCount>> {
        let rows = sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT status, COUNT(*) AS count
            FROM projects
            WHERE deleted_at IS NULL
            GROUP BY status
            ORDER BY count DESC, status ASC
            "#,
        )
        .fetch_all(self.get_pool())
        .await?;

        Ok(rows)
    }
}
