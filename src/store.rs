//! Persistence seams. `db::Database` implements these against Postgres; the
//! integration tests provide an in-memory implementation.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{
    Activity, ActivityFilter, ActivityInput, CategoryHours, Client, ClientInput, DayHours, Deliverable,
    DeliverableInput, DeliverableStatus, NamedHours, NewTask, NewUser, Page, Paginated, Project,
    ProjectFilter, ProjectInput, Stage, StageOrder, StatusCount, Task, TaskMove, TimeLog, TimeLogFilter,
    TimeLogInput, TimerStart, UrgentProject, User, UserHours, UserSummary,
};
use crate::reports::DateRange;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn create_user(&self, user: &NewUser) -> Result<User>;
    async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>>;
    /// Every user, by name.
    async fn list_users(&self) -> Result<Vec<UserSummary>>;
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn create_client(&self, owner_id: Uuid, input: &ClientInput) -> Result<Client>;
    /// Soft-deleted clients are not returned.
    async fn get_client(&self, id: Uuid) -> Result<Option<Client>>;
    async fn update_client(&self, id: Uuid, input: &ClientInput) -> Result<Option<Client>>;
    /// Sets `deleted_at` and status INACTIVE. Returns false if no live row matched.
    async fn soft_delete_client(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;
    async fn list_clients(&self, query: Option<&str>, page: Page) -> Result<Paginated<Client>>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Inserts the project and its stages in one transaction.
    async fn create_project(&self, owner_id: Uuid, input: &ProjectInput, stages: &[String]) -> Result<Project>;
    async fn get_project(&self, id: Uuid) -> Result<Option<Project>>;
    async fn update_project(&self, id: Uuid, input: &ProjectInput) -> Result<Option<Project>>;
    async fn soft_delete_project(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>>;
}

#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn list_stages(&self, project_id: Uuid) -> Result<Vec<Stage>>;
    async fn get_stage(&self, id: Uuid) -> Result<Option<Stage>>;
    /// Appends a column after the current last one.
    async fn create_stage(&self, project_id: Uuid, name: &str) -> Result<Stage>;
    async fn rename_stage(&self, id: Uuid, name: &str) -> Result<Option<Stage>>;
    /// Applies every update or none. Each id must be a stage of `project_id`.
    async fn reorder_stages(&self, project_id: Uuid, updates: &[StageOrder]) -> Result<()>;

    async fn list_tasks(&self, project_id: Uuid) -> Result<Vec<Task>>;
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>>;
    /// Inserts at the end of the task's column.
    async fn insert_task(&self, task: &NewTask) -> Result<Task>;
    /// Persists every editable field of `task`, including its history.
    async fn save_task(&self, task: &Task) -> Result<Task>;
    async fn delete_task(&self, id: Uuid) -> Result<bool>;
    /// Applies every move or none. Each id must be a task of `project_id`.
    async fn reorder_tasks(&self, project_id: Uuid, moves: &[TaskMove]) -> Result<()>;
}

#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn create_activity(&self, created_by: Uuid, input: &ActivityInput) -> Result<Activity>;
    async fn get_activity(&self, id: Uuid) -> Result<Option<Activity>>;
    async fn update_activity(&self, id: Uuid, input: &ActivityInput) -> Result<Option<Activity>>;
    async fn delete_activity(&self, id: Uuid) -> Result<bool>;
    async fn list_activities(&self, filter: &ActivityFilter, page: Page) -> Result<Paginated<Activity>>;
    /// Activities starting within `[from, to)`, earliest first.
    async fn activities_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Activity>>;
}

#[async_trait]
pub trait TimeLogStore: Send + Sync {
    async fn create_time_log(&self, user_id: Uuid, input: &TimeLogInput) -> Result<TimeLog>;
    async fn get_time_log(&self, id: Uuid) -> Result<Option<TimeLog>>;
    async fn update_time_log(&self, id: Uuid, input: &TimeLogInput) -> Result<Option<TimeLog>>;
    async fn delete_time_log(&self, id: Uuid) -> Result<bool>;
    async fn list_time_logs(&self, user_id: Uuid, filter: &TimeLogFilter, page: Page) -> Result<Paginated<TimeLog>>;
    /// `None` when the user already has a running timer.
    async fn start_timer(&self, user_id: Uuid, timer: &TimerStart, at: DateTime<Utc>) -> Result<Option<TimeLog>>;
    async fn running_timer(&self, user_id: Uuid) -> Result<Option<TimeLog>>;
    /// Closes a running timer. Returns `None` if it was not running.
    async fn finish_timer(&self, id: Uuid, end: DateTime<Utc>, duration: f64) -> Result<Option<TimeLog>>;
}

#[async_trait]
pub trait DeliverableStore: Send + Sync {
    async fn create_deliverable(&self, created_by: Uuid, input: &DeliverableInput) -> Result<Deliverable>;
    async fn get_deliverable(&self, id: Uuid) -> Result<Option<Deliverable>>;
    async fn update_deliverable(&self, id: Uuid, input: &DeliverableInput) -> Result<Option<Deliverable>>;
    async fn set_deliverable_status(
        &self,
        id: Uuid,
        status: DeliverableStatus,
        approved_by: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<Option<Deliverable>>;
    async fn delete_deliverable(&self, id: Uuid) -> Result<bool>;
    async fn list_deliverables(&self, project_id: Uuid) -> Result<Vec<Deliverable>>;
}

/// Group-by rollups over time logs, projects and clients. `user_id = None`
/// aggregates over everyone; empty `project_ids` means every project.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn sum_hours(&self, user_id: Option<Uuid>, range: DateRange, billable_only: bool) -> Result<f64>;
    /// Sum of `duration * coalesce(bill_rate, default_rate)` over billable logs.
    async fn billable_value(
        &self,
        user_id: Option<Uuid>,
        range: DateRange,
        project_ids: &[Uuid],
        default_rate: f64,
    ) -> Result<f64>;
    async fn hours_by_category(&self, user_id: Option<Uuid>, range: DateRange) -> Result<Vec<CategoryHours>>;
    async fn hours_by_day(&self, user_id: Option<Uuid>, range: DateRange) -> Result<Vec<DayHours>>;
    /// Highest totals first; `limit = None` returns every project.
    async fn hours_by_project(
        &self,
        user_id: Option<Uuid>,
        range: DateRange,
        limit: Option<i64>,
    ) -> Result<Vec<NamedHours>>;
    /// Highest totals first.
    async fn hours_by_client(&self, user_id: Option<Uuid>, range: DateRange) -> Result<Vec<NamedHours>>;
    async fn hours_by_user(&self, range: DateRange, project_ids: &[Uuid]) -> Result<Vec<UserHours>>;
    async fn count_new_clients(&self, range: DateRange) -> Result<i64>;
    async fn count_active_projects(&self) -> Result<i64>;
    async fn count_active_clients(&self) -> Result<i64>;
    /// Open projects with an estimated end date on or after `today`, nearest first.
    async fn urgent_projects(&self, today: NaiveDate, limit: i64) -> Result<Vec<UrgentProject>>;
    async fn project_status_distribution(&self) -> Result<Vec<StatusCount>>;
}

/// Everything the application needs from persistence.
pub trait Store:
    UserStore + ClientStore + ProjectStore + BoardStore + ActivityStore + TimeLogStore + DeliverableStore + ReportStore
{
}

impl<T> Store for T where
    T: UserStore + ClientStore + ProjectStore + BoardStore + ActivityStore + TimeLogStore + DeliverableStore + ReportStore
{
}
