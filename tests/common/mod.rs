//! In-memory store shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Result};
use archflow::auth::Session;
use archflow::models::{
    Activity, ActivityFilter, ActivityInput, CategoryHours, Client, ClientInput, ClientStatus, DayHours,
    Deliverable, DeliverableInput, DeliverableStatus, NamedHours, NewTask, NewUser, Page, Paginated, Project,
    ProjectFilter, ProjectInput, Role, Stage, StageOrder, StatusCount, Task, TaskMove, TimeLog, TimeLogCategory,
    TimeLogFilter, TimeLogInput, TimerStart, UrgentProject, User, UserHours, UserSummary,
    CLOSED_PROJECT_STATUSES,
};
use archflow::notify::{Notification, Notifier};
use archflow::reports::DateRange;
use archflow::store::{
    ActivityStore, BoardStore, ClientStore, DeliverableStore, ProjectStore, ReportStore, TimeLogStore, UserStore,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Default)]
struct State {
    users: Vec<User>,
    clients: Vec<Client>,
    projects: Vec<Project>,
    stages: Vec<Stage>,
    tasks: Vec<Task>,
    activities: Vec<Activity>,
    time_logs: Vec<TimeLog>,
    deliverables: Vec<Deliverable>,
}

/// Records every call and can be told to fail named operations.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    calls: Mutex<Vec<&'static str>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn enter(&self, op: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(op);
        if self.failing.lock().unwrap().contains(op) {
            bail!("{op} failed");
        }
        Ok(())
    }

    /// Makes every later call to `op` return an error.
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Adds a user directly and returns a session for them.
    pub fn add_user(&self, full_name: &str, role: Role) -> Session {
        let user = User {
            id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            email: format!("{}@studio.test", full_name.to_lowercase().replace(' ', ".")),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        };
        let session = Session {
            user_id: user.id,
            user_name: user.full_name.clone(),
            email: user.email.clone(),
            role,
        };
        self.state().users.push(user);
        session
    }

    pub fn clients(&self) -> Vec<Client> {
        self.state().clients.clone()
    }

    pub fn stages_of(&self, project_id: Uuid) -> Vec<Stage> {
        let mut stages: Vec<Stage> = self.state().stages.iter().filter(|s| s.project_id == project_id).cloned().collect();
        stages.sort_by_key(|s| s.order);
        stages
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state().tasks.clone()
    }

    pub fn task(&self, id: Uuid) -> Task {
        self.state().tasks.iter().find(|t| t.id == id).cloned().unwrap()
    }

    pub fn deliverable_count(&self) -> usize {
        self.state().deliverables.len()
    }
}

pub fn owner(store: &MemoryStore) -> Session {
    store.add_user("Olivia Owner", Role::Owner)
}

pub fn editor(store: &MemoryStore) -> Session {
    store.add_user("Eduardo Editor", Role::Editor)
}

pub fn viewer(store: &MemoryStore) -> Session {
    store.add_user("Vera Viewer", Role::Viewer)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn client_input(name: &str, email: &str) -> ClientInput {
    ClientInput {
        name: name.into(),
        email: email.into(),
        ..Default::default()
    }
}

pub fn project_input(name: &str) -> ProjectInput {
    ProjectInput {
        name: name.into(),
        ..Default::default()
    }
}

/// Keeps every notification it is given.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn publish(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}

fn paginate<T: Clone>(rows: Vec<T>, page: Page) -> Paginated<T> {
    let total = rows.len() as i64;
    let data = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    Paginated::new(data, total, page)
}

fn matches(value: Option<&str>, needle: &str) -> bool {
    value.is_some_and(|v| v.to_lowercase().contains(needle))
}

fn is_open(status: &str) -> bool {
    !CLOSED_PROJECT_STATUSES.contains(&status)
}

fn sort_desc<T>(rows: &mut [T], hours: impl Fn(&T) -> f64) {
    rows.sort_by(|a, b| hours(b).total_cmp(&hours(a)));
}

impl State {
    fn logs_in(&self, user_id: Option<Uuid>, range: DateRange) -> impl Iterator<Item = &TimeLog> + '_ {
        self.time_logs
            .iter()
            .filter(move |l| user_id.is_none_or(|u| l.user_id == u) && range.contains(l.date))
    }

    fn build_client(id: Uuid, owner_id: Option<Uuid>, input: &ClientInput, created_at: DateTime<Utc>) -> Client {
        Client {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            website: input.website.clone(),
            legal_type: input.legal_type,
            document: input.document.clone(),
            address: input.address.clone(),
            category: input.category,
            status: input.status,
            notes: input.notes.clone(),
            tags: input.tags.clone(),
            user_id: owner_id,
            created_at,
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn build_project(id: Uuid, owner_id: Uuid, input: &ProjectInput, created_at: DateTime<Utc>) -> Project {
        Project {
            id,
            name: input.name.clone(),
            status: input.status.clone(),
            owner_id,
            client_id: input.client_id,
            project_type: input.project_type.clone(),
            address: input.address.clone(),
            start_date: input.start_date,
            estimated_end_date: input.estimated_end_date,
            actual_end_date: input.actual_end_date,
            total_area: input.total_area,
            planned_cost: input.planned_cost,
            architectural_style: input.architectural_style,
            construction_type: input.construction_type,
            number_of_floors: input.number_of_floors,
            parking_spots: input.parking_spots,
            has_basement: input.has_basement,
            has_garage: input.has_garage,
            environmental_license_required: input.environmental_license_required,
            visibility: input.visibility,
            created_at,
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn build_activity(id: Uuid, created_by: Uuid, input: &ActivityInput, created_at: DateTime<Utc>) -> Activity {
        Activity {
            id,
            kind: input.kind,
            title: input.title.clone(),
            description: input.description.clone(),
            duration: input.duration,
            start_time: input.start_time,
            end_time: input.end_time,
            location: input.location.clone(),
            contact_email: input.contact_email.clone(),
            participants: input.participants.clone(),
            client_id: input.client_id,
            project_id: input.project_id,
            task_id: input.task_id,
            status: input.status,
            notes: input.notes.clone(),
            created_by,
            created_at,
        }
    }

    fn build_time_log(id: Uuid, user_id: Uuid, input: &TimeLogInput, created_at: DateTime<Utc>) -> TimeLog {
        TimeLog {
            id,
            user_id,
            project_id: input.project_id,
            task_id: input.task_id,
            client_id: input.client_id,
            category: input.category,
            description: input.description.clone(),
            date: input.date,
            start_time: input.start_time,
            end_time: input.end_time,
            duration: input.duration,
            billable: input.billable,
            bill_rate: input.bill_rate,
            tags: input.tags.clone(),
            created_at,
        }
    }

    fn build_deliverable(
        id: Uuid,
        created_by: Uuid,
        input: &DeliverableInput,
        created_at: DateTime<Utc>,
    ) -> Deliverable {
        Deliverable {
            id,
            project_id: input.project_id,
            task_id: input.task_id,
            name: input.name.clone(),
            kind: input.kind,
            description: input.description.clone(),
            file_url: input.file_url.clone(),
            file_key: input.file_key.clone(),
            file_size: input.file_size,
            mime_type: input.mime_type.clone(),
            version: input.version,
            status: input.status,
            tags: input.tags.clone(),
            created_by,
            approved_by: None,
            approved_at: None,
            created_at,
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.enter("find_user_by_email")?;
        Ok(self.state().users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        self.enter("create_user")?;
        let user = User {
            id: Uuid::new_v4(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: Utc::now(),
        };
        self.state().users.push(user.clone());
        Ok(user)
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>> {
        self.enter("users_by_ids")?;
        Ok(self
            .state()
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .map(|u| UserSummary {
                id: u.id,
                full_name: u.full_name.clone(),
            })
            .collect())
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>> {
        self.enter("list_users")?;
        let mut users: Vec<UserSummary> = self
            .state()
            .users
            .iter()
            .map(|u| UserSummary {
                id: u.id,
                full_name: u.full_name.clone(),
            })
            .collect();
        users.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(users)
    }
}

#[async_trait]
impl ClientStore for MemoryStore {
    async fn create_client(&self, owner_id: Uuid, input: &ClientInput) -> Result<Client> {
        self.enter("create_client")?;
        let client = State::build_client(Uuid::new_v4(), Some(owner_id), input, Utc::now());
        self.state().clients.push(client.clone());
        Ok(client)
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<Client>> {
        self.enter("get_client")?;
        Ok(self
            .state()
            .clients
            .iter()
            .find(|c| c.id == id && c.deleted_at.is_none())
            .cloned())
    }

    async fn update_client(&self, id: Uuid, input: &ClientInput) -> Result<Option<Client>> {
        self.enter("update_client")?;
        let mut state = self.state();
        let Some(client) = state.clients.iter_mut().find(|c| c.id == id && c.deleted_at.is_none()) else {
            return Ok(None);
        };
        *client = State::build_client(id, client.user_id, input, client.created_at);
        Ok(Some(client.clone()))
    }

    async fn soft_delete_client(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        self.enter("soft_delete_client")?;
        let mut state = self.state();
        match state.clients.iter_mut().find(|c| c.id == id && c.deleted_at.is_none()) {
            Some(client) => {
                client.deleted_at = Some(at);
                client.status = ClientStatus::Inactive;
                client.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_clients(&self, query: Option<&str>, page: Page) -> Result<Paginated<Client>> {
        self.enter("list_clients")?;
        let needle = query.map(str::to_lowercase);
        let mut rows: Vec<Client> = self
            .state()
            .clients
            .iter()
            .rev()
            .filter(|c| c.deleted_at.is_none())
            .filter(|c| match &needle {
                Some(n) => {
                    matches(Some(c.name.as_str()), n)
                        || matches(Some(c.email.as_str()), n)
                        || matches(c.document.as_deref(), n)
                }
                None => true,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(rows, page))
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn create_project(&self, owner_id: Uuid, input: &ProjectInput, stages: &[String]) -> Result<Project> {
        self.enter("create_project")?;
        let now = Utc::now();
        let project = State::build_project(Uuid::new_v4(), owner_id, input, now);
        let mut state = self.state();
        for (name, order) in stages.iter().zip(0..) {
            state.stages.push(Stage {
                id: Uuid::new_v4(),
                project_id: project.id,
                name: name.clone(),
                order,
                created_at: now,
            });
        }
        state.projects.push(project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        self.enter("get_project")?;
        Ok(self
            .state()
            .projects
            .iter()
            .find(|p| p.id == id && p.deleted_at.is_none())
            .cloned())
    }

    async fn update_project(&self, id: Uuid, input: &ProjectInput) -> Result<Option<Project>> {
        self.enter("update_project")?;
        let mut state = self.state();
        let Some(project) = state.projects.iter_mut().find(|p| p.id == id && p.deleted_at.is_none()) else {
            return Ok(None);
        };
        *project = State::build_project(id, project.owner_id, input, project.created_at);
        Ok(Some(project.clone()))
    }

    async fn soft_delete_project(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        self.enter("soft_delete_project")?;
        let mut state = self.state();
        match state.projects.iter_mut().find(|p| p.id == id && p.deleted_at.is_none()) {
            Some(project) => {
                project.deleted_at = Some(at);
                project.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>> {
        self.enter("list_projects")?;
        let mut rows: Vec<Project> = self
            .state()
            .projects
            .iter()
            .filter(|p| p.deleted_at.is_none())
            .filter(|p| filter.client_id.is_none_or(|c| p.client_id == Some(c)))
            .filter(|p| filter.status.as_ref().is_none_or(|s| &p.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn list_stages(&self, project_id: Uuid) -> Result<Vec<Stage>> {
        self.enter("list_stages")?;
        Ok(self.stages_of(project_id))
    }

    async fn get_stage(&self, id: Uuid) -> Result<Option<Stage>> {
        self.enter("get_stage")?;
        Ok(self.state().stages.iter().find(|s| s.id == id).cloned())
    }

    async fn create_stage(&self, project_id: Uuid, name: &str) -> Result<Stage> {
        self.enter("create_stage")?;
        let mut state = self.state();
        let order = state
            .stages
            .iter()
            .filter(|s| s.project_id == project_id)
            .map(|s| s.order + 1)
            .max()
            .unwrap_or(0);
        let stage = Stage {
            id: Uuid::new_v4(),
            project_id,
            name: name.to_string(),
            order,
            created_at: Utc::now(),
        };
        state.stages.push(stage.clone());
        Ok(stage)
    }

    async fn rename_stage(&self, id: Uuid, name: &str) -> Result<Option<Stage>> {
        self.enter("rename_stage")?;
        let mut state = self.state();
        Ok(state.stages.iter_mut().find(|s| s.id == id).map(|stage| {
            stage.name = name.to_string();
            stage.clone()
        }))
    }

    async fn reorder_stages(&self, project_id: Uuid, updates: &[StageOrder]) -> Result<()> {
        self.enter("reorder_stages")?;
        let mut state = self.state();
        for update in updates {
            if !state.stages.iter().any(|s| s.id == update.id && s.project_id == project_id) {
                bail!("stage {} does not belong to project {project_id}", update.id);
            }
        }
        for update in updates {
            if let Some(stage) = state.stages.iter_mut().find(|s| s.id == update.id) {
                stage.order = update.order;
            }
        }
        Ok(())
    }

    async fn list_tasks(&self, project_id: Uuid) -> Result<Vec<Task>> {
        self.enter("list_tasks")?;
        let mut tasks: Vec<Task> = self.state().tasks.iter().filter(|t| t.project_id == project_id).cloned().collect();
        tasks.sort_by_key(|t| (t.stage_id, t.position));
        Ok(tasks)
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        self.enter("get_task")?;
        Ok(self.state().tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn insert_task(&self, task: &NewTask) -> Result<Task> {
        self.enter("insert_task")?;
        let mut state = self.state();
        let position = state
            .tasks
            .iter()
            .filter(|t| t.stage_id == task.stage_id)
            .map(|t| t.position + 1)
            .max()
            .unwrap_or(0);
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            project_id: task.project_id,
            stage_id: task.stage_id,
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            position,
            assignee_id: task.assignee_id,
            due_date: task.due_date,
            tags: task.tags.clone(),
            historico: Json(task.history.clone()),
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn save_task(&self, task: &Task) -> Result<Task> {
        self.enter("save_task")?;
        let mut state = self.state();
        let Some(stored) = state.tasks.iter_mut().find(|t| t.id == task.id) else {
            bail!("task {} does not exist", task.id);
        };
        *stored = Task {
            updated_at: Utc::now(),
            ..task.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool> {
        self.enter("delete_task")?;
        let mut state = self.state();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        Ok(state.tasks.len() != before)
    }

    async fn reorder_tasks(&self, project_id: Uuid, moves: &[TaskMove]) -> Result<()> {
        self.enter("reorder_tasks")?;
        let mut state = self.state();
        for m in moves {
            if !state.tasks.iter().any(|t| t.id == m.id && t.project_id == project_id) {
                bail!("task {} does not belong to project {project_id}", m.id);
            }
        }
        for m in moves {
            if let Some(task) = state.tasks.iter_mut().find(|t| t.id == m.id) {
                task.stage_id = m.stage_id;
                task.position = m.position;
                if let Some(history) = &m.history {
                    task.historico = Json(history.clone());
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn create_activity(&self, created_by: Uuid, input: &ActivityInput) -> Result<Activity> {
        self.enter("create_activity")?;
        let activity = State::build_activity(Uuid::new_v4(), created_by, input, Utc::now());
        self.state().activities.push(activity.clone());
        Ok(activity)
    }

    async fn get_activity(&self, id: Uuid) -> Result<Option<Activity>> {
        self.enter("get_activity")?;
        Ok(self.state().activities.iter().find(|a| a.id == id).cloned())
    }

    async fn update_activity(&self, id: Uuid, input: &ActivityInput) -> Result<Option<Activity>> {
        self.enter("update_activity")?;
        let mut state = self.state();
        let Some(activity) = state.activities.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        *activity = State::build_activity(id, activity.created_by, input, activity.created_at);
        Ok(Some(activity.clone()))
    }

    async fn delete_activity(&self, id: Uuid) -> Result<bool> {
        self.enter("delete_activity")?;
        let mut state = self.state();
        let before = state.activities.len();
        state.activities.retain(|a| a.id != id);
        Ok(state.activities.len() != before)
    }

    async fn list_activities(&self, filter: &ActivityFilter, page: Page) -> Result<Paginated<Activity>> {
        self.enter("list_activities")?;
        let mut rows: Vec<Activity> = self
            .state()
            .activities
            .iter()
            .filter(|a| filter.client_id.is_none_or(|c| a.client_id == Some(c)))
            .filter(|a| filter.project_id.is_none_or(|p| a.project_id == Some(p)))
            .filter(|a| filter.kind.is_none_or(|k| a.kind == k))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(paginate(rows, page))
    }

    async fn activities_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Activity>> {
        self.enter("activities_between")?;
        let mut rows: Vec<Activity> = self
            .state()
            .activities
            .iter()
            .filter(|a| a.start_time >= from && a.start_time < to)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.start_time);
        Ok(rows)
    }
}

#[async_trait]
impl TimeLogStore for MemoryStore {
    async fn create_time_log(&self, user_id: Uuid, input: &TimeLogInput) -> Result<TimeLog> {
        self.enter("create_time_log")?;
        let log = State::build_time_log(Uuid::new_v4(), user_id, input, Utc::now());
        self.state().time_logs.push(log.clone());
        Ok(log)
    }

    async fn get_time_log(&self, id: Uuid) -> Result<Option<TimeLog>> {
        self.enter("get_time_log")?;
        Ok(self.state().time_logs.iter().find(|l| l.id == id).cloned())
    }

    async fn update_time_log(&self, id: Uuid, input: &TimeLogInput) -> Result<Option<TimeLog>> {
        self.enter("update_time_log")?;
        let mut state = self.state();
        let Some(log) = state.time_logs.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        *log = State::build_time_log(id, log.user_id, input, log.created_at);
        Ok(Some(log.clone()))
    }

    async fn delete_time_log(&self, id: Uuid) -> Result<bool> {
        self.enter("delete_time_log")?;
        let mut state = self.state();
        let before = state.time_logs.len();
        state.time_logs.retain(|l| l.id != id);
        Ok(state.time_logs.len() != before)
    }

    async fn list_time_logs(&self, user_id: Uuid, filter: &TimeLogFilter, page: Page) -> Result<Paginated<TimeLog>> {
        self.enter("list_time_logs")?;
        let mut rows: Vec<TimeLog> = self
            .state()
            .time_logs
            .iter()
            .filter(|l| l.user_id == user_id)
            .filter(|l| filter.project_id.is_none_or(|p| l.project_id == Some(p)))
            .filter(|l| filter.client_id.is_none_or(|c| l.client_id == Some(c)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.date, b.created_at).cmp(&(a.date, a.created_at)));
        Ok(paginate(rows, page))
    }

    async fn start_timer(&self, user_id: Uuid, timer: &TimerStart, at: DateTime<Utc>) -> Result<Option<TimeLog>> {
        self.enter("start_timer")?;
        let mut state = self.state();
        if state.time_logs.iter().any(|l| l.user_id == user_id && l.is_running()) {
            return Ok(None);
        }
        let log = TimeLog {
            id: Uuid::new_v4(),
            user_id,
            project_id: timer.project_id,
            task_id: timer.task_id,
            client_id: timer.client_id,
            category: timer.category,
            description: timer.description.clone(),
            date: at.date_naive(),
            start_time: Some(at),
            end_time: None,
            duration: 0.0,
            billable: timer.billable,
            bill_rate: timer.bill_rate,
            tags: Vec::new(),
            created_at: Utc::now(),
        };
        state.time_logs.push(log.clone());
        Ok(Some(log))
    }

    async fn running_timer(&self, user_id: Uuid) -> Result<Option<TimeLog>> {
        self.enter("running_timer")?;
        Ok(self
            .state()
            .time_logs
            .iter()
            .filter(|l| l.user_id == user_id && l.is_running())
            .max_by_key(|l| l.start_time)
            .cloned())
    }

    async fn finish_timer(&self, id: Uuid, end: DateTime<Utc>, duration: f64) -> Result<Option<TimeLog>> {
        self.enter("finish_timer")?;
        let mut state = self.state();
        Ok(state
            .time_logs
            .iter_mut()
            .find(|l| l.id == id && l.is_running())
            .map(|log| {
                log.end_time = Some(end);
                log.duration = duration;
                log.clone()
            }))
    }
}

#[async_trait]
impl DeliverableStore for MemoryStore {
    async fn create_deliverable(&self, created_by: Uuid, input: &DeliverableInput) -> Result<Deliverable> {
        self.enter("create_deliverable")?;
        let deliverable = State::build_deliverable(Uuid::new_v4(), created_by, input, Utc::now());
        self.state().deliverables.push(deliverable.clone());
        Ok(deliverable)
    }

    async fn get_deliverable(&self, id: Uuid) -> Result<Option<Deliverable>> {
        self.enter("get_deliverable")?;
        Ok(self.state().deliverables.iter().find(|d| d.id == id).cloned())
    }

    async fn update_deliverable(&self, id: Uuid, input: &DeliverableInput) -> Result<Option<Deliverable>> {
        self.enter("update_deliverable")?;
        let mut state = self.state();
        let Some(deliverable) = state.deliverables.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        let mut updated = State::build_deliverable(id, deliverable.created_by, input, deliverable.created_at);
        if updated.status == deliverable.status {
            updated.approved_by = deliverable.approved_by;
            updated.approved_at = deliverable.approved_at;
        }
        *deliverable = updated;
        Ok(Some(deliverable.clone()))
    }

    async fn set_deliverable_status(
        &self,
        id: Uuid,
        status: DeliverableStatus,
        approved_by: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<Option<Deliverable>> {
        self.enter("set_deliverable_status")?;
        let mut state = self.state();
        Ok(state.deliverables.iter_mut().find(|d| d.id == id).map(|d| {
            d.status = status;
            d.approved_by = approved_by;
            d.approved_at = approved_by.map(|_| at);
            d.updated_at = at;
            d.clone()
        }))
    }

    async fn delete_deliverable(&self, id: Uuid) -> Result<bool> {
        self.enter("delete_deliverable")?;
        let mut state = self.state();
        let before = state.deliverables.len();
        state.deliverables.retain(|d| d.id != id);
        Ok(state.deliverables.len() != before)
    }

    async fn list_deliverables(&self, project_id: Uuid) -> Result<Vec<Deliverable>> {
        self.enter("list_deliverables")?;
        let mut rows: Vec<Deliverable> = self
            .state()
            .deliverables
            .iter()
            .filter(|d| d.project_id == project_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn sum_hours(&self, user_id: Option<Uuid>, range: DateRange, billable_only: bool) -> Result<f64> {
        self.enter("sum_hours")?;
        Ok(self
            .state()
            .logs_in(user_id, range)
            .filter(|l| !billable_only || l.billable)
            .map(|l| l.duration)
            .sum())
    }

    async fn billable_value(
        &self,
        user_id: Option<Uuid>,
        range: DateRange,
        project_ids: &[Uuid],
        default_rate: f64,
    ) -> Result<f64> {
        self.enter("billable_value")?;
        Ok(self
            .state()
            .logs_in(user_id, range)
            .filter(|l| l.billable)
            .filter(|l| project_ids.is_empty() || l.project_id.is_some_and(|p| project_ids.contains(&p)))
            .map(|l| l.duration * l.bill_rate.unwrap_or(default_rate))
            .sum())
    }

    async fn hours_by_category(&self, user_id: Option<Uuid>, range: DateRange) -> Result<Vec<CategoryHours>> {
        self.enter("hours_by_category")?;
        let mut totals: Vec<(TimeLogCategory, f64)> = Vec::new();
        for log in self.state().logs_in(user_id, range) {
            match totals.iter_mut().find(|(c, _)| *c == log.category) {
                Some((_, hours)) => *hours += log.duration,
                None => totals.push((log.category, log.duration)),
            }
        }
        let mut rows: Vec<CategoryHours> = totals
            .into_iter()
            .map(|(category, hours)| CategoryHours { category, hours })
            .collect();
        sort_desc(&mut rows, |r| r.hours);
        Ok(rows)
    }

    async fn hours_by_day(&self, user_id: Option<Uuid>, range: DateRange) -> Result<Vec<DayHours>> {
        self.enter("hours_by_day")?;
        let mut totals: HashMap<NaiveDate, f64> = HashMap::new();
        for log in self.state().logs_in(user_id, range) {
            *totals.entry(log.date).or_default() += log.duration;
        }
        let mut rows: Vec<DayHours> = totals.into_iter().map(|(date, hours)| DayHours { date, hours }).collect();
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }

    async fn hours_by_project(
        &self,
        user_id: Option<Uuid>,
        range: DateRange,
        limit: Option<i64>,
    ) -> Result<Vec<NamedHours>> {
        self.enter("hours_by_project")?;
        let state = self.state();
        let mut totals: HashMap<Option<Uuid>, f64> = HashMap::new();
        for log in state.logs_in(user_id, range) {
            *totals.entry(log.project_id).or_default() += log.duration;
        }
        let mut rows: Vec<NamedHours> = totals
            .into_iter()
            .map(|(id, hours)| NamedHours {
                id,
                name: id.and_then(|id| state.projects.iter().find(|p| p.id == id).map(|p| p.name.clone())),
                hours,
            })
            .collect();
        sort_desc(&mut rows, |r| r.hours);
        if let Some(limit) = limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }

    async fn hours_by_client(&self, user_id: Option<Uuid>, range: DateRange) -> Result<Vec<NamedHours>> {
        self.enter("hours_by_client")?;
        let state = self.state();
        let mut totals: HashMap<Option<Uuid>, f64> = HashMap::new();
        for log in state.logs_in(user_id, range) {
            *totals.entry(log.client_id).or_default() += log.duration;
        }
        let mut rows: Vec<NamedHours> = totals
            .into_iter()
            .map(|(id, hours)| NamedHours {
                id,
                name: id.and_then(|id| state.clients.iter().find(|c| c.id == id).map(|c| c.name.clone())),
                hours,
            })
            .collect();
        sort_desc(&mut rows, |r| r.hours);
        Ok(rows)
    }

    async fn hours_by_user(&self, range: DateRange, project_ids: &[Uuid]) -> Result<Vec<UserHours>> {
        self.enter("hours_by_user")?;
        let state = self.state();
        let mut rows: Vec<UserHours> = Vec::new();
        for log in state.logs_in(None, range) {
            if !project_ids.is_empty() && !log.project_id.is_some_and(|p| project_ids.contains(&p)) {
                continue;
            }
            let Some(user) = state.users.iter().find(|u| u.id == log.user_id) else {
                continue;
            };
            let billable = if log.billable { log.duration } else { 0.0 };
            match rows.iter_mut().find(|r| r.user_id == user.id) {
                Some(row) => {
                    row.total_hours += log.duration;
                    row.billable_hours += billable;
                }
                None => rows.push(UserHours {
                    user_id: user.id,
                    name: user.full_name.clone(),
                    total_hours: log.duration,
                    billable_hours: billable,
                }),
            }
        }
        sort_desc(&mut rows, |r| r.total_hours);
        Ok(rows)
    }

    async fn count_new_clients(&self, range: DateRange) -> Result<i64> {
        self.enter("count_new_clients")?;
        let (from, to) = (range.start_at(), range.end_at());
        Ok(self
            .state()
            .clients
            .iter()
            .filter(|c| c.deleted_at.is_none() && c.created_at >= from && c.created_at < to)
            .count() as i64)
    }

    async fn count_active_projects(&self) -> Result<i64> {
        self.enter("count_active_projects")?;
        Ok(self
            .state()
            .projects
            .iter()
            .filter(|p| p.deleted_at.is_none() && is_open(&p.status))
            .count() as i64)
    }

    async fn count_active_clients(&self) -> Result<i64> {
        self.enter("count_active_clients")?;
        Ok(self
            .state()
            .clients
            .iter()
            .filter(|c| c.deleted_at.is_none() && c.status != ClientStatus::Inactive)
            .count() as i64)
    }

    async fn urgent_projects(&self, today: NaiveDate, limit: i64) -> Result<Vec<UrgentProject>> {
        self.enter("urgent_projects")?;
        let state = self.state();
        let mut rows: Vec<UrgentProject> = state
            .projects
            .iter()
            .filter(|p| p.deleted_at.is_none() && is_open(&p.status))
            .filter_map(|p| {
                let end = p.estimated_end_date.filter(|end| *end >= today)?;
                Some(UrgentProject {
                    id: p.id,
                    name: p.name.clone(),
                    status: p.status.clone(),
                    estimated_end_date: end,
                    client_name: p
                        .client_id
                        .and_then(|id| state.clients.iter().find(|c| c.id == id).map(|c| c.name.clone())),
                })
            })
            .collect();
        rows.sort_by_key(|p| p.estimated_end_date);
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn project_status_distribution(&self) -> Result<Vec<StatusCount>> {
        self.enter("project_status_distribution")?;
        let mut counts: HashMap<String, i64> = HashMap::new();
        for project in self.state().projects.iter().filter(|p| p.deleted_at.is_none()) {
            *counts.entry(project.status.clone()).or_default() += 1;
        }
        let mut rows: Vec<StatusCount> = counts
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));
        Ok(rows)
    }
}
