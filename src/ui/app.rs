//! Screen stack and the glue between screen actions and the action layer.
//!
//! The screen on top of the stack receives keys. Wizards are pushed over the
//! list they edit and popped when they close, after which the list below is
//! reloaded so it shows what was saved.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::event::KeyCode;
use tracing::{info, warn};
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame, Terminal,
};
use uuid::Uuid;

use super::activities::{self, ActivitiesState, ActivityAction};
use super::activity_wizard::{self, ActivityWizardAction, ActivityWizardState};
use super::board::{self, BoardAction, BoardState};
use super::client_wizard::{self, ClientWizardAction, ClientWizardState};
use super::clients::{self, ClientAction, ClientsState};
use super::components::{form::FormState, read_key};
use super::dashboard::{self, DashboardAction, DashboardState};
use super::deliverable_wizard::{self, DeliverableWizardAction, DeliverableWizardState};
use super::deliverables::{self, DeliverableAction, DeliverablesState};
use super::home::{self, HomeAction, HomeState, MenuEntry};
use super::login::{self, LoginAction, LoginState};
use super::project_wizard::{self, ProjectWizardAction, ProjectWizardState};
use super::projects::{self, ProjectAction, ProjectsState};
use super::reports::{self as reports_screen, ReportsAction, ReportsState, ReportsView};
use super::task_wizard::{self, TaskWizardAction, TaskWizardState};
use super::time_log_wizard::{self, TimeLogWizardAction, TimeLogWizardState};
use super::time_logs::{self, TimeLogAction, TimeLogsState};
use crate::actions;
use crate::auth::{self, Session};
use crate::config::Config;
use crate::db::Database;
use crate::error::{ActionError, ActionResult, FieldErrors};
use crate::models::{ActivityFilter, Client, Page, Project, ProjectFilter, TimeLogFilter};
use crate::notify::{NotificationHub, Subscription};
use crate::reports::{ReportFilters, ReportKind, ReportPeriod};
use crate::storage::LocalStorage;

/// How long a status message stays on screen.
const STATUS_TTL: Duration = Duration::from_secs(6);
/// Upper bound on the entries offered in client and project choices.
const CHOICE_LIMIT: u32 = 500;
const REPORT_CHART_DAYS: u32 = 14;

enum Screen {
    Login(LoginState),
    Home(HomeState),
    Dashboard(DashboardState),
    Clients(ClientsState),
    ClientWizard(ClientWizardState),
    Projects(ProjectsState),
    ProjectWizard(ProjectWizardState),
    Board(BoardState),
    TaskWizard(TaskWizardState),
    TimeLogs(TimeLogsState),
    TimeLogWizard(TimeLogWizardState),
    Activities(ActivitiesState),
    ActivityWizard(ActivityWizardState),
    Deliverables(DeliverablesState),
    DeliverableWizard(DeliverableWizardState),
    Reports(ReportsState),
}

impl Screen {
    fn form_mut(&mut self) -> Option<&mut FormState> {
        match self {
            Screen::Login(state) => Some(&mut state.form),
            Screen::ClientWizard(state) => Some(&mut state.form),
            Screen::ProjectWizard(state) => Some(&mut state.form),
            Screen::TaskWizard(state) => Some(&mut state.form),
            Screen::TimeLogWizard(state) => Some(&mut state.form),
            Screen::ActivityWizard(state) => Some(&mut state.form),
            Screen::DeliverableWizard(state) => Some(&mut state.form),
            _ => None,
        }
    }
}

/// Where a list screen was loaded from, so it can be loaded again.
enum Route {
    Clients { query: String, page: u32 },
    Projects(Option<Uuid>),
    Board(Uuid),
    TimeLogs(u32),
    Activities(u32),
    Deliverables(Uuid),
}

struct Status {
    text: String,
    error: bool,
    shown_at: Instant,
}

pub struct App {
    db: Database,
    objects: LocalStorage,
    hub: NotificationHub,
    config: Config,
    session: Option<Session>,
    subscription: Option<Subscription>,
    stack: Vec<Screen>,
    status: Option<Status>,
}

impl App {
    pub fn new(db: Database, objects: LocalStorage, config: Config) -> Self {
        Self {
            db,
            objects,
            hub: NotificationHub::default(),
            config,
            session: None,
            subscription: None,
            stack: vec![Screen::Login(LoginState::new())],
            status: None,
        }
    }

    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            self.expire_status();
            terminal.draw(|f| self.render(f))?;

            if let Some(key) = read_key()? {
                if self.handle_key(key).await? {
                    return Ok(());
                }
            }
            self.poll_notifications();
        }
    }

    fn render<B: Backend>(&mut self, f: &mut Frame<B>) {
        match self.stack.last_mut() {
            Some(Screen::Login(state)) => login::render_login(f, state),
            Some(Screen::Home(state)) => home::render_home(f, state),
            Some(Screen::Dashboard(state)) => dashboard::render_dashboard(f, state),
            Some(Screen::Clients(state)) => clients::render_clients(f, state),
            Some(Screen::ClientWizard(state)) => client_wizard::render_client_wizard(f, state),
            Some(Screen::Projects(state)) => projects::render_projects(f, state),
            Some(Screen::ProjectWizard(state)) => project_wizard::render_project_wizard(f, state),
            Some(Screen::Board(state)) => board::render_board(f, state),
            Some(Screen::TaskWizard(state)) => task_wizard::render_task_wizard(f, state),
            Some(Screen::TimeLogs(state)) => time_logs::render_time_logs(f, state),
            Some(Screen::TimeLogWizard(state)) => time_log_wizard::render_time_log_wizard(f, state),
            Some(Screen::Activities(state)) => activities::render_activities(f, state),
            Some(Screen::ActivityWizard(state)) => activity_wizard::render_activity_wizard(f, state),
            Some(Screen::Deliverables(state)) => deliverables::render_deliverables(f, state),
            Some(Screen::DeliverableWizard(state)) => deliverable_wizard::render_deliverable_wizard(f, state),
            Some(Screen::Reports(state)) => reports_screen::render_reports(f, state),
            None => {}
        }

        if let Some(status) = &self.status {
            let size = f.size();
            if size.height > 0 {
                let area = Rect::new(size.x, size.y + size.height - 1, size.width, 1);
                let color = if status.error { Color::Red } else { Color::Green };
                f.render_widget(Paragraph::new(status.text.as_str()).style(Style::default().fg(color)), area);
            }
        }
    }

    /// Returns `true` when the user asked to quit.
    async fn handle_key(&mut self, key: KeyCode) -> Result<bool> {
        let Some(screen) = self.stack.last_mut() else {
            return Ok(true);
        };
        match screen {
            Screen::Login(state) => {
                if let Some(action) = login::handle_input(state, key) {
                    return self.on_login(action).await;
                }
            }
            Screen::Home(state) => {
                if let Some(action) = home::handle_input(state, key) {
                    self.on_home(action).await?;
                }
            }
            Screen::Dashboard(state) => {
                if let Some(action) = dashboard::handle_input(state, key) {
                    self.on_dashboard(action).await?;
                }
            }
            Screen::Clients(state) => {
                if let Some(action) = clients::handle_input(state, key) {
                    self.on_clients(action).await?;
                }
            }
            Screen::ClientWizard(state) => {
                if let Some(action) = client_wizard::handle_input(state, key) {
                    self.on_client_wizard(action).await?;
                }
            }
            Screen::Projects(state) => {
                if let Some(action) = projects::handle_input(state, key) {
                    self.on_projects(action).await?;
                }
            }
            Screen::ProjectWizard(state) => {
                if let Some(action) = project_wizard::handle_input(state, key) {
                    self.on_project_wizard(action).await?;
                }
            }
            Screen::Board(state) => {
                if let Some(action) = board::handle_input(state, key) {
                    self.on_board(action).await?;
                }
            }
            Screen::TaskWizard(state) => {
                if let Some(action) = task_wizard::handle_input(state, key) {
                    self.on_task_wizard(action).await?;
                }
            }
            Screen::TimeLogs(state) => {
                if let Some(action) = time_logs::handle_input(state, key) {
                    self.on_time_logs(action).await?;
                }
            }
            Screen::TimeLogWizard(state) => {
                if let Some(action) = time_log_wizard::handle_input(state, key) {
                    self.on_time_log_wizard(action).await?;
                }
            }
            Screen::Activities(state) => {
                if let Some(action) = activities::handle_input(state, key) {
                    self.on_activities(action).await?;
                }
            }
            Screen::ActivityWizard(state) => {
                if let Some(action) = activity_wizard::handle_input(state, key) {
                    self.on_activity_wizard(action).await?;
                }
            }
            Screen::Deliverables(state) => {
                if let Some(action) = deliverables::handle_input(state, key) {
                    self.on_deliverables(action).await?;
                }
            }
            Screen::DeliverableWizard(state) => {
                if let Some(action) = deliverable_wizard::handle_input(state, key) {
                    self.on_deliverable_wizard(action).await?;
                }
            }
            Screen::Reports(state) => {
                if let Some(action) = reports_screen::handle_input(state, key) {
                    self.on_reports(action).await?;
                }
            }
        }
        Ok(false)
    }

    fn notice(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            error: false,
            shown_at: Instant::now(),
        });
    }

    /// Field errors go to the open form; everything else to the status line.
    fn show_error(&mut self, err: ActionError) {
        if let ActionError::Validation(errors) = &err {
            if let Some(form) = self.stack.last_mut().and_then(Screen::form_mut) {
                form.set_errors(errors.clone());
                return;
            }
        }
        let text = match err {
            ActionError::Unauthorized => "You are not allowed to do that.".to_string(),
            ActionError::Validation(errors) => errors.to_string(),
            other => other.to_string(),
        };
        self.status = Some(Status {
            text,
            error: true,
            shown_at: Instant::now(),
        });
    }

    fn expire_status(&mut self) {
        if self.status.as_ref().is_some_and(|s| s.shown_at.elapsed() > STATUS_TTL) {
            self.status = None;
        }
    }

    fn poll_notifications(&mut self) {
        let Some(subscription) = self.subscription.as_mut() else {
            return;
        };
        if let Some(notification) = subscription.try_recv() {
            info!(title = %notification.title, "notification received");
            self.notice(format!("{}: {}", notification.title, notification.message));
        }
    }

    fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Pushes the screen, or shows why it could not be opened.
    fn push(&mut self, screen: ActionResult<Screen>) {
        match screen {
            Ok(screen) => self.stack.push(screen),
            Err(e) => self.show_error(e),
        }
    }

    fn replace(&mut self, screen: ActionResult<Screen>) {
        match screen {
            Ok(screen) => {
                self.stack.pop();
                self.stack.push(screen);
            }
            Err(e) => self.show_error(e),
        }
    }

    fn route(&self) -> Option<Route> {
        match self.stack.last()? {
            Screen::Clients(state) => Some(Route::Clients {
                query: state.query().to_string(),
                page: state.page(),
            }),
            Screen::Projects(state) => Some(Route::Projects(state.client_id())),
            Screen::Board(state) => Some(Route::Board(state.project_id())),
            Screen::TimeLogs(state) => Some(Route::TimeLogs(state.page())),
            Screen::Activities(state) => Some(Route::Activities(state.page())),
            Screen::Deliverables(state) => Some(Route::Deliverables(state.project_id())),
            _ => None,
        }
    }

    /// Loads the top screen again from the database.
    async fn reload(&mut self) -> Result<()> {
        let Some(route) = self.route() else {
            return Ok(());
        };
        let screen = match route {
            Route::Clients { query, page } => self.clients_screen(&query, page).await,
            Route::Projects(client_id) => self.projects_screen(client_id).await,
            Route::Board(project_id) => {
                let session = self.signed_in()?;
                match actions::board::load_board(&self.db, &session, project_id).await {
                    Ok(loaded) => {
                        if let Some(Screen::Board(state)) = self.stack.last_mut() {
                            state.reload(loaded);
                        }
                    }
                    Err(e) => self.show_error(e),
                }
                return Ok(());
            }
            Route::TimeLogs(page) => self.time_logs_screen(page).await,
            Route::Activities(page) => self.activities_screen(page).await,
            Route::Deliverables(project_id) => self.deliverables_screen(project_id).await,
        };
        self.replace(screen);
        Ok(())
    }

    /// Closes a wizard and refreshes the list it was opened from.
    async fn close_wizard(&mut self) -> Result<()> {
        self.pop();
        self.reload().await
    }

    async fn on_login(&mut self, action: LoginAction) -> Result<bool> {
        match action {
            LoginAction::Quit => return Ok(true),
            LoginAction::Submit { email, password } => match auth::authenticate(&self.db, &email, &password).await {
                Ok(session) => {
                    self.subscription = Some(self.hub.subscribe(session.user_id));
                    self.stack = vec![Screen::Home(HomeState::new(&session))];
                    self.notice(format!("Welcome, {}", session.user_name));
                    self.session = Some(session);
                }
                Err(ActionError::Unauthorized) => {
                    if let Some(Screen::Login(state)) = self.stack.last_mut() {
                        state.rejected();
                    }
                }
                Err(e) => self.show_error(e),
            },
        }
        Ok(false)
    }

    async fn on_home(&mut self, action: HomeAction) -> Result<()> {
        match action {
            HomeAction::Logout => {
                if let Some(session) = self.session.take() {
                    info!(user_id = %session.user_id, "signed out");
                }
                self.subscription = None;
                self.stack = vec![Screen::Login(LoginState::new())];
            }
            HomeAction::Open(entry) => {
                let screen = match entry {
                    MenuEntry::Dashboard => self.dashboard_screen().await,
                    MenuEntry::Clients => self.clients_screen("", 1).await,
                    MenuEntry::Projects => self.projects_screen(None).await,
                    MenuEntry::TimeTracking => self.time_logs_screen(1).await,
                    MenuEntry::Activities => self.activities_screen(1).await,
                    MenuEntry::Reports => self.reports_screen(ReportPeriod::Month, ReportKind::default()).await,
                };
                self.push(screen);
            }
        }
        Ok(())
    }

    async fn on_dashboard(&mut self, action: DashboardAction) -> Result<()> {
        match action {
            DashboardAction::Back => self.pop(),
            DashboardAction::Refresh => {
                let screen = self.dashboard_screen().await;
                self.replace(screen);
            }
        }
        Ok(())
    }

    async fn on_clients(&mut self, action: ClientAction) -> Result<()> {
        let session = self.signed_in()?;
        match action {
            ClientAction::Back => self.pop(),
            ClientAction::NewClient => self.stack.push(Screen::ClientWizard(ClientWizardState::new())),
            ClientAction::EditClient(client) => {
                self.stack.push(Screen::ClientWizard(ClientWizardState::from_existing(&client)));
            }
            ClientAction::DeleteClient(id) => {
                match actions::clients::soft_delete_client(&self.db, &session, id).await {
                    Ok(()) => self.notice("Client deleted"),
                    Err(e) => self.show_error(e),
                }
                self.reload().await?;
            }
            ClientAction::ViewProjects(id) => {
                let screen = self.projects_screen(Some(id)).await;
                self.push(screen);
            }
            ClientAction::Load { query, page } => {
                let screen = self.clients_screen(&query, page).await;
                self.replace(screen);
            }
        }
        Ok(())
    }

    async fn on_client_wizard(&mut self, action: ClientWizardAction) -> Result<()> {
        let session = self.signed_in()?;
        let result = match action {
            ClientWizardAction::Cancel => {
                self.pop();
                return Ok(());
            }
            ClientWizardAction::Save(None, input) => actions::clients::create_client(&self.db, &session, input).await,
            ClientWizardAction::Save(Some(id), input) => {
                actions::clients::update_client(&self.db, &session, id, input).await
            }
        };
        match result {
            Ok(client) => {
                self.notice(format!("Saved {}", client.name));
                self.close_wizard().await
            }
            Err(e) => {
                self.show_error(e);
                Ok(())
            }
        }
    }

    async fn on_projects(&mut self, action: ProjectAction) -> Result<()> {
        let session = self.signed_in()?;
        match action {
            ProjectAction::Back => self.pop(),
            ProjectAction::NewProject(client_id) => match self.client_choices(&session).await {
                Ok(clients) => self
                    .stack
                    .push(Screen::ProjectWizard(ProjectWizardState::new(&clients, client_id))),
                Err(e) => self.show_error(e),
            },
            ProjectAction::EditProject(project) => match self.client_choices(&session).await {
                Ok(clients) => self
                    .stack
                    .push(Screen::ProjectWizard(ProjectWizardState::from_existing(&project, &clients))),
                Err(e) => self.show_error(e),
            },
            ProjectAction::DeleteProject(id) => {
                match actions::projects::delete_project(&self.db, &session, id).await {
                    Ok(()) => self.notice("Project deleted"),
                    Err(e) => self.show_error(e),
                }
                self.reload().await?;
            }
            ProjectAction::OpenBoard(id) => {
                let screen = self.board_screen(id).await;
                self.push(screen);
            }
            ProjectAction::OpenDeliverables(id) => {
                let screen = self.deliverables_screen(id).await;
                self.push(screen);
            }
        }
        Ok(())
    }

    async fn on_project_wizard(&mut self, action: ProjectWizardAction) -> Result<()> {
        let session = self.signed_in()?;
        let result = match action {
            ProjectWizardAction::Cancel => {
                self.pop();
                return Ok(());
            }
            ProjectWizardAction::Save(None, input) => {
                actions::projects::create_project(&self.db, &session, input).await
            }
            ProjectWizardAction::Save(Some(id), input) => {
                actions::projects::update_project(&self.db, &session, id, input).await
            }
        };
        match result {
            Ok(project) => {
                self.notice(format!("Saved {}", project.name));
                self.close_wizard().await
            }
            Err(e) => {
                self.show_error(e);
                Ok(())
            }
        }
    }

    async fn on_board(&mut self, action: BoardAction) -> Result<()> {
        let session = self.signed_in()?;
        let Some(Screen::Board(state)) = self.stack.last() else {
            return Ok(());
        };
        let project_id = state.project_id();
        let stages = state.stages();

        let result = match action {
            BoardAction::Back => {
                self.pop();
                return Ok(());
            }
            BoardAction::NewTask(stage_id) => {
                match auth::team_members(&self.db, &session).await {
                    Ok(users) => self
                        .stack
                        .push(Screen::TaskWizard(TaskWizardState::new(stage_id, &users))),
                    Err(e) => self.show_error(e),
                }
                return Ok(());
            }
            BoardAction::EditTask(task) => {
                match auth::team_members(&self.db, &session).await {
                    Ok(users) => self
                        .stack
                        .push(Screen::TaskWizard(TaskWizardState::from_existing(&task, &users, &stages))),
                    Err(e) => self.show_error(e),
                }
                return Ok(());
            }
            BoardAction::DeleteTask(id) => actions::tasks::delete_task(&self.db, &session, id).await,
            BoardAction::MoveTasks(updates) => {
                actions::tasks::update_task_positions(&self.db, &session, project_id, &updates).await
            }
            BoardAction::MoveStages(updates) => {
                actions::board::update_stage_order(&self.db, &session, project_id, &updates).await
            }
            BoardAction::CreateStage(name) => {
                actions::board::create_stage(&self.db, &session, project_id, &name)
                    .await
                    .map(|_| ())
            }
            BoardAction::RenameStage(id, name) => {
                actions::board::rename_stage(&self.db, &session, id, &name)
                    .await
                    .map(|_| ())
            }
        };
        if let Err(e) = result {
            self.show_error(e);
        }
        self.reload().await
    }

    async fn on_task_wizard(&mut self, action: TaskWizardAction) -> Result<()> {
        let session = self.signed_in()?;
        let project_id = self.stack.iter().rev().find_map(|s| match s {
            Screen::Board(state) => Some(state.project_id()),
            _ => None,
        });

        let result = match action {
            TaskWizardAction::Cancel => {
                self.pop();
                return Ok(());
            }
            TaskWizardAction::Create { stage_id, input } => {
                let project_id = project_id.context("task wizard opened without a board")?;
                actions::tasks::create_task(&self.db, &self.hub, &session, project_id, stage_id, input)
                    .await
                    .map(|_| ())
            }
            TaskWizardAction::Update {
                task_id,
                changes,
                stage_id,
            } => {
                let updated = actions::tasks::update_task(&self.db, &self.hub, &session, task_id, changes).await;
                match (updated, stage_id) {
                    (Ok(_), Some(stage_id)) => {
                        actions::tasks::update_task_stage(&self.db, &self.hub, &session, task_id, stage_id)
                            .await
                            .map(|_| ())
                    }
                    (result, _) => result.map(|_| ()),
                }
            }
        };
        match result {
            Ok(()) => self.close_wizard().await,
            Err(e) => {
                self.show_error(e);
                Ok(())
            }
        }
    }

    async fn on_time_logs(&mut self, action: TimeLogAction) -> Result<()> {
        let session = self.signed_in()?;
        let result = match action {
            TimeLogAction::Back => {
                self.pop();
                return Ok(());
            }
            TimeLogAction::NewLog => {
                match self.project_choices(&session).await {
                    Ok(projects) => self.stack.push(Screen::TimeLogWizard(TimeLogWizardState::new(
                        Utc::now().date_naive(),
                        &projects,
                    ))),
                    Err(e) => self.show_error(e),
                }
                return Ok(());
            }
            TimeLogAction::EditLog(log) => {
                match self.project_choices(&session).await {
                    Ok(projects) => self
                        .stack
                        .push(Screen::TimeLogWizard(TimeLogWizardState::from_existing(&log, &projects))),
                    Err(e) => self.show_error(e),
                }
                return Ok(());
            }
            TimeLogAction::Load { page } => {
                let screen = self.time_logs_screen(page).await;
                self.replace(screen);
                return Ok(());
            }
            TimeLogAction::DeleteLog(id) => actions::time_logs::delete_time_log(&self.db, &session, id)
                .await
                .map(|()| "Entry deleted".to_string()),
            TimeLogAction::StartTimer(timer) => actions::time_logs::start_time_log(&self.db, &session, timer)
                .await
                .map(|_| "Timer started".to_string()),
            TimeLogAction::StopTimer(id) => actions::time_logs::stop_time_log(&self.db, &session, id)
                .await
                .map(|log| format!("Timer stopped after {:.2}h", log.duration)),
        };
        match result {
            Ok(message) => self.notice(message),
            Err(e) => self.show_error(e),
        }
        self.reload().await
    }

    async fn on_time_log_wizard(&mut self, action: TimeLogWizardAction) -> Result<()> {
        let session = self.signed_in()?;
        let result = match action {
            TimeLogWizardAction::Cancel => {
                self.pop();
                return Ok(());
            }
            TimeLogWizardAction::Save(None, input) => {
                actions::time_logs::create_time_log(&self.db, &session, input).await
            }
            TimeLogWizardAction::Save(Some(id), input) => {
                actions::time_logs::update_time_log(&self.db, &session, id, input).await
            }
        };
        match result {
            Ok(_) => self.close_wizard().await,
            Err(e) => {
                self.show_error(e);
                Ok(())
            }
        }
    }

    async fn on_activities(&mut self, action: ActivityAction) -> Result<()> {
        let session = self.signed_in()?;
        match action {
            ActivityAction::Back => self.pop(),
            ActivityAction::NewActivity | ActivityAction::EditActivity(_) => {
                let choices = tokio::try_join!(self.client_choices(&session), self.project_choices(&session));
                match choices {
                    Ok((clients, projects)) => {
                        let state = match action {
                            ActivityAction::EditActivity(activity) => ActivityWizardState::from_existing(
                                &activity,
                                session.user_id,
                                &clients,
                                &projects,
                            ),
                            _ => ActivityWizardState::new(session.user_id, Utc::now(), &clients, &projects),
                        };
                        self.stack.push(Screen::ActivityWizard(state));
                    }
                    Err(e) => self.show_error(e),
                }
            }
            ActivityAction::DeleteActivity(id) => {
                match actions::activities::delete_activity(&self.db, &session, id).await {
                    Ok(()) => self.notice("Activity deleted"),
                    Err(e) => self.show_error(e),
                }
                self.reload().await?;
            }
            ActivityAction::Load { page } => {
                let screen = self.activities_screen(page).await;
                self.replace(screen);
            }
        }
        Ok(())
    }

    async fn on_activity_wizard(&mut self, action: ActivityWizardAction) -> Result<()> {
        let session = self.signed_in()?;
        let result = match action {
            ActivityWizardAction::Cancel => {
                self.pop();
                return Ok(());
            }
            ActivityWizardAction::Save(None, input) => {
                actions::activities::create_activity(&self.db, &session, input).await
            }
            ActivityWizardAction::Save(Some(id), input) => {
                actions::activities::update_activity(&self.db, &session, id, input).await
            }
        };
        match result {
            Ok(activity) => {
                self.notice(format!("Saved {}", activity.title));
                self.close_wizard().await
            }
            Err(e) => {
                self.show_error(e);
                Ok(())
            }
        }
    }

    async fn on_deliverables(&mut self, action: DeliverableAction) -> Result<()> {
        let session = self.signed_in()?;
        let Some(Screen::Deliverables(state)) = self.stack.last() else {
            return Ok(());
        };
        let project_id = state.project_id();

        let result = match action {
            DeliverableAction::Back => {
                self.pop();
                return Ok(());
            }
            DeliverableAction::Upload => {
                self.stack
                    .push(Screen::DeliverableWizard(DeliverableWizardState::new(project_id)));
                return Ok(());
            }
            DeliverableAction::Edit(deliverable) => {
                self.stack
                    .push(Screen::DeliverableWizard(DeliverableWizardState::from_existing(&deliverable)));
                return Ok(());
            }
            DeliverableAction::NewVersion { id, path } => match read_upload(Path::new(&path)).await {
                Ok((file_name, bytes)) => actions::deliverables::new_deliverable_version(
                    &self.db,
                    &self.objects,
                    &session,
                    id,
                    &file_name,
                    &bytes,
                )
                .await
                .map(|d| format!("Uploaded version {}", d.version)),
                Err(e) => Err(ActionError::Failed(format!("Could not read {path}: {e}"))),
            },
            DeliverableAction::Approve(id) => {
                actions::deliverables::approve_deliverable(&self.db, &self.hub, &session, id)
                    .await
                    .map(|d| format!("{} approved", d.name))
            }
            DeliverableAction::Reject(id) => actions::deliverables::reject_deliverable(&self.db, &session, id)
                .await
                .map(|d| format!("{} rejected", d.name)),
            DeliverableAction::Delete(id) => {
                actions::deliverables::delete_deliverable(&self.db, &self.objects, &session, id)
                    .await
                    .map(|()| "Deliverable deleted".to_string())
            }
        };
        match result {
            Ok(message) => self.notice(message),
            Err(e) => self.show_error(e),
        }
        self.reload().await
    }

    async fn on_deliverable_wizard(&mut self, action: DeliverableWizardAction) -> Result<()> {
        let session = self.signed_in()?;
        let result = match action {
            DeliverableWizardAction::Cancel => {
                self.pop();
                return Ok(());
            }
            DeliverableWizardAction::Upload { path, mut upload } => match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    upload.bytes = bytes;
                    actions::deliverables::upload_deliverable(&self.db, &self.objects, &session, upload).await
                }
                Err(e) => {
                    warn!(path = %path.display(), "cannot read upload: {e}");
                    let mut errors = FieldErrors::new();
                    errors.add("path", "Could not read this file");
                    Err(errors.into())
                }
            },
            DeliverableWizardAction::Update(id, input) => {
                actions::deliverables::update_deliverable(&self.db, &session, id, input).await
            }
        };
        match result {
            Ok(deliverable) => {
                self.notice(format!("Saved {} v{}", deliverable.name, deliverable.version));
                self.close_wizard().await
            }
            Err(e) => {
                self.show_error(e);
                Ok(())
            }
        }
    }

    async fn on_reports(&mut self, action: ReportsAction) -> Result<()> {
        match action {
            ReportsAction::Back => self.pop(),
            ReportsAction::Load { period, kind } => {
                let screen = self.reports_screen(period, kind).await;
                self.replace(screen);
            }
        }
        Ok(())
    }

    async fn client_choices(&self, session: &Session) -> ActionResult<Vec<Client>> {
        let page = actions::clients::list_clients(&self.db, session, None, Page::first(CHOICE_LIMIT)).await?;
        Ok(page.data)
    }

    async fn project_choices(&self, session: &Session) -> ActionResult<Vec<Project>> {
        let mut projects = actions::projects::list_projects(&self.db, session, ProjectFilter::default()).await?;
        projects.truncate(CHOICE_LIMIT as usize);
        Ok(projects)
    }

    async fn dashboard_screen(&self) -> ActionResult<Screen> {
        let session = self.signed_in()?;
        let metrics = actions::reports::dashboard_metrics(&self.db, &session, Utc::now(), self.config.default_bill_rate)
            .await?;
        Ok(Screen::Dashboard(DashboardState::new(metrics)))
    }

    async fn clients_screen(&self, query: &str, page: u32) -> ActionResult<Screen> {
        let session = self.signed_in()?;
        let search = Some(query.trim()).filter(|q| !q.is_empty());
        let result = actions::clients::list_clients(
            &self.db,
            &session,
            search,
            Page::new(page, actions::clients::DEFAULT_PAGE_SIZE),
        )
        .await?;
        Ok(Screen::Clients(ClientsState::new(result, query.to_string())))
    }

    async fn projects_screen(&self, client_id: Option<Uuid>) -> ActionResult<Screen> {
        let session = self.signed_in()?;
        let title = match client_id {
            Some(id) => {
                let client = actions::clients::get_client(&self.db, &session, id).await?;
                format!("Projects - {}", client.name)
            }
            None => "Projects".to_string(),
        };
        let filter = ProjectFilter {
            client_id,
            ..ProjectFilter::default()
        };
        let projects = actions::projects::list_projects(&self.db, &session, filter).await?;
        Ok(Screen::Projects(ProjectsState::new(client_id, title, projects)))
    }

    async fn board_screen(&self, project_id: Uuid) -> ActionResult<Screen> {
        let session = self.signed_in()?;
        let (board, users) = tokio::try_join!(
            actions::board::load_board(&self.db, &session, project_id),
            auth::team_members(&self.db, &session),
        )?;
        Ok(Screen::Board(BoardState::new(board, users)))
    }

    async fn time_logs_screen(&self, page: u32) -> ActionResult<Screen> {
        let session = self.signed_in()?;
        let today = Utc::now().date_naive();
        let (logs, metrics, running, projects) = tokio::try_join!(
            actions::time_logs::list_time_logs(
                &self.db,
                &session,
                TimeLogFilter::default(),
                Page::new(page, actions::time_logs::DEFAULT_PAGE_SIZE),
            ),
            actions::reports::time_log_metrics(&self.db, &session, today, self.config.default_bill_rate),
            actions::time_logs::running_time_log(&self.db, &session),
            self.project_choices(&session),
        )?;
        let names = projects.into_iter().map(|p| (p.id, p.name)).collect();
        Ok(Screen::TimeLogs(TimeLogsState::new(logs, metrics, running, names)))
    }

    async fn activities_screen(&self, page: u32) -> ActionResult<Screen> {
        let session = self.signed_in()?;
        let result = actions::activities::list_activities(
            &self.db,
            &session,
            ActivityFilter::default(),
            Page::new(page, actions::activities::DEFAULT_PAGE_SIZE),
        )
        .await?;
        Ok(Screen::Activities(ActivitiesState::new(result)))
    }

    async fn deliverables_screen(&self, project_id: Uuid) -> ActionResult<Screen> {
        let session = self.signed_in()?;
        let (project, list) = tokio::try_join!(
            actions::projects::get_project(&self.db, &session, project_id),
            actions::deliverables::list_deliverables(&self.db, &session, project_id),
        )?;
        Ok(Screen::Deliverables(DeliverablesState::new(project.id, project.name, list)))
    }

    async fn reports_screen(&self, period: ReportPeriod, kind: ReportKind) -> ActionResult<Screen> {
        let session = self.signed_in()?;
        let today = Utc::now().date_naive();
        let range = period.range(today);
        let rate = self.config.default_bill_rate;
        let filters = ReportFilters {
            period,
            project_ids: Vec::new(),
        };

        let (metrics, daily, categories, top_projects, clients, preview) = tokio::try_join!(
            actions::reports::time_log_metrics(&self.db, &session, today, rate),
            actions::reports::daily_productivity(&self.db, &session, today, REPORT_CHART_DAYS),
            actions::reports::time_by_category(&self.db, &session, range),
            actions::reports::top_projects(&self.db, &session, range),
            actions::reports::time_by_client(&self.db, &session, range),
            actions::reports::report_preview(&self.db, &session, &filters, kind, today, rate),
        )?;
        let view = ReportsView {
            metrics,
            daily,
            categories,
            top_projects,
            clients,
            preview,
        };
        Ok(Screen::Reports(ReportsState::new(period, kind, view)))
    }

    fn signed_in(&self) -> ActionResult<Session> {
        self.session.clone().ok_or(ActionError::Unauthorized)
    }
}

/// File name and contents of a file picked for upload.
async fn read_upload(path: &Path) -> Result<(String, Vec<u8>)> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("path has no file name")?
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok((file_name, bytes))
}
