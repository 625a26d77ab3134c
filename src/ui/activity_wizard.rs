use chrono::{DateTime, Utc};
use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};
use uuid::Uuid;

use super::components::date_input::DateInputState;
use super::components::form::{
    index_of, optional_index, optional_options, pick, pick_optional, render_form, FormAction, FormField, FormState,
};
use crate::error::FieldErrors;
use crate::models::{Activity, ActivityInput, ActivityStatus, ActivityType, Client, Project};

pub enum ActivityWizardAction {
    Cancel,
    Save(Option<Uuid>, ActivityInput),
}

pub struct ActivityWizardState {
    activity_id: Option<Uuid>,
    user_id: Uuid,
    base: ActivityInput,
    client_ids: Vec<Uuid>,
    project_ids: Vec<Uuid>,
    pub form: FormState,
}

impl ActivityWizardState {
    pub fn new(user_id: Uuid, now: DateTime<Utc>, clients: &[Client], projects: &[Project]) -> Self {
        let mut input = ActivityInput::new(ActivityType::default(), "", now);
        input.participants.push(user_id);
        Self::build(None, user_id, input, clients, projects)
    }

    pub fn from_existing(activity: &Activity, user_id: Uuid, clients: &[Client], projects: &[Project]) -> Self {
        Self::build(Some(activity.id), user_id, ActivityInput::from(activity), clients, projects)
    }

    fn build(
        activity_id: Option<Uuid>,
        user_id: Uuid,
        base: ActivityInput,
        clients: &[Client],
        projects: &[Project],
    ) -> Self {
        let client_ids: Vec<Uuid> = clients.iter().map(|c| c.id).collect();
        let project_ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
        let fields = vec![
            FormField::choice(
                "kind",
                "Type",
                ActivityType::ALL.map(ActivityType::as_str),
                index_of(&ActivityType::ALL, &base.kind),
            ),
            FormField::text("title", "Title", base.title.clone()),
            FormField::date("start_time", "Starts", DateInputState::date_time(base.start_time)),
            FormField::text(
                "duration",
                "Duration (minutes)",
                base.duration.map(|d| d.to_string()).unwrap_or_default(),
            ),
            FormField::text("location", "Location", base.location.clone().unwrap_or_default()),
            FormField::text("email", "Contact email", base.contact_email.clone().unwrap_or_default()),
            FormField::choice(
                "client",
                "Client",
                optional_options(clients.iter().map(|c| c.name.clone())),
                optional_index(&client_ids, base.client_id.as_ref()),
            ),
            FormField::choice(
                "project",
                "Project",
                optional_options(projects.iter().map(|p| p.name.clone())),
                optional_index(&project_ids, base.project_id.as_ref()),
            ),
            FormField::toggle("attending", "I'm attending", base.participants.contains(&user_id)),
            FormField::choice(
                "status",
                "Status",
                ActivityStatus::ALL.map(ActivityStatus::as_str),
                index_of(&ActivityStatus::ALL, &base.status),
            ),
            FormField::text("description", "Description", base.description.clone().unwrap_or_default()),
            FormField::text("notes", "Notes", base.notes.clone().unwrap_or_default()),
        ];

        let title = if activity_id.is_some() { "Edit Activity" } else { "New Activity" };
        Self {
            activity_id,
            user_id,
            base,
            client_ids,
            project_ids,
            form: FormState::new(title, fields),
        }
    }

    pub fn input(&self) -> Result<ActivityInput, FieldErrors> {
        let form = &self.form;
        let mut errors = FieldErrors::new();
        let duration = form.number("duration", &mut errors);
        errors.into_result()?;

        let mut participants: Vec<Uuid> = self
            .base
            .participants
            .iter()
            .copied()
            .filter(|id| *id != self.user_id)
            .collect();
        if form.toggled("attending") {
            participants.push(self.user_id);
        }

        let start_time = form.date_time("start_time").unwrap_or(self.base.start_time);
        Ok(ActivityInput {
            kind: pick(&ActivityType::ALL, form.choice("kind")),
            title: form.text("title").to_string(),
            start_time,
            end_time: duration.map(|minutes| start_time + chrono::Duration::minutes(i64::from(minutes))),
            duration,
            location: form.optional("location"),
            contact_email: form.optional("email"),
            client_id: pick_optional(&self.client_ids, form.choice("client")),
            project_id: pick_optional(&self.project_ids, form.choice("project")),
            participants,
            status: pick(&ActivityStatus::ALL, form.choice("status")),
            description: form.optional("description"),
            notes: form.optional("notes"),
            task_id: self.base.task_id,
        })
    }
}

pub fn render_activity_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ActivityWizardState) {
    render_form(f, &state.form);
}

pub fn handle_input(state: &mut ActivityWizardState, key: KeyCode) -> Option<ActivityWizardAction> {
    match state.form.handle_key(key)? {
        FormAction::Cancel => Some(ActivityWizardAction::Cancel),
        FormAction::Submit => match state.input() {
            Ok(input) => Some(ActivityWizardAction::Save(state.activity_id, input)),
            Err(errors) => {
                state.form.set_errors(errors);
                None
            }
        },
    }
}
