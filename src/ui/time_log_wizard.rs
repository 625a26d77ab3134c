use chrono::NaiveDate;
use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};
use uuid::Uuid;

use super::components::date_input::DateInputState;
use super::components::form::{
    index_of, optional_index, optional_options, pick, pick_optional, render_form, FormAction, FormField, FormState,
};
use crate::error::FieldErrors;
use crate::models::{Project, TimeLog, TimeLogCategory, TimeLogInput};

pub enum TimeLogWizardAction {
    Cancel,
    Save(Option<Uuid>, TimeLogInput),
}

pub struct TimeLogWizardState {
    log_id: Option<Uuid>,
    /// Values the form does not show, kept as they were.
    base: TimeLogInput,
    project_ids: Vec<Uuid>,
    pub form: FormState,
}

impl TimeLogWizardState {
    pub fn new(today: NaiveDate, projects: &[Project]) -> Self {
        Self::build(None, TimeLogInput::new(today, 0.0), projects)
    }

    pub fn from_existing(log: &TimeLog, projects: &[Project]) -> Self {
        Self::build(Some(log.id), TimeLogInput::from(log), projects)
    }

    fn build(log_id: Option<Uuid>, base: TimeLogInput, projects: &[Project]) -> Self {
        let project_ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
        let duration = if base.duration > 0.0 { base.duration.to_string() } else { String::new() };
        let fields = vec![
            FormField::date("date", "Date", DateInputState::date(base.date)),
            FormField::text("duration", "Hours", duration),
            FormField::choice(
                "category",
                "Category",
                TimeLogCategory::ALL.map(TimeLogCategory::as_str),
                index_of(&TimeLogCategory::ALL, &base.category),
            ),
            FormField::choice(
                "project",
                "Project",
                optional_options(projects.iter().map(|p| p.name.clone())),
                optional_index(&project_ids, base.project_id.as_ref()),
            ),
            FormField::text("description", "Description", base.description.clone().unwrap_or_default()),
            FormField::toggle("billable", "Billable", base.billable),
            FormField::text(
                "bill_rate",
                "Hourly rate",
                base.bill_rate.map(|r| r.to_string()).unwrap_or_default(),
            ),
            FormField::text("tags", "Tags (comma separated)", base.tags.join(", ")),
        ];

        let title = if log_id.is_some() { "Edit Time Entry" } else { "Log Time" };
        Self {
            log_id,
            base,
            project_ids,
            form: FormState::new(title, fields),
        }
    }

    pub fn input(&self) -> Result<TimeLogInput, FieldErrors> {
        let form = &self.form;
        let mut errors = FieldErrors::new();
        let duration = form.number("duration", &mut errors).unwrap_or(0.0);
        let bill_rate = form.number("bill_rate", &mut errors);
        errors.into_result()?;

        Ok(TimeLogInput {
            date: form.date("date").unwrap_or(self.base.date),
            duration,
            category: pick(&TimeLogCategory::ALL, form.choice("category")),
            project_id: pick_optional(&self.project_ids, form.choice("project")),
            description: form.optional("description"),
            billable: form.toggled("billable"),
            bill_rate,
            tags: form.list("tags"),
            ..self.base.clone()
        })
    }
}

pub fn render_time_log_wizard<B: Backend>(f: &mut Frame<B>, state: &mut TimeLogWizardState) {
    render_form(f, &state.form);
}

pub fn handle_input(state: &mut TimeLogWizardState, key: KeyCode) -> Option<TimeLogWizardAction> {
    match state.form.handle_key(key)? {
        FormAction::Cancel => Some(TimeLogWizardAction::Cancel),
        FormAction::Submit => match state.input() {
            Ok(input) => Some(TimeLogWizardAction::Save(state.log_id, input)),
            Err(errors) => {
                state.form.set_errors(errors);
                None
            }
        },
    }
}
