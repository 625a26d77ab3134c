use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};
use uuid::Uuid;

use super::components::form::{
    index_of, optional_index, optional_options, pick, pick_optional, render_form, FormAction, FormField, FormState,
};
use crate::error::FieldErrors;
use crate::models::{
    ArchitecturalStyle, Client, ConstructionType, Project, ProjectInput, ProjectVisibility, DEFAULT_STAGES,
    PROJECT_STATUSES,
};

pub enum ProjectWizardAction {
    Cancel,
    Save(Option<Uuid>, ProjectInput),
}

pub struct ProjectWizardState {
    pub project_id: Option<Uuid>,
    /// Ids behind the client choices; choice 0 is "no client".
    client_ids: Vec<Uuid>,
    pub form: FormState,
}

fn date_text(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn number_text<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl ProjectWizardState {
    pub fn new(clients: &[Client], client_id: Option<Uuid>) -> Self {
        let input = ProjectInput {
            client_id,
            ..ProjectInput::default()
        };
        Self::build(None, clients, &input)
    }

    pub fn from_existing(project: &Project, clients: &[Client]) -> Self {
        Self::build(Some(project.id), clients, &ProjectInput::from(project))
    }

    fn build(project_id: Option<Uuid>, clients: &[Client], input: &ProjectInput) -> Self {
        let client_ids: Vec<Uuid> = clients.iter().map(|c| c.id).collect();
        let client_names: Vec<String> = clients.iter().map(|c| c.name.clone()).collect();

        let mut fields = vec![
            FormField::text("name", "Name", input.name.clone()),
            FormField::choice(
                "status",
                "Status",
                PROJECT_STATUSES,
                index_of(&PROJECT_STATUSES, &input.status.as_str()),
            ),
            FormField::choice(
                "client",
                "Client",
                optional_options(client_names),
                optional_index(&client_ids, input.client_id.as_ref()),
            ),
            FormField::text("project_type", "Type", input.project_type.clone().unwrap_or_default()),
            FormField::text("address", "Address", input.address.clone().unwrap_or_default()),
            FormField::text("start_date", "Start (YYYY-MM-DD)", date_text(input.start_date)),
            FormField::text("estimated_end_date", "Deadline (YYYY-MM-DD)", date_text(input.estimated_end_date)),
            FormField::text("actual_end_date", "Finished (YYYY-MM-DD)", date_text(input.actual_end_date)),
            FormField::text("total_area", "Total area (m2)", number_text(input.total_area)),
            FormField::text("planned_cost", "Planned cost", number_text(input.planned_cost)),
            FormField::choice(
                "architectural_style",
                "Style",
                optional_options(ArchitecturalStyle::ALL.map(ArchitecturalStyle::as_str)),
                optional_index(&ArchitecturalStyle::ALL, input.architectural_style.as_ref()),
            ),
            FormField::choice(
                "construction_type",
                "Construction",
                optional_options(ConstructionType::ALL.map(ConstructionType::as_str)),
                optional_index(&ConstructionType::ALL, input.construction_type.as_ref()),
            ),
            FormField::text("number_of_floors", "Floors", number_text(input.number_of_floors)),
            FormField::text("parking_spots", "Parking spots", number_text(input.parking_spots)),
            FormField::toggle("has_basement", "Basement", input.has_basement),
            FormField::toggle("has_garage", "Garage", input.has_garage),
            FormField::toggle(
                "environmental_license_required",
                "Environmental license",
                input.environmental_license_required,
            ),
            FormField::choice(
                "visibility",
                "Visibility",
                ProjectVisibility::ALL.map(ProjectVisibility::as_str),
                index_of(&ProjectVisibility::ALL, &input.visibility),
            ),
        ];
        if project_id.is_none() {
            fields.push(FormField::text("stages", "Columns (comma separated)", DEFAULT_STAGES.join(", ")));
        }

        let title = if project_id.is_some() { "Edit Project" } else { "New Project" };
        Self {
            project_id,
            client_ids,
            form: FormState::new(title, fields),
        }
    }

    pub fn input(&self) -> Result<ProjectInput, FieldErrors> {
        let form = &self.form;
        let mut errors = FieldErrors::new();

        let input = ProjectInput {
            name: form.text("name").to_string(),
            status: PROJECT_STATUSES
                .get(form.choice("status"))
                .copied()
                .unwrap_or(PROJECT_STATUSES[0])
                .to_string(),
            client_id: pick_optional(&self.client_ids, form.choice("client")),
            project_type: form.optional("project_type"),
            address: form.optional("address"),
            start_date: form.optional_date("start_date", &mut errors),
            estimated_end_date: form.optional_date("estimated_end_date", &mut errors),
            actual_end_date: form.optional_date("actual_end_date", &mut errors),
            total_area: form.number("total_area", &mut errors),
            planned_cost: form.number("planned_cost", &mut errors),
            architectural_style: pick_optional(&ArchitecturalStyle::ALL, form.choice("architectural_style")),
            construction_type: pick_optional(&ConstructionType::ALL, form.choice("construction_type")),
            number_of_floors: form.number("number_of_floors", &mut errors),
            parking_spots: form.number("parking_spots", &mut errors),
            has_basement: form.toggled("has_basement"),
            has_garage: form.toggled("has_garage"),
            environmental_license_required: form.toggled("environmental_license_required"),
            visibility: pick(&ProjectVisibility::ALL, form.choice("visibility")),
            stages: form.list("stages"),
        };
        errors.into_result().map(|()| input)
    }
}

pub fn render_project_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState) {
    render_form(f, &state.form);
}

pub fn handle_input(state: &mut ProjectWizardState, key: KeyCode) -> Option<ProjectWizardAction> {
    match state.form.handle_key(key)? {
        FormAction::Cancel => Some(ProjectWizardAction::Cancel),
        FormAction::Submit => match state.input() {
            Ok(input) => Some(ProjectWizardAction::Save(state.project_id, input)),
            Err(errors) => {
                state.form.set_errors(errors);
                None
            }
        },
    }
}
